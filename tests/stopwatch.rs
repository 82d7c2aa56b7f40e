//! A stopwatch machine end to end: enum identifiers, action-dependent
//! effects, context snapshots and checkpoint recovery.

use chrono::{DateTime, Duration, Utc};
use mindset::checkpoint::Checkpoint;
use mindset::effects::{EffectOutcome, Machine};
use mindset::{action_enum, state_enum};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

state_enum! {
    enum Watch {
        Stopped,
        Running,
    }
}

action_enum! {
    enum Control {
        Start,
        Stop,
        Reset,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Elapsed {
    started_at: Option<DateTime<Utc>>,
    paused_ms: Option<i64>,
}

fn stopwatch() -> Machine<Watch, Control, Elapsed> {
    Machine::<Watch, Control, Elapsed>::builder()
        .state_with(Watch::Stopped, |def| {
            def.on(Control::Start, Watch::Running)
                .on(Control::Reset, Watch::Stopped)
                .effect(|env| {
                    match env.action() {
                        Some(Control::Stop) => {
                            let started_at = env.context().started_at.unwrap_or_else(Utc::now);
                            let paused_ms = (Utc::now() - started_at).num_milliseconds();
                            env.set_context(Elapsed {
                                started_at: None,
                                paused_ms: Some(paused_ms),
                            });
                        }
                        Some(Control::Reset) => env.set_context(Elapsed::default()),
                        _ => {}
                    }
                    Ok(EffectOutcome::Done)
                })
        })
        .state_with(Watch::Running, |def| {
            def.on(Control::Stop, Watch::Stopped)
                .on(Control::Reset, Watch::Stopped)
                .effect(|env| {
                    let paused = Duration::milliseconds(env.context().paused_ms.unwrap_or(0));
                    env.set_context(Elapsed {
                        started_at: Some(Utc::now() - paused),
                        paused_ms: None,
                    });
                    Ok(EffectOutcome::Done)
                })
        })
        .initial(Watch::Stopped)
        .build()
        .unwrap()
}

#[test]
fn start_stop_reset_cycle() {
    let instance = stopwatch().instantiate().unwrap();
    assert_eq!(*instance.context(), Elapsed::default());

    instance.dispatch(Control::Start).unwrap();
    assert_eq!(instance.state(), Watch::Running);
    assert!(instance.context().started_at.is_some());

    instance.dispatch(Control::Stop).unwrap();
    let paused = instance.context();
    assert_eq!(instance.state(), Watch::Stopped);
    assert_eq!(paused.started_at, None);
    assert!(paused.paused_ms.is_some_and(|ms| ms >= 0));

    instance.dispatch(Control::Reset).unwrap();
    assert_eq!(*instance.context(), Elapsed::default());
}

#[test]
fn resuming_keeps_accumulated_time() {
    let instance = stopwatch()
        .recover(
            None,
            Some(Elapsed {
                started_at: None,
                paused_ms: Some(60_000),
            }),
        )
        .unwrap();

    instance.dispatch(Control::Start).unwrap();
    let started_at = instance.context().started_at.unwrap();
    assert!(Utc::now() - started_at >= Duration::milliseconds(60_000));
}

#[test]
fn snapshots_are_not_mutated_by_later_transitions() {
    let instance = stopwatch().instantiate().unwrap();
    instance.dispatch(Control::Start).unwrap();
    let running = instance.context();

    instance.dispatch(Control::Reset).unwrap();

    assert!(running.started_at.is_some());
    assert!(!Rc::ptr_eq(&running, &instance.context()));
}

#[test]
fn stopwatch_has_no_final_state() {
    let machine = stopwatch();
    assert!(machine.final_states().is_empty());
    assert!(machine.validate().is_success());
}

#[test]
fn checkpoint_round_trip_resumes_running_watch() {
    let machine = stopwatch();
    let instance = machine.instantiate().unwrap();
    instance.dispatch(Control::Start).unwrap();

    let json = instance.checkpoint().to_json().unwrap();
    let restored: Checkpoint<Watch, Elapsed> = Checkpoint::from_json(&json).unwrap();
    let resumed = machine.resume(restored).unwrap();

    assert_eq!(resumed.state(), Watch::Running);
    // Entry effect reran on recovery and restarted the clock
    assert!(resumed.context().started_at.is_some());
    assert_eq!(resumed.context().paused_ms, None);

    resumed.dispatch(Control::Stop).unwrap();
    assert_eq!(resumed.state(), Watch::Stopped);
}
