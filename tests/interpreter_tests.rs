//! Transitions, context handling, recovery and diagnostics of running
//! instances.

use mindset::core::StateDef;
use mindset::effects::{EffectOutcome, Machine};
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default, PartialEq)]
struct Ctx {
    value: Option<&'static str>,
}

fn transitions_machine() -> Machine<&'static str, &'static str> {
    Machine::builder()
        .state("a", StateDef::new().on("toB", "b").on("toC", "c"))
        .state("b", StateDef::new())
        .state("c", StateDef::new().on("toX", "x"))
        .state("x", StateDef::new())
        .initial("a")
        .build()
        .unwrap()
}

fn context_machine() -> Machine<&'static str, &'static str, Ctx> {
    Machine::builder()
        .state("a", StateDef::new().on("toB", "b"))
        .state(
            "b",
            StateDef::new().on("toA", "a").effect(|env| {
                env.set_context(Ctx { value: Some("X") });
                env.dispatch("toA")?;
                env.set_context(Ctx { value: Some("Y") });
                Ok(EffectOutcome::Done)
            }),
        )
        .initial("a")
        .build()
        .unwrap()
}

mod transitions {
    use super::*;

    #[test]
    fn transitions_from_a_to_b() {
        let instance = transitions_machine().instantiate().unwrap();
        instance.dispatch("toB").unwrap();
        assert_eq!(instance.state(), "b");
    }

    #[test]
    fn transitions_from_a_to_c() {
        let instance = transitions_machine().instantiate().unwrap();
        instance.dispatch("toC").unwrap();
        assert_eq!(instance.state(), "c");
    }

    #[test]
    fn does_not_transition_from_b_to_c() {
        let instance = transitions_machine().instantiate().unwrap();
        instance.dispatch("toB").unwrap();
        instance.dispatch("toC").unwrap();
        assert_eq!(instance.state(), "b");
    }

    #[test]
    fn ignores_invalid_action_names() {
        let instance = transitions_machine().instantiate().unwrap();
        instance.dispatch("orNotToB").unwrap();
        assert_eq!(instance.state(), "a");
    }

    #[test]
    fn final_states_are_classified_by_outgoing_transitions() {
        let machine = transitions_machine();
        let mut finals: Vec<_> = machine.final_states().iter().copied().collect();
        finals.sort_unstable();
        assert_eq!(finals, vec!["b", "x"]);
    }
}

mod context {
    use super::*;

    #[test]
    fn context_defaults_to_initial_value() {
        let instance = context_machine().instantiate().unwrap();
        assert_eq!(*instance.context(), Ctx::default());
    }

    #[test]
    fn context_can_be_recovered() {
        let instance = context_machine()
            .recover(None, Some(Ctx { value: Some("Z") }))
            .unwrap();
        assert_eq!(instance.state(), "a");
        assert_eq!(*instance.context(), Ctx { value: Some("Z") });
    }

    #[test]
    fn context_is_only_set_before_subsequent_dispatches() {
        let instance = context_machine().instantiate().unwrap();
        instance.dispatch("toB").unwrap();

        assert_eq!(instance.state(), "a");
        assert_eq!(*instance.context(), Ctx { value: Some("X") });
    }

    #[test]
    fn context_observers_see_each_snapshot() {
        let instance = context_machine().instantiate().unwrap();
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        instance.on_context_change(move |ctx| sink.borrow_mut().push(ctx.value));

        instance.dispatch("toB").unwrap();
        instance.dispatch("toB").unwrap();

        assert_eq!(*seen.borrow(), vec![Some("X"), Some("X")]);
    }

    #[test]
    fn instances_do_not_share_context() {
        let machine = context_machine();
        let first = machine.instantiate().unwrap();
        let second = machine.instantiate().unwrap();

        first.dispatch("toB").unwrap();

        assert_eq!(first.context().value, Some("X"));
        assert_eq!(second.context().value, None);
    }
}

mod recovery {
    use super::*;

    #[test]
    fn initial_state_is_used_without_recovery_state() {
        let instance = transitions_machine().recover(None, None).unwrap();
        assert_eq!(instance.state(), "a");
    }

    #[test]
    fn recovery_state_is_used_when_provided() {
        let instance = transitions_machine().recover(Some("x"), None).unwrap();
        assert_eq!(instance.state(), "x");
        assert!(instance.is_final());
    }
}

mod diagnostics {
    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_warnings(run: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        captured.text()
    }

    #[test]
    fn rejected_calls_are_logged_as_warnings() {
        let output = capture_warnings(|| {
            let instance = context_machine().instantiate().unwrap();
            instance.dispatch("toB").unwrap();
        });

        assert!(output.contains("WARN"));
        assert!(output.contains("Context cannot be set after the effect has expired"));
    }

    #[test]
    fn unknown_actions_are_not_warned_about() {
        let output = capture_warnings(|| {
            let instance = transitions_machine().instantiate().unwrap();
            instance.dispatch("nonsense").unwrap();
        });

        assert!(output.is_empty());
    }

    #[test]
    fn late_dispatch_is_logged() {
        let output = capture_warnings(|| {
            let machine: Machine<&str, &str> = Machine::builder()
                .state("a", StateDef::new().on("toB", "b"))
                .state(
                    "b",
                    StateDef::new().on("toA", "a").effect(|env| {
                        env.dispatch("toA")?;
                        env.dispatch("toA")?;
                        Ok(EffectOutcome::Done)
                    }),
                )
                .initial("a")
                .build()
                .unwrap();
            let instance = machine.instantiate().unwrap();
            instance.dispatch("toB").unwrap();
            assert_eq!(instance.state(), "a");
        });

        assert!(output.contains("Cannot dispatch an action after the effect has expired"));
    }
}
