//! Checkpoint and resume for machine instances.
//!
//! A checkpoint captures the two values an instance needs to be recovered:
//! its current state and its context. Storing checkpoints is left to the
//! caller; this module only turns them into JSON or binary and back.

use crate::core::{Action, State};
use crate::effects::{Interpreter, Machine};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable capture of an instance.
/// Does NOT include effects or the active activation (not serializable).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S, C> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Current state of the instance
    pub state: S,

    /// Current context of the instance
    pub context: C,
}

impl<S, C> Checkpoint<S, C> {
    pub fn new(state: S, context: C) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state,
            context,
        }
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == CHECKPOINT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        }
    }
}

impl<S: Serialize, C: Serialize> Checkpoint<S, C> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }
}

impl<S: DeserializeOwned, C: DeserializeOwned> Checkpoint<S, C> {
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }
}

impl<S: State, A: Action, C: Clone + 'static, P: 'static> Interpreter<S, A, C, P> {
    /// Capture the current state and context.
    pub fn checkpoint(&self) -> Checkpoint<S, C> {
        Checkpoint::new(self.state(), C::clone(&self.context()))
    }
}

impl<S: State, A: Action, C: 'static, P: 'static> Machine<S, A, C, P> {
    /// Recover an instance from a checkpoint.
    ///
    /// Behaves like [`Machine::recover`] with both values supplied.
    pub fn resume(
        &self,
        checkpoint: Checkpoint<S, C>,
    ) -> Result<Interpreter<S, A, C, P>, CheckpointError> {
        checkpoint.check_version()?;
        tracing::debug!(
            id = %checkpoint.id,
            state = checkpoint.state.name(),
            "resuming from checkpoint"
        );
        Ok(self.recover(Some(checkpoint.state), Some(checkpoint.context))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateDef;
    use crate::effects::MachineError;

    #[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
    struct Counter {
        ticks: u32,
    }

    fn machine() -> Machine<String, String, Counter> {
        Machine::builder()
            .state(
                "idle".to_string(),
                StateDef::new().on("start".to_string(), "running".to_string()),
            )
            .state(
                "running".to_string(),
                StateDef::new().on("stop".to_string(), "idle".to_string()),
            )
            .initial("idle".to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn checkpoint_captures_state_and_context() {
        let instance = machine()
            .recover(Some("running".to_string()), Some(Counter { ticks: 3 }))
            .unwrap();
        let checkpoint = instance.checkpoint();

        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.state, "running");
        assert_eq!(checkpoint.context, Counter { ticks: 3 });
        assert!(Uuid::parse_str(&checkpoint.id).is_ok());
    }

    #[test]
    fn json_checkpoint_resumes_instance() {
        let machine = machine();
        let instance = machine
            .recover(Some("running".to_string()), Some(Counter { ticks: 7 }))
            .unwrap();

        let json = instance.checkpoint().to_json().unwrap();
        let restored = Checkpoint::<String, Counter>::from_json(&json).unwrap();
        let resumed = machine.resume(restored).unwrap();

        assert_eq!(resumed.state(), "running");
        assert_eq!(resumed.context().ticks, 7);
    }

    #[test]
    fn binary_checkpoint_resumes_instance() {
        let machine = machine();
        let instance = machine.instantiate().unwrap();
        instance.dispatch("start".to_string()).unwrap();

        let bytes = instance.checkpoint().to_binary().unwrap();
        let resumed = machine
            .resume(Checkpoint::from_binary(&bytes).unwrap())
            .unwrap();

        assert_eq!(resumed.state(), "running");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut checkpoint = Checkpoint::new("idle".to_string(), Counter::default());
        checkpoint.version = CHECKPOINT_VERSION + 1;
        let json = checkpoint.to_json().unwrap();

        let result = Checkpoint::<String, Counter>::from_json(&json);
        assert!(matches!(
            result,
            Err(CheckpointError::UnsupportedVersion { found: 2, supported: 1 })
        ));

        let result = machine().resume(checkpoint);
        assert!(matches!(result, Err(CheckpointError::UnsupportedVersion { .. })));
    }

    #[test]
    fn resume_rejects_undeclared_state() {
        let checkpoint = Checkpoint::new("gone".to_string(), Counter::default());
        let result = machine().resume(checkpoint);

        assert!(matches!(
            result,
            Err(CheckpointError::Resume(MachineError::UnknownState { .. }))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = Checkpoint::<String, Counter>::from_json("{not json");
        assert!(matches!(result, Err(CheckpointError::DeserializationFailed(_))));
    }
}
