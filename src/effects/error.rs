//! Errors raised while running a machine.

use thiserror::Error;

/// Errors that can occur while instantiating or dispatching.
///
/// Unknown actions are not errors: they are ignored. Calls made from an
/// effect outside its permitted window are not errors either: they are
/// logged and dropped.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    /// The configuration is internally inconsistent.
    #[error("State '{target}' does not exist in the state machine (action '{action}' from '{state}')")]
    UnknownTarget {
        state: String,
        action: String,
        target: String,
    },

    #[error("Cannot place an instance in undeclared state '{state}'")]
    UnknownState { state: String },

    /// Raised by an effect body to abort the dispatch that entered it.
    #[error("Effect for state '{state}' failed: {message}")]
    EffectFailed { state: String, message: String },
}

impl MachineError {
    /// Build an [`MachineError::EffectFailed`] for the given state.
    pub fn effect_failed(state: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EffectFailed {
            state: state.into(),
            message: message.into(),
        }
    }
}
