//! Build errors for the machine builder.

use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Initial state '{state}' is not declared. Add it with .state(..)")]
    UnknownInitialState { state: String },

    #[error("State '{state}' is declared more than once")]
    DuplicateState { state: String },
}
