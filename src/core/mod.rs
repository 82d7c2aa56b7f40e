//! Core state machine types.
//!
//! This module contains the declarative side of a machine:
//! - State and action identifiers via the `State` and `Action` traits
//! - The configuration model and final-state classification
//! - The observable cell that holds live interpreter values
//!
//! Nothing here runs effects; that lives in [`crate::effects`].

mod cell;
mod config;
mod state;

pub use cell::{ObservableCell, SubscriptionId};
pub use config::{classify, validate, Config, ConfigError, FinalStates, StateDef};
pub use state::{Action, State, Trigger};
