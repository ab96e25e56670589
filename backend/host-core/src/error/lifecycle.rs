use crate::lifecycle::LifecycleState;

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LifecycleError {
    #[error("Invalid Transition Error: cannot {operation} while {state:?} {location}")]
    InvalidTransition {
        operation: &'static str,
        state: LifecycleState,
        location: ErrorLocation,
    },
}
