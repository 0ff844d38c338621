//! Status lifecycles shared by every entity with a `status` column.

use std::fmt::Display;

use crate::errors::ModelError;

/// A status enumeration with a fixed set of legal transitions.
pub trait Lifecycle: Copy + PartialEq + Display {
    fn can_transition_to(self, next: Self) -> bool;

    /// Terminal states accept no further transition.
    fn is_terminal(self) -> bool;

    fn transition(self, next: Self) -> Result<Self, ModelError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ModelError::Validation(format!("invalid transition from {} to {}", self, next)))
        }
    }
}
