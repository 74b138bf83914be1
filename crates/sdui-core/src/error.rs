//! Boundary-validation errors for store mutations.
//!
//! The engine itself never fails on data-shape problems: missing variables,
//! malformed paths, and stale dependency edges all degrade to fallbacks so a
//! partially-specified screen can still resolve. The only caller error is a
//! blank variable name arriving at the mutation boundary.

use thiserror::Error;

/// Errors surfaced by [`Store`](crate::store::Store) mutations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    /// A mutation named a variable with an empty (or whitespace-only) name.
    #[error("variable name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_stable() {
        assert_eq!(
            StoreError::EmptyName.to_string(),
            "variable name must not be empty"
        );
    }
}
