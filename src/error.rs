//! Error taxonomy for the GF(2) / MPC core.
//!
//! Every failure here is a precondition violation: a caller bug, not a transient
//! condition. There is nothing to retry.

use std::alloc::Layout;

use thiserror::Error;

/// Fatal, caller-visible errors produced by this crate.
///
/// None of these are recoverable by the core itself; callers treat any of them as a
/// bug-or-OOM and abort the enclosing cryptographic operation (see SPEC_FULL.md §7).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dimension mismatch: expected {expected}, got {actual} ({context})")]
    DimensionMismatch {
        expected: String,
        actual: String,
        context: &'static str,
    },

    #[error("aligned allocation of {0:?} failed")]
    AllocationFailure(Layout),

    #[error("contract violation: {0}")]
    ContractViolation(&'static str),
}

impl CoreError {
    pub(crate) fn dimension_mismatch(
        context: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        tracing::trace!(context, %expected, %actual, "dimension mismatch");
        CoreError::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
            context,
        }
    }
}
