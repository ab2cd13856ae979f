//! Error types for the `trophic-grid` crate.
//!
//! All fallible operations in this crate return [`GridError`] through the
//! standard [`Result`] type alias.

/// Errors that can occur during grid operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// More entities were requested than the grid has cells for.
    ///
    /// This is the only user-triggerable failure in the system. It is
    /// reported before any mutation; the prior grid is left untouched.
    #[error("requested population {requested} exceeds grid capacity {capacity}")]
    InvalidPopulation {
        /// Total number of entities requested.
        requested: u64,
        /// Number of cells available to hold them.
        capacity: u64,
    },
}
