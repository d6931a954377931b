//! Pure reductions from a record set to derived state.
//!
//! Every function in this module is a set→state function: synchronous,
//! reentrant, no I/O, no shared mutable state. Output depends only on the
//! record set passed in, so a reduction may be re-run at any time over a
//! grown set — late-arriving relay replies are folded in by the caller and
//! the reduction simply recomputes. Nothing here mutates derived state in
//! place; recomputation is the only update mechanism.

pub mod catalog;
pub mod history;
pub mod status;
pub mod suggest;

pub use catalog::{CatalogEntry, documents_by, public_documents};
pub use history::{RevisionHistory, history};
pub use status::{DerivedStatus, derived_status};
pub use suggest::{pending_counts, suggestions_for};
