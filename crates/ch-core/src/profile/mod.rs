//! Profile domain models.
//!
//! [`ProfileRow`] mirrors the remote `profiles` table; [`ProfileSummary`] is the
//! cached subset the client persists and gates navigation on.

mod completion;
mod row;
mod summary;

pub use completion::Completion;
pub use row::{ProfileRow, ProfileUpdate};
pub use summary::ProfileSummary;
