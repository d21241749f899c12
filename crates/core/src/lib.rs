//! # dailybrief core
//!
//! Domain types, collaborator traits, and error definitions for the
//! dailybrief work-triage assistant. Nothing in here performs I/O; the
//! traits describe the narrow seams through which the budget-constrained
//! assembler talks to the outside world.
//!
//! ## Seams
//!
//! - [`TokenCounter`]: exact token counting by an external service
//! - [`WorkSource`]: an independently-fallible producer of work data
//! - [`ItemEnricher`]: fetches the heavy text fields of a ranked item

pub mod counter;
pub mod enrich;
pub mod error;
pub mod source;
pub mod work;

// Re-export key types at crate root for ergonomics
pub use counter::TokenCounter;
pub use enrich::ItemEnricher;
pub use error::{BudgetError, ProviderError, SourceError};
pub use source::{SourceData, SourceKind, WorkSource};
pub use work::{Comment, EnrichedItem, ProjectStatus, PullRequest, ReviewState, WorkItem};
