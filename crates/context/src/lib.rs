//! Budget-constrained content assembly for dailybrief.
//!
//! Everything that decides what text reaches the language model lives here:
//!
//! 1. **Price** text with a [`CostEstimator`] (exact counter, or ~4 chars per token)
//! 2. **Admit** priced sections through a [`BudgetLedger`], evicting
//!    strictly lower priorities when something more important arrives
//! 3. **Assemble** the admitted sections into one `<work_context>` document
//!    with a [`ContentAssembler`]
//! 4. **Degrade** a ranked list of enriched issues to a hard cap with the
//!    [`DegradationPipeline`], never dropping the protected prefix
//!
//! Multi-source population ([`populate`]) and per-run enrichment
//! memoization ([`EnrichmentCache`]) sit on top of those pieces.

pub mod assembler;
pub mod cache;
pub mod degrade;
pub mod ledger;
pub mod populate;
pub mod sections;
pub mod token;
pub mod truncate;

pub use assembler::{AssemblyStats, ContentAssembler, EMPTY_DOCUMENT, Section, SectionStats};
pub use cache::{CacheStats, EnrichmentCache, enrich_ranked};
pub use degrade::{DegradationOutcome, DegradationPipeline, DegradationPolicy, Phase};
pub use ledger::{BudgetEntry, BudgetLedger};
pub use populate::{PopulateReport, collect_sources, populate};
pub use token::{CostEstimator, EstimatorStats, approximate_tokens};
