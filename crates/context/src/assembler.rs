//! Section-based document assembly under a token budget.
//!
//! Producers hand over finished text blocks ("sections") with a caller
//! assigned priority. Each section is priced by the [`CostEstimator`] and
//! admitted through a [`BudgetLedger`]; when it does not fit, strictly
//! lower-priority sections are evicted to make room, or the candidate is
//! rejected with the residual shortfall.
//!
//! # Output order
//!
//! [`ContentAssembler::build`] emits sections by priority, highest first,
//! keeping admission order among equals.

use crate::ledger::BudgetLedger;
use crate::token::{CostEstimator, EstimatorStats};
use dailybrief_core::BudgetError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

const ENVELOPE_OPEN: &str = "<work_context>";
const ENVELOPE_CLOSE: &str = "</work_context>";

/// Document returned when no section was admitted.
pub const EMPTY_DOCUMENT: &str = "<work_context>\nNo work items available.\n</work_context>";

// ── Types ─────────────────────────────────────────────────────────────────

/// A named, priced, prioritized block of finished text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub content: String,
    pub priority: i32,
    pub cost: usize,
}

/// Per-section line in [`AssemblyStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    pub name: String,
    pub cost: usize,
    pub priority: i32,
}

/// Read-only snapshot of an assembler's budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub capacity: usize,
    pub used: usize,
    pub remaining: usize,
    pub section_count: usize,
    /// Admission order.
    pub sections: Vec<SectionStats>,
    pub estimator: EstimatorStats,
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Composes prioritized sections into one capacity-respecting document.
///
/// Owned by one logical run; call [`reset`](Self::reset) before reuse.
pub struct ContentAssembler {
    run_id: Uuid,
    ledger: BudgetLedger<String>,
    estimator: CostEstimator,
}

impl ContentAssembler {
    pub fn new(capacity: usize, estimator: CostEstimator) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            ledger: BudgetLedger::new(capacity),
            estimator,
        }
    }

    /// An assembler that prices with the character approximation only.
    pub fn approximate(capacity: usize) -> Self {
        Self::new(capacity, CostEstimator::approximate())
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn capacity(&self) -> usize {
        self.ledger.capacity()
    }

    pub fn estimator(&self) -> &CostEstimator {
        &self.estimator
    }

    /// Price `content` and admit it as section `name`.
    ///
    /// Returns the names evicted to make room (empty when it fit outright).
    /// A rejected candidate is never admitted and evicts nothing.
    pub async fn add_section(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
        priority: i32,
    ) -> Result<Vec<String>, BudgetError> {
        let name = name.into();
        let content = content.into();

        if self.ledger.has_allocation(&name) {
            return Err(BudgetError::DuplicateSection(name));
        }

        let cost = self.estimator.estimate(&content).await;

        if self.ledger.can_allocate(cost) {
            debug!(run_id = %self.run_id, section = %name, cost, priority, "Section admitted");
            self.ledger.allocate_with(name, cost, priority, content);
            return Ok(Vec::new());
        }

        let evicted = self
            .ledger
            .handle_overflow_with(name.clone(), cost, priority, content)?;
        info!(
            run_id = %self.run_id,
            section = %name,
            cost,
            priority,
            evicted = ?evicted,
            "Section admitted after eviction"
        );
        Ok(evicted)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.ledger.has_allocation(name)
    }

    /// Admitted sections in admission order.
    pub fn sections(&self) -> Vec<Section> {
        self.ledger
            .iter()
            .map(|(entry, content)| Section {
                name: entry.name.clone(),
                content: content.clone(),
                priority: entry.priority,
                cost: entry.cost,
            })
            .collect()
    }

    /// Render admitted sections, highest priority first, inside the envelope.
    pub fn build(&self) -> String {
        if self.ledger.is_empty() {
            return EMPTY_DOCUMENT.to_string();
        }

        let mut ordered: Vec<(i32, &str)> = self
            .ledger
            .iter()
            .map(|(entry, content)| (entry.priority, content.as_str()))
            .collect();
        // Stable sort keeps admission order among equal priorities.
        ordered.sort_by(|a, b| b.0.cmp(&a.0));

        let body = ordered
            .into_iter()
            .map(|(_, content)| content)
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{ENVELOPE_OPEN}\n{body}\n{ENVELOPE_CLOSE}")
    }

    pub fn stats(&self) -> AssemblyStats {
        let sections: Vec<SectionStats> = self
            .ledger
            .entries()
            .map(|entry| SectionStats {
                name: entry.name.clone(),
                cost: entry.cost,
                priority: entry.priority,
            })
            .collect();

        AssemblyStats {
            capacity: self.ledger.capacity(),
            used: self.ledger.used(),
            remaining: self.ledger.remaining(),
            section_count: sections.len(),
            sections,
            estimator: self.estimator.stats(),
        }
    }

    /// Clear all sections; capacity is unchanged and a new run id is issued.
    pub fn reset(&mut self) {
        self.ledger.reset();
        self.run_id = Uuid::new_v4();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dailybrief_core::TokenCounter;
    use dailybrief_core::error::ProviderError;
    use std::sync::Arc;

    /// Prices every non-empty text at a fixed cost.
    struct FixedCounter(usize);

    #[async_trait]
    impl TokenCounter for FixedCounter {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn count_tokens(&self, _model: &str, _text: &str) -> Result<usize, ProviderError> {
            Ok(self.0)
        }
    }

    fn fixed_cost_assembler(capacity: usize, cost: usize) -> ContentAssembler {
        ContentAssembler::new(
            capacity,
            CostEstimator::with_counter(Arc::new(FixedCounter(cost)), "test-model"),
        )
    }

    #[test]
    fn empty_assembler_builds_marker() {
        let asm = ContentAssembler::approximate(100);
        assert_eq!(asm.build(), EMPTY_DOCUMENT);
    }

    #[tokio::test]
    async fn higher_priority_evicts_lower() {
        let mut asm = fixed_cost_assembler(150, 100);

        let evicted = asm.add_section("low", "low content", 3).await.unwrap();
        assert!(evicted.is_empty());

        let evicted = asm.add_section("high", "high content", 10).await.unwrap();
        assert_eq!(evicted, vec!["low"]);

        let doc = asm.build();
        assert!(doc.contains("high content"));
        assert!(!doc.contains("low content"));
        assert!(!asm.has_section("low"));
    }

    #[tokio::test]
    async fn rejected_section_is_not_admitted() {
        let mut asm = fixed_cost_assembler(150, 100);
        asm.add_section("high", "high content", 10).await.unwrap();

        let err = asm.add_section("low", "low content", 3).await.unwrap_err();
        assert_eq!(
            err,
            BudgetError::Overflow {
                name: "low".into(),
                shortfall: 50,
            }
        );
        assert!(!asm.build().contains("low content"));
        assert_eq!(asm.stats().section_count, 1);
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let mut asm = ContentAssembler::approximate(1000);
        asm.add_section("issues", "first", 5).await.unwrap();
        let err = asm.add_section("issues", "second", 9).await.unwrap_err();
        assert_eq!(err, BudgetError::DuplicateSection("issues".into()));
        assert!(asm.build().contains("first"));
    }

    #[tokio::test]
    async fn build_orders_by_priority_then_admission() {
        let mut asm = ContentAssembler::approximate(10_000);
        asm.add_section("b", "BETA", 5).await.unwrap();
        asm.add_section("a", "ALPHA", 9).await.unwrap();
        asm.add_section("c", "GAMMA", 5).await.unwrap();
        asm.add_section("d", "DELTA", 1).await.unwrap();

        let doc = asm.build();
        let pos = |s: &str| doc.find(s).unwrap();
        assert!(pos("ALPHA") < pos("BETA"));
        assert!(pos("BETA") < pos("GAMMA"));
        assert!(pos("GAMMA") < pos("DELTA"));
        assert!(doc.starts_with(ENVELOPE_OPEN));
        assert!(doc.ends_with(ENVELOPE_CLOSE));
        assert!(doc.contains("ALPHA\n\nBETA"));
    }

    #[tokio::test]
    async fn stats_reflect_admissions() {
        let mut asm = fixed_cost_assembler(1000, 100);
        asm.add_section("one", "x", 1).await.unwrap();
        asm.add_section("two", "y", 2).await.unwrap();

        let stats = asm.stats();
        assert_eq!(stats.capacity, 1000);
        assert_eq!(stats.used, 200);
        assert_eq!(stats.remaining, 800);
        assert_eq!(stats.section_count, 2);
        assert_eq!(stats.sections[0].name, "one");
        assert_eq!(stats.sections[1].cost, 100);
        assert_eq!(stats.estimator.exact, 2);
    }

    #[tokio::test]
    async fn reset_clears_sections() {
        let mut asm = ContentAssembler::approximate(100);
        let first_run = asm.run_id();
        asm.add_section("a", "content", 1).await.unwrap();

        asm.reset();
        assert_eq!(asm.build(), EMPTY_DOCUMENT);
        assert_eq!(asm.stats().used, 0);
        assert_eq!(asm.capacity(), 100);
        assert_ne!(asm.run_id(), first_run);

        // Same name is admissible again after reset.
        asm.add_section("a", "content", 1).await.unwrap();
        assert!(asm.has_section("a"));
    }

    #[tokio::test]
    async fn sections_expose_content_and_cost() {
        let mut asm = ContentAssembler::approximate(100);
        asm.add_section("notes", "12345678", 2).await.unwrap();
        let sections = asm.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "12345678");
        assert_eq!(sections[0].cost, 2);
    }
}
