//! Multi-phase degradation of a ranked, enriched item list.
//!
//! Given items in rank order (index 0 is most important) and a hard token
//! capacity, the pipeline applies these phases in order. Each phase runs
//! only while the list is still over capacity, and its changes are kept
//! even if they are not enough on their own:
//!
//! 1. [`Phase::TrimComments`]: every item's comments are cut to
//!    `notes_budget`, oldest first.
//! 2. [`Phase::TruncateBodies`]: every item's body is cut to `body_budget`,
//!    at a sentence boundary when possible.
//! 3. [`Phase::DropTrailing`]: items are removed from the tail, one at a
//!    time, until the list fits or only the protected prefix is left.
//! 4. [`Phase::ProtectedPrefixOnly`]: the protected prefix is returned
//!    over capacity rather than failing.
//!
//! Items are never reordered, and a fitting input is returned untouched.

use crate::token::approximate_tokens;
use crate::truncate::{comment_cost, trim_comments_to_budget, truncate_at_sentence};
use dailybrief_config::DegradationConfig;
use dailybrief_core::EnrichedItem;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Per-item sub-budgets and the protected prefix size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationPolicy {
    pub notes_budget: usize,
    pub body_budget: usize,
    pub protected_prefix: usize,
    pub item_overhead: usize,
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self::from(&DegradationConfig::default())
    }
}

impl From<&DegradationConfig> for DegradationPolicy {
    fn from(config: &DegradationConfig) -> Self {
        Self {
            notes_budget: config.notes_budget,
            body_budget: config.body_budget,
            protected_prefix: config.protected_prefix,
            item_overhead: config.item_overhead,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    TrimComments,
    TruncateBodies,
    DropTrailing,
    ProtectedPrefixOnly,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationOutcome {
    pub items: Vec<EnrichedItem>,
    /// Whether any comment, body or item was removed or shortened.
    pub truncated: bool,
    pub total_cost: usize,
    pub capacity: usize,
    /// Phases that ran, in order.
    pub phases: Vec<Phase>,
    /// Keys of dropped items, lowest rank first.
    pub dropped: Vec<String>,
    pub comments_dropped: usize,
    pub bodies_truncated: usize,
}

impl DegradationOutcome {
    pub fn fits(&self) -> bool {
        self.total_cost <= self.capacity
    }
}

pub struct DegradationPipeline {
    capacity: usize,
    policy: DegradationPolicy,
}

impl DegradationPipeline {
    pub fn new(capacity: usize, policy: DegradationPolicy) -> Self {
        Self { capacity, policy }
    }

    pub fn from_config(config: &DegradationConfig) -> Self {
        Self::new(config.capacity, DegradationPolicy::from(config))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> &DegradationPolicy {
        &self.policy
    }

    /// Approximate cost of one item across all of its text fields.
    pub fn item_cost(&self, enriched: &EnrichedItem) -> usize {
        approximate_tokens(&enriched.item.title)
            + approximate_tokens(&enriched.body)
            + enriched.comments.iter().map(comment_cost).sum::<usize>()
            + enriched
                .references
                .iter()
                .map(|r| approximate_tokens(r))
                .sum::<usize>()
            + self.policy.item_overhead
    }

    pub fn total_cost(&self, items: &[EnrichedItem]) -> usize {
        items.iter().map(|item| self.item_cost(item)).sum()
    }

    pub fn run(&self, mut items: Vec<EnrichedItem>) -> DegradationOutcome {
        let mut total = self.total_cost(&items);
        let mut outcome = DegradationOutcome {
            items: Vec::new(),
            truncated: false,
            total_cost: total,
            capacity: self.capacity,
            phases: Vec::new(),
            dropped: Vec::new(),
            comments_dropped: 0,
            bodies_truncated: 0,
        };

        if total <= self.capacity {
            debug!(items = items.len(), total, capacity = self.capacity, "Items fit, no degradation");
            outcome.items = items;
            return outcome;
        }

        info!(
            items = items.len(),
            total,
            capacity = self.capacity,
            "Items over capacity, degrading"
        );

        outcome.phases.push(Phase::TrimComments);
        for enriched in &mut items {
            outcome.comments_dropped +=
                trim_comments_to_budget(&mut enriched.comments, self.policy.notes_budget);
        }
        total = self.total_cost(&items);
        debug!(total, dropped = outcome.comments_dropped, "Comments trimmed");

        if total > self.capacity {
            outcome.phases.push(Phase::TruncateBodies);
            for enriched in &mut items {
                let (body, cut) = truncate_at_sentence(&enriched.body, self.policy.body_budget);
                if cut {
                    enriched.body = body;
                    outcome.bodies_truncated += 1;
                }
            }
            total = self.total_cost(&items);
            debug!(total, truncated = outcome.bodies_truncated, "Bodies truncated");
        }

        if total > self.capacity && items.len() > self.policy.protected_prefix {
            outcome.phases.push(Phase::DropTrailing);
            while total > self.capacity && items.len() > self.policy.protected_prefix {
                let Some(last) = items.pop() else {
                    break;
                };
                total -= self.item_cost(&last);
                outcome.dropped.push(last.item.key());
            }
            debug!(total, dropped = outcome.dropped.len(), "Trailing items dropped");
        }

        if total > self.capacity {
            outcome.phases.push(Phase::ProtectedPrefixOnly);
            warn!(
                items = items.len(),
                total,
                capacity = self.capacity,
                "Protected items alone exceed capacity, returning them anyway"
            );
        }

        outcome.truncated = outcome.comments_dropped > 0
            || outcome.bodies_truncated > 0
            || !outcome.dropped.is_empty();
        outcome.total_cost = total;
        outcome.items = items;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use dailybrief_core::{Comment, WorkItem};

    fn item(number: u64, body: &str) -> EnrichedItem {
        EnrichedItem::new(WorkItem::new("acme/api", number, format!("Item {number}")), body)
    }

    fn with_comments(mut enriched: EnrichedItem, count: i64) -> EnrichedItem {
        let base = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        for i in 0..count {
            enriched.comments.push(Comment {
                author: format!("dev{i}"),
                // 400 chars = 100 tokens
                body: "c".repeat(400),
                created_at: base + Duration::hours(i),
            });
        }
        enriched
    }

    fn prose(chars: usize) -> String {
        "Sentence number one is here. "
            .repeat(chars / 29 + 1)
            .chars()
            .take(chars)
            .collect()
    }

    fn pipeline(capacity: usize) -> DegradationPipeline {
        DegradationPipeline::new(capacity, DegradationPolicy::default())
    }

    #[test]
    fn policy_defaults_match_config() {
        let policy = DegradationPolicy::default();
        assert_eq!(policy.notes_budget, 300);
        assert_eq!(policy.body_budget, 800);
        assert_eq!(policy.protected_prefix, 5);
        assert_eq!(policy.item_overhead, 20);
    }

    #[test]
    fn item_cost_sums_all_fields_and_overhead() {
        let mut enriched = item(1, &"b".repeat(40));
        enriched.references.push("acme/api#2".into());
        enriched = with_comments(enriched, 1);
        // title "Item 1" = 2, body = 10, comment "dev0" + 400 chars = 1 + 100,
        // reference 10 chars = 3, overhead = 20
        assert_eq!(pipeline(0).item_cost(&enriched), 136);
    }

    #[test]
    fn fitting_input_is_returned_unchanged() {
        let items = vec![item(1, "Small body."), item(2, "Another.")];
        let outcome = pipeline(10_000).run(items.clone());
        assert_eq!(outcome.items, items);
        assert!(!outcome.truncated);
        assert!(outcome.phases.is_empty());
        assert!(outcome.fits());
    }

    #[test]
    fn comment_trim_alone_can_be_enough() {
        let items = vec![
            with_comments(item(1, "Short body."), 10),
            with_comments(item(2, "Short body."), 10),
        ];
        let outcome = pipeline(1000).run(items);

        assert_eq!(outcome.phases, vec![Phase::TrimComments]);
        assert!(outcome.truncated);
        assert!(outcome.fits());
        assert_eq!(outcome.comments_dropped, 16);
        for enriched in &outcome.items {
            let authors: Vec<&str> = enriched.comments.iter().map(|c| c.author.as_str()).collect();
            assert_eq!(authors, vec!["dev8", "dev9"]);
            assert_eq!(enriched.body, "Short body.");
        }
    }

    #[test]
    fn body_truncated_at_sentence_when_comments_are_not_enough() {
        let outcome = pipeline(900).run(vec![item(1, &prose(12_000))]);

        assert_eq!(outcome.phases, vec![Phase::TrimComments, Phase::TruncateBodies]);
        assert_eq!(outcome.bodies_truncated, 1);
        let body = &outcome.items[0].body;
        assert!(body.ends_with('.'));
        assert!(!body.contains("[truncated]"));
        assert!(approximate_tokens(body) <= 800);
        assert!(outcome.fits());
    }

    #[test]
    fn body_without_sentences_is_hard_cut() {
        let outcome = pipeline(900).run(vec![item(1, &"x".repeat(12_000))]);
        assert!(outcome.items[0].body.ends_with(crate::truncate::TRUNCATION_MARKER));
        assert!(outcome.fits());
    }

    #[test]
    fn trailing_items_dropped_after_field_shrinking() {
        let items: Vec<EnrichedItem> = (1..=8).map(|n| item(n, &prose(12_000))).collect();
        let outcome = pipeline(5400).run(items);

        assert_eq!(
            outcome.phases,
            vec![Phase::TrimComments, Phase::TruncateBodies, Phase::DropTrailing]
        );
        assert_eq!(outcome.items.len(), 6);
        assert_eq!(outcome.dropped, vec!["acme/api#8", "acme/api#7"]);
        assert_eq!(outcome.bodies_truncated, 8);
        assert!(outcome.fits());
        let numbers: Vec<u64> = outcome.items.iter().map(|e| e.item.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn protected_prefix_survives_any_capacity() {
        let items: Vec<EnrichedItem> = (1..=10)
            .map(|n| with_comments(item(n, &prose(50_000)), 20))
            .collect();

        for capacity in [0, 100, 2000] {
            let outcome = pipeline(capacity).run(items.clone());
            assert!(outcome.items.len() >= 5);
            let numbers: Vec<u64> = outcome.items.iter().map(|e| e.item.number).collect();
            assert_eq!(&numbers[..5], &[1, 2, 3, 4, 5]);
            assert_eq!(outcome.phases.last(), Some(&Phase::ProtectedPrefixOnly));
            assert!(!outcome.fits());
        }
    }

    #[test]
    fn short_list_is_never_dropped() {
        let items: Vec<EnrichedItem> = (1..=3).map(|n| item(n, &prose(4000))).collect();
        let outcome = pipeline(0).run(items);

        assert_eq!(outcome.items.len(), 3);
        assert!(outcome.dropped.is_empty());
        assert!(!outcome.phases.contains(&Phase::DropTrailing));
        assert_eq!(outcome.phases.last(), Some(&Phase::ProtectedPrefixOnly));
    }

    #[test]
    fn second_run_on_output_changes_nothing() {
        let items: Vec<EnrichedItem> = (1..=8)
            .map(|n| with_comments(item(n, &prose(12_000)), 6))
            .collect();
        let p = pipeline(5000);

        let first = p.run(items);
        let second = p.run(first.items.clone());
        assert_eq!(second.items, first.items);
        assert!(!second.truncated);
        assert_eq!(second.total_cost, first.total_cost);
    }

    #[test]
    fn policy_from_config() {
        let config = DegradationConfig {
            capacity: 1234,
            notes_budget: 10,
            body_budget: 20,
            protected_prefix: 2,
            item_overhead: 0,
        };
        let p = DegradationPipeline::from_config(&config);
        assert_eq!(p.capacity(), 1234);
        assert_eq!(p.policy().protected_prefix, 2);
        assert_eq!(p.policy().item_overhead, 0);
    }
}
