//! Token budget ledger with priority-based eviction.
//!
//! Tracks how much of one fixed capacity has been committed, and to which
//! named, prioritized entries. Each entry can carry a payload `P` (the
//! assembler stores section text there); the cost/priority view is
//! exposed through [`BudgetLedger::entries`].
//!
//! # Eviction
//!
//! Only entries with a priority *strictly lower* than the candidate's are
//! eligible, lowest priority first, insertion order among equals. Overflow
//! resolution is atomic: the eviction plan is computed before anything is
//! removed, and a plan that cannot make room leaves the ledger untouched.

use dailybrief_core::BudgetError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bookkeeping record for one admitted allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub name: String,
    pub cost: usize,
    pub priority: i32,
}

/// A single fixed capacity and the entries committed against it.
#[derive(Debug, Clone)]
pub struct BudgetLedger<P = ()> {
    capacity: usize,
    used: usize,
    /// Insertion-ordered; names are unique.
    entries: Vec<(BudgetEntry, P)>,
}

impl<P> BudgetLedger<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: 0,
            entries: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of all committed costs.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }

    /// Whether `cost` more tokens fit without eviction.
    pub fn can_allocate(&self, cost: usize) -> bool {
        self.used.saturating_add(cost) <= self.capacity
    }

    /// Commit an allocation carrying `payload`.
    ///
    /// No fit check: callers verify with [`can_allocate`](Self::can_allocate)
    /// or go through [`handle_overflow_with`](Self::handle_overflow_with).
    /// Committing an existing name replaces that entry.
    pub fn allocate_with(&mut self, name: impl Into<String>, cost: usize, priority: i32, payload: P) {
        let name = name.into();
        self.release(&name);
        self.used += cost;
        self.entries.push((
            BudgetEntry {
                name,
                cost,
                priority,
            },
            payload,
        ));
    }

    pub fn has_allocation(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<(&BudgetEntry, &P)> {
        self.position(name)
            .map(|i| (&self.entries[i].0, &self.entries[i].1))
    }

    /// The cost/priority projection, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &BudgetEntry> {
        self.entries.iter().map(|(entry, _)| entry)
    }

    /// Entries with their payloads, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BudgetEntry, &P)> {
        self.entries.iter().map(|(entry, payload)| (entry, payload))
    }

    /// Remove an entry, returning it with its payload.
    pub fn release(&mut self, name: &str) -> Option<(BudgetEntry, P)> {
        let index = self.position(name)?;
        let (entry, payload) = self.entries.remove(index);
        self.used = self.used.saturating_sub(entry.cost);
        Some((entry, payload))
    }

    /// Evict strictly lower-priority entries until `cost` fits.
    ///
    /// Returns the evicted names in eviction order (empty if it already
    /// fits). Does not commit the candidate. On failure nothing is evicted
    /// and the error carries the residual shortfall.
    pub fn evict_for(&mut self, name: &str, cost: usize, priority: i32) -> Result<Vec<String>, BudgetError> {
        // An existing entry under the same name is replaced on commit.
        let replaced = self.get(name).map_or(0, |(entry, _)| entry.cost);
        let needed = self
            .used
            .saturating_sub(replaced)
            .saturating_add(cost)
            .saturating_sub(self.capacity);
        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<&BudgetEntry> = self
            .entries()
            .filter(|entry| entry.priority < priority && entry.name != name)
            .collect();
        // Stable: equal priorities keep insertion order.
        candidates.sort_by_key(|entry| entry.priority);

        let mut freed = 0;
        let mut plan = Vec::new();
        for entry in candidates {
            if freed >= needed {
                break;
            }
            freed += entry.cost;
            plan.push(entry.name.clone());
        }

        if freed < needed {
            return Err(BudgetError::Overflow {
                name: name.to_string(),
                shortfall: needed - freed,
            });
        }

        for victim in &plan {
            if let Some((entry, _)) = self.release(victim) {
                debug!(
                    evicted = %entry.name,
                    cost = entry.cost,
                    priority = entry.priority,
                    for_entry = %name,
                    "Evicted lower-priority entry"
                );
            }
        }
        Ok(plan)
    }

    /// Make room for a candidate that does not currently fit, then commit it.
    ///
    /// Returns the evicted names on success.
    pub fn handle_overflow_with(
        &mut self,
        name: impl Into<String>,
        cost: usize,
        priority: i32,
        payload: P,
    ) -> Result<Vec<String>, BudgetError> {
        let name = name.into();
        let evicted = self.evict_for(&name, cost, priority)?;
        self.allocate_with(name, cost, priority, payload);
        Ok(evicted)
    }

    /// Drop every entry; capacity is unchanged.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.used = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| entry.name == name)
    }
}

impl<P: Default> BudgetLedger<P> {
    /// Commit an allocation with a default payload.
    pub fn allocate(&mut self, name: impl Into<String>, cost: usize, priority: i32) {
        self.allocate_with(name, cost, priority, P::default());
    }

    /// [`handle_overflow_with`](Self::handle_overflow_with) with a default payload.
    pub fn handle_overflow(
        &mut self,
        name: impl Into<String>,
        cost: usize,
        priority: i32,
    ) -> Result<Vec<String>, BudgetError> {
        self.handle_overflow_with(name, cost, priority, P::default())
    }
}
