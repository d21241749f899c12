//! Multi-source population of a [`ContentAssembler`].
//!
//! Sources are fetched concurrently and fail independently: a source that
//! errors contributes nothing, and a section that cannot be admitted is
//! skipped with a warning. Population itself never fails; at worst it
//! returns the empty-document marker.

use crate::assembler::ContentAssembler;
use crate::sections;
use dailybrief_config::SourcePriorities;
use dailybrief_core::{SourceData, SourceKind, WorkSource};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Admission order. Priorities, not this order, decide who survives.
const KINDS: [SourceKind; 3] = [
    SourceKind::Issues,
    SourceKind::PullRequests,
    SourceKind::Projects,
];

/// What happened to each source's section during population.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulateReport {
    pub admitted: Vec<String>,
    /// Sections evicted by later, higher-priority admissions.
    pub evicted: Vec<String>,
    /// Sections that could not be admitted, with the reason.
    pub rejected: Vec<(String, String)>,
}

pub fn priority_for(kind: SourceKind, priorities: &SourcePriorities) -> i32 {
    match kind {
        SourceKind::Issues => priorities.issues,
        SourceKind::PullRequests => priorities.pull_requests,
        SourceKind::Projects => priorities.projects,
    }
}

/// Fetch every source concurrently, keeping only the successful results.
pub async fn collect_sources(sources: &[Arc<dyn WorkSource>]) -> Vec<SourceData> {
    let results = join_all(sources.iter().map(|source| async move {
        (source.name().to_string(), source.kind(), source.fetch().await)
    }))
    .await;

    results
        .into_iter()
        .filter_map(|(name, kind, result)| match result {
            Ok(data) if data.kind() != kind => {
                warn!(source = %name, expected = %kind, got = %data.kind(), "Source returned the wrong kind, skipping");
                None
            }
            Ok(data) => {
                debug!(source = %name, kind = %kind, "Source fetched");
                Some(data)
            }
            Err(e) => {
                warn!(source = %name, error = %e, "Source failed, skipping its section");
                None
            }
        })
        .collect()
}

/// Merge payloads of the same kind (e.g. issues from two trackers).
fn merge_kind(data: &[SourceData], kind: SourceKind) -> Option<SourceData> {
    let mut merged: Option<SourceData> = None;
    for payload in data.iter().filter(|d| d.kind() == kind) {
        match (&mut merged, payload) {
            (None, _) => merged = Some(payload.clone()),
            (Some(SourceData::Issues(acc)), SourceData::Issues(more)) => acc.extend(more.iter().cloned()),
            (Some(SourceData::PullRequests(acc)), SourceData::PullRequests(more)) => {
                acc.extend(more.iter().cloned())
            }
            (Some(SourceData::Projects(acc)), SourceData::Projects(more)) => {
                acc.extend(more.iter().cloned())
            }
            _ => {}
        }
    }
    merged
}

/// Admit one section per available source kind and build the document.
pub async fn populate(
    assembler: &mut ContentAssembler,
    data: &[SourceData],
    priorities: &SourcePriorities,
) -> (String, PopulateReport) {
    let mut report = PopulateReport::default();

    for kind in KINDS {
        let Some(payload) = merge_kind(data, kind) else {
            continue;
        };
        let Some(content) = sections::section_for(&payload) else {
            debug!(kind = %kind, "Source returned no data");
            continue;
        };

        let name = kind.to_string();
        match assembler
            .add_section(name.clone(), content, priority_for(kind, priorities))
            .await
        {
            Ok(evicted) => {
                report.admitted.retain(|n| !evicted.contains(n));
                report.evicted.extend(evicted);
                report.admitted.push(name);
            }
            Err(e) => {
                warn!(section = %name, error = %e, "Section not admitted");
                report.rejected.push((name, e.to_string()));
            }
        }
    }

    (assembler.build(), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::EMPTY_DOCUMENT;
    use async_trait::async_trait;
    use dailybrief_core::{ProjectStatus, PullRequest, ReviewState, SourceError, WorkItem};

    struct StaticSource(SourceData);

    #[async_trait]
    impl WorkSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn kind(&self) -> SourceKind {
            self.0.kind()
        }

        async fn fetch(&self) -> Result<SourceData, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl WorkSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn kind(&self) -> SourceKind {
            SourceKind::PullRequests
        }

        async fn fetch(&self) -> Result<SourceData, SourceError> {
            Err(SourceError::Unavailable {
                source_name: "broken".into(),
                reason: "HTTP 502".into(),
            })
        }
    }

    fn issues(n: u64) -> SourceData {
        SourceData::Issues(
            (1..=n)
                .map(|i| WorkItem::new("acme/api", i, format!("Issue number {i}")))
                .collect(),
        )
    }

    fn projects() -> SourceData {
        SourceData::Projects(vec![ProjectStatus {
            name: "briefing".into(),
            phase: "Phase 1".into(),
            progress_pct: 20,
            next_steps: vec!["Ship it".into()],
        }])
    }

    #[tokio::test]
    async fn failed_source_is_skipped() {
        let sources: Vec<Arc<dyn WorkSource>> = vec![
            Arc::new(StaticSource(issues(2))),
            Arc::new(BrokenSource),
            Arc::new(StaticSource(projects())),
        ];
        let data = collect_sources(&sources).await;
        assert_eq!(data.len(), 2);

        let mut asm = ContentAssembler::approximate(10_000);
        let (doc, report) = populate(&mut asm, &data, &SourcePriorities::default()).await;
        assert!(doc.contains("## Priority Issues"));
        assert!(doc.contains("## Project Status"));
        assert!(!doc.contains("## Open Pull Requests"));
        assert_eq!(report.admitted, vec!["issues", "projects"]);
    }

    #[tokio::test]
    async fn all_sources_failing_yields_empty_document() {
        let sources: Vec<Arc<dyn WorkSource>> = vec![Arc::new(BrokenSource)];
        let data = collect_sources(&sources).await;

        let mut asm = ContentAssembler::approximate(1000);
        let (doc, report) = populate(&mut asm, &data, &SourcePriorities::default()).await;
        assert_eq!(doc, EMPTY_DOCUMENT);
        assert!(report.admitted.is_empty());
    }

    #[tokio::test]
    async fn oversized_low_priority_section_is_rejected_not_fatal() {
        let data = vec![issues(1), projects()];
        let issues_cost = crate::token::approximate_tokens(
            &sections::section_for(&data[0]).unwrap(),
        );

        // Room for the issues section only.
        let mut asm = ContentAssembler::approximate(issues_cost + 1);
        let (doc, report) = populate(&mut asm, &data, &SourcePriorities::default()).await;

        assert!(doc.contains("## Priority Issues"));
        assert!(!doc.contains("## Project Status"));
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "projects");
    }

    #[tokio::test]
    async fn higher_priority_source_evicts_lower_when_configured() {
        let data = vec![issues(1), projects()];
        let issues_cost =
            crate::token::approximate_tokens(&sections::section_for(&data[0]).unwrap());
        let projects_cost =
            crate::token::approximate_tokens(&sections::section_for(&data[1]).unwrap());

        let priorities = SourcePriorities {
            issues: 1,
            pull_requests: 2,
            projects: 9,
        };
        // Either section fits alone, both together do not.
        let mut asm = ContentAssembler::approximate(issues_cost.max(projects_cost));
        let (doc, report) = populate(&mut asm, &data, &priorities).await;

        assert!(doc.contains("## Project Status"));
        assert!(!doc.contains("## Priority Issues"));
        assert_eq!(report.admitted, vec!["projects"]);
        assert_eq!(report.evicted, vec!["issues"]);
        assert!(report.rejected.is_empty());
    }

    #[tokio::test]
    async fn same_kind_payloads_are_merged() {
        let data = vec![
            SourceData::PullRequests(vec![PullRequest {
                repo: "acme/a".into(),
                number: 1,
                title: "One".into(),
                author: "x".into(),
                draft: false,
                review_state: ReviewState::Approved,
            }]),
            SourceData::PullRequests(vec![PullRequest {
                repo: "acme/b".into(),
                number: 2,
                title: "Two".into(),
                author: "y".into(),
                draft: false,
                review_state: ReviewState::Pending,
            }]),
        ];

        let mut asm = ContentAssembler::approximate(10_000);
        let (doc, report) = populate(&mut asm, &data, &SourcePriorities::default()).await;
        assert!(doc.contains("[acme/a#1] One"));
        assert!(doc.contains("[acme/b#2] Two"));
        assert_eq!(report.admitted, vec!["pull_requests"]);
    }

    #[test]
    fn priorities_map_by_kind() {
        let p = SourcePriorities::default();
        assert_eq!(priority_for(SourceKind::Issues, &p), 10);
        assert_eq!(priority_for(SourceKind::PullRequests, &p), 8);
        assert_eq!(priority_for(SourceKind::Projects, &p), 5);
    }
}
