//! Section builders: render upstream work data into markdown blocks.
//!
//! Every builder returns `None` for empty input so that an empty source
//! never occupies budget.

use dailybrief_core::{EnrichedItem, ProjectStatus, PullRequest, SourceData, WorkItem};

/// Render scored issues, in the order given.
pub fn issues_section(items: &[WorkItem]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let mut out = String::from("## Priority Issues\n");
    for item in items {
        out.push_str(&format!(
            "\n- [{}] {} (score {:.1})",
            item.key(),
            item.title,
            item.score
        ));
        if !item.labels.is_empty() {
            out.push_str(&format!(" [{}]", item.labels.join(", ")));
        }
        if let Some(updated) = item.updated_at {
            out.push_str(&format!(" updated {}", updated.format("%Y-%m-%d")));
        }
    }
    Some(out)
}

/// Render open pull requests.
pub fn pull_requests_section(prs: &[PullRequest]) -> Option<String> {
    if prs.is_empty() {
        return None;
    }

    let mut out = String::from("## Open Pull Requests\n");
    for pr in prs {
        out.push_str(&format!(
            "\n- [{}#{}] {} by {}: {}",
            pr.repo, pr.number, pr.title, pr.author, pr.review_state
        ));
        if pr.draft {
            out.push_str(" (draft)");
        }
    }
    Some(out)
}

/// Render local project progress summaries.
pub fn projects_section(projects: &[ProjectStatus]) -> Option<String> {
    if projects.is_empty() {
        return None;
    }

    let mut out = String::from("## Project Status\n");
    for project in projects {
        out.push_str(&format!(
            "\n### {} — {} ({}%)\n",
            project.name,
            project.phase,
            project.progress_pct.min(100)
        ));
        for step in &project.next_steps {
            out.push_str(&format!("- {step}\n"));
        }
    }
    Some(out.trim_end().to_string())
}

/// Render one enriched issue with its body, comments, and references.
pub fn render_enriched_item(rank: usize, enriched: &EnrichedItem) -> String {
    let mut out = format!(
        "### {}. [{}] {}\n",
        rank + 1,
        enriched.item.key(),
        enriched.item.title
    );
    if !enriched.body.trim().is_empty() {
        out.push('\n');
        out.push_str(enriched.body.trim());
        out.push('\n');
    }
    if !enriched.comments.is_empty() {
        out.push_str("\nComments:\n");
        for comment in &enriched.comments {
            out.push_str(&format!(
                "- {} ({}): {}\n",
                comment.author,
                comment.created_at.format("%Y-%m-%d"),
                comment.body.trim()
            ));
        }
    }
    if !enriched.references.is_empty() {
        out.push_str(&format!("\nReferences: {}\n", enriched.references.join(", ")));
    }
    out.trim_end().to_string()
}

/// Render a ranked enriched list as one section.
pub fn enriched_section(items: &[EnrichedItem]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let rendered: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(rank, item)| render_enriched_item(rank, item))
        .collect();
    Some(format!("## Issue Details\n\n{}", rendered.join("\n\n")))
}

/// Render whichever section matches the source payload.
pub fn section_for(data: &SourceData) -> Option<String> {
    match data {
        SourceData::Issues(items) => issues_section(items),
        SourceData::PullRequests(prs) => pull_requests_section(prs),
        SourceData::Projects(projects) => projects_section(projects),
    }
}
