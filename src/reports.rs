use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::aggregate::{
    is_counted_branch, month_range, AuthorCommitRow, BranchTally, ContributionTally,
};
use crate::config::Config;
use crate::error::Result;
use crate::export;
use crate::models::CommitQuery;
use crate::providers::CommitSource;

/// Sums commits on every non-default branch between the start date and `now`.
pub async fn count_branch_commits(
    source: &dyn CommitSource,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BranchTally {
    let namespace = source.namespace();
    let mut tally = BranchTally::default();

    for repository in source.list_repositories().await {
        for branch in source.list_branches(&repository).await {
            if !is_counted_branch(&branch.name) {
                continue;
            }

            let query = CommitQuery::between(start, now).on_branch(&branch.name);
            let commits = source.list_commits(&repository, &query).await.len();
            tally.record(&repository.name, &branch.name, commits);

            info!(
                "Repo: {namespace}/{}, Branch: {}, Commits: {commits} (running total: {})",
                repository.name,
                branch.name,
                tally.total()
            );
        }
    }

    tally
}

/// Collects every commit by `author` across all repositories.
pub async fn collect_author_history(source: &dyn CommitSource, author: &str) -> Vec<AuthorCommitRow> {
    let query = CommitQuery::by_author(author);
    let mut rows = Vec::new();

    for repository in source.list_repositories().await {
        info!("Processing repository: {}", repository.name);

        let commits = source.list_commits(&repository, &query).await;
        info!(
            "Found {} commits by {author} in {}",
            commits.len(),
            repository.name
        );

        rows.extend(
            commits
                .into_iter()
                .map(|commit| AuthorCommitRow::new(&repository, commit)),
        );
    }

    rows
}

pub async fn export_author_history(
    source: &dyn CommitSource,
    config: &Config,
    author: &str,
) -> Result<PathBuf> {
    let rows = collect_author_history(source, author).await;
    if rows.is_empty() {
        warn!("No commits found for author {author}");
    }

    let folder = config.output_dir.join(source.namespace());
    let path = export::write_author_history(&folder, &format!("{author} Commit History"), &rows)?;

    info!("Commits by author {author} saved to {}", path.display());
    Ok(path)
}

/// Tallies commits per username and month for every repository.
pub async fn tally_contributions(
    source: &dyn CommitSource,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ContributionTally {
    let query = CommitQuery::between(start, now);
    let mut tally = ContributionTally::default();

    for repository in source.list_repositories().await {
        let commits = source.list_commits(&repository, &query).await;
        info!("Found {} commits in {}", commits.len(), repository.name);

        for commit in &commits {
            tally.record(commit);
        }
    }

    tally
}

pub async fn export_contribution_report(
    source: &dyn CommitSource,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let start = config.require_start_date()?;
    let tally = tally_contributions(source, start, now).await;

    let months = month_range(start.date_naive(), now.date_naive());
    let pivot = tally.pivot(&months);
    let names = tally.reconciliation();

    for entry in names.iter().filter(|entry| entry.multiple_names) {
        warn!(
            "{} commits under multiple names: {}",
            entry.username,
            entry.author_names.join(", ")
        );
    }

    let namespace = source.namespace();
    let folder = config.output_dir.join(&namespace);
    let stem = format!("{} Contribution Report", namespace.replace('/', " "));
    let path = export::write_contribution_report(&folder, &stem, &pivot, &names)?;

    info!(
        "Commit counts for {} commits by {} users saved to {}",
        tally.total(),
        pivot.rows.len(),
        path.display()
    );
    Ok(path)
}
