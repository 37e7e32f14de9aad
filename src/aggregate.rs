use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use indexmap::IndexMap;

use crate::models::{Commit, Repository};

/// Default branches left out of branch commit counts.
pub const EXCLUDED_BRANCHES: [&str; 2] = ["main", "master"];

pub fn is_counted_branch(name: &str) -> bool {
    !EXCLUDED_BRANCHES.contains(&name)
}

/// One line of an author's commit history.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorCommitRow {
    pub repo: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub url: String,
    pub sha: String,
}

impl AuthorCommitRow {
    pub fn new(repository: &Repository, commit: Commit) -> Self {
        Self {
            repo: repository.name.clone(),
            date: commit.author_date,
            message: commit.message,
            url: commit.url,
            sha: commit.sha,
        }
    }
}

/// First day of the month `date` falls in.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Every month from `start` to `end`, both inclusive, oldest first.
pub fn month_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let last = month_start(end);
    let mut months = Vec::new();
    let mut current = month_start(start);

    while current <= last {
        months.push(current);
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    months
}

/// Column label for a month, e.g. `Jan 24`.
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %y").to_string()
}

/// Username a commit is counted under.
///
/// Falls back to the author name when the provider reported no login, so two
/// people sharing a display name end up in the same row.
pub fn resolve_username(commit: &Commit) -> &str {
    if commit.login.trim().is_empty() {
        &commit.author_name
    } else {
        &commit.login
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub username: String,
    /// Month label to commit count, in column order.
    pub counts: IndexMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributionPivot {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameReconciliation {
    pub username: String,
    pub author_names: Vec<String>,
    pub multiple_names: bool,
}

/// Commit counts per username and month, plus every author name seen per
/// username.
#[derive(Debug, Default)]
pub struct ContributionTally {
    counts: BTreeMap<String, HashMap<NaiveDate, usize>>,
    author_names: BTreeMap<String, BTreeSet<String>>,
}

impl ContributionTally {
    pub fn record(&mut self, commit: &Commit) {
        let username = resolve_username(commit).to_string();
        let month = month_start(commit.author_date.date_naive());

        *self
            .counts
            .entry(username.clone())
            .or_default()
            .entry(month)
            .or_default() += 1;

        self.author_names
            .entry(username)
            .or_default()
            .insert(commit.author_name.clone());
    }

    pub fn total(&self) -> usize {
        self.counts.values().flat_map(HashMap::values).sum()
    }

    /// Usernames as rows, `months` as zero-filled columns.
    pub fn pivot(&self, months: &[NaiveDate]) -> ContributionPivot {
        let columns: Vec<String> = months.iter().copied().map(month_label).collect();

        let rows = self
            .counts
            .iter()
            .map(|(username, by_month)| PivotRow {
                username: username.clone(),
                counts: months
                    .iter()
                    .zip(&columns)
                    .map(|(month, label)| {
                        (label.clone(), by_month.get(month).copied().unwrap_or(0))
                    })
                    .collect(),
            })
            .collect();

        ContributionPivot { columns, rows }
    }

    pub fn reconciliation(&self) -> Vec<NameReconciliation> {
        self.author_names
            .iter()
            .map(|(username, names)| NameReconciliation {
                username: username.clone(),
                author_names: names.iter().cloned().collect(),
                multiple_names: names.len() > 1,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCommitCount {
    pub repo: String,
    pub branch: String,
    pub commits: usize,
}

/// Per-branch commit counts with a running total. Callers decide which
/// branches get recorded.
#[derive(Debug, Default)]
pub struct BranchTally {
    entries: Vec<BranchCommitCount>,
    total: usize,
}

impl BranchTally {
    pub fn record(&mut self, repo: &str, branch: &str, commits: usize) {
        self.total += commits;
        self.entries.push(BranchCommitCount {
            repo: repo.to_string(),
            branch: branch.to_string(),
            commits,
        });
    }

    pub fn entries(&self) -> &[BranchCommitCount] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
