use chrono::{DateTime, Utc};

/// A commit in the provider-neutral shape every report works on.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub sha: String,
    pub url: String,
    pub author_name: String,
    pub author_email: String,
    pub author_date: DateTime<Utc>,
    pub message: String,
    /// Provider username. Equals `author_name` when the provider has none.
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
}

/// Filters applied when listing the commits of one repository.
#[derive(Debug, Clone, Default)]
pub struct CommitQuery {
    pub author: Option<String>,
    pub branch: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl CommitQuery {
    pub fn by_author(author: &str) -> Self {
        Self {
            author: Some(author.to_string()),
            ..Self::default()
        }
    }

    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn on_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }
}
