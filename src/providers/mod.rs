pub mod ado;
pub mod github;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::{Config, ProviderConfig};
use crate::error::Result;
use crate::models::{Branch, Commit, CommitQuery, Repository};

use self::ado::AdoProvider;
use self::github::GitHubProvider;

/// What every report needs from a hosting provider.
///
/// Listing calls never fail outright: a page that cannot be fetched is logged
/// and the items collected before it are returned.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Human readable provider name, used in prompts and logs.
    fn name(&self) -> &'static str;

    /// Relative output directory for this organization (and project).
    fn namespace(&self) -> String;

    async fn list_repositories(&self) -> Vec<Repository>;

    async fn list_branches(&self, repository: &Repository) -> Vec<Branch>;

    async fn list_commits(&self, repository: &Repository, query: &CommitQuery) -> Vec<Commit>;
}

pub fn from_config(config: &Config) -> Result<Box<dyn CommitSource>> {
    let source: Box<dyn CommitSource> = match &config.provider {
        ProviderConfig::GitHub {
            api_url,
            org,
            token,
        } => Box::new(GitHubProvider::new(api_url, org.clone(), token.clone())?),
        ProviderConfig::Ado {
            api_url,
            org,
            project,
            username,
            token,
        } => Box::new(AdoProvider::new(
            api_url,
            org,
            project,
            username.clone(),
            token.clone(),
        )?),
    };

    Ok(source)
}

/// Both APIs accept ISO-8601 UTC timestamps with a `Z` suffix.
pub(crate) fn api_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_api_timestamp_uses_zulu_suffix() {
        let value = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(api_timestamp(value), "2024-01-01T00:00:00Z");
    }
}
