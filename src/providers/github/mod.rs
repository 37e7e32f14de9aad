mod client;
mod rate_limit;
mod types;

use async_trait::async_trait;
use log::info;

use crate::auth::Token;
use crate::error::Result;
use crate::models::{Branch, Commit, CommitQuery, Repository};
use crate::pagination::{collect_pages, PageCursor};
use crate::providers::CommitSource;

use self::client::GitHubClient;

pub struct GitHubProvider {
    client: GitHubClient,
    org: String,
}

impl GitHubProvider {
    pub fn new(base_url: &str, org: String, token: Option<Token>) -> Result<Self> {
        let client = GitHubClient::new(base_url, token)?;

        Ok(Self { client, org })
    }
}

#[async_trait]
impl CommitSource for GitHubProvider {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    fn namespace(&self) -> String {
        self.org.clone()
    }

    async fn list_repositories(&self) -> Vec<Repository> {
        let what = format!("repositories for {}", self.org);
        let repositories = collect_pages(&what, PageCursor::first_page(), |cursor| {
            self.client.fetch_repositories_page(&self.org, cursor)
        })
        .await;

        info!("Found {} repositories in {}", repositories.len(), self.org);
        repositories.into_iter().map(Repository::from).collect()
    }

    async fn list_branches(&self, repository: &Repository) -> Vec<Branch> {
        let what = format!("branches for {}/{}", self.org, repository.name);
        collect_pages(&what, PageCursor::first_page(), |cursor| {
            self.client
                .fetch_branches_page(&self.org, &repository.name, cursor)
        })
        .await
        .into_iter()
        .map(Branch::from)
        .collect()
    }

    async fn list_commits(&self, repository: &Repository, query: &CommitQuery) -> Vec<Commit> {
        let what = format!("commits for {}/{}", self.org, repository.name);
        collect_pages(&what, PageCursor::first_page(), |cursor| {
            self.client
                .fetch_commits_page(&self.org, &repository.name, query, cursor)
        })
        .await
        .into_iter()
        .map(Commit::from)
        .collect()
    }
}
