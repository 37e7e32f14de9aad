mod client;
mod types;

use async_trait::async_trait;
use log::{error, info};

use crate::auth::Token;
use crate::error::Result;
use crate::models::{Branch, Commit, CommitQuery, Repository};
use crate::pagination::{collect_pages, PageCursor};
use crate::providers::CommitSource;

use self::client::AdoClient;

pub struct AdoProvider {
    client: AdoClient,
    org: String,
    project: String,
}

impl AdoProvider {
    pub fn new(
        base_url: &str,
        org: &str,
        project: &str,
        username: String,
        token: Option<Token>,
    ) -> Result<Self> {
        let client = AdoClient::new(base_url, org, project, username, token)?;

        Ok(Self {
            client,
            org: org.to_string(),
            project: project.to_string(),
        })
    }
}

#[async_trait]
impl CommitSource for AdoProvider {
    fn name(&self) -> &'static str {
        "ADO"
    }

    fn namespace(&self) -> String {
        format!("{}/{}", self.org, self.project)
    }

    async fn list_repositories(&self) -> Vec<Repository> {
        match self.client.fetch_repositories().await {
            Ok(repositories) => {
                info!(
                    "Found {} repositories in {}/{}",
                    repositories.len(),
                    self.org,
                    self.project
                );
                repositories.into_iter().map(Repository::from).collect()
            }
            Err(e) => {
                error!(
                    "Error fetching repositories for {}/{}: {e}",
                    self.org, self.project
                );
                Vec::new()
            }
        }
    }

    async fn list_branches(&self, repository: &Repository) -> Vec<Branch> {
        match self.client.fetch_branches(&repository.id).await {
            Ok(refs) => refs.into_iter().map(Branch::from).collect(),
            Err(e) => {
                error!("Error fetching branches for {}: {e}", repository.name);
                Vec::new()
            }
        }
    }

    async fn list_commits(&self, repository: &Repository, query: &CommitQuery) -> Vec<Commit> {
        let what = format!("commits for {}", repository.name);
        collect_pages(&what, PageCursor::first_window(), |cursor| {
            self.client
                .fetch_commits_page(&repository.id, query, cursor)
        })
        .await
        .into_iter()
        .map(Commit::from)
        .collect()
    }
}
