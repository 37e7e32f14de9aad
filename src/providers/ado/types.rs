use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Branch, Commit, Repository};

/// Azure DevOps wraps every collection in `{ "count": n, "value": [...] }`.
#[derive(Debug, Deserialize)]
pub struct AdoList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct AdoRepositoryDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AdoRefDto {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoCommitDto {
    pub commit_id: String,
    pub author: AdoSignatureDto,
    #[serde(default)]
    pub comment: String,
    pub remote_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdoSignatureDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub date: DateTime<Utc>,
}

impl From<AdoRepositoryDto> for Repository {
    fn from(dto: AdoRepositoryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl From<AdoRefDto> for Branch {
    fn from(dto: AdoRefDto) -> Self {
        let name = dto
            .name
            .strip_prefix("refs/heads/")
            .map_or(dto.name.clone(), str::to_string);
        Self { name }
    }
}

// ADO has no usernames on commits, so the author name doubles as the login.
impl From<AdoCommitDto> for Commit {
    fn from(dto: AdoCommitDto) -> Self {
        Self {
            sha: dto.commit_id,
            url: dto.remote_url.unwrap_or_default(),
            login: dto.author.name.clone(),
            author_name: dto.author.name,
            author_email: dto.author.email,
            author_date: dto.author.date,
            message: dto.comment,
        }
    }
}
