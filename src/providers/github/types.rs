use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Branch, Commit, Repository};

#[derive(Debug, Deserialize)]
pub struct GitHubRepositoryDto {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GitHubBranchDto {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCommitDto {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: GitHubCommitDetailDto,
    /// `null` when the commit email is not linked to a GitHub account.
    pub author: Option<GitHubUserDto>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCommitDetailDto {
    pub author: GitHubSignatureDto,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GitHubSignatureDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubUserDto {
    pub login: String,
}

impl From<GitHubRepositoryDto> for Repository {
    fn from(dto: GitHubRepositoryDto) -> Self {
        Self {
            id: dto.name.clone(),
            name: dto.name,
        }
    }
}

impl From<GitHubBranchDto> for Branch {
    fn from(dto: GitHubBranchDto) -> Self {
        Self { name: dto.name }
    }
}

impl From<GitHubCommitDto> for Commit {
    fn from(dto: GitHubCommitDto) -> Self {
        let signature = dto.commit.author;
        let login = dto
            .author
            .map(|user| user.login)
            .filter(|login| !login.is_empty())
            .unwrap_or_else(|| signature.name.clone());

        Self {
            sha: dto.sha,
            url: dto.html_url,
            author_name: signature.name,
            author_email: signature.email,
            author_date: signature.date,
            message: dto.commit.message,
            login,
        }
    }
}
