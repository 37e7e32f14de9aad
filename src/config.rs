use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, ValueEnum};

use crate::auth::Token;
use crate::error::{CommitLensError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Github,
    Ado,
}

/// Connection settings, read from the environment (or a `.env` file) unless
/// given on the command line.
#[derive(Debug, Args)]
pub struct ProviderArgs {
    /// Hosting provider to query
    #[arg(long, global = true, env = "GIT_PROVIDER", value_enum, default_value_t = ProviderKind::Github)]
    pub provider: ProviderKind,

    /// Organization name
    #[arg(long, global = true, env = "ORG_NAME")]
    pub org: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, env = "GITHUB_BASE_URL", default_value = "https://api.github.com")]
    pub github_url: String,

    /// GitHub API token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Azure DevOps base URL
    #[arg(long, global = true, env = "ADO_BASE_URL", default_value = "https://dev.azure.com")]
    pub ado_url: String,

    /// Azure DevOps project name
    #[arg(long, global = true, env = "ADO_PROJECT")]
    pub ado_project: Option<String>,

    /// Azure DevOps username for basic auth (may be empty when using a PAT)
    #[arg(long, global = true, env = "ADO_USERNAME", default_value = "")]
    pub ado_username: String,

    /// Azure DevOps personal access token
    #[arg(long, global = true, env = "ADO_TOKEN", hide_env_values = true)]
    pub ado_token: Option<String>,

    /// Start of the reporting window (RFC 3339 or YYYY-MM-DD, UTC)
    #[arg(long, global = true, env = "START_DATE")]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ProviderConfig {
    GitHub {
        api_url: String,
        org: String,
        token: Option<Token>,
    },
    Ado {
        api_url: String,
        org: String,
        project: String,
        username: String,
        token: Option<Token>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub start_date: Option<DateTime<Utc>>,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_args(args: &ProviderArgs, output_dir: PathBuf) -> Result<Self> {
        let org = required(args.org.as_deref(), "organization name (ORG_NAME)")?;

        let provider = match args.provider {
            ProviderKind::Github => ProviderConfig::GitHub {
                api_url: args.github_url.clone(),
                org,
                token: Token::from_optional(args.github_token.as_deref()),
            },
            ProviderKind::Ado => ProviderConfig::Ado {
                api_url: args.ado_url.clone(),
                org,
                project: required(args.ado_project.as_deref(), "Azure DevOps project (ADO_PROJECT)")?,
                username: args.ado_username.clone(),
                token: Token::from_optional(args.ado_token.as_deref()),
            },
        };

        let start_date = args
            .start_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(parse_start_date)
            .transpose()?;

        Ok(Self {
            provider,
            start_date,
            output_dir,
        })
    }

    pub fn require_start_date(&self) -> Result<DateTime<Utc>> {
        self.start_date.ok_or_else(|| {
            CommitLensError::Config("START_DATE is required for this report".to_string())
        })
    }
}

fn required(value: Option<&str>, what: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CommitLensError::Config(format!("Missing {what}")))
}

/// Accepts a full RFC 3339 timestamp or a bare date taken as UTC midnight.
pub fn parse_start_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| CommitLensError::Config(format!("Invalid START_DATE '{value}'")))
}
