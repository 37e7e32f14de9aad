use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info};

use crate::config::{Config, ProviderArgs};
use crate::error::CommitLensError;
use crate::keep_awake::KeepAwake;
use crate::providers::{self, CommitSource};
use crate::reports;

#[derive(Parser)]
#[command(name = "commitlens")]
#[command(author, version, about = "Commit activity reports for GitHub and Azure DevOps", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    provider: ProviderArgs,

    /// Directory reports are written to
    #[arg(short, long, global = true, default_value = "output")]
    output_dir: PathBuf,

    /// Let the system sleep while the report runs
    #[arg(long, global = true, default_value_t = false)]
    allow_sleep: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count commits on every branch except main and master since START_DATE
    Branches,

    /// Export every commit by one author
    Author {
        /// Author username (prompted for when omitted)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Export commit counts per author and month since START_DATE
    Contributions,
}

impl Cli {
    /// Runs the selected report. Failures are logged, never returned, so a
    /// failed report still exits cleanly.
    pub async fn execute(&self) -> Result<()> {
        let keep_awake = if self.allow_sleep {
            KeepAwake::disabled()
        } else {
            KeepAwake::acquire()
        };
        if keep_awake.is_active() {
            info!("System sleep disabled for the duration of the run");
        }

        let started = Instant::now();
        if let Err(e) = self.run().await {
            error!("Error: {e:#}");
        }
        info!(
            "Execution time: {:.2} seconds",
            started.elapsed().as_secs_f64()
        );

        drop(keep_awake);
        Ok(())
    }

    async fn run(&self) -> Result<()> {
        let config = Config::from_args(&self.provider, self.output_dir.clone())?;
        let source = providers::from_config(&config)?;

        match &self.command {
            Commands::Branches => {
                let start = config.require_start_date()?;
                info!("Counting branch commits in {} since {start}", source.namespace());

                let tally = reports::count_branch_commits(source.as_ref(), start, Utc::now()).await;

                for entry in tally.entries() {
                    println!("{}\t{}\t{}", entry.repo, entry.branch, entry.commits);
                }
                println!(
                    "TOTAL COMMIT COUNT: {} across {} branches",
                    tally.total(),
                    tally.entries().len()
                );
            }
            Commands::Author { author } => {
                let author = match author {
                    Some(author) => author.trim().to_string(),
                    None => prompt_author(source.as_ref())?,
                };
                if author.is_empty() {
                    return Err(CommitLensError::Config("An author is required".to_string()).into());
                }

                let path = reports::export_author_history(source.as_ref(), &config, &author).await?;
                println!("{}", path.display());
            }
            Commands::Contributions => {
                let path =
                    reports::export_contribution_report(source.as_ref(), &config, Utc::now()).await?;
                println!("{}", path.display());
            }
        }

        Ok(())
    }
}

fn prompt_author(source: &dyn CommitSource) -> Result<String> {
    print!("Enter the author's {} username: ", source.name());
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_author_subcommand_with_globals() {
        let cli = Cli::try_parse_from([
            "commitlens",
            "author",
            "--author",
            "janedoe",
            "--provider",
            "ado",
            "--org",
            "acme",
            "--ado-project",
            "platform",
            "--allow-sleep",
        ])
        .unwrap();

        assert!(matches!(&cli.command, Commands::Author { author: Some(a) } if a == "janedoe"));
        assert_eq!(cli.provider.org.as_deref(), Some("acme"));
        assert_eq!(cli.provider.ado_project.as_deref(), Some("platform"));
        assert!(cli.allow_sleep);
        assert_eq!(cli.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_invalid_provider_is_rejected() {
        let result = Cli::try_parse_from(["commitlens", "--provider", "gitlab", "branches"]);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_configuration_errors_do_not_fail_the_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("out");
        let cli = Cli::try_parse_from([
            "commitlens",
            "contributions",
            "--org",
            "acme",
            "--start-date",
            "not-a-date",
            "--allow-sleep",
            "--output-dir",
            output.to_str().unwrap(),
        ])
        .unwrap();

        assert!(cli.execute().await.is_ok());
        assert!(!output.exists());
    }
}
