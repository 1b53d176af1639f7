//! Clone command - list, filter and clone every repository of the owners

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use regex::Regex;
use repoclone_core::{CliOverrides, CloneReport, Config, Credentials, RepoFilter, Secrets};
use tracing::debug;

/// Owners, credentials and limits for a clone run
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Owners given as positional arguments
    #[arg(value_name = "OWNER")]
    pub positional_owners: Vec<String>,

    /// User or organization whose repositories are cloned (repeatable)
    #[arg(short = 'o', long = "owner", value_name = "OWNER")]
    pub owner: Vec<String>,

    /// Username for basic authentication
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(short, long)]
    pub password: Option<String>,

    /// Personal access token
    #[arg(short, long)]
    pub token: Option<String>,

    /// Destination root; repositories land in <dest>/<owner>/<name>
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Maximum number of clones running at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Maximum number of attempts per repository
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Only clone repositories whose name matches this pattern
    #[arg(short = 'm', long = "match", value_name = "PATTERN")]
    pub pattern: Option<Regex>,

    /// Path to git executable
    #[arg(long = "git", value_name = "PATH")]
    pub git_path: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CloneArgs {
    /// Owners from `--owner` flags followed by positional owners
    pub fn owners(&self) -> Vec<String> {
        self.owner
            .iter()
            .chain(self.positional_owners.iter())
            .cloned()
            .collect()
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            destination: self.dest.clone(),
            concurrency: self.concurrency,
            max_attempts: self.max_attempts,
            git_path: self.git_path.clone(),
            api_url: self.api_url.clone(),
        }
    }

    /// Explicit credentials, falling back to GITHUB_TOKEN and the secrets file
    fn credentials(&self) -> anyhow::Result<Option<Credentials>> {
        let explicit = Credentials::from_parts(
            self.username.clone(),
            self.password.clone(),
            self.token.clone(),
        )?;

        match explicit {
            Some(credentials) => Ok(Some(credentials)),
            None => Ok(Secrets::load()?.credentials()),
        }
    }

    /// Execute the clone command
    pub async fn execute(self) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(self.overrides())?;
        debug!(
            destination = ?config.clone.destination,
            concurrency = config.clone.concurrency,
            max_attempts = config.clone.max_attempts,
            git_path = %config.clone.git_path,
            "Configuration loaded"
        );

        let mut options = config.clone_options(self.owners());
        if let Some(credentials) = self.credentials()? {
            debug!(auth = credentials.kind(), "Using credentials");
            options = options.with_credentials(credentials);
        }
        if let Some(pattern) = self.pattern.clone() {
            options.filter = RepoFilter::name_matches(pattern);
        }

        let report =
            repoclone_github::clone_repos_with(options, Arc::new(config.git_cloner())).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", render_report(&report));
        }

        Ok(())
    }
}

/// Human readable run summary
fn render_report(report: &CloneReport) -> String {
    let mut out = String::new();

    for name in &report.cloned {
        out.push_str(&format!("  cloned {}\n", name));
    }

    out.push_str(&format!(
        "Cloned {} repositories for {} owners\n",
        report.cloned.len(),
        report.owners.len()
    ));

    if !report.failed.is_empty() {
        out.push_str(&format!(
            "Failed to clone {} repositories:\n",
            report.failed.len()
        ));
        for failed in &report.failed {
            out.push_str(&format!(
                "  {} after {} attempts: {}\n",
                failed.full_name, failed.attempts, failed.error
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use repoclone_core::{FailedClone, OwnerSummary};

    fn args(owner: &str) -> CloneArgs {
        CloneArgs {
            positional_owners: Vec::new(),
            owner: vec![owner.to_string()],
            username: None,
            password: None,
            token: None,
            dest: None,
            concurrency: None,
            max_attempts: None,
            pattern: None,
            git_path: None,
            api_url: None,
            json: false,
        }
    }

    #[test]
    fn test_explicit_token_wins() {
        let mut args = args("doowb");
        args.token = Some("ghp_cli".to_string());
        assert_eq!(
            args.credentials().unwrap(),
            Some(Credentials::token("ghp_cli"))
        );
    }

    #[test]
    fn test_both_credential_shapes_rejected() {
        let mut args = args("doowb");
        args.username = Some("doowb".to_string());
        args.token = Some("ghp_cli".to_string());
        assert!(args.credentials().is_err());
    }

    #[test]
    fn test_overrides_carry_flags() {
        let mut args = args("doowb");
        args.dest = Some(PathBuf::from("/srv/mirror"));
        args.concurrency = Some(3);
        args.git_path = Some("/opt/git".to_string());

        let overrides = args.overrides();
        assert_eq!(overrides.destination, Some(PathBuf::from("/srv/mirror")));
        assert_eq!(overrides.concurrency, Some(3));
        assert_eq!(overrides.max_attempts, None);
        assert_eq!(overrides.git_path.as_deref(), Some("/opt/git"));
    }

    #[test]
    fn test_render_report() {
        let now = Utc::now();
        let report = CloneReport {
            cloned: vec!["doowb/npm-api".to_string()],
            failed: vec![FailedClone {
                full_name: "doowb/broken".to_string(),
                attempts: 3,
                error: "Clone failed for doowb/broken: exit status 128".to_string(),
            }],
            owners: vec![OwnerSummary {
                owner: "doowb".to_string(),
                listed: 2,
                selected: 2,
                cloned: 1,
                failed: 1,
            }],
            started_at: now,
            finished_at: now,
        };

        let out = render_report(&report);
        assert!(out.contains("  cloned doowb/npm-api\n"));
        assert!(out.contains("Cloned 1 repositories for 1 owners\n"));
        assert!(out.contains("  doowb/broken after 3 attempts: "));
    }
}
