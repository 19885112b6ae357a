//! prodrel - CLI entry point.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use prodrel::git::{GitCli, check_git_installed};
use prodrel::github::OctocrabPublisher;
use prodrel::release::{
    CI_TAG_VAR, EnvSnapshot, ReleaseContext, ReleaseOutcome, ReleaseSettings, run_release,
};
use prodrel::ReleaseError;

/// Publish a production GitHub release with notes built from conventional commits.
#[derive(Parser, Debug)]
#[command(name = "prodrel")]
#[command(about = "Publish a production GitHub release from conventional commits")]
#[command(version)]
struct Cli {
    /// Repository working directory
    #[arg(short = 'C', long, default_value = ".")]
    cwd: PathBuf,

    /// Remote whose URL identifies the GitHub repository
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Tag marking the last production deployment
    #[arg(long, default_value = "Production")]
    production_tag: String,

    /// Prefix of version tags
    #[arg(long, default_value = "v")]
    tag_prefix: String,

    /// Name given to the published release
    #[arg(long, default_value = "Production")]
    release_name: String,

    /// GitHub API base URL (defaults to GITHUB_API_URL, then api.github.com)
    #[arg(long)]
    api_url: Option<String>,

    /// Dry run - print release notes without touching GitHub
    #[arg(long)]
    dry_run: bool,

    /// Print raw Markdown instead of styled terminal output
    #[arg(long)]
    plain: bool,
}

impl Cli {
    fn settings(&self) -> ReleaseSettings {
        ReleaseSettings {
            remote: self.remote.clone(),
            production_tag: self.production_tag.clone(),
            tag_prefix: self.tag_prefix.clone(),
            release_name: self.release_name.clone(),
            api_url: self.api_url.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prodrel=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let env = EnvSnapshot::capture();
    let ci_tag = env.ci_tag().map(str::to_string);

    match run(&cli, env).await {
        Ok(outcome) => {
            match outcome {
                ReleaseOutcome::UpToDate { tag } => {
                    println!("✓ Production is already at {}. Nothing to release.", tag);
                }
                ReleaseOutcome::DryRun { tag } => {
                    println!("✓ Dry run complete for {}. No release was published.", tag);
                }
                ReleaseOutcome::Published(release) => {
                    println!("✓ Published {}: {}", release.tag_name, release.html_url);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_already_exists() {
                error!(
                    error = %e,
                    ci_var = CI_TAG_VAR,
                    ci_tag = ci_tag.as_deref().unwrap_or("<unset>"),
                    "Release creation collided with an existing release"
                );
            } else {
                error!(error = %e, "Release failed");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli, env: EnvSnapshot) -> Result<ReleaseOutcome, ReleaseError> {
    check_git_installed()?;

    let ctx = ReleaseContext::new(&cli.cwd, env, cli.settings());
    let git = GitCli::new(&ctx.cwd, ctx.env.clone());

    let styled = !cli.plain && console::Term::stdout().is_term();
    info!(cwd = %ctx.cwd.display(), dry_run = ctx.settings.dry_run, "Starting release");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let connect = || OctocrabPublisher::from_env(&ctx.env, ctx.api_url());
    run_release(&ctx, &git, connect, &mut out, styled).await
}
