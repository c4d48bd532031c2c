use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use portfolio_data::edits;
use portfolio_data::github::{AssetStore, GitHubTransport};
use portfolio_data::images::{self, DistributeOptions};
use portfolio_data::table::column::{PINNED, RESUME_WORTHY};
use portfolio_data::table::{store, RenameOutcome};
use portfolio_data::{
    Config, GhCli, GitHubClient, GitHubMetadataSource, GitHubSync, HttpPageFetcher,
    OpenGraphSync, RepoFilter, RowKey, SyncOptions, SyncReport,
};

#[derive(Parser, Debug)]
#[command(name = "portfolio-data")]
#[command(version)]
#[command(about = "Maintain the portfolio projects.csv and its generated assets")]
struct Args {
    /// Projects CSV (defaults to $PROJECTS_CSV or public/data/projects.csv)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Site public directory (defaults to $PUBLIC_DIR or public)
    #[arg(long, global = true)]
    public_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove forked repositories
    Clean,

    /// Set the Hidden flag on one project
    ToggleHidden {
        /// Repo name or org/repo
        #[arg(long)]
        repo: String,

        #[arg(long, value_enum)]
        hidden: YesNo,
    },

    /// Delete one project
    Delete {
        /// org/repo
        #[arg(long)]
        repo: RowKey,
    },

    /// Rename a column, keeping every value
    RenameColumn {
        #[arg(long, default_value = RESUME_WORTHY)]
        from: String,

        #[arg(long, default_value = PINNED)]
        to: String,
    },

    /// Hide projects with no fetched GitHub data
    HideUnfetched,

    /// Refresh GitHub metadata for every project (or one)
    FetchGithub {
        /// Repo name or org/repo
        #[arg(long)]
        repo: Option<String>,

        /// Skip saving READMEs and social preview images
        #[arg(long)]
        no_assets: bool,
    },

    /// Scrape Open Graph tags and favicons from project homepages
    FetchOg {
        /// Repo name or org/repo
        #[arg(long)]
        repo: Option<String>,
    },

    /// Generate favicon variants from a source image
    Favicons {
        /// Source image (defaults to <public-dir>/pfp.png)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Output directory (defaults to <public-dir>)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Copy a template social preview into every local checkout
    DistributePreviews {
        #[arg(long)]
        source: PathBuf,

        #[arg(long)]
        dry_run: bool,

        /// Only checkouts whose Local column is yes
        #[arg(long)]
        local_only: bool,
    },

    /// Copy each checkout's social preview into the public directory
    CopyPreviews,

    /// List checkouts with a social preview ready for manual upload
    ScanPreviews {
        /// org/repo
        #[arg(long)]
        repo: Option<RowKey>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum YesNo {
    Yes,
    No,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("portfolio_data=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(csv) = args.csv {
        config.csv_path = csv;
    }
    if let Some(public_dir) = args.public_dir {
        config.public_dir = public_dir;
    }

    let ok = match args.command {
        Command::Clean => clean(&config)?,
        Command::ToggleHidden { repo, hidden } => {
            let hidden = matches!(hidden, YesNo::Yes);
            match edits::toggle_hidden(&config.csv_path, &RepoFilter::new(&repo), hidden)? {
                Some(label) => {
                    println!("Updated {}", label);
                    println!("   Hidden: {}", if hidden { "yes" } else { "no" });
                    true
                }
                None => {
                    eprintln!("Repo not found: {}", repo);
                    false
                }
            }
        }
        Command::Delete { repo } => match edits::delete_project(&config.csv_path, &repo)? {
            Some(remaining) => {
                println!("Deleted {}", repo);
                println!("{} projects remaining", remaining);
                true
            }
            None => {
                eprintln!("Repo not found: {}", repo);
                false
            }
        },
        Command::RenameColumn { from, to } => rename_column(&config.csv_path, &from, &to)?,
        Command::HideUnfetched => {
            let hidden = edits::hide_unfetched(&config.csv_path)?;
            if hidden.is_empty() {
                println!("All projects have GitHub data");
            } else {
                println!("Hid {} projects without GitHub data:", hidden.len());
                for label in &hidden {
                    println!("  - {}", label);
                }
            }
            true
        }
        Command::FetchGithub { repo, no_assets } => {
            let options = sync_options(repo.as_deref());
            let report = if let Some(token) = &config.github_token {
                let client = GitHubClient::new(token, config.fetch_timeout)?;
                fetch_github(&config, client, &options, !no_assets).await?
            } else {
                let gh = GhCli::new(&config.gh_bin, config.fetch_timeout);
                gh.check_auth().await?;
                fetch_github(&config, gh, &options, !no_assets).await?
            };
            print_sync_report("GitHub", &report);
            sync_succeeded(&options, &report)
        }
        Command::FetchOg { repo } => {
            let options = sync_options(repo.as_deref());
            let sync = OpenGraphSync::new(HttpPageFetcher::new(config.fetch_timeout)?);
            let report = sync.sync_file(&config.csv_path, &options).await?;
            print_sync_report("Open Graph", &report);
            sync_succeeded(&options, &report)
        }
        Command::Favicons { source, out } => {
            let source = source.unwrap_or_else(|| config.public_dir.join("pfp.png"));
            let out = out.unwrap_or_else(|| config.public_dir.clone());
            let icons = images::generate_favicons(&source, &out)?;
            println!("Generated {} favicon variants in {}", icons.len(), out.display());
            true
        }
        Command::DistributePreviews {
            source,
            dry_run,
            local_only,
        } => {
            let dataset = store::load(&config.csv_path)?;
            let report = images::distribute_template(
                &dataset,
                &config.local_repos(),
                &source,
                DistributeOptions { dry_run, local_only },
            )?;
            if dry_run {
                println!("Dry run, nothing was written");
            }
            println!("Copied:    {}", report.copied.len());
            println!("Skipped:   {}", report.skipped.len());
            println!("Not found: {}", report.not_found.len());
            if local_only {
                println!("Not local: {}", report.not_local.len());
            }
            println!("Errors:    {}", report.errors.len());
            report.errors.is_empty()
        }
        Command::CopyPreviews => {
            let dataset = store::load(&config.csv_path)?;
            let report =
                images::collect_previews(&dataset, &config.local_repos(), &config.public_dir);
            println!(
                "Copied {} images to {}",
                report.copied.len(),
                config.public_dir.join("social-previews").display()
            );
            if !report.missing.is_empty() {
                println!("Missing source image: {}", report.missing.join(", "));
            }
            report.errors.is_empty()
        }
        Command::ScanPreviews { repo } => {
            let dataset = store::load(&config.csv_path)?;
            let report = images::scan_previews(&dataset, &config.local_repos(), repo.as_ref());
            if let Some(repo) = &repo {
                if report.found.is_empty() && report.missing.is_empty() {
                    eprintln!("Repo not found locally: {}", repo);
                    process::exit(1);
                }
            }
            if !report.found.is_empty() {
                println!("Social previews need a manual upload (GitHub has no API for it):");
                for found in &report.found {
                    println!("  {}", found.repo);
                    println!("    image:    {}", found.path.display());
                    println!("    settings: {}", found.settings_url);
                }
            }
            println!("Found: {}  Missing: {}", report.found.len(), report.missing.len());
            true
        }
    };

    if !ok {
        process::exit(1);
    }
    Ok(())
}

fn clean(config: &Config) -> anyhow::Result<bool> {
    let report = edits::remove_forks(&config.csv_path)?;
    println!("Removed {} forked repositories", report.removed.len());
    for label in report.removed.iter().take(10) {
        println!("  - {}", label);
    }
    if report.removed.len() > 10 {
        println!("  ... and {} more", report.removed.len() - 10);
    }
    println!(
        "{} projects remaining, {} columns",
        report.remaining, report.columns
    );
    Ok(true)
}

fn rename_column(path: &Path, from: &str, to: &str) -> anyhow::Result<bool> {
    match edits::rename_column(path, from, to) {
        Ok(RenameOutcome::Renamed) => {
            println!("Renamed '{}' to '{}'", from, to);
            Ok(true)
        }
        Ok(RenameOutcome::AlreadyMigrated) => {
            println!("Column '{}' already exists, nothing to do", to);
            Ok(true)
        }
        Err(portfolio_data::Error::ColumnNotFound(column)) => {
            eprintln!("Column '{}' not found", column);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn fetch_github<T: GitHubTransport>(
    config: &Config,
    transport: T,
    options: &SyncOptions,
    with_assets: bool,
) -> anyhow::Result<SyncReport> {
    let mut sync = GitHubSync::new(GitHubMetadataSource::new(transport));
    if with_assets {
        sync = sync.with_assets(AssetStore::new(&config.public_dir, config.fetch_timeout)?);
    }
    Ok(sync.sync_file(&config.csv_path, options).await?)
}

fn sync_options(repo: Option<&str>) -> SyncOptions {
    SyncOptions {
        filter: repo.map(RepoFilter::new),
        show_progress: true,
    }
}

/// A run scoped to one repository fails when nothing matched or the fetch
/// did not succeed.
fn sync_succeeded(options: &SyncOptions, report: &SyncReport) -> bool {
    match &options.filter {
        Some(filter) if report.matched == 0 => {
            eprintln!("Repo not found: {}", filter);
            false
        }
        Some(_) if report.updated > 0 => true,
        Some(_) => {
            for (repo, reason) in &report.passed_over {
                eprintln!("{}: skipped ({})", repo, reason);
            }
            false
        }
        None => true,
    }
}

fn print_sync_report(source: &str, report: &SyncReport) {
    println!();
    println!("{} sync complete", source);
    println!("  Updated: {}", report.updated);
    println!("  Skipped: {}", report.skipped);
    println!("  Errors:  {}", report.errors());
    for (repo, error) in &report.failures {
        println!("    {}: {}", repo, error);
    }
    if !report.added_columns.is_empty() {
        let names: Vec<_> = report.added_columns.iter().map(|c| c.as_str()).collect();
        println!("  Added columns: {}", names.join(", "));
    }
}
