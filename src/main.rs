use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use npm_repo::cache::Cache;
use npm_repo::config::{self, Config, DEFAULT_LIST_COUNT};
use npm_repo::lookup::PackageLookup;
use npm_repo::registry::{CdnRegistry, GitHubRegistry};

#[derive(Parser)]
#[command(name = "npm-repo")]
#[command(version, about = "Get package repository URL")]
struct Cli {
    /// Package name, e.g. `vite` or `@vitejs/plugin-react`
    pkgname: String,

    /// Print a GitHub URL comparing two versions: `<from>..<to>`,
    /// `<from>...<to>`, or `<from>` to compare against the latest version
    #[arg(short, long, value_name = "RANGE", allow_hyphen_values = true)]
    compare: Option<String>,

    /// List recent N versions and their GitHub URLs [default: 20]
    #[arg(short, long, value_name = "N", num_args = 0..=1)]
    list: Option<Option<usize>>,

    /// Print a "s/.*/v&/"-like sed script
    #[arg(long)]
    sed: bool,

    /// Print a "v{}"-like template string
    #[arg(long)]
    template: bool,

    /// Ignore the result cache
    #[arg(long)]
    no_cache: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Number of versions to list; `--list 0` counts as not listing.
    fn list_count(&self) -> Option<usize> {
        self.list
            .map(|n| n.unwrap_or(DEFAULT_LIST_COUNT))
            .filter(|&n| n > 0)
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,npm_repo=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&config::config_path())?;

    let mut lookup = PackageLookup::new(
        Arc::new(CdnRegistry::from_config(&config.registries)),
        Arc::new(GitHubRegistry::from_config(&config.registries)),
    );
    if config.cache.enabled && !cli.no_cache {
        match Cache::new(&config::cache_db_path(), config.cache.ttl) {
            Ok(cache) => lookup = lookup.with_cache(Arc::new(cache)),
            Err(e) => warn!("Cache unavailable, continuing without it: {}", e),
        }
    }

    let package = lookup.resolve(&cli.pkgname).await?;
    let list = cli.list_count();

    if let Some(range) = &cli.compare {
        println!("{}", lookup.compare_url(&package, range).await?);
    }

    if let Some(limit) = list {
        for line in package.listing(limit) {
            println!("{line}");
        }
    }

    if cli.sed {
        println!("{}", package.urls().sed_script());
    }

    if cli.template {
        println!("{}", package.pattern);
    }

    if cli.compare.is_none() && list.is_none() && !cli.sed && !cli.template {
        println!("{}", package.browse_url());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
