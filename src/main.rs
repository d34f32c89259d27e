use clap::{Parser, Subcommand};
use docs_preprocessor::assemble::{self, BuildOptions};
use docs_preprocessor::config::{self, SiteConfig};
use docs_preprocessor::exclude::Excludes;
use docs_preprocessor::output;
use docs_preprocessor::template::PageTemplate;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docs-preprocessor")]
#[command(about = "Build a navigable HTML site from global and package documentation")]
#[command(long_about = "\
Build a navigable HTML site from global and package documentation

Every file is placed according to its path. Markdown becomes an HTML page
with a navigation sidebar, images are copied, everything else is ignored.

Source structure:

  docs/
  ├── config.toml                          # Optional, see gen-config
  ├── global/
  │   └── help/support.md                  → help/support.html
  └── packages/module-vpc/
      ├── README.md                        → packages/module-vpc/overview.html
      ├── modules/
      │   ├── _docs/README.md              → packages/module-vpc/README.html
      │   └── vpc-app/
      │       ├── README.md                → packages/module-vpc/vpc-app/overview.html
      │       └── _docs/routing.md         → packages/module-vpc/vpc-app/routing.html
      └── examples/vpc-app/
          ├── README.md                    → packages/module-vpc/vpc-app/examples/overview.html
          └── docs/usage.md                → packages/module-vpc/vpc-app/examples/usage.html

Relative links in package docs are rewritten to point at the package
repository, e.g. https://github.com/gruntwork-io/module-vpc/tree/master/...

Run 'docs-preprocessor gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Documentation source directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "_site", global = true)]
    output: PathBuf,

    /// Log progress at info level (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site
    Build {
        /// Page template, overrides build.template
        #[arg(long)]
        template: Option<PathBuf>,
        /// Glob of paths to skip, added to build.excludes (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Show how each file would be handled without building
    Check {
        /// Glob of paths to skip, added to build.excludes (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { template, exclude } => {
            let site_config = load_site_config(&cli.source, exclude)?;
            init_thread_pool(&site_config.processing);

            let template_path = template.unwrap_or_else(|| PathBuf::from(&site_config.build.template));
            let template = PageTemplate::load(&template_path)?;
            let options = BuildOptions::from_config(&site_config, &cli.source, &cli.output);

            println!(
                "==> Building {} → {}",
                cli.source.display(),
                cli.output.display()
            );
            let report = assemble::build(options, template)?;
            output::print_build_report(&report);

            if !report.is_success() {
                std::process::exit(1);
            }
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check { exclude, json } => {
            let site_config = load_site_config(&cli.source, exclude)?;
            let excludes = Excludes::new(&site_config.build.excludes)?;
            let classifications = assemble::check(&cli.source, &excludes)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&classifications)?);
            } else {
                println!("==> Checking {}", cli.source.display());
                output::print_check_output(&classifications);
            }

            if classifications.iter().any(|c| c.is_failure()) {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--verbose` enables INFO level, otherwise use RUST_LOG or default to WARN.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `config.toml` from the source root and apply CLI excludes on top.
fn load_site_config(source: &Path, extra_excludes: Vec<String>) -> Result<SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(source)?;
    site_config.build.excludes.extend(extra_excludes);
    site_config.validate()?;
    Ok(site_config)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
