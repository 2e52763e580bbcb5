//! entitle CLI entry point.
//!
//! Answers console access questions from the command line:
//!
//! ```text
//! entitle check --principal @me.json --feature MESSAGING_SEND
//! entitle route --principal @me.json /crm/leads
//! entitle menu  --principal @me.json
//! entitle init
//! ```
//!
//! Exit codes: `0` allowed, `1` error, `2` denied, `3` misconfigured.

mod commands;
mod tracing_writer;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{CheckRequest, Report};
use entitle_auth::{DefaultPolicy, MatchPolicy};
use entitle_guard::config::{ConfigLoader, ConfigResolver, EntitleConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tracing_writer::FileMakeWriter;

/// entitle - feature and permission gating for multi-tenant consoles
#[derive(Parser, Debug)]
#[command(name = "entitle")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Global config file (defaults to ~/.entitle/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Console manifest (overrides config and ENTITLE_MANIFEST)
    #[arg(long, global = true, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Write logs to this directory as well as stderr
    #[arg(long, global = true, value_name = "DIR")]
    log_file: Option<PathBuf>,

    /// Log level for the log file (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide feature, role and permission requirements for a principal
    Check {
        /// Principal as provider JSON, or @FILE
        #[arg(short, long, value_name = "JSON|@FILE")]
        principal: String,

        /// Required feature key (repeatable, all must be held)
        #[arg(short, long = "feature", value_name = "KEY")]
        features: Vec<String>,

        /// Accepted role (repeatable)
        #[arg(short, long = "role", value_name = "ROLE")]
        roles: Vec<String>,

        /// Permission code (repeatable)
        #[arg(long = "perm", value_name = "CODE")]
        perms: Vec<String>,

        /// Require every --perm instead of any
        #[arg(long)]
        all: bool,
    },

    /// Run a console path through its manifest guard
    Route {
        /// Principal as provider JSON, or @FILE
        #[arg(short, long, value_name = "JSON|@FILE")]
        principal: String,

        /// Console path, e.g. /crm/leads
        path: String,
    },

    /// Print the navigation menu a principal sees
    Menu {
        /// Principal as provider JSON, or @FILE
        #[arg(short, long, value_name = "JSON|@FILE")]
        principal: String,

        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Write .entitle/config.toml and a starter manifest
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

/// CLI-based configuration overrides.
///
/// Applied after the file and env layers, so flags always win.
struct CliOverrides {
    project_root: PathBuf,
    config_file: Option<PathBuf>,
    debug: bool,
    manifest: Option<PathBuf>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

impl CliOverrides {
    fn from_args(args: &Args) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_root = args.project.clone().unwrap_or_else(|| cwd.clone());

        Self {
            project_root,
            config_file: args.config.clone(),
            debug: args.debug,
            // Relative to where the user typed it, not the project root.
            manifest: args.manifest.as_ref().map(|p| absolutize(&cwd, p)),
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        }
    }

    fn load_config(&self) -> Result<EntitleConfig> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);
        if let Some(ref path) = self.config_file {
            loader = loader.with_global_config(path);
        }

        let mut config = loader.load()?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliOverrides {
    fn apply(&self, config: &mut EntitleConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(ref manifest) = self.manifest {
            config.manifest = Some(manifest.clone());
        }
        if let Some(ref dir) = self.log_file {
            config.logging.file = true;
            config.logging.file_path = Some(dir.clone());
        }
        if let Some(ref level) = self.log_level {
            config.logging.file_level.clone_from(level);
        }
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn init_tracing(verbose: bool, config: &EntitleConfig) {
    // Terminal: --debug > --verbose > RUST_LOG > logging.level
    let terminal_filter = if config.debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter);

    let file_layer = if config.logging.file {
        FileMakeWriter::open(&config.logging.resolved_file_path()).map(|writer| {
            fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(config.logging.file_filter_directive()))
        })
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();
}

fn emit(report: Report) -> ExitCode {
    print!("{}", report.text);
    report.verdict.exit_code()
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let overrides = CliOverrides::from_args(&args);
    let config = overrides.load_config()?;

    init_tracing(args.verbose, &config);
    info!(project = %overrides.project_root.display(), "entitle starting");

    let policy = DefaultPolicy;
    let root = overrides.project_root.as_path();

    let code = match args.command {
        Command::Check {
            principal,
            features,
            roles,
            perms,
            all,
        } => {
            let principal = commands::load_principal(&principal)?;
            let request = CheckRequest {
                features,
                roles,
                perms,
                match_policy: if all { MatchPolicy::All } else { MatchPolicy::Any },
            };
            emit(commands::check(&principal, &request, &policy))
        }
        Command::Route { principal, path } => {
            let principal = commands::load_principal(&principal)?;
            let manifest = commands::load_manifest(root, &config)?;
            emit(commands::route(principal, &manifest, &path, &config.guard).await?)
        }
        Command::Menu { principal, json } => {
            let principal = commands::load_principal(&principal)?;
            let manifest = commands::load_manifest(root, &config)?;
            emit(commands::menu(&principal, &manifest, &policy, json)?)
        }
        Command::Init { force } => {
            for path in commands::init(root, force)? {
                println!("wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
