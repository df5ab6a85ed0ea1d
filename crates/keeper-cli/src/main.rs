//! Keeper - exclusion-aware package installer
//!
//! Usage:
//!   keeper path drupal/core --type drupal-core
//!   keeper install drupal/core --type drupal-core --version 8.0.0 --archive core.zip
//!   keeper update drupal/core --version 8.0.1 --archive core-8.0.1.zip
//!   keeper remove drupal/core
//!   keeper status
//!   keeper prune web --exclude sites/ --exclude modules/
//!   keeper merge build web --exclude sites/

mod reporter;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keeper_core::changes::{ChangeDetector, ManifestChangeDetector};
use keeper_core::config::{ConfigStore, InstallerConfig};
use keeper_core::exclusion::ExclusionSet;
use keeper_core::fs::LocalFs;
use keeper_core::installer::{
    InstallContext, InstallReport, InstallationOrchestrator, PackageInstaller,
};
use keeper_core::lockfile::{LockedPackage, LockfileStore};
use keeper_core::package::{Package, PackageIdentity, SourceRef};
use keeper_core::reconcile::{ReconcileReport, merge_except, prune_except};

use crate::reporter::ConsoleReporter;

#[derive(Parser)]
#[command(name = "keeper")]
#[command(about = "Install packages while preserving local sub-paths", long_about = None)]
struct Cli {
    /// Path to keeper.toml (default: discovered from the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved install path of a package
    Path {
        /// Full package name (vendor/name)
        name: String,
        /// Package type
        #[arg(long = "type")]
        package_type: String,
    },

    /// Install a package
    Install(InstallArgs),

    /// Update an installed package to another version
    Update(UpdateArgs),

    /// Remove an installed package
    #[command(alias = "rm")]
    Remove {
        /// Full package name (vendor/name)
        name: String,
    },

    /// Show installed packages and local changes
    Status {
        /// Only show this package
        name: Option<String>,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete everything under a directory except the excluded paths
    Prune {
        dir: PathBuf,
        /// Preserved relative path (repeatable)
        #[arg(long = "exclude", value_name = "PATH")]
        exclude: Vec<String>,
    },

    /// Copy one tree over another, skipping the excluded paths
    Merge {
        source: PathBuf,
        destination: PathBuf,
        /// Skipped relative path (repeatable)
        #[arg(long = "exclude", value_name = "PATH")]
        exclude: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Local directory to copy
    #[arg(long)]
    path: Option<PathBuf>,
    /// Git repository URL
    #[arg(long)]
    git: Option<String>,
    /// Zip archive
    #[arg(long)]
    archive: Option<PathBuf>,
}

#[derive(Args)]
struct InstallArgs {
    /// Full package name (vendor/name)
    name: String,
    /// Package type
    #[arg(long = "type")]
    package_type: String,
    /// Package version
    #[arg(long)]
    version: String,
    #[command(flatten)]
    source: SourceArgs,
    /// Branch, tag or commit to check out (with --git)
    #[arg(long = "ref", requires = "git")]
    reference: Option<String>,
}

#[derive(Args)]
struct UpdateArgs {
    /// Full package name (vendor/name)
    name: String,
    /// Target version
    #[arg(long)]
    version: String,
    #[command(flatten)]
    source: SourceArgs,
    /// Branch, tag or commit to check out (with --git)
    #[arg(long = "ref", requires = "git")]
    reference: Option<String>,
}

impl SourceArgs {
    fn into_source_ref(self, reference: Option<String>) -> Result<SourceRef> {
        match (self.path, self.git, self.archive) {
            (Some(path), None, None) => Ok(SourceRef::Path { path }),
            (None, Some(url), None) => Ok(SourceRef::Git { url, reference }),
            (None, None, Some(path)) => Ok(SourceRef::Archive { path }),
            _ => anyhow::bail!("Exactly one of --path, --git or --archive is required"),
        }
    }
}

/// Loaded project: root, configuration and install state location.
struct Project {
    root: PathBuf,
    config: InstallerConfig,
    lockfile: LockfileStore,
}

impl Project {
    fn load(cli_root: Option<PathBuf>, cli_config: Option<PathBuf>) -> Result<Self> {
        let root = match cli_root {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let store = match cli_config {
            Some(path) => ConfigStore::from_path(path, root.clone()),
            None => ConfigStore::discover(root.clone()),
        };
        let config = store.load().with_context(|| match store.config_path() {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Failed to load default config".to_string(),
        })?;
        let lockfile = LockfileStore::new(store.lockfile_path(&config));
        tracing::debug!(
            root = %root.display(),
            lockfile = %lockfile.path().display(),
            "project loaded"
        );
        Ok(Self {
            root,
            config,
            lockfile,
        })
    }

    fn orchestrator(&self) -> InstallationOrchestrator {
        let ctx = InstallContext::new(self.root.clone(), self.config.clone())
            .with_change_detector(Box::new(ManifestChangeDetector::new(self.lockfile.clone())))
            .with_reporter(Box::new(ConsoleReporter))
            .with_lockfile(self.lockfile.clone());
        InstallationOrchestrator::new(ctx)
    }

    fn locked(&self, name: &str) -> Result<LockedPackage> {
        self.lockfile
            .get(name)
            .with_context(|| format!("Failed to read {}", self.lockfile.path().display()))?
            .ok_or_else(|| anyhow::anyhow!("Package '{}' is not installed", name))
    }

    fn exclusions(&self, entries: Vec<String>) -> ExclusionSet {
        ExclusionSet::with_separator(entries, self.config.separator())
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keeper=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let project = Project::load(cli.root, cli.config)?;
    run(&project, cli.command)
}

fn run(project: &Project, command: Commands) -> Result<()> {
    match command {
        Commands::Path { name, package_type } => {
            let identity = PackageIdentity::new(name, package_type, "");
            println!("{}", project.config.install_path(&identity).display());
        }
        Commands::Install(args) => run_install(project, args)?,
        Commands::Update(args) => run_update(project, args)?,
        Commands::Remove { name } => run_remove(project, &name)?,
        Commands::Status { name, format } => run_status(project, name.as_deref(), format)?,
        Commands::Prune { dir, exclude } => {
            let dir = project.root.join(dir);
            let report = prune_except(&LocalFs::new(), &dir, &project.exclusions(exclude))
                .with_context(|| format!("Failed to prune {}", dir.display()))?;
            print_reconcile("Pruned", &dir, &report);
        }
        Commands::Merge {
            source,
            destination,
            exclude,
        } => {
            let source = project.root.join(source);
            let destination = project.root.join(destination);
            let report = merge_except(
                &LocalFs::new(),
                &source,
                &destination,
                &project.exclusions(exclude),
            )
            .with_context(|| {
                format!(
                    "Failed to merge {} into {}",
                    source.display(),
                    destination.display()
                )
            })?;
            print_reconcile("Merged into", &destination, &report);
        }
    }
    Ok(())
}

fn run_install(project: &Project, args: InstallArgs) -> Result<()> {
    let identity = PackageIdentity::new(args.name, args.package_type, args.version);
    let package = Package::new(identity, args.source.into_source_ref(args.reference)?);

    let report = project
        .orchestrator()
        .install(&package)
        .with_context(|| format!("Failed to install {}", package.identity))?;
    print_install_result("Installed", &package, &report);
    Ok(())
}

fn run_update(project: &Project, args: UpdateArgs) -> Result<()> {
    let locked = project.locked(&args.name)?;
    let initial = locked
        .package()
        .ok_or_else(|| anyhow::anyhow!("No source recorded for '{}'", args.name))?;
    let target = Package::new(
        PackageIdentity::new(&locked.name, &locked.package_type, args.version),
        args.source.into_source_ref(args.reference)?,
    );

    let report = project
        .orchestrator()
        .update(&initial, &target)
        .with_context(|| format!("Failed to update {}", target.identity))?;
    print_install_result("Updated", &target, &report);
    Ok(())
}

fn run_remove(project: &Project, name: &str) -> Result<()> {
    let locked = project.locked(name)?;
    let package = match locked.package() {
        Some(package) => package,
        // Removal never downloads, so any source will do.
        None => Package::new(
            locked.identity(),
            SourceRef::Path {
                path: PathBuf::new(),
            },
        ),
    };

    let report = project
        .orchestrator()
        .remove(&package)
        .with_context(|| format!("Failed to remove {}", package.identity))?;
    print_install_result("Removed", &package, &report);
    Ok(())
}

fn run_status(project: &Project, name: Option<&str>, format: OutputFormat) -> Result<()> {
    let lockfile = project
        .lockfile
        .load()
        .with_context(|| format!("Failed to read {}", project.lockfile.path().display()))?;
    let detector = ManifestChangeDetector::new(project.lockfile.clone());

    let mut rows = Vec::new();
    for locked in lockfile.packages.values() {
        if name.is_some_and(|n| n != locked.name) {
            continue;
        }
        let identity = locked.identity();
        let path = project.root.join(&locked.install_path);
        let changes = detector
            .detect_local_changes(&identity, &path)
            .with_context(|| format!("Failed to check {} for local changes", locked.name))?;
        rows.push((locked, changes));
    }

    if let Some(name) = name
        && rows.is_empty()
    {
        anyhow::bail!("Package '{}' is not installed", name);
    }

    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No packages installed");
            }
            for (locked, changes) in &rows {
                let marker = if changes.is_empty() {
                    style("✓").green()
                } else {
                    style("⚠").yellow()
                };
                println!(
                    "{} {} ({}) -> {}",
                    marker,
                    locked.name,
                    locked.version,
                    locked.install_path.display()
                );
                for change in changes {
                    println!("    {}", style(change).yellow());
                }
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = rows
                .iter()
                .map(|(locked, changes)| {
                    serde_json::json!({
                        "name": locked.name,
                        "type": locked.package_type,
                        "version": locked.version,
                        "install_path": locked.install_path,
                        "exclusions": locked.exclusions,
                        "changes": changes
                            .iter()
                            .map(|c| serde_json::json!({ "path": c.path, "kind": c.kind.as_str() }))
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_install_result(action: &str, package: &Package, report: &InstallReport) {
    println!(
        "{} {} {} ({})",
        style("✓").green(),
        action,
        package.full_name(),
        package.version()
    );
    println!("  Path: {}", report.install_path.display());
    if let Some(pruned) = &report.pruned
        && !pruned.preserved.is_empty()
    {
        println!("  Preserved: {}", pruned.preserved.join(", "));
    }
    for warning in &report.warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }
}

fn print_reconcile(action: &str, path: &Path, report: &ReconcileReport) {
    println!("{} {} {}", style("✓").green(), action, path.display());
    println!(
        "  {} deleted, {} copied, {} preserved",
        report.deleted.len(),
        report.copied.len(),
        report.preserved.len()
    );
}
