//! Map Migrator entry point
//!
//! Loads a map document, runs the migration engine over it and writes the
//! result back.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use map_migrator::persistence::{load_map, save_map};
use map_migrator::{ChainPolicy, MapMigrator, MigrationSettings, ObjectKind};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Input .json map document
    input: PathBuf,
    /// Output path (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Settings file (.json)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Override the running format version
    #[arg(long)]
    game_version: Option<String>,
    /// Override the cell size in pixels
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..))]
    cell_size: Option<i32>,
    /// Batch matching policy: exact or cumulative
    #[arg(long)]
    policy: Option<ChainPolicy>,
    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn settings(&self) -> MigrationSettings {
        let mut settings = match &self.settings {
            Some(path) => MigrationSettings::load(path),
            None => MigrationSettings::default(),
        };
        if let Some(version) = &self.game_version {
            settings.current_version = version.clone();
        }
        if let Some(cell_size) = self.cell_size {
            settings.cell_size = cell_size;
        }
        if let Some(policy) = self.policy {
            settings.chain_policy = policy;
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let migrator = MapMigrator::new(cli.settings());
    let settings = migrator.settings();
    log::info!(
        "Map Migrator starting (format {}, cell size {}, {} policy)",
        settings.current_version,
        settings.cell_size,
        settings.chain_policy.as_str()
    );

    let mut map = load_map(&cli.input)
        .with_context(|| format!("Reading {}", cli.input.display()))?;
    let report = migrator.check_migration(&mut map);
    print!("{}", report);
    for kind in ObjectKind::ALL {
        log::info!("{} {} object(s) on '{}'", map.object_count(kind), kind, map.name);
    }

    if cli.dry_run {
        log::info!("Dry run, nothing written");
        return Ok(());
    }
    if !report.changed() && cli.output.is_none() {
        log::info!("Map '{}' already up to date", map.name);
        return Ok(());
    }

    let output = cli.output.as_ref().unwrap_or(&cli.input);
    save_map(&map, output).with_context(|| format!("Writing {}", output.display()))?;
    println!(
        "{} objects created, {} refreshed, {} tiles moved",
        report.objects_created(),
        report.objects_refreshed(),
        report.tiles_moved()
    );
    Ok(())
}
