//! Command line inspector for saved TileInk documents.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tileink_core::vector::loops_to_svg_path_data;
use tileink_core::{ConfigError, DesignStore, FileStorage, FillConfig, StorageError, TileFrame, TileShape};

#[derive(Parser)]
#[command(name = "tileink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect fills of saved TileInk documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Source {
    /// Saved document (JSON)
    file: PathBuf,

    /// Only process designs for this tile shape
    #[arg(long, value_parser = parse_shape)]
    shape: Option<TileShape>,

    /// Tile side length in local pixels
    #[arg(long, default_value_t = 240.0)]
    side: f64,

    /// Engine tunables (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print boundary ids, mask statistics and loop counts for every fill
    Report(Source),

    /// Print SVG path data for every fill
    Paths(Source),
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Failed to read config {path}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },
    #[error("Invalid config {path}: {source}")]
    ConfigParse { path: PathBuf, source: ConfigError },
    #[error("Tile side must be positive, got {0}")]
    Side(f64),
}

fn parse_shape(name: &str) -> Result<TileShape, String> {
    TileShape::from_name(name).ok_or_else(|| format!("unknown tile shape '{name}'"))
}

fn load_config(path: Option<&PathBuf>) -> Result<FillConfig, CliError> {
    let Some(path) = path else {
        return Ok(FillConfig::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    FillConfig::from_json(&json).map_err(|source| CliError::ConfigParse {
        path: path.clone(),
        source,
    })
}

fn load(source: &Source) -> Result<DesignStore, CliError> {
    if source.side.is_nan() || source.side <= 0.0 {
        return Err(CliError::Side(source.side));
    }
    let config = load_config(source.config.as_ref())?;
    let document = FileStorage::read_path(&source.file)?;
    log::info!("loaded {} design(s) from {}", document.designs.len(), source.file.display());
    Ok(document.into_store(config))
}

/// Designs selected by `--shape`, as (index, shape).
fn selected(store: &DesignStore, shape: Option<TileShape>) -> Vec<(usize, TileShape)> {
    store
        .designs()
        .iter()
        .enumerate()
        .filter(|(_, d)| shape.is_none_or(|s| s == d.shape))
        .map(|(i, d)| (i, d.shape))
        .collect()
}

fn report(source: &Source) -> Result<(), CliError> {
    let mut store = load(source)?;
    for (d, shape) in selected(&store, source.shape) {
        let tile = TileFrame::new(shape, source.side);
        let design = &store.designs()[d];
        println!("design {d} ({shape}): {} ink, {} fill(s)", design.ink.len(), design.fills.len());

        let fills: Vec<_> = design.fills.iter().map(|f| (f.id, f.seed)).collect();
        for (n, (id, seed)) in fills.into_iter().enumerate() {
            let Some(data) = store.render_fill(d, &tile, id) else {
                println!("  fill {n} at ({:.4}, {:.4}): invalid seed", seed.x, seed.y);
                continue;
            };
            let loops = store.vectorize_fill(d, &tile, id);
            let fill = store.designs()[d].get_fill(id);
            let boundary = fill.and_then(|f| f.boundary_ink_ids.clone()).unwrap_or_default();
            println!(
                "  fill {n} at ({:.4}, {:.4}): boundary {boundary:?}, tile edge {}, closed by ink {}, area {:.1}, signature {}, {} loop(s)",
                seed.x,
                seed.y,
                data.uses_tile_boundary,
                data.closed_by_ink,
                data.mask_area_local(),
                data.signature,
                loops.len()
            );
        }
    }
    Ok(())
}

fn paths(source: &Source) -> Result<(), CliError> {
    let mut store = load(source)?;
    for (d, shape) in selected(&store, source.shape) {
        let tile = TileFrame::new(shape, source.side);
        let ids: Vec<_> = store.designs()[d].fills.iter().map(|f| f.id).collect();
        for (n, id) in ids.into_iter().enumerate() {
            let loops = store.vectorize_fill(d, &tile, id);
            if loops.is_empty() {
                log::warn!("design {d} fill {n} produced no loops");
                continue;
            }
            println!("{shape}\t{d}\t{n}\t{}", loops_to_svg_path_data(&loops));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Report(source) => report(source),
        Commands::Paths(source) => paths(source),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
