use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use forest_mesh::{BufferExport, TreeConfig};

/// Generate a procedural tree and write its mesh buffers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML tree configuration, the deciduous preset when omitted
    config: Option<PathBuf>,

    /// Write the mesh and instance buffers as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only keep the geometry visible at this growth
    #[arg(long)]
    growth: Option<f32>,

    /// Write the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<TreeConfig> {
    let Some(path) = path else {
        log::info!("no configuration given, using the deciduous preset");
        return Ok(TreeConfig::deciduous());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    TreeConfig::from_toml_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    if let Some(path) = &cli.dump_config {
        fs::write(path, toml::to_string_pretty(&config)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("configuration written to {}", path.display());
        return Ok(());
    }

    let tree = config.generate()?;
    log::info!(
        "{} nodes: bark {} vertices / {} triangles, leaves {} vertices / {} triangles",
        tree.skeleton.node_count(),
        tree.bark.vertex_count(),
        tree.bark.triangle_count(),
        tree.leaves.vertex_count(),
        tree.leaves.triangle_count()
    );

    let mut export = BufferExport::new(&tree, &config.instances);
    if let Some(growth) = cli.growth {
        export = export.gated(growth);
        log::info!(
            "gated at growth {growth}: {} bark / {} leaf triangles left",
            export.bark.triangle_count(),
            export.leaves.triangle_count()
        );
    }

    match &cli.output {
        Some(path) => {
            fs::write(path, export.to_json()?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("buffers written to {}", path.display());
        }
        None => println!(
            "nodes: {}\nbark: {} vertices, {} triangles\nleaves: {} vertices, {} triangles",
            export.node_count,
            export.bark.vertex_count(),
            export.bark.triangle_count(),
            export.leaves.vertex_count(),
            export.leaves.triangle_count()
        ),
    }
    Ok(())
}
