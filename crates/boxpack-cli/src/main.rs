use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use boxpack_core::{BoxSpec, PackStats, Packer, Placement};
use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "boxpack",
    about = "Pack rectangles into a fixed-size container",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack boxes from a dataset and report placements
    Pack(PackArgs),
    /// Simple timing bench (packs a random workload once, prints time + fullness)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// JSON dataset: an array of {"id": "name", "w": 50, "h": 100} entries
    #[arg(long, help_heading = "Input/Output")]
    input: Option<PathBuf>,
    /// Inline box size WxH, repeatable (e.g. --box 50x100 --box 30x40)
    #[arg(long = "box", value_name = "WxH", help_heading = "Input/Output")]
    boxes: Vec<String>,
    /// Write the report to this file instead of stdout
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"], help_heading = "Input/Output")]
    format: String,

    // Layout
    /// Container width
    #[arg(long, default_value_t = 1024.0, help_heading = "Layout")]
    width: f64,
    /// Container height
    #[arg(long, default_value_t = 1024.0, help_heading = "Layout")]
    height: f64,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Container width
    #[arg(long, default_value_t = 1024.0)]
    width: f64,
    /// Container height
    #[arg(long, default_value_t = 1024.0)]
    height: f64,
    /// Number of random boxes
    #[arg(long, default_value_t = 200)]
    count: usize,
    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Minimum side length
    #[arg(long, default_value_t = 8.0)]
    min_side: f64,
    /// Maximum side length
    #[arg(long, default_value_t = 96.0)]
    max_side: f64,
}

#[derive(Debug, Error)]
enum DatasetError {
    #[error("read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid box size '{0}', expected WxH (e.g. 50x100)")]
    BadSize(String),
    #[error("no boxes to pack; pass --input or --box")]
    Empty,
}

/// One requested box in the JSON dataset.
#[derive(Debug, Deserialize)]
struct BoxDef {
    #[serde(default)]
    id: Option<String>,
    w: f64,
    h: f64,
}

#[derive(Serialize)]
struct Report {
    container_width: f64,
    container_height: f64,
    stats: PackStats,
    placed: Vec<Placement<String>>,
    unplaced: Vec<BoxSpec<String>>,
    rejected: Vec<BoxSpec<String>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args),
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_pack(cli: &PackArgs) -> anyhow::Result<()> {
    let mut packer: Packer<String> = Packer::new(cli.width, cli.height);

    if let Some(path) = &cli.input {
        for (i, def) in load_dataset(path)?.into_iter().enumerate() {
            let id = def.id.unwrap_or_else(|| format!("item{}", i));
            packer.add_box(def.w, def.h, id);
        }
    }
    for (i, size) in cli.boxes.iter().enumerate() {
        let (w, h) = parse_size(size)?;
        packer.add_box(w, h, format!("box{}", i));
    }
    if packer.pending_count() == 0 {
        return Err(DatasetError::Empty.into());
    }

    info!(boxes = packer.pending_count(), "packing");
    packer.pack();
    let stats = packer.stats();

    let rendered = match cli.format.as_str() {
        "json" => {
            let report = Report {
                container_width: packer.container_width(),
                container_height: packer.container_height(),
                stats,
                placed: packer.placed().to_vec(),
                unplaced: packer.unplaced().to_vec(),
                rejected: packer.rejected().to_vec(),
            };
            serde_json::to_string_pretty(&report)?
        }
        _ => render_text(&packer, &stats),
    };

    match &cli.out {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn render_text(packer: &Packer<String>, stats: &PackStats) -> String {
    let mut out = String::new();
    for p in packer.placed() {
        out.push_str(&format!(
            "{:<12} at {},{} size {}x{}{}\n",
            p.key,
            p.rect.left,
            p.rect.top,
            p.rect.width,
            p.rect.height,
            if p.rotated { " (rotated)" } else { "" },
        ));
    }
    for spec in packer.unplaced() {
        out.push_str(&format!(
            "{:<12} unplaced, size {}x{}\n",
            spec.key, spec.width, spec.height
        ));
    }
    for spec in packer.rejected() {
        out.push_str(&format!(
            "{:<12} rejected, size {}x{}\n",
            spec.key, spec.width, spec.height
        ));
    }
    out.push_str(&stats.summary());
    out
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    use std::time::Instant;
    use rand::{Rng, SeedableRng};
    // Minimal bench: seeded workload; pack once and print time + fullness
    let mut rng = rand::rngs::StdRng::seed_from_u64(b.seed);
    let mut packer: Packer<String> = Packer::new(b.width, b.height);
    for i in 0..b.count {
        let w = rng.gen_range(b.min_side..=b.max_side);
        let h = rng.gen_range(b.min_side..=b.max_side);
        packer.add_box(w, h, format!("r{}", i));
    }
    let start = Instant::now();
    packer.pack();
    let dur = start.elapsed();
    let stats = packer.stats();
    println!(
        "boxes={} placed={} unplaced={} fullness={:.2}% time={}",
        b.count,
        stats.placed,
        stats.unplaced,
        stats.fullness * 100.0,
        bench_fmt_dur(dur)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn load_dataset(path: &Path) -> Result<Vec<BoxDef>, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_size(size: &str) -> Result<(f64, f64), DatasetError> {
    let bad = || DatasetError::BadSize(size.to_string());
    let (w, h) = size.split_once(['x', 'X']).ok_or_else(bad)?;
    let w: f64 = w.trim().parse().map_err(|_| bad())?;
    let h: f64 = h.trim().parse().map_err(|_| bad())?;
    Ok((w, h))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_accepts_floats_and_whitespace() {
        assert_eq!(parse_size("50x100").unwrap(), (50.0, 100.0));
        assert_eq!(parse_size("12.5X40").unwrap(), (12.5, 40.0));
        assert_eq!(parse_size(" 8 x 9 ").unwrap(), (8.0, 9.0));
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("50").is_err());
        assert!(parse_size("x100").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn dataset_ids_are_optional() {
        let defs: Vec<BoxDef> =
            serde_json::from_str(r#"[{"id": "a", "w": 50, "h": 100}, {"w": 30, "h": 40}]"#)
                .unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].id.as_deref(), Some("a"));
        assert!(defs[1].id.is_none());
        assert_eq!((defs[1].w, defs[1].h), (30.0, 40.0));
    }
}
