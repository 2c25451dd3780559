//! Example: patch extraction throughput on a synthetic grid.
//!
//! Synthesizes a deterministic grid, extracts every valid window with each
//! execution variant, and cross-checks the variants against the first run.
//! Per-variant timing is printed to stdout; a JSON summary is written next
//! to the working directory.
//!
//! Run from the workspace root:
//!   cargo run -p patch-sampler --example extract -- --help
//!   cargo run -p patch-sampler --example extract -- --height 480 --width 640

use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use patch_sampler::{
    ChannelGrid, Execution, Grid, SampleConfig, WindowPlan, sample2d_into, sample3d_into,
};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Extract sliding-window patches from a synthetic grid")]
struct Args {
    /// Grid height in rows
    #[arg(long, default_value_t = 120)]
    height: usize,

    /// Grid width in columns
    #[arg(long, default_value_t = 160)]
    width: usize,

    /// Channel count (1 runs the planar kernel)
    #[arg(long, default_value_t = 3)]
    channels: usize,

    /// Window side length
    #[arg(long, default_value_t = 8)]
    window: usize,

    /// Output JSON path
    #[arg(long, default_value = "extract_results.json")]
    out: String,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunDto {
    label: &'static str,
    strict_checks: bool,
    worker_pool: bool,
    /// Wall-clock time for this variant, in milliseconds.
    elapsed_ms: f64,
    matches_baseline: bool,
}

#[derive(Serialize)]
struct SummaryDto {
    height: usize,
    width: usize,
    channels: usize,
    window: usize,
    origin_rows: usize,
    origin_cols: usize,
    samples_per_channel: usize,
    total_samples: usize,
    sample_area: usize,
    checksum: f64,
    runs: Vec<RunDto>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn variants() -> Vec<(&'static str, SampleConfig)> {
    let mut v = vec![
        ("sequential/strict", SampleConfig::default()),
        ("sequential/relaxed", SampleConfig::relaxed()),
    ];
    #[cfg(feature = "rayon")]
    {
        v.push((
            "worker-pool/strict",
            SampleConfig {
                execution: Execution::WorkerPool,
                ..SampleConfig::default()
            },
        ));
        v.push((
            "worker-pool/relaxed",
            SampleConfig {
                strict_checks: false,
                execution: Execution::WorkerPool,
            },
        ));
    }
    v
}

fn fill_ramp(data: &mut [f32]) {
    for (i, v) in data.iter_mut().enumerate() {
        *v = (i % 251) as f32;
    }
}

fn is_worker_pool(cfg: &SampleConfig) -> bool {
    cfg.execution != Execution::Sequential
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    if args.channels == 0 {
        bail!("channels must be > 0");
    }

    let plan = WindowPlan::new(args.height, args.width, args.window)
        .context("planning the origin grid")?;
    let total_len = args.channels * plan.output_len();

    println!(
        "grid {}x{}x{}, window {}: {} origins per channel, {} samples total",
        args.height,
        args.width,
        args.channels,
        args.window,
        plan.count(),
        args.channels * plan.count()
    );

    let mut out = vec![0.0f32; total_len];
    let mut baseline: Option<Vec<f32>> = None;
    let mut runs: Vec<RunDto> = Vec::new();

    if args.channels == 1 {
        let mut grid = Grid::new_fill(args.height, args.width, 0.0f32);
        fill_ramp(grid.data_mut());
        let view = grid.as_view();

        for (label, cfg) in variants() {
            let t0 = Instant::now();
            sample2d_into(&view, args.window, &cfg, &mut out).context("extracting patches")?;
            let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;
            record_run(label, &cfg, elapsed_ms, &out, &mut baseline, &mut runs);
        }
    } else {
        let mut grid = ChannelGrid::new_fill(args.height, args.width, args.channels, 0.0f32);
        fill_ramp(grid.data_mut());
        let view = grid.as_view();

        for (label, cfg) in variants() {
            let t0 = Instant::now();
            sample3d_into(&view, args.window, &cfg, &mut out).context("extracting patches")?;
            let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;
            record_run(label, &cfg, elapsed_ms, &out, &mut baseline, &mut runs);
        }
    }

    let checksum: f64 = baseline
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|&v| v as f64)
        .sum();
    println!("checksum {checksum:.1}");

    let summary = SummaryDto {
        height: args.height,
        width: args.width,
        channels: args.channels,
        window: args.window,
        origin_rows: plan.origin_rows(),
        origin_cols: plan.origin_cols(),
        samples_per_channel: plan.count(),
        total_samples: args.channels * plan.count(),
        sample_area: plan.sample_area(),
        checksum,
        runs,
    };

    let out_file =
        std::fs::File::create(&args.out).with_context(|| format!("creating {}", args.out))?;
    serde_json::to_writer_pretty(out_file, &summary)
        .with_context(|| format!("writing JSON to {}", args.out))?;

    println!("summary written to {}", args.out);
    Ok(())
}

fn record_run(
    label: &'static str,
    cfg: &SampleConfig,
    elapsed_ms: f64,
    out: &[f32],
    baseline: &mut Option<Vec<f32>>,
    runs: &mut Vec<RunDto>,
) {
    let matches_baseline = match baseline {
        Some(base) => base.as_slice() == out,
        None => {
            *baseline = Some(out.to_vec());
            true
        }
    };

    println!("  {label}: {elapsed_ms:.2} ms (matches baseline: {matches_baseline})");
    runs.push(RunDto {
        label,
        strict_checks: cfg.strict_checks,
        worker_pool: is_worker_pool(cfg),
        elapsed_ms,
        matches_baseline,
    });
}
