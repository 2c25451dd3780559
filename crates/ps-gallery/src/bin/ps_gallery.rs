use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use ps_core::{
    ChannelGrid, ChannelGridView, Grid, GridView, PatchStack, to_f32, to_f32_interleaved,
};
use ps_sample::{Execution, SampleConfig, WindowPlan, sample2d, sample3d};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ps_gallery")]
#[command(about = "Run patch extraction on image fixtures and dump the results")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "sample2d")]
    Sample2d(SampleArgs),
    #[command(name = "sample3d")]
    Sample3d(SampleArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct SampleArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Window side length.
    #[arg(long, default_value_t = 8)]
    window: usize,
    /// Skip the inner bounds checks.
    #[arg(long, default_value_t = false)]
    relaxed: bool,
    /// Fill the stack on the rayon worker pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// Patches to render as PNG previews (per channel for sample3d).
    #[arg(long, default_value_t = 8)]
    dump: usize,
    /// Samples to re-read from the source and compare against the stack.
    #[arg(long, default_value_t = 16)]
    verify: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSample {
    case: &'static str,
    input: String,
    height: usize,
    width: usize,
    channels: usize,
    window: usize,
    origin_rows: usize,
    origin_cols: usize,
    samples_per_channel: usize,
    total_samples: usize,
    sample_area: usize,
    output_len: usize,
    strict_checks: bool,
    worker_pool: bool,
    elapsed_ms: f64,
    verified: usize,
    dumped: usize,
    stack_dtype: &'static str,
    stack_layout: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Sample2d(args) => run_sample2d(args),
        Command::Sample3d(args) => run_sample3d(args),
    }
}

fn run_sample2d(args: SampleArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "sample2d")?;
    let grid = load_gray_f32(&args.common.input)?;
    let view = grid.as_view();

    let plan = WindowPlan::new(grid.height(), grid.width(), args.window)
        .context("planning the origin grid")?;
    let cfg = sample_config(&args);

    let t0 = Instant::now();
    let stack = sample2d(&view, args.window, &cfg).context("extracting patches")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    println!(
        "sample2d {}x{} window {}: {} samples in {elapsed_ms:.2} ms",
        grid.height(),
        grid.width(),
        args.window,
        stack.count()
    );

    let verified = verify_sample2d(&view, &plan, &stack, args.verify)?;
    let dumped = dump_patches_2d(&case_dir, &stack, args.dump)?;
    write_stack_bin(case_dir.join("stack.bin"), &stack)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaSample {
            case: "sample2d",
            input: args.common.input.display().to_string(),
            height: grid.height(),
            width: grid.width(),
            channels: 1,
            window: args.window,
            origin_rows: plan.origin_rows(),
            origin_cols: plan.origin_cols(),
            samples_per_channel: plan.count(),
            total_samples: stack.count(),
            sample_area: stack.sample_area(),
            output_len: stack.data().len(),
            strict_checks: cfg.strict_checks,
            worker_pool: args.parallel,
            elapsed_ms,
            verified,
            dumped,
            stack_dtype: "f32le",
            stack_layout: "sample,row,col",
        },
    )?;

    Ok(())
}

fn run_sample3d(args: SampleArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "sample3d")?;
    let grid = load_rgb_f32(&args.common.input)?;
    let view = grid.as_view();

    let plan = WindowPlan::new(grid.height(), grid.width(), args.window)
        .context("planning the origin grid")?;
    let cfg = sample_config(&args);

    let t0 = Instant::now();
    let stack = sample3d(&view, args.window, &cfg).context("extracting patches")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    println!(
        "sample3d {}x{}x{} window {}: {} samples in {elapsed_ms:.2} ms",
        grid.height(),
        grid.width(),
        grid.channels(),
        args.window,
        stack.count()
    );

    let verified = verify_sample3d(&view, &plan, &stack, args.verify)?;
    let dumped = dump_patches_3d(&case_dir, &stack, args.dump, grid.channels())?;
    write_stack_bin(case_dir.join("stack.bin"), &stack)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaSample {
            case: "sample3d",
            input: args.common.input.display().to_string(),
            height: grid.height(),
            width: grid.width(),
            channels: grid.channels(),
            window: args.window,
            origin_rows: plan.origin_rows(),
            origin_cols: plan.origin_cols(),
            samples_per_channel: plan.count(),
            total_samples: stack.count(),
            sample_area: stack.sample_area(),
            output_len: stack.data().len(),
            strict_checks: cfg.strict_checks,
            worker_pool: args.parallel,
            elapsed_ms,
            verified,
            dumped,
            stack_dtype: "f32le",
            stack_layout: "channel,sample,row,col",
        },
    )?;

    Ok(())
}

fn sample_config(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        strict_checks: !args.relaxed,
        execution: if args.parallel {
            Execution::WorkerPool
        } else {
            Execution::Sequential
        },
    }
}

fn prepare_case(common: &CommonArgs, case_name: &str) -> Result<PathBuf> {
    ensure_file_exists(&common.input, "input")?;

    let case_dir = common.out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;

    fs::copy(&common.input, case_dir.join("input.png")).with_context(|| {
        format!(
            "copying input {} -> {}",
            common.input.display(),
            case_dir.join("input.png").display()
        )
    })?;

    Ok(case_dir)
}

fn load_gray_f32(path: &Path) -> Result<Grid<f32>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    let grid = Grid::from_vec(h as usize, w as usize, data)
        .with_context(|| format!("constructing grid from {}", path.display()))?;
    Ok(to_f32(&grid.as_view()))
}

fn load_rgb_f32(path: &Path) -> Result<ChannelGrid<f32>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let rgb = dyn_img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let data = rgb.into_raw();

    let grid = ChannelGrid::from_vec(h as usize, w as usize, 3, data)
        .with_context(|| format!("constructing grid from {}", path.display()))?;
    Ok(to_f32_interleaved(&grid.as_view()))
}

fn verify_sample2d(
    src: &GridView<'_, f32>,
    plan: &WindowPlan,
    stack: &PatchStack<f32>,
    requested: usize,
) -> Result<usize> {
    let window = plan.window();
    let picks = spread_indices(stack.count(), requested);

    for &idx in &picks {
        let (r, c) = plan.origin(idx);
        let sample = stack
            .sample(idx)
            .context("sample index out of range during verification")?;
        for wr in 0..window {
            let row = &src.row(r + wr)[c..c + window];
            if row != &sample[wr * window..(wr + 1) * window] {
                bail!("sample {idx} (origin {r},{c}) does not match the source window");
            }
        }
    }

    Ok(picks.len())
}

fn verify_sample3d(
    src: &ChannelGridView<'_, f32>,
    plan: &WindowPlan,
    stack: &PatchStack<f32>,
    requested: usize,
) -> Result<usize> {
    let window = plan.window();
    let block = plan.count();
    let picks = spread_indices(stack.count(), requested);

    for &idx in &picks {
        let ch = idx / block;
        let (r, c) = plan.origin(idx % block);
        let sample = stack
            .sample(idx)
            .context("sample index out of range during verification")?;
        for wr in 0..window {
            for wc in 0..window {
                let expected = src
                    .get(r + wr, c + wc, ch)
                    .context("source index out of range during verification")?;
                if sample[wr * window + wc] != *expected {
                    bail!(
                        "sample {idx} (channel {ch}, origin {r},{c}) does not match the source window"
                    );
                }
            }
        }
    }

    Ok(picks.len())
}

/// Evenly spaced sample indices, at most `requested` of them.
fn spread_indices(total: usize, requested: usize) -> Vec<usize> {
    if total == 0 || requested == 0 {
        return Vec::new();
    }
    let take = requested.min(total);
    let step = total / take;
    (0..take).map(|i| i * step).collect()
}

fn dump_patches_2d(case_dir: &Path, stack: &PatchStack<f32>, requested: usize) -> Result<usize> {
    let n = requested.min(stack.count());
    for idx in 0..n {
        let sample = stack
            .sample(idx)
            .context("sample index out of range during dump")?;
        save_patch_png(
            case_dir.join(format!("patch_{idx:04}.png")),
            stack.window(),
            normalize_to_u8(sample),
        )?;
    }
    Ok(n)
}

fn dump_patches_3d(
    case_dir: &Path,
    stack: &PatchStack<f32>,
    per_channel: usize,
    channels: usize,
) -> Result<usize> {
    let block = stack.count() / channels;
    let n = per_channel.min(block);
    let mut dumped = 0;

    for ch in 0..channels {
        for i in 0..n {
            let sample = stack
                .sample(ch * block + i)
                .context("sample index out of range during dump")?;
            save_patch_png(
                case_dir.join(format!("patch_c{ch}_{i:04}.png")),
                stack.window(),
                normalize_to_u8(sample),
            )?;
            dumped += 1;
        }
    }

    Ok(dumped)
}

fn save_patch_png(path: PathBuf, window: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(window as u32, window as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn normalize_to_u8(data: &[f32]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut min_v = f32::INFINITY;
    let mut max_v = f32::NEG_INFINITY;
    for &v in data {
        if v < min_v {
            min_v = v;
        }
        if v > max_v {
            max_v = v;
        }
    }

    if (max_v - min_v).abs() < 1e-12 {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max_v - min_v);
    data.iter()
        .map(|&v| ((v - min_v) * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn write_stack_bin(path: PathBuf, stack: &PatchStack<f32>) -> Result<()> {
    let mut file = io::BufWriter::new(
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?,
    );
    for &v in stack.data() {
        file.write_all(&v.to_le_bytes())
            .with_context(|| format!("writing stack bytes to {}", path.display()))?;
    }
    file.flush()
        .with_context(|| format!("flushing {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
