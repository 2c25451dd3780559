use ps_core::{Error, GridView, PatchStack};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::{Execution, SampleConfig};
use crate::plan::WindowPlan;

/// Extracts every valid `window x window` patch of `src` into a new stack.
///
/// Samples are ordered by origin, row-major: the patch anchored at `(r, c)`
/// lands at sample index `r * (width - window + 1) + c`.
pub fn sample2d<T>(
    src: &GridView<'_, T>,
    window: usize,
    cfg: &SampleConfig,
) -> Result<PatchStack<T>, Error>
where
    T: Copy + Default + Send + Sync,
{
    let plan = WindowPlan::new(src.height(), src.width(), window)?;
    let mut stack = PatchStack::new_fill(plan.count(), window, T::default());
    run2d(src, &plan, cfg, stack.data_mut());
    Ok(stack)
}

/// Like [`sample2d`] but writes into a caller-owned buffer whose length must
/// equal the plan's `output_len()`. On error the buffer is left untouched.
pub fn sample2d_into<T>(
    src: &GridView<'_, T>,
    window: usize,
    cfg: &SampleConfig,
    out: &mut [T],
) -> Result<(), Error>
where
    T: Copy + Send + Sync,
{
    let plan = WindowPlan::new(src.height(), src.width(), window)?;
    if out.len() != plan.output_len() {
        return Err(Error::SizeMismatch {
            expected: plan.output_len(),
            actual: out.len(),
        });
    }

    run2d(src, &plan, cfg, out);
    Ok(())
}

fn run2d<T>(src: &GridView<'_, T>, plan: &WindowPlan, cfg: &SampleConfig, out: &mut [T])
where
    T: Copy + Send + Sync,
{
    debug_assert_eq!(out.len(), plan.output_len());
    let row_block = plan.origin_cols() * plan.sample_area();

    match cfg.execution {
        Execution::Sequential => {
            for (r, block) in out.chunks_mut(row_block).enumerate() {
                fill_origin_row(src.data(), plan, r, block, cfg.strict_checks);
            }
        }
        #[cfg(feature = "rayon")]
        Execution::WorkerPool => {
            out.par_chunks_mut(row_block)
                .enumerate()
                .for_each(|(r, block)| {
                    fill_origin_row(src.data(), plan, r, block, cfg.strict_checks);
                });
        }
    }
}

/// Fills all samples whose origin lies in row `r`. `block` holds exactly
/// `origin_cols * window * window` elements.
fn fill_origin_row<T: Copy>(src: &[T], plan: &WindowPlan, r: usize, block: &mut [T], strict: bool) {
    debug_assert_eq!(src.len(), plan.height() * plan.width());
    debug_assert_eq!(block.len(), plan.origin_cols() * plan.sample_area());

    if strict {
        fill_origin_row_checked(src, plan.width(), plan.window(), plan.origin_cols(), r, block);
    } else {
        fill_origin_row_raw(src, plan.width(), plan.window(), plan.origin_cols(), r, block);
    }
}

fn fill_origin_row_checked<T: Copy>(
    src: &[T],
    width: usize,
    window: usize,
    origin_cols: usize,
    r: usize,
    block: &mut [T],
) {
    let area = window * window;
    for c in 0..origin_cols {
        let sample = &mut block[c * area..(c + 1) * area];
        for wr in 0..window {
            let start = (r + wr) * width + c;
            sample[wr * window..(wr + 1) * window].copy_from_slice(&src[start..start + window]);
        }
    }
}

fn fill_origin_row_raw<T: Copy>(
    src: &[T],
    width: usize,
    window: usize,
    origin_cols: usize,
    r: usize,
    block: &mut [T],
) {
    let src_ptr = src.as_ptr();
    let mut dst = block.as_mut_ptr();
    // SAFETY:
    // - The plan guarantees `r + window <= height` and `c + window <= width`
    //   for every origin column, so each copied run starts at
    //   `(r + wr) * width + c` and its `window` elements stay inside `src`
    //   (`src.len() == height * width`).
    // - `block` holds exactly `origin_cols * window * window` elements and
    //   `dst` advances by `window` for each of `origin_cols * window` runs.
    // - `src` and `block` are distinct allocations, so the copied ranges
    //   never overlap.
    unsafe {
        for c in 0..origin_cols {
            for wr in 0..window {
                let run = src_ptr.add((r + wr) * width + c);
                core::ptr::copy_nonoverlapping(run, dst, window);
                dst = dst.add(window);
            }
        }
    }
}
