use ps_core::{ChannelGridView, Error, PatchStack};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::{Execution, SampleConfig};
use crate::plan::WindowPlan;

/// Extracts every valid `window x window` patch of every channel of `src`
/// into a new stack.
///
/// The source is channel-interleaved; the stack is channel-major: all samples
/// of channel 0 first, then channel 1, and so on. Within one channel block,
/// samples are ordered by origin, row-major, so the patch of channel `ch`
/// anchored at `(r, c)` lands at sample index
/// `ch * count + r * (width - window + 1) + c`. Each sample holds a single
/// channel.
pub fn sample3d<T>(
    src: &ChannelGridView<'_, T>,
    window: usize,
    cfg: &SampleConfig,
) -> Result<PatchStack<T>, Error>
where
    T: Copy + Default + Send + Sync,
{
    let plan = plan3d(src.height(), src.width(), src.channels(), window)?;
    let count = src.channels() * plan.count();
    let mut stack = PatchStack::new_fill(count, window, T::default());
    run3d(src, &plan, cfg, stack.data_mut());
    Ok(stack)
}

/// Like [`sample3d`] but writes into a caller-owned buffer whose length must
/// equal `channels * output_len()`. On error the buffer is left untouched.
pub fn sample3d_into<T>(
    src: &ChannelGridView<'_, T>,
    window: usize,
    cfg: &SampleConfig,
    out: &mut [T],
) -> Result<(), Error>
where
    T: Copy + Send + Sync,
{
    let plan = plan3d(src.height(), src.width(), src.channels(), window)?;
    let expected = src
        .channels()
        .checked_mul(plan.output_len())
        .expect("output stack size overflow");
    if out.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: out.len(),
        });
    }

    run3d(src, &plan, cfg, out);
    Ok(())
}

/// Validates the channel axis before delegating to the planar plan, so a
/// zero-channel source reports its own channel count.
fn plan3d(
    height: usize,
    width: usize,
    channels: usize,
    window: usize,
) -> Result<WindowPlan, Error> {
    if height == 0 || width == 0 || channels == 0 {
        return Err(Error::InvalidDimensions {
            height,
            width,
            channels,
        });
    }
    WindowPlan::new(height, width, window)
}

fn run3d<T>(src: &ChannelGridView<'_, T>, plan: &WindowPlan, cfg: &SampleConfig, out: &mut [T])
where
    T: Copy + Send + Sync,
{
    debug_assert_eq!(out.len(), src.channels() * plan.output_len());
    let row_block = plan.origin_cols() * plan.sample_area();
    let rows = plan.origin_rows();

    match cfg.execution {
        Execution::Sequential => {
            for (i, block) in out.chunks_mut(row_block).enumerate() {
                fill_channel_row(src, plan, i / rows, i % rows, block, cfg.strict_checks);
            }
        }
        #[cfg(feature = "rayon")]
        Execution::WorkerPool => {
            out.par_chunks_mut(row_block)
                .enumerate()
                .for_each(|(i, block)| {
                    fill_channel_row(src, plan, i / rows, i % rows, block, cfg.strict_checks);
                });
        }
    }
}

/// Fills all samples of channel `ch` whose origin lies in row `r`. `block`
/// holds exactly `origin_cols * window * window` elements.
fn fill_channel_row<T: Copy>(
    src: &ChannelGridView<'_, T>,
    plan: &WindowPlan,
    ch: usize,
    r: usize,
    block: &mut [T],
    strict: bool,
) {
    debug_assert!(ch < src.channels());
    debug_assert!(r < plan.origin_rows());
    debug_assert_eq!(block.len(), plan.origin_cols() * plan.sample_area());

    if strict {
        fill_channel_row_checked(
            src.data(),
            plan.width(),
            src.channels(),
            plan.window(),
            plan.origin_cols(),
            ch,
            r,
            block,
        );
    } else {
        fill_channel_row_raw(
            src.data(),
            plan.width(),
            src.channels(),
            plan.window(),
            plan.origin_cols(),
            ch,
            r,
            block,
        );
    }
}

fn fill_channel_row_checked<T: Copy>(
    src: &[T],
    width: usize,
    channels: usize,
    window: usize,
    origin_cols: usize,
    ch: usize,
    r: usize,
    block: &mut [T],
) {
    let area = window * window;
    for c in 0..origin_cols {
        let sample = &mut block[c * area..(c + 1) * area];
        for wr in 0..window {
            let row_base = ((r + wr) * width + c) * channels + ch;
            for (wc, out) in sample[wr * window..(wr + 1) * window]
                .iter_mut()
                .enumerate()
            {
                *out = src[row_base + wc * channels];
            }
        }
    }
}

fn fill_channel_row_raw<T: Copy>(
    src: &[T],
    width: usize,
    channels: usize,
    window: usize,
    origin_cols: usize,
    ch: usize,
    r: usize,
    block: &mut [T],
) {
    let src_ptr = src.as_ptr();
    let mut dst = block.as_mut_ptr();
    // SAFETY:
    // - The plan guarantees `r + window <= height` and `c + window <= width`
    //   for every origin column, so the deepest read offset
    //   `((r + wr) * width + c + wc) * channels + ch` is at most
    //   `(height * width - 1) * channels + channels - 1`, the last element of
    //   `src` (`src.len() == height * width * channels`).
    // - `block` holds exactly `origin_cols * window * window` elements and
    //   `dst` advances once per written element.
    // - `src` and `block` are distinct allocations.
    unsafe {
        for c in 0..origin_cols {
            for wr in 0..window {
                let row_base = src_ptr.add(((r + wr) * width + c) * channels + ch);
                for wc in 0..window {
                    *dst = *row_base.add(wc * channels);
                    dst = dst.add(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ps_core::{ChannelGrid, Error, Grid};

    use crate::config::SampleConfig;
    #[cfg(feature = "rayon")]
    use crate::config::Execution;
    use crate::plan::WindowPlan;
    use crate::sample2d::sample2d;
    use crate::sample3d::{sample3d, sample3d_into};

    fn rgb_4x4() -> ChannelGrid<f32> {
        ChannelGrid::from_vec(
            4,
            4,
            3,
            vec![
                1.0, 2.0, 3.0, 5.0, 6.0, 7.0, 4.0, 5.0, 6.0, 6.0, 4.0, 5.0, //
                4.0, 6.0, 3.0, 5.0, 8.0, 7.0, 6.0, 3.0, 6.0, 5.0, 8.0, 5.0, //
                3.0, 7.0, 3.0, 4.0, 5.0, 7.0, 5.0, 2.0, 5.0, 4.0, 5.0, 5.0, //
                2.0, 8.0, 3.0, 3.0, 2.0, 7.0, 1.0, 2.0, 6.0, 3.0, 1.0, 5.0, //
            ],
        )
        .expect("valid grid")
    }

    #[test]
    fn window2_on_rgb_4x4_known_values() {
        let src = rgb_4x4();
        let stack = sample3d(&src.as_view(), 2, &SampleConfig::default()).expect("valid run");

        // 9 origins per channel, 3 channel blocks.
        assert_eq!(stack.count(), 27);
        assert_eq!(stack.window(), 2);
        assert_eq!(stack.sample(0), Some(&[1.0, 5.0, 4.0, 5.0][..]));
        assert_eq!(stack.sample(8), Some(&[5.0, 4.0, 1.0, 3.0][..]));
        assert_eq!(stack.sample(9), Some(&[2.0, 6.0, 6.0, 8.0][..]));
        assert_eq!(stack.sample(13), Some(&[8.0, 3.0, 5.0, 2.0][..]));
        assert_eq!(stack.sample(26), Some(&[5.0, 5.0, 6.0, 5.0][..]));
        assert_eq!(stack.sample(27), None);
    }

    #[test]
    fn channel_blocks_match_planar_sampling() {
        let src = rgb_4x4();
        let view = src.as_view();
        let stack = sample3d(&view, 2, &SampleConfig::default()).expect("valid run");

        let block_len = 9 * 4;
        for ch in 0..3 {
            let plane = view.channel_plane(ch);
            let planar = sample2d(&plane.as_view(), 2, &SampleConfig::default()).expect("valid run");
            assert_eq!(
                &stack.data()[ch * block_len..(ch + 1) * block_len],
                planar.data()
            );
        }
    }

    #[test]
    fn window_equal_to_grid_copies_each_plane() {
        let src = rgb_4x4();
        let view = src.as_view();
        let stack = sample3d(&view, 4, &SampleConfig::default()).expect("valid run");

        assert_eq!(stack.count(), 3);
        for ch in 0..3 {
            let plane = view.channel_plane(ch);
            assert_eq!(stack.sample(ch), Some(plane.data()));
        }
    }

    #[test]
    fn window_one_rasterizes_each_plane() {
        let src = rgb_4x4();
        let view = src.as_view();
        let stack = sample3d(&view, 1, &SampleConfig::default()).expect("valid run");

        assert_eq!(stack.count(), 48);
        let plane = view.channel_plane(2);
        assert_eq!(&stack.data()[2 * 16..3 * 16], plane.data());
    }

    #[test]
    fn every_window_size_matches_interleaved_gather() {
        let src = rgb_4x4();
        let view = src.as_view();

        for window in 1..=4 {
            let plan = WindowPlan::new(4, 4, window).expect("valid plan");
            for cfg in [SampleConfig::default(), SampleConfig::relaxed()] {
                let stack = sample3d(&view, window, &cfg).expect("valid run");
                assert_eq!(stack.count(), 3 * plan.count());

                for ch in 0..3 {
                    for (i, (r, c)) in plan.origins().enumerate() {
                        let sample = stack
                            .sample(ch * plan.count() + i)
                            .expect("sample in range");
                        for wr in 0..window {
                            for wc in 0..window {
                                let expected =
                                    view.get(r + wr, c + wc, ch).expect("source in range");
                                assert_eq!(sample[wr * window + wc], *expected);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn single_channel_matches_sample2d() {
        let data: Vec<f32> = (1..=16).map(|v| v as f32).collect();
        let planar = Grid::from_vec(4, 4, data.clone()).expect("valid grid");
        let interleaved = ChannelGrid::from_vec(4, 4, 1, data).expect("valid grid");

        let planar_stack =
            sample2d(&planar.as_view(), 2, &SampleConfig::default()).expect("valid run");
        let stack = sample3d(&interleaved.as_view(), 2, &SampleConfig::default())
            .expect("valid run");
        assert_eq!(stack.data(), planar_stack.data());
    }

    #[test]
    fn relaxed_and_pooled_runs_match_strict_sequential() {
        let mut data = Vec::with_capacity(6 * 5 * 4);
        for i in 0..(6 * 5 * 4) {
            data.push((i % 13) as f32);
        }
        let src = ChannelGrid::from_vec(6, 5, 4, data).expect("valid grid");
        let view = src.as_view();

        let strict = sample3d(&view, 3, &SampleConfig::default()).expect("valid run");
        let relaxed = sample3d(&view, 3, &SampleConfig::relaxed()).expect("valid run");
        assert_eq!(strict, relaxed);

        #[cfg(feature = "rayon")]
        {
            let pooled = sample3d(
                &view,
                3,
                &SampleConfig {
                    execution: Execution::WorkerPool,
                    ..SampleConfig::default()
                },
            )
            .expect("valid run");
            assert_eq!(strict, pooled);
        }
    }

    #[test]
    fn zero_channels_are_rejected() {
        let src = ChannelGrid::from_vec(4, 4, 0, Vec::<f32>::new()).expect("valid grid");
        let err = sample3d(&src.as_view(), 2, &SampleConfig::default())
            .expect_err("channels must be rejected");
        assert_eq!(
            err,
            Error::InvalidDimensions {
                height: 4,
                width: 4,
                channels: 0
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid grid dimensions: 4x4x0, every axis must be nonzero"
        );
    }

    #[test]
    fn into_rejects_wrong_output_length() {
        let src = rgb_4x4();
        let mut out = vec![7.0f32; 107];
        let err = sample3d_into(&src.as_view(), 2, &SampleConfig::default(), &mut out)
            .expect_err("length must be rejected");

        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 108,
                actual: 107
            }
        );
        assert!(out.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn into_matches_allocating_variant() {
        let src = rgb_4x4();
        let stack = sample3d(&src.as_view(), 3, &SampleConfig::default()).expect("valid run");

        let mut out = vec![0.0f32; stack.data().len()];
        sample3d_into(&src.as_view(), 3, &SampleConfig::default(), &mut out).expect("valid run");
        assert_eq!(out.as_slice(), stack.data());
    }
}
