use ps_core::Error;

/// Validated sliding-window geometry for one source shape.
///
/// A plan exists only when at least one window fits: all dimensions nonzero,
/// `window >= 1`, `window <= height`, and `window <= width`. Origins are
/// enumerated row-major, so sample `r * origin_cols + c` reads the window
/// whose top-left corner is grid position `(r, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    height: usize,
    width: usize,
    window: usize,
    origin_rows: usize,
    origin_cols: usize,
}

impl WindowPlan {
    pub fn new(height: usize, width: usize, window: usize) -> Result<Self, Error> {
        if height == 0 || width == 0 {
            return Err(Error::InvalidDimensions {
                height,
                width,
                channels: 1,
            });
        }

        if window == 0 || window > height || window > width {
            return Err(Error::InvalidWindowSize {
                window,
                height,
                width,
            });
        }

        Ok(Self {
            height,
            width,
            window,
            origin_rows: height - window + 1,
            origin_cols: width - window + 1,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of valid origin rows, `height - window + 1`.
    pub fn origin_rows(&self) -> usize {
        self.origin_rows
    }

    /// Number of valid origin columns, `width - window + 1`.
    pub fn origin_cols(&self) -> usize {
        self.origin_cols
    }

    /// Number of samples one channel produces.
    pub fn count(&self) -> usize {
        self.origin_rows * self.origin_cols
    }

    /// Elements per sample, `window * window`.
    pub fn sample_area(&self) -> usize {
        self.window * self.window
    }

    /// Elements one channel writes, `count() * sample_area()`.
    pub fn output_len(&self) -> usize {
        self.count()
            .checked_mul(self.sample_area())
            .expect("output stack size overflow")
    }

    /// Sample index of the window anchored at origin `(r, c)`.
    #[inline]
    pub fn index(&self, r: usize, c: usize) -> usize {
        debug_assert!(r < self.origin_rows, "origin row out of range");
        debug_assert!(c < self.origin_cols, "origin column out of range");
        r * self.origin_cols + c
    }

    /// Origin `(r, c)` of the window stored at sample index `idx`.
    #[inline]
    pub fn origin(&self, idx: usize) -> (usize, usize) {
        debug_assert!(idx < self.count(), "sample index out of range");
        (idx / self.origin_cols, idx % self.origin_cols)
    }

    /// Iterates origins in storage order.
    pub fn origins(self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.origin_cols;
        (0..self.origin_rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::WindowPlan;
    use ps_core::Error;

    #[test]
    fn plan_geometry_for_4x4_window2() {
        let plan = WindowPlan::new(4, 4, 2).expect("valid plan");
        assert_eq!(plan.origin_rows(), 3);
        assert_eq!(plan.origin_cols(), 3);
        assert_eq!(plan.count(), 9);
        assert_eq!(plan.sample_area(), 4);
        assert_eq!(plan.output_len(), 36);
    }

    #[test]
    fn window_equal_to_grid_leaves_one_origin() {
        let plan = WindowPlan::new(3, 5, 3).expect("valid plan");
        assert_eq!(plan.origin_rows(), 1);
        assert_eq!(plan.origin_cols(), 3);
        assert_eq!(plan.count(), 3);
    }

    #[test]
    fn window_one_samples_every_element() {
        let plan = WindowPlan::new(4, 4, 1).expect("valid plan");
        assert_eq!(plan.count(), 16);
        assert_eq!(plan.sample_area(), 1);
        assert_eq!(plan.output_len(), 16);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let err = WindowPlan::new(4, 4, 5).expect_err("window must be rejected");
        assert_eq!(
            err,
            Error::InvalidWindowSize {
                window: 5,
                height: 4,
                width: 4
            }
        );
        assert_eq!(err.to_string(), "window size 5 does not fit a 4x4 grid");
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = WindowPlan::new(4, 4, 0).expect_err("window must be rejected");
        assert_eq!(
            err,
            Error::InvalidWindowSize {
                window: 0,
                height: 4,
                width: 4
            }
        );
    }

    #[test]
    fn window_must_fit_both_axes() {
        assert!(WindowPlan::new(2, 8, 3).is_err());
        assert!(WindowPlan::new(8, 2, 3).is_err());
        assert!(WindowPlan::new(8, 8, 3).is_ok());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = WindowPlan::new(0, 4, 1).expect_err("dimensions must be rejected");
        assert_eq!(
            err,
            Error::InvalidDimensions {
                height: 0,
                width: 4,
                channels: 1
            }
        );
        assert!(WindowPlan::new(4, 0, 1).is_err());
    }

    #[test]
    fn origin_and_index_are_inverse() {
        let plan = WindowPlan::new(5, 4, 2).expect("valid plan");
        for idx in 0..plan.count() {
            let (r, c) = plan.origin(idx);
            assert!(r < plan.origin_rows());
            assert!(c < plan.origin_cols());
            assert_eq!(plan.index(r, c), idx);
        }
    }

    #[test]
    fn origins_iterate_in_storage_order() {
        let plan = WindowPlan::new(3, 4, 2).expect("valid plan");
        let origins: Vec<(usize, usize)> = plan.origins().collect();
        assert_eq!(origins.len(), plan.count());
        assert_eq!(origins[0], (0, 0));
        assert_eq!(origins[1], (0, 1));
        assert_eq!(origins[3], (1, 0));
        assert_eq!(origins.last().copied(), Some((1, 2)));
    }
}
