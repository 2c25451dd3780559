/// Packed stack of square patches.
///
/// Sample `i` occupies the contiguous range `[i * window * window, (i + 1) *
/// window * window)`. Within a sample, elements are row-major over the window.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchStack<T> {
    count: usize,
    window: usize,
    data: Vec<T>,
}

impl<T> PatchStack<T> {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn sample_area(&self) -> usize {
        self.window * self.window
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn sample(&self, idx: usize) -> Option<&[T]> {
        if idx >= self.count {
            return None;
        }
        let area = self.sample_area();
        let start = idx * area;
        self.data.get(start..start + area)
    }

    pub fn samples(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.sample_area())
    }
}

impl<T: Clone> PatchStack<T> {
    pub fn new_fill(count: usize, window: usize, value: T) -> Self {
        assert!(window >= 1, "window must be at least 1");
        let len = count
            .checked_mul(window)
            .and_then(|v| v.checked_mul(window))
            .expect("patch stack size overflow");
        Self {
            count,
            window,
            data: vec![value; len],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PatchStack;

    #[test]
    fn new_fill_builds_packed_layout() {
        let stack = PatchStack::new_fill(3, 2, 0.0f32);
        assert_eq!(stack.count(), 3);
        assert_eq!(stack.window(), 2);
        assert_eq!(stack.sample_area(), 4);
        assert_eq!(stack.data().len(), 12);
    }

    #[test]
    fn sample_slices_by_index() {
        let mut stack = PatchStack::new_fill(2, 2, 0.0f32);
        for (i, v) in stack.data_mut().iter_mut().enumerate() {
            *v = i as f32;
        }

        assert_eq!(stack.sample(0), Some(&[0.0, 1.0, 2.0, 3.0][..]));
        assert_eq!(stack.sample(1), Some(&[4.0, 5.0, 6.0, 7.0][..]));
        assert_eq!(stack.sample(2), None);
    }

    #[test]
    fn samples_iterates_in_order() {
        let mut stack = PatchStack::new_fill(3, 1, 0.0f32);
        stack.data_mut().copy_from_slice(&[5.0, 6.0, 7.0]);

        let collected: Vec<&[f32]> = stack.samples().collect();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0], &[5.0]);
        assert_eq!(collected[2], &[7.0]);
    }

    #[test]
    fn empty_stack_has_no_samples() {
        let stack = PatchStack::new_fill(0, 4, 0u8);
        assert_eq!(stack.data().len(), 0);
        assert_eq!(stack.sample(0), None);
        assert_eq!(stack.samples().count(), 0);
    }
}
