use crate::Error;

/// Owned single-channel grid in dense row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    height: usize,
    width: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    pub fn from_vec(height: usize, width: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = height.checked_mul(width).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn as_view(&self) -> GridView<'_, T> {
        GridView {
            height: self.height,
            width: self.width,
            data: &self.data,
        }
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_fill(height: usize, width: usize, value: T) -> Self {
        let len = height.checked_mul(width).expect("grid size overflow");
        Self {
            height,
            width,
            data: vec![value; len],
        }
    }
}

/// Borrowed single-channel grid. Rows are tightly packed, so the element at
/// `(r, c)` lives at index `r * width + c`.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a, T> {
    height: usize,
    width: usize,
    data: &'a [T],
}

impl<'a, T> GridView<'a, T> {
    pub fn from_slice(height: usize, width: usize, data: &'a [T]) -> Result<Self, Error> {
        let expected = height.checked_mul(width).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn row(&self, r: usize) -> &'a [T] {
        assert!(r < self.height, "row index out of bounds");
        let start = r * self.width;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, r: usize, c: usize) -> Option<&'a T> {
        if r >= self.height || c >= self.width {
            return None;
        }
        self.data.get(r * self.width + c)
    }
}

/// Owned multi-channel grid in dense row-major order with interleaved
/// channels: the element at `(r, c, ch)` lives at `(r * width + c) * channels + ch`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGrid<T> {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<T>,
}

impl<T> ChannelGrid<T> {
    pub fn from_vec(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<T>,
    ) -> Result<Self, Error> {
        let expected = height
            .checked_mul(width)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(Error::SizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn as_view(&self) -> ChannelGridView<'_, T> {
        ChannelGridView {
            height: self.height,
            width: self.width,
            channels: self.channels,
            data: &self.data,
        }
    }
}

impl<T: Clone> ChannelGrid<T> {
    pub fn new_fill(height: usize, width: usize, channels: usize, value: T) -> Self {
        let len = height
            .checked_mul(width)
            .and_then(|v| v.checked_mul(channels))
            .expect("grid size overflow");
        Self {
            height,
            width,
            channels,
            data: vec![value; len],
        }
    }
}

/// Borrowed multi-channel grid with interleaved channels.
#[derive(Debug, Clone, Copy)]
pub struct ChannelGridView<'a, T> {
    height: usize,
    width: usize,
    channels: usize,
    data: &'a [T],
}

impl<'a, T> ChannelGridView<'a, T> {
    pub fn from_slice(
        height: usize,
        width: usize,
        channels: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        let expected = height
            .checked_mul(width)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(Error::SizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Returns the interleaved row `r` (`width * channels` elements).
    pub fn row(&self, r: usize) -> &'a [T] {
        assert!(r < self.height, "row index out of bounds");
        let stride = self.width * self.channels;
        let start = r * stride;
        &self.data[start..start + stride]
    }

    /// Returns the channel values of the pixel at `(r, c)`.
    pub fn pixel(&self, r: usize, c: usize) -> &'a [T] {
        assert!(r < self.height, "row index out of bounds");
        assert!(c < self.width, "column index out of bounds");
        let start = (r * self.width + c) * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn get(&self, r: usize, c: usize, ch: usize) -> Option<&'a T> {
        if r >= self.height || c >= self.width || ch >= self.channels {
            return None;
        }
        self.data.get((r * self.width + c) * self.channels + ch)
    }
}

impl<'a, T: Copy> ChannelGridView<'a, T> {
    /// Gathers one channel into a dense single-channel grid.
    pub fn channel_plane(&self, ch: usize) -> Grid<T> {
        assert!(ch < self.channels, "channel index out of bounds");
        let mut plane = Vec::with_capacity(self.height * self.width);
        for px in self.data.chunks_exact(self.channels) {
            plane.push(px[ch]);
        }

        Grid {
            height: self.height,
            width: self.width,
            data: plane,
        }
    }
}

pub fn to_f32(grid: &GridView<'_, u8>) -> Grid<f32> {
    Grid {
        height: grid.height(),
        width: grid.width(),
        data: grid.data().iter().map(|&px| px as f32).collect(),
    }
}

pub fn to_f32_interleaved(grid: &ChannelGridView<'_, u8>) -> ChannelGrid<f32> {
    ChannelGrid {
        height: grid.height(),
        width: grid.width(),
        channels: grid.channels(),
        data: grid.data().iter().map(|&px| px as f32).collect(),
    }
}
