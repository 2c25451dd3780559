use core::fmt;

/// Error type shared by the grid containers and the sampling kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A grid dimension (height, width, or channel count) is zero.
    InvalidDimensions {
        height: usize,
        width: usize,
        channels: usize,
    },
    /// The window is zero-sized or larger than the grid along some axis.
    InvalidWindowSize {
        window: usize,
        height: usize,
        width: usize,
    },
    /// A buffer length does not match the length implied by the shape.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions {
                height,
                width,
                channels,
            } => {
                write!(
                    f,
                    "invalid grid dimensions: {height}x{width}x{channels}, every axis must be nonzero"
                )
            }
            Self::InvalidWindowSize {
                window,
                height,
                width,
            } => {
                write!(
                    f,
                    "window size {window} does not fit a {height}x{width} grid"
                )
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for Error {}
