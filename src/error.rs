use thiserror::Error;

use crate::types::{PixelFormat, Size};

/// Why a buffer cannot be shown by a surface.
///
/// A `display_frame` call that fails with this error leaves the surface in
/// the state it was in before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("pixel format {0:?} cannot be displayed")]
    UnsupportedPixelFormat(PixelFormat),
    #[error("unknown four-character pixel format code {0:#010x}")]
    UnknownFourcc(u32),
    #[error("frame has no pixels ({}x{})", .0.width, .0.height)]
    EmptyFrame(Size),
    #[error("expected {expected} plane(s), got {actual}")]
    PlaneCount { expected: usize, actual: usize },
    #[error("row stride of {bytes_per_row} bytes is too small for {width} pixels")]
    StrideTooSmall { bytes_per_row: usize, width: u32 },
    #[error("plane holds {actual} bytes but the frame needs {required}")]
    PlaneTooShort { actual: usize, required: usize },
    #[error("side-by-side alpha needs an even width, got {0}")]
    OddPackedWidth(u32),
    #[error("frame {}x{} exceeds the backend limit of {max} pixels per side", .size.width, .size.height)]
    TooLarge { size: Size, max: u32 },
}

#[cfg(feature = "std")]
pub use self::std_errors::*;

#[cfg(feature = "std")]
mod std_errors {
    use thiserror::Error;

    use super::FormatError;

    /// Platform-specific error details.
    #[derive(Debug, Error)]
    #[non_exhaustive]
    pub enum PlatformError {
        #[error("{0}")]
        Message(String),
        /// A Core Video call returned a non-success `CVReturn`.
        #[cfg(target_vendor = "apple")]
        #[error("core video returned {0}")]
        CvReturn(i32),
    }

    /// Top-level crate error.
    #[derive(Debug, Error)]
    #[non_exhaustive]
    pub enum Error {
        #[error("unsupported frame: {0}")]
        Format(#[from] FormatError),
        #[error("platform error: {0}")]
        Platform(#[from] PlatformError),
        #[cfg(feature = "gpu")]
        #[error("gpu error: {0}")]
        Gpu(String),
        #[error("invalid pointer")]
        InvalidPointer,
        #[error("invalid argument: {0}")]
        InvalidArgument(&'static str),
        #[error("panic")]
        Panic,
    }

    impl Error {
        /// Negative status code reported across the C ABI.
        pub fn code(&self) -> i32 {
            match self {
                Self::Format(_) => -1,
                Self::Platform(_) => -2,
                #[cfg(feature = "gpu")]
                Self::Gpu(_) => -3,
                Self::InvalidPointer => -4,
                Self::Panic => -5,
                Self::InvalidArgument(_) => -6,
            }
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}
