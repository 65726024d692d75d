//! Core Video pixel buffers on macOS and iOS.

pub mod buffer;
pub mod ext;

pub use buffer::LockedPixelBuffer;
pub use ext::DisplayPixelBufferExt;

use crate::error::FormatError;
use crate::types::{PixelFormat, Size};

/// Core Video dimensions as a [`Size`], rejecting sides that do not fit `u32`.
pub(crate) fn pixel_size(width: usize, height: usize) -> Result<Size, FormatError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok(Size::new(width, height)),
        _ => Err(FormatError::TooLarge {
            size: Size::new(
                width.try_into().unwrap_or(u32::MAX),
                height.try_into().unwrap_or(u32::MAX),
            ),
            max: u32::MAX,
        }),
    }
}

pub(crate) fn fourcc_to_pixel_format(fourcc: u32) -> Option<PixelFormat> {
    // kCVPixelFormatType values
    #[allow(clippy::mistyped_literal_suffixes)]
    match fourcc {
        0x34_32_30_76 => Some(PixelFormat::Nv12),   // '420v'
        0x34_32_30_66 => Some(PixelFormat::Nv12),   // '420f'
        0x79_75_76_73 => Some(PixelFormat::Yuyv),   // 'yuvs'
        0x32_76_75_79 => Some(PixelFormat::Uyvy),   // '2vuy'
        0x42_47_52_41 => Some(PixelFormat::Bgra32), // 'BGRA'
        0x52_47_42_41 => Some(PixelFormat::Rgba32), // 'RGBA'
        0x6A_70_65_67 => Some(PixelFormat::Jpeg),   // 'jpeg'
        _ => None,
    }
}
