/// Pixel formats a decoded frame may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PixelFormat {
    Nv12,
    Yuyv,
    Uyvy,
    Bgra32,
    Rgba32,
    Jpeg,
}

impl PixelFormat {
    /// Bytes per pixel for packed single-plane formats the surfaces can draw.
    ///
    /// Returns `None` for planar, chroma-subsampled or compressed formats.
    pub const fn packed_bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Bgra32 | Self::Rgba32 => Some(4),
            _ => None,
        }
    }

    /// Byte offsets of the red, green, blue and alpha channels within a pixel.
    pub(crate) const fn channel_offsets(self) -> [usize; 4] {
        match self {
            Self::Bgra32 => [2, 1, 0, 3],
            _ => [0, 1, 2, 3],
        }
    }
}

/// Pixel dimensions of a frame or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels, widened so it cannot overflow on 32-bit hosts.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
