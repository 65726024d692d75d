use arrayvec::ArrayVec;

use crate::error::FormatError;
use crate::layout::AlphaLayout;
use crate::types::{PixelFormat, Size};

/// Maximum number of planes a pixel buffer can carry (Y, U, V).
pub const MAX_PLANES: usize = 3;

/// A single plane of image data.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub bytes_per_row: usize,
}

/// A decoded frame owned by the caller.
///
/// Surfaces borrow a `PixelBuffer` only for the duration of a
/// `display_frame` call and copy or upload what they need before returning.
pub trait PixelBuffer {
    fn pixel_format(&self) -> PixelFormat;
    fn size(&self) -> Size;
    fn planes(&self) -> &[Plane<'_>];
}

/// A pixel buffer over caller-provided byte slices.
#[derive(Debug, Clone)]
pub struct BorrowedPixelBuffer<'a> {
    pixel_format: PixelFormat,
    size: Size,
    planes: ArrayVec<Plane<'a>, MAX_PLANES>,
}

impl<'a> BorrowedPixelBuffer<'a> {
    /// A single-plane buffer, e.g. BGRA or RGBA.
    pub fn packed(
        pixel_format: PixelFormat,
        size: Size,
        data: &'a [u8],
        bytes_per_row: usize,
    ) -> Self {
        let mut planes = ArrayVec::new();
        planes.push(Plane {
            data,
            bytes_per_row,
        });
        BorrowedPixelBuffer {
            pixel_format,
            size,
            planes,
        }
    }

    /// A buffer from up to [`MAX_PLANES`] planes; extra planes are ignored.
    pub fn planar(
        pixel_format: PixelFormat,
        size: Size,
        planes: impl IntoIterator<Item = Plane<'a>>,
    ) -> Self {
        BorrowedPixelBuffer {
            pixel_format,
            size,
            planes: planes.into_iter().take(MAX_PLANES).collect(),
        }
    }
}

impl PixelBuffer for BorrowedPixelBuffer<'_> {
    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn size(&self) -> Size {
        self.size
    }

    fn planes(&self) -> &[Plane<'_>] {
        &self.planes
    }
}

/// The validated shape of a buffer a surface is about to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub pixel_format: PixelFormat,
    /// Size of the whole buffer.
    pub source: Size,
    /// Size of the image on screen (half the width for side-by-side alpha).
    pub displayed: Size,
    pub bytes_per_row: usize,
    pub layout: AlphaLayout,
}

impl FrameGeometry {
    /// Check that `buffer` can be drawn with `layout`.
    ///
    /// Runs before a surface touches any state, so a rejected buffer never
    /// disturbs the frame currently shown.
    pub fn inspect<B>(buffer: &B, layout: AlphaLayout) -> Result<Self, FormatError>
    where
        B: PixelBuffer + ?Sized,
    {
        let pixel_format = buffer.pixel_format();
        let bytes_per_pixel = pixel_format
            .packed_bytes_per_pixel()
            .ok_or(FormatError::UnsupportedPixelFormat(pixel_format))?;

        let source = buffer.size();
        if source.is_empty() {
            return Err(FormatError::EmptyFrame(source));
        }

        let planes = buffer.planes();
        let [plane] = planes else {
            return Err(FormatError::PlaneCount {
                expected: 1,
                actual: planes.len(),
            });
        };

        let row_len = source.width as usize * bytes_per_pixel;
        if plane.bytes_per_row < row_len {
            return Err(FormatError::StrideTooSmall {
                bytes_per_row: plane.bytes_per_row,
                width: source.width,
            });
        }

        // The last row may be unpadded.
        let required = plane
            .bytes_per_row
            .saturating_mul(source.height as usize - 1)
            .saturating_add(row_len);
        if plane.data.len() < required {
            return Err(FormatError::PlaneTooShort {
                actual: plane.data.len(),
                required,
            });
        }

        if layout.is_side_by_side() && source.width % 2 != 0 {
            return Err(FormatError::OddPackedWidth(source.width));
        }

        Ok(FrameGeometry {
            pixel_format,
            source,
            displayed: layout.displayed_size(source),
            bytes_per_row: plane.bytes_per_row,
            layout,
        })
    }

    /// Straight-alpha RGBA of displayed pixel (`x`, `y`).
    ///
    /// `data` must be the plane this geometry was inspected from.
    pub(crate) fn sample(&self, data: &[u8], x: u32, y: u32) -> [u8; 4] {
        let [r, g, b, a] = self.pixel_format.channel_offsets();
        let (color_x, alpha_x) = self.layout.offsets(self.displayed.width);
        let row = y as usize * self.bytes_per_row;
        let color = row + (color_x + x) as usize * 4;
        let alpha = match self.layout {
            AlphaLayout::Embedded => data[color + a],
            // The mask is grey; its red channel carries the coverage.
            _ => data[row + (alpha_x + x) as usize * 4 + r],
        };
        [data[color + r], data[color + g], data[color + b], alpha]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(format: PixelFormat, width: u32, height: u32, data: &[u8]) -> BorrowedPixelBuffer<'_> {
        BorrowedPixelBuffer::packed(format, Size::new(width, height), data, width as usize * 4)
    }

    #[test]
    fn side_by_side_geometry() {
        let data = [0u8; 4 * 4 * 2];
        let buf = packed(PixelFormat::Bgra32, 4, 2, &data);
        let g = FrameGeometry::inspect(&buf, AlphaLayout::AlphaLeftColorRight).unwrap();
        assert_eq!(g.source, Size::new(4, 2));
        assert_eq!(g.displayed, Size::new(2, 2));
        assert_eq!(g.bytes_per_row, 16);
    }

    #[test]
    fn rejects_planar_formats() {
        let data = [0u8; 64];
        let buf = packed(PixelFormat::Nv12, 4, 4, &data);
        assert_eq!(
            FrameGeometry::inspect(&buf, AlphaLayout::Embedded),
            Err(FormatError::UnsupportedPixelFormat(PixelFormat::Nv12))
        );
    }

    #[test]
    fn rejects_empty_and_odd_frames() {
        let data = [0u8; 64];
        let buf = packed(PixelFormat::Rgba32, 0, 4, &data);
        assert_eq!(
            FrameGeometry::inspect(&buf, AlphaLayout::Embedded),
            Err(FormatError::EmptyFrame(Size::new(0, 4)))
        );

        let buf = packed(PixelFormat::Rgba32, 3, 1, &data);
        assert_eq!(
            FrameGeometry::inspect(&buf, AlphaLayout::AlphaLeftColorRight),
            Err(FormatError::OddPackedWidth(3))
        );
        assert!(FrameGeometry::inspect(&buf, AlphaLayout::Embedded).is_ok());
    }

    #[test]
    fn rejects_short_strides_and_planes() {
        let data = [0u8; 64];
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(4, 4), &data, 8);
        assert_eq!(
            FrameGeometry::inspect(&buf, AlphaLayout::Embedded),
            Err(FormatError::StrideTooSmall {
                bytes_per_row: 8,
                width: 4
            })
        );

        let buf = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(4, 4), &data[..60], 16);
        assert_eq!(
            FrameGeometry::inspect(&buf, AlphaLayout::Embedded),
            Err(FormatError::PlaneTooShort {
                actual: 60,
                required: 64
            })
        );
    }

    #[test]
    fn unpadded_last_row_is_accepted() {
        // Two rows of 2 pixels with a 12-byte stride: 12 + 8 bytes.
        let data = [0u8; 20];
        let buf = BorrowedPixelBuffer::packed(PixelFormat::Rgba32, Size::new(2, 2), &data, 12);
        assert!(FrameGeometry::inspect(&buf, AlphaLayout::Embedded).is_ok());
    }

    #[test]
    fn rejects_wrong_plane_count() {
        let y = [0u8; 16];
        let uv = [0u8; 8];
        let buf = BorrowedPixelBuffer::planar(
            PixelFormat::Rgba32,
            Size::new(2, 2),
            [
                Plane {
                    data: &y,
                    bytes_per_row: 8,
                },
                Plane {
                    data: &uv,
                    bytes_per_row: 8,
                },
            ],
        );
        assert_eq!(
            FrameGeometry::inspect(&buf, AlphaLayout::Embedded),
            Err(FormatError::PlaneCount {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn samples_mask_and_colour_halves() {
        // One row, BGRA: [mask=200 grey][colour b=10 g=20 r=30]
        let data = [200, 200, 200, 255, 10, 20, 30, 255];
        let buf = packed(PixelFormat::Bgra32, 2, 1, &data);
        let g = FrameGeometry::inspect(&buf, AlphaLayout::AlphaLeftColorRight).unwrap();
        assert_eq!(g.sample(&data, 0, 0), [30, 20, 10, 200]);

        let g = FrameGeometry::inspect(&buf, AlphaLayout::ColorLeftAlphaRight).unwrap();
        assert_eq!(g.sample(&data, 0, 0), [200, 200, 200, 30]);
    }

    #[test]
    fn samples_embedded_alpha() {
        let data = [1, 2, 3, 4];
        let buf = packed(PixelFormat::Rgba32, 1, 1, &data);
        let g = FrameGeometry::inspect(&buf, AlphaLayout::Embedded).unwrap();
        assert_eq!(g.sample(&data, 0, 0), [1, 2, 3, 4]);
    }
}
