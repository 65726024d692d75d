use std::ptr::NonNull;

use arrayvec::ArrayVec;
use objc2_core_video::{
    CVPixelBuffer, CVPixelBufferGetBaseAddress, CVPixelBufferGetBaseAddressOfPlane,
    CVPixelBufferGetBytesPerRow, CVPixelBufferGetBytesPerRowOfPlane, CVPixelBufferGetHeight,
    CVPixelBufferGetHeightOfPlane, CVPixelBufferGetPixelFormatType, CVPixelBufferGetPlaneCount,
    CVPixelBufferGetWidth, CVPixelBufferLockBaseAddress, CVPixelBufferLockFlags,
    CVPixelBufferUnlockBaseAddress, kCVReturnSuccess,
};

use crate::buffer::{MAX_PLANES, PixelBuffer, Plane};
use crate::error::{Error, FormatError, PlatformError};
use crate::platform::apple::{fourcc_to_pixel_format, pixel_size};
use crate::types::{PixelFormat, Size};

/// A `CVPixelBuffer` whose base address is locked read-only.
///
/// The lock is released on drop, so plane data is only reachable while this
/// value is alive.
pub struct LockedPixelBuffer<'a> {
    pixel_buffer: &'a CVPixelBuffer,
    pixel_format: PixelFormat,
    size: Size,
    planes: ArrayVec<Plane<'a>, MAX_PLANES>,
}

impl<'a> LockedPixelBuffer<'a> {
    pub fn lock(pixel_buffer: &'a CVPixelBuffer) -> Result<Self, Error> {
        let fourcc = CVPixelBufferGetPixelFormatType(pixel_buffer);
        let pixel_format =
            fourcc_to_pixel_format(fourcc).ok_or(FormatError::UnknownFourcc(fourcc))?;
        let size = pixel_size(
            CVPixelBufferGetWidth(pixel_buffer),
            CVPixelBufferGetHeight(pixel_buffer),
        )?;

        let status =
            unsafe { CVPixelBufferLockBaseAddress(pixel_buffer, CVPixelBufferLockFlags::ReadOnly) };
        if status != kCVReturnSuccess {
            return Err(PlatformError::CvReturn(status).into());
        }

        // SAFETY: the base address stays locked until `self` is dropped.
        let planes = unsafe { locked_planes(pixel_buffer) };
        tracing::trace!(?pixel_format, planes = planes.len(), "pixel buffer locked");

        Ok(LockedPixelBuffer {
            pixel_buffer,
            pixel_format,
            size,
            planes,
        })
    }
}

/// Views of every plane; a packed buffer is treated as a single plane.
///
/// SAFETY: the pixel buffer base address must be locked for the lifetime 'a.
unsafe fn locked_planes(pixel_buffer: &CVPixelBuffer) -> ArrayVec<Plane<'_>, MAX_PLANES> {
    let planar_count = CVPixelBufferGetPlaneCount(pixel_buffer);
    let region = |i: usize| {
        if planar_count == 0 {
            (
                CVPixelBufferGetBaseAddress(pixel_buffer),
                CVPixelBufferGetBytesPerRow(pixel_buffer),
                CVPixelBufferGetHeight(pixel_buffer),
            )
        } else {
            (
                CVPixelBufferGetBaseAddressOfPlane(pixel_buffer, i),
                CVPixelBufferGetBytesPerRowOfPlane(pixel_buffer, i),
                CVPixelBufferGetHeightOfPlane(pixel_buffer, i),
            )
        }
    };

    (0..planar_count.clamp(1, MAX_PLANES))
        .map_while(|i| {
            let (base, bytes_per_row, rows) = region(i);
            let len = bytes_per_row.checked_mul(rows)?;
            // Core Video hands out null for planes that are not backed yet.
            let base = NonNull::new(base.cast::<u8>())?;
            // SAFETY: a locked region spans `rows` rows of `bytes_per_row`.
            let data = unsafe { std::slice::from_raw_parts(base.as_ptr().cast_const(), len) };
            Some(Plane {
                data,
                bytes_per_row,
            })
        })
        .collect()
}

impl Drop for LockedPixelBuffer<'_> {
    fn drop(&mut self) {
        self.planes.clear();
        unsafe {
            CVPixelBufferUnlockBaseAddress(self.pixel_buffer, CVPixelBufferLockFlags::ReadOnly);
        }
    }
}

impl PixelBuffer for LockedPixelBuffer<'_> {
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
