//! C bindings for host UI code written in other languages.
//!
//! Every function returns zero (or a non-negative value) on success and a
//! negative [`Error::code`] on failure. A surface handle must only be used
//! from one thread at a time.

use std::ptr;

use crate::backend::SoftwareSurface;
use crate::buffer::BorrowedPixelBuffer;
use crate::config::SurfaceConfig;
use crate::error::{Error, Result};
use crate::layout::AlphaLayout;
use crate::surface::{DisplaySurface, Presentation};
use crate::tint::TintParams;
use crate::types::{PixelFormat, Size};

/// Opaque surface handle.
pub struct AlphaSurface {
    inner: SoftwareSurface,
}

fn return_code<F: FnOnce() -> Result<i32>>(f: F) -> i32 {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => e.code(),
        Err(_) => Error::Panic.code(),
    }
}

fn parse_layout(layout: u32) -> Result<AlphaLayout> {
    match layout {
        0 => Ok(AlphaLayout::AlphaLeftColorRight),
        1 => Ok(AlphaLayout::ColorLeftAlphaRight),
        2 => Ok(AlphaLayout::Embedded),
        _ => Err(Error::InvalidArgument("unknown alpha layout")),
    }
}

fn parse_format(format: u32) -> Result<PixelFormat> {
    match format {
        0 => Ok(PixelFormat::Bgra32),
        1 => Ok(PixelFormat::Rgba32),
        _ => Err(Error::InvalidArgument("unknown pixel format")),
    }
}

/// # Safety
///
/// The caller must ensure that surface is null or was returned by
/// [alpha_surface_new] and not yet freed.
unsafe fn parse_surface<'a>(surface: *mut AlphaSurface) -> Result<&'a mut AlphaSurface> {
    unsafe { surface.as_mut() }.ok_or(Error::InvalidPointer)
}

/// # Safety
///
/// The caller must ensure that data is valid for 'a.
unsafe fn parse_slice<'a>(data: *const u8, size: usize) -> Result<&'a [u8]> {
    if data.is_null() {
        if size == 0 {
            return Ok(&[]);
        }
        return Err(Error::InvalidPointer);
    }
    Ok(unsafe { std::slice::from_raw_parts(data, size) })
}

/// Create a surface drawing into a `width` x `height` canvas.
///
/// `layout`: 0 alpha left/colour right, 1 colour left/alpha right, 2 embedded
/// alpha. Returns null if the layout is unknown or the size exceeds the canvas
/// limit. Free with [alpha_surface_free].
#[unsafe(no_mangle)]
pub extern "C" fn alpha_surface_new(width: u32, height: u32, layout: u32) -> *mut AlphaSurface {
    let created = std::panic::catch_unwind(|| {
        let config = SurfaceConfig::default().with_layout(parse_layout(layout)?);
        let inner = SoftwareSurface::new(Size::new(width, height), config)?;
        Ok::<_, Error>(Box::new(AlphaSurface { inner }))
    });
    match created {
        Ok(Ok(surface)) => Box::into_raw(surface),
        Ok(Err(err)) => {
            tracing::warn!(%err, width, height, "failed to create surface");
            ptr::null_mut()
        }
        Err(_) => ptr::null_mut(),
    }
}

/// Destroy a surface. Null is ignored.
///
/// # Safety
/// - The caller must ensure that surface was returned by [alpha_surface_new]
///   and is not used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_free(surface: *mut AlphaSurface) {
    if !surface.is_null() {
        drop(unsafe { Box::from_raw(surface) });
    }
}

/// Show a decoded frame. The bytes are copied before this returns.
///
/// `format`: 0 BGRA, 1 RGBA. On failure the previous frame stays displayed.
///
/// # Safety
/// - The caller must ensure that surface is a live handle.
/// - The caller must ensure that data points to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_display_frame(
    surface: *mut AlphaSurface,
    data: *const u8,
    len: usize,
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: u32,
) -> i32 {
    return_code(move || {
        let surface = unsafe { parse_surface(surface) }?;
        let data = unsafe { parse_slice(data, len) }?;
        let format = parse_format(format)?;
        let buffer =
            BorrowedPixelBuffer::packed(format, Size::new(width, height), data, bytes_per_row);
        surface.inner.display_frame(&buffer)?;
        Ok(0)
    })
}

/// Remove the current frame; the next redraw is transparent.
///
/// # Safety
/// - The caller must ensure that surface is a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_clear(surface: *mut AlphaSurface) -> i32 {
    return_code(move || {
        unsafe { parse_surface(surface) }?.inner.clear();
        Ok(0)
    })
}

/// Enable the tint filter towards `hue` (0..1), or disable it.
///
/// # Safety
/// - The caller must ensure that surface is a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_set_tint(
    surface: *mut AlphaSurface,
    hue: f32,
    enabled: bool,
) -> i32 {
    return_code(move || {
        let surface = unsafe { parse_surface(surface) }?;
        let mut config = surface.inner.config().clone();
        config.tint = enabled.then(|| TintParams::with_hue(hue));
        surface.inner.set_config(config);
        Ok(0)
    })
}

/// Resize the canvas. An oversized view is rejected and the canvas kept.
///
/// # Safety
/// - The caller must ensure that surface is a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_resize(
    surface: *mut AlphaSurface,
    width: u32,
    height: u32,
) -> i32 {
    return_code(move || {
        unsafe { parse_surface(surface) }?
            .inner
            .resize(Size::new(width, height))?;
        Ok(0)
    })
}

/// Render the current state into the canvas.
///
/// Returns 0 if the canvas was cleared, 1 if a frame was drawn, 2 if it was
/// the first frame drawn since creation or the last clear.
///
/// # Safety
/// - The caller must ensure that surface is a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_redraw(surface: *mut AlphaSurface) -> i32 {
    return_code(move || {
        let code = match unsafe { parse_surface(surface) }?.inner.redraw() {
            Presentation::Cleared => 0,
            Presentation::Frame { first: false } => 1,
            Presentation::Frame { first: true } => 2,
        };
        Ok(code)
    })
}

/// Straight-alpha RGBA canvas, row-major without padding.
///
/// The pointer is valid until the next call on this surface. Returns null for
/// a null surface.
///
/// # Safety
/// - The caller must ensure that surface is a live handle.
/// - The caller must ensure that len is null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alpha_surface_pixels(
    surface: *const AlphaSurface,
    len: *mut usize,
) -> *const u8 {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return ptr::null();
    };
    let raw = surface.inner.canvas().as_raw();
    if let Some(len) = unsafe { len.as_mut() } {
        *len = raw.len();
    }
    raw.as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redraw_clear_through_the_c_abi() {
        let surface = alpha_surface_new(1, 1, 2);
        assert!(!surface.is_null());
        let frame = [10u8, 20, 30, 40];
        unsafe {
            assert_eq!(
                alpha_surface_display_frame(surface, frame.as_ptr(), 4, 1, 1, 4, 1),
                0
            );
            assert_eq!(alpha_surface_redraw(surface), 2);
            assert_eq!(alpha_surface_redraw(surface), 1);

            let mut len = 0;
            let pixels = alpha_surface_pixels(surface, &mut len);
            assert_eq!(std::slice::from_raw_parts(pixels, len), &frame);

            assert_eq!(alpha_surface_clear(surface), 0);
            assert_eq!(alpha_surface_redraw(surface), 0);
            let pixels = alpha_surface_pixels(surface, &mut len);
            assert_eq!(std::slice::from_raw_parts(pixels, len), &[0, 0, 0, 0]);

            alpha_surface_free(surface);
        }
    }

    #[test]
    fn bad_arguments_return_negative_codes() {
        assert!(alpha_surface_new(1, 1, 9).is_null());

        let surface = alpha_surface_new(2, 2, 0);
        let frame = [0u8; 12];
        unsafe {
            assert_eq!(
                alpha_surface_display_frame(ptr::null_mut(), frame.as_ptr(), 12, 1, 1, 4, 0),
                Error::InvalidPointer.code()
            );
            assert_eq!(
                alpha_surface_display_frame(surface, ptr::null(), 12, 1, 1, 4, 0),
                Error::InvalidPointer.code()
            );
            assert_eq!(
                alpha_surface_display_frame(surface, frame.as_ptr(), 12, 3, 1, 12, 0),
                -1
            );
            assert_eq!(
                alpha_surface_display_frame(surface, frame.as_ptr(), 12, 1, 1, 4, 7),
                Error::InvalidArgument("").code()
            );
            assert_eq!(alpha_surface_clear(ptr::null_mut()), Error::InvalidPointer.code());
            assert!(alpha_surface_pixels(ptr::null(), ptr::null_mut()).is_null());
            alpha_surface_free(surface);
        }
    }

    #[test]
    fn tint_can_be_toggled() {
        let surface = alpha_surface_new(1, 1, 2);
        unsafe {
            assert_eq!(alpha_surface_set_tint(surface, 0.3, true), 0);
            assert!((*surface).inner.config().tint.is_some());
            assert_eq!(alpha_surface_set_tint(surface, 0.0, false), 0);
            assert!((*surface).inner.config().tint.is_none());
            alpha_surface_free(surface);
        }
    }

    #[test]
    fn oversized_views_do_not_abort() {
        assert!(alpha_surface_new(u32::MAX, u32::MAX, 0).is_null());

        let surface = alpha_surface_new(2, 2, 0);
        assert!(!surface.is_null());
        unsafe {
            assert_eq!(
                alpha_surface_resize(surface, u32::MAX, u32::MAX),
                Error::InvalidArgument("").code()
            );
            let mut len = 0;
            alpha_surface_pixels(surface, &mut len);
            assert_eq!(len, 2 * 2 * 4);
            assert_eq!(alpha_surface_resize(surface, 3, 1), 0);
            alpha_surface_pixels(surface, &mut len);
            assert_eq!(len, 3 * 4);
            alpha_surface_free(surface);
        }
    }
}
