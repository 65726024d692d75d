//! Adapters from platform image types to [`PixelBuffer`](crate::buffer::PixelBuffer).

#[cfg(target_vendor = "apple")]
pub mod apple;
