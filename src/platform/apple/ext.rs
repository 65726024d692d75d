use objc2_core_video::CVPixelBuffer;

use crate::error::Error;
use crate::platform::apple::buffer::LockedPixelBuffer;
use crate::surface::DisplaySurface;

/// Show Core Video frames, e.g. those copied from `AVPlayerItemVideoOutput`.
pub trait DisplayPixelBufferExt {
    /// Lock `pixel_buffer`, display it and unlock it again.
    fn display_pixel_buffer(&mut self, pixel_buffer: &CVPixelBuffer) -> Result<(), Error>;
}

impl<S> DisplayPixelBufferExt for S
where
    S: DisplaySurface<Error = Error>,
{
    fn display_pixel_buffer(&mut self, pixel_buffer: &CVPixelBuffer) -> Result<(), Error> {
        let locked = LockedPixelBuffer::lock(pixel_buffer)
            .inspect_err(|err| tracing::warn!(%err, "dropping pixel buffer"))?;
        self.display_frame(&locked)
    }
}
