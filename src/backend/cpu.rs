//! Software presentation into an in-memory RGBA canvas.

use image::{Rgba, RgbaImage};

use crate::buffer::{FrameGeometry, PixelBuffer};
use crate::config::SurfaceConfig;
use crate::error::{Error, Result};
use crate::surface::{DisplaySurface, FrameSlot, Presentation, SurfaceState};
use crate::types::Size;

/// The current frame, unpacked to straight-alpha RGBA at its displayed size.
#[derive(Debug, Default)]
struct Texture {
    size: Size,
    pixels: Vec<u8>,
}

impl Texture {
    fn upload(&mut self, geometry: &FrameGeometry, data: &[u8]) {
        let size = geometry.displayed;
        // Keeps the allocation when the frame size repeats.
        self.pixels.resize(size.area() as usize * 4, 0);
        self.size = size;

        let row_len = size.width as usize * 4;
        for (y, row) in self.pixels.chunks_exact_mut(row_len).enumerate() {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                px.copy_from_slice(&geometry.sample(data, x as u32, y as u32));
            }
        }
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Largest canvas side a [`SoftwareSurface`] allocates.
pub const MAX_VIEW_DIMENSION: u32 = 16_384;

fn transparent_canvas(view: Size) -> Result<RgbaImage> {
    let within_limit = view.width <= MAX_VIEW_DIMENSION && view.height <= MAX_VIEW_DIMENSION;
    let bytes = usize::try_from(view.area())
        .ok()
        .and_then(|area| area.checked_mul(4));
    if !within_limit || bytes.is_none() {
        tracing::warn!(width = view.width, height = view.height, "view size rejected");
        return Err(Error::InvalidArgument("view size exceeds the canvas limit"));
    }
    Ok(RgbaImage::new(view.width, view.height))
}

/// A [`DisplaySurface`] that composes into an [`RgbaImage`] on the CPU.
///
/// Frames are copied out of the caller's buffer during
/// [`display_frame`](DisplaySurface::display_frame); [`redraw`](Self::redraw)
/// renders the current state into the canvas, which holds straight-alpha
/// RGBA ready to hand to a host compositor.
#[derive(Debug)]
pub struct SoftwareSurface {
    config: SurfaceConfig,
    canvas: RgbaImage,
    texture: Texture,
    slot: FrameSlot,
}

impl SoftwareSurface {
    /// Fails if either side of `view` exceeds [`MAX_VIEW_DIMENSION`].
    pub fn new(view: Size, config: SurfaceConfig) -> Result<Self> {
        Ok(SoftwareSurface {
            config,
            canvas: transparent_canvas(view)?,
            texture: Texture::default(),
            slot: FrameSlot::default(),
        })
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Scale mode, tint and the leading-frame skip take effect on the next
    /// redraw; the alpha layout on the next frame.
    pub fn set_config(&mut self, config: SurfaceConfig) {
        self.config = config;
    }

    pub fn view_size(&self) -> Size {
        Size::new(self.canvas.width(), self.canvas.height())
    }

    /// Change the size of the view. The canvas is transparent until the next
    /// redraw. On error the current canvas is kept.
    pub fn resize(&mut self, view: Size) -> Result<()> {
        if view != self.view_size() {
            self.canvas = transparent_canvas(view)?;
            tracing::debug!(width = view.width, height = view.height, "canvas resized");
        }
        Ok(())
    }

    /// The output of the last redraw.
    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Render the current state into the canvas.
    pub fn redraw(&mut self) -> Presentation {
        for px in self.canvas.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }

        if !self.slot.drawable(self.config.skip_leading_frames) {
            tracing::trace!(state = ?self.slot.state(), "redraw cleared");
            return Presentation::Cleared;
        }

        let rect = self.config.scale_mode.fit(self.texture.size, self.view_size());
        if !rect.is_empty() {
            let (tw, th) = (self.texture.size.width, self.texture.size.height);
            for (x, y, px) in self.canvas.enumerate_pixels_mut() {
                // Nearest texel under the pixel centre.
                let u = (x as f32 + 0.5 - rect.x) / rect.width;
                let v = (y as f32 + 0.5 - rect.y) / rect.height;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let tx = ((u * tw as f32) as u32).min(tw - 1);
                let ty = ((v * th as f32) as u32).min(th - 1);
                let texel = self.texture.texel(tx, ty);
                *px = Rgba(match &self.config.tint {
                    Some(tint) => tint.apply_rgba8(texel),
                    None => texel,
                });
            }
        }

        let presentation = self.slot.presented();
        tracing::trace!(?presentation, "redraw");
        presentation
    }
}

impl DisplaySurface for SoftwareSurface {
    type Error = Error;

    fn display_frame<B>(&mut self, buffer: &B) -> Result<()>
    where
        B: PixelBuffer + ?Sized,
    {
        let geometry = FrameGeometry::inspect(buffer, self.config.layout)
            .inspect_err(|err| tracing::warn!(%err, "dropping frame"))?;
        // `inspect` guarantees exactly one plane.
        let data = buffer.planes()[0].data;

        let reused = self.texture.size == geometry.displayed;
        self.texture.upload(&geometry, data);
        self.slot.accept();

        tracing::debug!(
            width = geometry.displayed.width,
            height = geometry.displayed.height,
            format = ?geometry.pixel_format,
            reused,
            "frame imported"
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.slot.clear();
    }

    fn state(&self) -> SurfaceState {
        self.slot.state()
    }
}
