//! Where the alpha mask lives in a buffer, and how a frame is fitted into a view.

use crate::types::Size;

/// Placement of the alpha mask within a decoded buffer.
///
/// Gift/overlay videos are usually encoded without an alpha channel, so the
/// mask is packed next to the colour image and recovered at draw time from the
/// red channel of the mask half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlphaLayout {
    /// Left half is the alpha mask, right half is colour.
    #[default]
    AlphaLeftColorRight,
    /// Left half is colour, right half is the alpha mask.
    ColorLeftAlphaRight,
    /// The buffer's own alpha channel, straight (not premultiplied).
    Embedded,
}

impl AlphaLayout {
    pub const fn is_side_by_side(self) -> bool {
        !matches!(self, Self::Embedded)
    }

    /// Size of the image a buffer of `source` size displays as.
    pub const fn displayed_size(self, source: Size) -> Size {
        if self.is_side_by_side() {
            Size::new(source.width / 2, source.height)
        } else {
            source
        }
    }

    /// Horizontal pixel offsets of the colour and alpha halves.
    pub(crate) const fn offsets(self, displayed_width: u32) -> (u32, u32) {
        match self {
            Self::AlphaLeftColorRight => (displayed_width, 0),
            Self::ColorLeftAlphaRight => (0, displayed_width),
            Self::Embedded => (0, 0),
        }
    }
}

/// How a frame is scaled into the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScaleMode {
    /// Keep the aspect ratio and show the whole frame, centred.
    #[default]
    AspectFit,
    /// Keep the aspect ratio and cover the whole view, cropping overflow.
    AspectFill,
    /// Fill the view, ignoring the aspect ratio.
    Stretch,
}

/// An axis-aligned rectangle in view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl ScaleMode {
    /// Destination rectangle of a `frame`-sized image drawn into a `view`.
    pub fn fit(self, frame: Size, view: Size) -> Rect {
        let (vw, vh) = (view.width as f32, view.height as f32);
        if frame.is_empty() || view.is_empty() {
            return Rect {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }
        let (fw, fh) = (frame.width as f32, frame.height as f32);
        let scale = match self {
            Self::Stretch => {
                return Rect {
                    x: 0.0,
                    y: 0.0,
                    width: vw,
                    height: vh,
                };
            }
            Self::AspectFit => (vw / fw).min(vh / fh),
            Self::AspectFill => (vw / fw).max(vh / fh),
        };
        let (width, height) = (fw * scale, fh * scale);
        Rect {
            x: (vw - width) / 2.0,
            y: (vh - height) / 2.0,
            width,
            height,
        }
    }
}
