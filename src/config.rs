use crate::layout::{AlphaLayout, ScaleMode};
use crate::tint::TintParams;

/// Configuration shared by every surface backend.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceConfig {
    pub layout: AlphaLayout,
    pub scale_mode: ScaleMode,
    /// Colour grading; `None` draws the frame's own colours.
    pub tint: Option<TintParams>,
    /// Frames accepted after creation or a clear that are imported but not
    /// drawn, hiding decoder warm-up frames.
    pub skip_leading_frames: u32,
}

impl SurfaceConfig {
    pub fn with_layout(mut self, layout: AlphaLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_scale_mode(mut self, scale_mode: ScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    pub fn with_tint(mut self, tint: TintParams) -> Self {
        self.tint = Some(tint);
        self
    }

    pub fn with_skip_leading_frames(mut self, frames: u32) -> Self {
        self.skip_leading_frames = frames;
        self
    }
}
