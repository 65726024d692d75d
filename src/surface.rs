use crate::buffer::PixelBuffer;

/// What a surface currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceState {
    /// Nothing to show; redraws are fully transparent.
    #[default]
    Empty,
    /// A frame was accepted and is the next thing drawn.
    Displaying,
}

/// The outcome of one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// The surface was drawn fully transparent.
    Cleared,
    /// The current frame was drawn. `first` is set on the first frame drawn
    /// since the surface was created or last cleared.
    Frame { first: bool },
}

/// An on-screen region that shows the most recently supplied frame.
///
/// Calls come from one thread; `&mut self` keeps them from overlapping. The
/// buffer is borrowed only for the duration of `display_frame`.
pub trait DisplaySurface {
    type Error: core::error::Error;

    /// Make `buffer` the next frame drawn, replacing the current one.
    ///
    /// On error the surface keeps showing whatever it showed before.
    fn display_frame<B>(&mut self, buffer: &B) -> Result<(), Self::Error>
    where
        B: PixelBuffer + ?Sized;

    /// Drop the current frame so the next redraw is transparent.
    fn clear(&mut self);

    fn state(&self) -> SurfaceState;
}

/// Bookkeeping shared by the backends: current state, the leading-frame
/// skip counter and the first-frame flag.
#[derive(Debug, Default)]
pub(crate) struct FrameSlot {
    state: SurfaceState,
    accepted_since_clear: u32,
    drawn_since_clear: bool,
}

impl FrameSlot {
    pub(crate) fn state(&self) -> SurfaceState {
        self.state
    }

    pub(crate) fn accept(&mut self) {
        self.state = SurfaceState::Displaying;
        self.accepted_since_clear = self.accepted_since_clear.saturating_add(1);
    }

    pub(crate) fn clear(&mut self) {
        *self = FrameSlot::default();
    }

    /// Whether a redraw should draw the current frame.
    pub(crate) fn drawable(&self, skip_leading_frames: u32) -> bool {
        self.state == SurfaceState::Displaying && self.accepted_since_clear > skip_leading_frames
    }

    /// Record that the current frame was drawn.
    pub(crate) fn presented(&mut self) -> Presentation {
        let first = !self.drawn_since_clear;
        self.drawn_since_clear = true;
        Presentation::Frame { first }
    }
}
