//! Presentation backends implementing [`DisplaySurface`](crate::surface::DisplaySurface).

pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;

pub use cpu::{MAX_VIEW_DIMENSION, SoftwareSurface};
#[cfg(feature = "gpu")]
pub use gpu::{GpuSurface, WindowSurface};
