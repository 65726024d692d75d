#![cfg_attr(not(feature = "std"), no_std)]

pub mod buffer;
pub mod error;
pub mod layout;
pub mod surface;
pub mod types;

#[cfg(feature = "std")]
pub mod backend;
#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod platform;
#[cfg(feature = "std")]
pub mod tint;

#[cfg(feature = "c-api")]
pub mod ffi;

// Re-exports
pub use buffer::*;
pub use error::*;
pub use layout::*;
pub use surface::*;
pub use types::*;

#[cfg(feature = "std")]
pub use backend::*;
#[cfg(feature = "std")]
pub use config::*;
#[cfg(feature = "std")]
pub use tint::*;
