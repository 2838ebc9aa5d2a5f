//! Local image operations of the extraction pipeline

pub mod alpha;
pub mod overlay;
pub mod resize;

pub use alpha::AlphaPostProcessor;
pub use overlay::OverlayCompositor;
pub use resize::{ImageResizer, DISPLAY_FILTER};
