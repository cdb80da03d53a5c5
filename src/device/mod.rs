//! Ready-made update queue backends.

mod strip;

pub use strip::{DEFAULT_BRIGHTNESS, LedStripConfig, LedStripDevice, StripError};
