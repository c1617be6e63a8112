//! Launcher services.
//!
//! - `icons` - icon engine setup and refresh with progress display
//! - `launch` - starting apps, optionally elevated

pub mod icons;
pub mod launch;
