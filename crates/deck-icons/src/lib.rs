//! deck-icons: icon resolution and caching engine for LaunchDeck.
//!
//! Provides:
//! - Icon source classification for app rows and the window icon
//! - A cache directory keyed by source base name, invalidated by config mtime
//! - Out-of-process conversion (embedded exe icons, `.ico` files) with
//!   per-target failure reporting
//! - Lazy per-row lookups for the presentation layer

mod converter;
mod engine;
mod error;
mod refresh;
mod resolve;
mod store;
mod types;

pub use converter::{Converter, PowerShellConverter, convert, file_description};
pub use engine::{EngineConfig, IconEngine};
pub use error::{CacheError, ConvertError, PartialFailureReport, TargetFailure};
pub use refresh::{ProgressCallback, RefreshOutcome, RefreshProgress, ensure_fresh, needs_refresh};
pub use resolve::{classify, resolve, resolve_app, resolve_window};
pub use store::{CacheStore, FreshnessSignal};
pub use types::{CacheKey, ConvertOp, IconSpec, Target, Worklist};
