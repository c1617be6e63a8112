//! Core types for deck-icons

use std::path::{Path, PathBuf};

/// Prefix of generated per-row images.
pub(crate) const BUTTON_PREFIX: &str = "btn_";
/// Extension of generated per-row images.
pub(crate) const BUTTON_EXT: &str = "png";
/// File name of the generated window icon.
pub(crate) const WINDOW_ICON_FILE: &str = "window_icon.ico";

pub(crate) const RASTER_EXTENSIONS: [&str; 5] = ["png", "gif", "bmp", "jpg", "jpeg"];
pub(crate) const ICON_EXTENSIONS: [&str; 1] = ["ico"];
pub(crate) const EXECUTABLE_EXTENSIONS: [&str; 1] = ["exe"];

/// Where an icon comes from, after path resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconSpec {
    /// No spec: use the icon embedded in the app's own executable.
    Absent,
    /// Ready-to-use raster image, never cached.
    PreRendered(PathBuf),
    /// Standalone `.ico` file.
    LegacyIcon(PathBuf),
    /// Icon embedded in an executable.
    Executable(PathBuf),
}

/// Conversion performed by the external converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvertOp {
    /// Embedded executable icon -> PNG.
    ExtractToRaster,
    /// `.ico` file -> PNG.
    IconToRaster,
    /// Embedded executable icon -> `.ico`.
    ExtractToIconContainer,
}

impl ConvertOp {
    pub fn label(&self) -> &'static str {
        match self {
            ConvertOp::ExtractToRaster => "extract icon to png",
            ConvertOp::IconToRaster => "convert ico to png",
            ConvertOp::ExtractToIconContainer => "extract icon to ico",
        }
    }
}

/// Name of a generated artifact inside the cache directory.
///
/// Row images are keyed by the source file's stem only, so `a/tool.exe` and
/// `b/tool.exe` share `btn_tool.png`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Button(String),
    WindowIcon,
}

impl CacheKey {
    /// Row image key for a source file.
    pub fn button_for(source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        CacheKey::Button(stem)
    }

    pub fn file_name(&self) -> String {
        match self {
            CacheKey::Button(stem) => format!("{}{}.{}", BUTTON_PREFIX, stem, BUTTON_EXT),
            CacheKey::WindowIcon => WINDOW_ICON_FILE.to_string(),
        }
    }

    /// Whether a file name follows the generated-artifact convention.
    pub(crate) fn is_generated_name(name: &str) -> bool {
        if name == WINDOW_ICON_FILE {
            return true;
        }
        name.strip_prefix(BUTTON_PREFIX)
            .and_then(|rest| rest.strip_suffix(BUTTON_EXT))
            .is_some_and(|stem| stem.ends_with('.'))
    }
}

/// One artifact the cache must hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub op: ConvertOp,
    pub source: PathBuf,
    pub key: CacheKey,
}

/// Everything a refresh pass has to produce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Worklist {
    /// Window icon extracted from an executable, if any.
    pub window: Option<Target>,
    /// Row images in config order.
    pub apps: Vec<Target>,
}

impl Worklist {
    /// All targets, window icon first.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.window.iter().chain(self.apps.iter())
    }

    pub fn len(&self) -> usize {
        self.apps.len() + usize::from(self.window.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lowercased extension of `path`, empty when there is none.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_file_names() {
        let key = CacheKey::button_for(Path::new("/games/Quake.EXE"));
        assert_eq!(key, CacheKey::Button("Quake".to_string()));
        assert_eq!(key.file_name(), "btn_Quake.png");
        assert_eq!(CacheKey::WindowIcon.file_name(), "window_icon.ico");
    }

    #[test]
    fn generated_names() {
        assert!(CacheKey::is_generated_name("btn_quake.png"));
        assert!(CacheKey::is_generated_name("window_icon.ico"));
        assert!(!CacheKey::is_generated_name("cache.json"));
        assert!(!CacheKey::is_generated_name("btn_quake.ico"));
        assert!(!CacheKey::is_generated_name("notes.png"));
    }

    #[test]
    fn worklist_counts_window_target() {
        let mut work = Worklist::default();
        assert!(work.is_empty());
        work.window = Some(Target {
            op: ConvertOp::ExtractToIconContainer,
            source: PathBuf::from("/x/launcher.exe"),
            key: CacheKey::WindowIcon,
        });
        assert_eq!(work.len(), 1);
        assert_eq!(work.iter().count(), 1);
    }
}
