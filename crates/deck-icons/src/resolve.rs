//! Icon source classification and worklist construction.
//!
//! Pure mapping from config state to cache targets; nothing here touches the
//! filesystem.

use crate::types::{
    CacheKey, ConvertOp, EXECUTABLE_EXTENSIONS, ICON_EXTENSIONS, IconSpec, RASTER_EXTENSIONS,
    Target, Worklist, extension_of,
};
use deck_conf::{AppRecord, resolve_path};
use log::{debug, warn};
use std::path::Path;

/// Classify an icon spec string.
///
/// Empty means [`IconSpec::Absent`]. Returns `None` for an extension that is
/// neither a raster image, an `.ico` file nor an executable.
pub fn classify(base: &Path, spec: &str) -> Option<IconSpec> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Some(IconSpec::Absent);
    }

    let path = resolve_path(base, spec);
    let ext = extension_of(&path);

    if RASTER_EXTENSIONS.contains(&ext.as_str()) {
        Some(IconSpec::PreRendered(path))
    } else if ICON_EXTENSIONS.contains(&ext.as_str()) {
        Some(IconSpec::LegacyIcon(path))
    } else if EXECUTABLE_EXTENSIONS.contains(&ext.as_str()) {
        Some(IconSpec::Executable(path))
    } else {
        None
    }
}

/// Target for the window icon.
///
/// Only an executable needs work: its icon is extracted into an `.ico` in
/// the cache. An `.ico` spec is used as-is.
pub fn resolve_window(base: &Path, spec: &str) -> Option<Target> {
    match classify(base, spec)? {
        IconSpec::Absent => None,
        IconSpec::Executable(source) => Some(Target {
            op: ConvertOp::ExtractToIconContainer,
            source,
            key: CacheKey::WindowIcon,
        }),
        IconSpec::LegacyIcon(_) => None,
        IconSpec::PreRendered(path) => {
            warn!(
                "Window icon {} is not an .ico or .exe, ignoring",
                path.display()
            );
            None
        }
    }
}

/// Target for one app row, `None` when the row needs no cached image.
pub fn resolve_app(base: &Path, app: &AppRecord) -> Option<Target> {
    let spec = app.icon_spec().unwrap_or_default();
    let Some(kind) = classify(base, spec) else {
        warn!("Unsupported icon '{}' for {}, row gets no icon", spec, app.exe);
        return None;
    };

    let (op, source) = match kind {
        IconSpec::PreRendered(_) => return None,
        IconSpec::LegacyIcon(path) => (ConvertOp::IconToRaster, path),
        IconSpec::Executable(path) => (ConvertOp::ExtractToRaster, path),
        IconSpec::Absent if app.exe.trim().is_empty() => {
            warn!("App entry without executable or icon, row gets no icon");
            return None;
        }
        IconSpec::Absent => (ConvertOp::ExtractToRaster, resolve_path(base, &app.exe)),
    };

    let key = CacheKey::button_for(&source);
    if matches!(&key, CacheKey::Button(stem) if stem.is_empty()) {
        warn!("No file name in '{}', row gets no icon", source.display());
        return None;
    }
    Some(Target { op, source, key })
}

/// Build the full worklist for a config.
pub fn resolve(base: &Path, apps: &[AppRecord], window_icon: &str) -> Worklist {
    let window = resolve_window(base, window_icon);
    let apps: Vec<Target> = apps.iter().filter_map(|app| resolve_app(base, app)).collect();

    debug!(
        "Resolved {} row targets, window target: {}",
        apps.len(),
        window.is_some()
    );

    Worklist { window, apps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn app(exe: &str, icon: &str) -> AppRecord {
        AppRecord {
            exe: exe.to_string(),
            icon: icon.to_string(),
            ..Default::default()
        }
    }

    fn base() -> PathBuf {
        PathBuf::from("/opt/deck")
    }

    #[test]
    fn absent_spec_uses_own_executable() {
        let target = resolve_app(&base(), &app("games/quake.exe", "")).unwrap();
        assert_eq!(target.op, ConvertOp::ExtractToRaster);
        assert_eq!(target.source, PathBuf::from("/opt/deck/games/quake.exe"));
        assert_eq!(target.key.file_name(), "btn_quake.png");
    }

    #[test]
    fn png_spec_needs_no_target() {
        assert_eq!(resolve_app(&base(), &app("a.exe", "icons/a.PNG")), None);
    }

    #[test]
    fn ico_spec_is_converted_under_its_own_name() {
        let target = resolve_app(&base(), &app("a.exe", "icons/shield.ico")).unwrap();
        assert_eq!(target.op, ConvertOp::IconToRaster);
        assert_eq!(target.source, PathBuf::from("/opt/deck/icons/shield.ico"));
        assert_eq!(target.key.file_name(), "btn_shield.png");
    }

    #[test]
    fn exe_spec_is_extracted_under_that_exe_name() {
        let target = resolve_app(&base(), &app("a.exe", "/other/launcher.exe")).unwrap();
        assert_eq!(target.op, ConvertOp::ExtractToRaster);
        assert_eq!(target.source, PathBuf::from("/other/launcher.exe"));
        assert_eq!(target.key.file_name(), "btn_launcher.png");
    }

    #[test]
    fn unknown_extension_gets_nothing() {
        assert_eq!(resolve_app(&base(), &app("a.exe", "icon.svg")), None);
    }

    #[test]
    fn nameless_source_gets_nothing() {
        assert_eq!(resolve_app(&base(), &app("", "")), None);
        assert_eq!(resolve_app(&base(), &app("  ", "")), None);
        assert_eq!(resolve_app(&base(), &app("/", "")), None);
    }

    #[test]
    fn window_icon_rules() {
        assert_eq!(resolve_window(&base(), ""), None);
        assert_eq!(resolve_window(&base(), "deck.ico"), None);
        assert_eq!(resolve_window(&base(), "deck.png"), None);

        let target = resolve_window(&base(), "deck.exe").unwrap();
        assert_eq!(target.op, ConvertOp::ExtractToIconContainer);
        assert_eq!(target.source, PathBuf::from("/opt/deck/deck.exe"));
        assert_eq!(target.key, CacheKey::WindowIcon);
    }

    #[test]
    fn relative_spec_resolves_deterministically() {
        let record = app("a.exe", "./icons/../icons/shield.ico");
        let first = resolve_app(&base(), &record).unwrap();
        let second = resolve_app(&base(), &record).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.source, PathBuf::from("/opt/deck/icons/shield.ico"));
    }

    #[test]
    fn worklist_keeps_config_order() {
        let apps = [
            app("one.exe", ""),
            app("two.exe", "two.png"),
            app("three.exe", "three.ico"),
        ];
        let work = resolve(&base(), &apps, "deck.exe");
        assert_eq!(work.len(), 3);
        let names: Vec<String> = work.apps.iter().map(|t| t.key.file_name()).collect();
        assert_eq!(names, ["btn_one.png", "btn_three.png"]);
    }
}
