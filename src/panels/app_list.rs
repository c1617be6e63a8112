//! Text app list: one row per configured app.

use deck_conf::{AppRecord, LauncherConfig, LauncherPaths};
use deck_icons::{IconEngine, file_description};
use std::path::{Path, PathBuf};

/// Everything needed to render one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppRow {
    /// 1-based number used by `launch`.
    pub number: usize,
    pub title: String,
    /// Executable does not exist; the row cannot be launched.
    pub missing: bool,
    pub icon: Option<PathBuf>,
}

/// Build the rows for `config`, resolving icons lazily through `engine`.
pub fn build_rows(
    paths: &LauncherPaths,
    config: &LauncherConfig,
    engine: &IconEngine,
) -> Vec<AppRow> {
    config
        .apps
        .iter()
        .enumerate()
        .map(|(index, app)| {
            let exe = paths.resolve(&app.exe);
            AppRow {
                number: index + 1,
                title: display_title(app, &exe),
                missing: !exe.exists(),
                icon: engine.row_icon(app),
            }
        })
        .collect()
}

/// Title override, else the executable's file description, else its name.
fn display_title(app: &AppRecord, exe: &Path) -> String {
    if let Some(title) = app.title_override() {
        return title.to_string();
    }

    if cfg!(windows) && exe.exists() {
        if let Some(description) = file_description(exe) {
            return description;
        }
    }

    exe.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| app.exe.clone())
}

pub fn render(title: &str, window_icon: Option<&Path>, rows: &[AppRow]) -> String {
    let mut out = format!("{} Launcher\n", title);
    if let Some(icon) = window_icon {
        out.push_str(&format!("window icon: {}\n", icon.display()));
    }

    for row in rows {
        let icon = row
            .icon
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let suffix = if row.missing { " (missing)" } else { "" };
        out.push_str(&format!(
            "{:>3}  {}{}  [{}]\n",
            row.number, row.title, suffix, icon
        ));
    }

    out
}
