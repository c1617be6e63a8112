//! Launcher config parsing.
//!
//! The config is INI-style. Values may continue over indented lines, which is
//! how the `[apps] items` list is written:
//!
//! ```text
//! [meta]
//! title = Games
//! window_icon = launcher.exe
//!
//! [apps]
//! items =
//!     games/quake.exe | args=-fullscreen | icon=icons/quake.ico
//!     tools/editor.exe | title=Map Editor | elevated=yes
//! ```

use crate::error::ConfError;
use crate::record::AppRecord;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const DEFAULT_TITLE: &str = "Launcher";

/// Parsed launcher configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherConfig {
    pub title: String,
    /// Window icon spec: empty, an `.ico` file, or an executable.
    pub window_icon: String,
    /// Apps in declaration order.
    pub apps: Vec<AppRecord>,
}

type Sections = HashMap<String, HashMap<String, String>>;

/// Read and parse the config file at `path`.
pub fn read_config(path: &Path) -> Result<LauncherConfig, ConfError> {
    if !path.exists() {
        return Err(ConfError::Missing(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    debug!(
        "Loaded {} with {} apps",
        path.display(),
        config.apps.len()
    );
    Ok(config)
}

/// Parse config text.
pub fn parse_config(content: &str) -> Result<LauncherConfig, ConfError> {
    let sections = parse_sections(content)?;
    let get = |section: &str, key: &str| {
        sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(|v| v.trim().to_string())
    };

    let title = get("meta", "title")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let window_icon = get("meta", "window_icon").unwrap_or_default();

    let apps = get("apps", "items")
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(['#', ';']))
        .map(AppRecord::parse_line)
        .collect();

    Ok(LauncherConfig {
        title,
        window_icon,
        apps,
    })
}

fn parse_sections(content: &str) -> Result<Sections, ConfError> {
    let mut sections: Sections = HashMap::new();
    let mut section: Option<String> = None;
    let mut key: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let line = raw.trim();

        if line.is_empty() || line.starts_with(['#', ';']) {
            continue;
        }

        // Indented line continues the previous value
        if raw.starts_with(char::is_whitespace) {
            if let (Some(section), Some(key)) = (&section, &key) {
                if let Some(value) = sections.get_mut(section).and_then(|s| s.get_mut(key)) {
                    value.push('\n');
                    value.push_str(line);
                    continue;
                }
            }
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_string();
            sections.entry(name.clone()).or_default();
            section = Some(name);
            key = None;
            continue;
        }

        let Some(current) = &section else {
            return Err(ConfError::Syntax {
                line: line_no,
                message: "entry outside of a section".to_string(),
            });
        };

        let Some(split) = line.find(['=', ':']) else {
            return Err(ConfError::Syntax {
                line: line_no,
                message: format!("expected 'key = value', found '{}'", line),
            });
        };

        let name = line[..split].trim().to_string();
        let value = line[split + 1..].trim().to_string();
        if name.is_empty() {
            return Err(ConfError::Syntax {
                line: line_no,
                message: "empty key".to_string(),
            });
        }

        sections
            .entry(current.clone())
            .or_default()
            .insert(name.clone(), value);
        key = Some(name);
    }

    Ok(sections)
}
