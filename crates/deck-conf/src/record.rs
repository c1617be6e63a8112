//! Application records parsed from `[apps] items`.

/// One launchable entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppRecord {
    /// Executable path as written, absolute or relative to the base directory.
    pub exe: String,
    /// Argument string, split only when launching.
    pub args: String,
    /// Display title override; empty means derive from the executable.
    pub title: String,
    /// Icon spec: empty, or a path to a `.png`/`.ico`/`.exe`-like file.
    pub icon: String,
    pub elevated: bool,
}

impl AppRecord {
    /// Parse one item line: `exe | key=value | key=value ...`.
    ///
    /// Unknown keys and segments without `=` are ignored.
    pub fn parse_line(line: &str) -> Self {
        let mut parts = line.split('|').map(str::trim);
        let mut record = AppRecord {
            exe: parts.next().unwrap_or_default().to_string(),
            ..Default::default()
        };

        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim().to_lowercase().as_str() {
                "args" => record.args = value,
                "title" => record.title = value,
                "icon" => record.icon = value,
                "elevated" => record.elevated = parse_flag(&value),
                other => log::debug!("Ignoring unknown item key '{}'", other),
            }
        }

        record
    }

    pub fn title_override(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }

    pub fn icon_spec(&self) -> Option<&str> {
        let icon = self.icon.trim();
        (!icon.is_empty()).then_some(icon)
    }
}

/// Truthy config flag: `1`, `true`, `yes`, `y`, `on` (any case).
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line() {
        let record = AppRecord::parse_line(
            r"C:\Games\quake.exe | args=-width 1920 | Title=Quake | icon=icons\q.ico | elevated=Yes",
        );
        assert_eq!(record.exe, r"C:\Games\quake.exe");
        assert_eq!(record.args, "-width 1920");
        assert_eq!(record.title, "Quake");
        assert_eq!(record.icon, r"icons\q.ico");
        assert!(record.elevated);
    }

    #[test]
    fn bare_exe_has_defaults() {
        let record = AppRecord::parse_line("tools/editor.exe");
        assert_eq!(record.exe, "tools/editor.exe");
        assert_eq!(record.icon_spec(), None);
        assert_eq!(record.title_override(), None);
        assert!(!record.elevated);
    }

    #[test]
    fn value_may_contain_equals() {
        let record = AppRecord::parse_line("app.exe | args=--mode=fast");
        assert_eq!(record.args, "--mode=fast");
    }

    #[test]
    fn flags() {
        for truthy in ["1", "true", "YES", "y", "On"] {
            assert!(parse_flag(truthy), "{truthy}");
        }
        for falsy in ["", "0", "no", "off", "enabled"] {
            assert!(!parse_flag(falsy), "{falsy}");
        }
    }
}
