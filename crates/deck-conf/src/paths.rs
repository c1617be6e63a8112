//! Path helpers for the launcher layout.

use std::path::{Component, Path, PathBuf};

/// Where the launcher lives and where it keeps its files.
///
/// Everything is derived from the launcher executable: `tools/Games.exe`
/// reads `tools/Games.conf` and caches icons in `tools/.Games/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherPaths {
    /// Directory relative specs are resolved against.
    pub base_dir: PathBuf,
    /// Launcher stem, e.g. "Games".
    pub name: String,
    pub conf_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl LauncherPaths {
    /// Layout for the currently running executable.
    pub fn from_current_exe() -> std::io::Result<Self> {
        let exe = std::env::current_exe()?;
        Ok(Self::from_launcher(&exe))
    }

    /// Layout for a launcher binary at `exe`.
    pub fn from_launcher(exe: &Path) -> Self {
        let base_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = stem_of(exe);
        let conf_path = base_dir.join(format!("{}.conf", name));
        Self::with_conf(base_dir, name, conf_path)
    }

    /// Layout driven by an explicit config file: its directory becomes the
    /// base directory and its stem names the cache directory.
    pub fn from_conf(conf: &Path) -> Self {
        let base_dir = conf
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = stem_of(conf);
        Self::with_conf(base_dir, name, conf.to_path_buf())
    }

    fn with_conf(base_dir: PathBuf, name: String, conf_path: PathBuf) -> Self {
        let cache_dir = base_dir.join(format!(".{}", name));
        Self {
            base_dir,
            name,
            conf_path,
            cache_dir,
        }
    }

    /// Resolve a path from the config against the base directory.
    pub fn resolve(&self, spec: &str) -> PathBuf {
        resolve_path(&self.base_dir, spec)
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "launcher".to_string())
}

/// Resolve `spec` against `base` unless it is already absolute, then
/// normalize `.` and `..` lexically.
///
/// The working directory is never consulted and the filesystem is never
/// touched, so the result is stable for paths that do not exist yet and
/// resolving an already resolved path returns it unchanged.
pub fn resolve_path(base: &Path, spec: &str) -> PathBuf {
    let spec = Path::new(spec.trim());
    let joined = if spec.is_absolute() {
        spec.to_path_buf()
    } else {
        base.join(spec)
    };
    normalize(&joined)
}

fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    parts.iter().collect()
}
