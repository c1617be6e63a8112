//! Out-of-process icon conversion.
//!
//! The default backend drives `System.Drawing` through a hidden,
//! non-interactive PowerShell, one process per conversion. Calls block until
//! the process exits; there is no timeout.

use crate::error::ConvertError;
use crate::types::ConvertOp;
use log::debug;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// `CREATE_NO_WINDOW` process creation flag.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

const POWERSHELL: &str = "powershell";

/// Something that can turn an icon source into a file.
///
/// Implementations report whether the external call succeeded. Checking that
/// the output actually exists is done by [`convert`].
pub trait Converter: Send + Sync {
    fn run(&self, source: &Path, target: &Path, op: ConvertOp) -> Result<(), ConvertError>;
}

impl<F> Converter for F
where
    F: Fn(&Path, &Path, ConvertOp) -> Result<(), ConvertError> + Send + Sync,
{
    fn run(&self, source: &Path, target: &Path, op: ConvertOp) -> Result<(), ConvertError> {
        self(source, target, op)
    }
}

/// Run one conversion and verify its result.
///
/// Succeeds only when the converter reported success *and* `target` now
/// holds a non-empty file. Partial or empty output is removed so a later
/// completeness scan sees the target as missing.
pub fn convert(
    converter: &dyn Converter,
    source: &Path,
    target: &Path,
    op: ConvertOp,
) -> Result<(), ConvertError> {
    if !source.exists() {
        return Err(ConvertError::SourceMissing(source.to_path_buf()));
    }

    if let Err(e) = converter.run(source, target, op) {
        discard(target);
        return Err(e);
    }

    match fs::metadata(target) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        Ok(_) => {
            discard(target);
            Err(ConvertError::NoOutput(target.to_path_buf()))
        }
        Err(_) => Err(ConvertError::NoOutput(target.to_path_buf())),
    }
}

fn discard(target: &Path) {
    if fs::remove_file(target).is_ok() {
        debug!("Removed untrusted output {}", target.display());
    }
}

/// Converter backed by PowerShell and `System.Drawing`.
#[derive(Clone, Debug)]
pub struct PowerShellConverter {
    program: String,
}

impl Default for PowerShellConverter {
    fn default() -> Self {
        Self::new(POWERSHELL)
    }
}

impl PowerShellConverter {
    /// Use a specific PowerShell executable, e.g. `pwsh`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn script(source: &Path, target: &Path, op: ConvertOp) -> String {
        let src = ps_quote(source);
        let out = ps_quote(target);
        let body = match op {
            ConvertOp::ExtractToRaster => format!(
                "$icon = [System.Drawing.Icon]::ExtractAssociatedIcon({src}); \
                 if ($null -eq $icon) {{ exit 2 }}; \
                 $icon.ToBitmap().Save({out}, [System.Drawing.Imaging.ImageFormat]::Png)"
            ),
            ConvertOp::IconToRaster => format!(
                "$icon = New-Object System.Drawing.Icon({src}); \
                 $icon.ToBitmap().Save({out}, [System.Drawing.Imaging.ImageFormat]::Png)"
            ),
            ConvertOp::ExtractToIconContainer => format!(
                "$icon = [System.Drawing.Icon]::ExtractAssociatedIcon({src}); \
                 if ($null -eq $icon) {{ exit 2 }}; \
                 $fs = New-Object System.IO.FileStream({out}, 'Create'); \
                 try {{ $icon.Save($fs) }} finally {{ $fs.Close() }}"
            ),
        };

        format!(
            "try {{ Add-Type -AssemblyName System.Drawing | Out-Null; {body}; exit 0 }} catch {{ exit 1 }}"
        )
    }
}

impl Converter for PowerShellConverter {
    fn run(&self, source: &Path, target: &Path, op: ConvertOp) -> Result<(), ConvertError> {
        debug!(
            "{}: {} -> {}",
            op.label(),
            source.display(),
            target.display()
        );

        let output = hidden_powershell(&self.program, &Self::script(source, target, op))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(ConvertError::Spawn)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ConvertError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Version-info file description of an executable, e.g. "Quake III Arena".
///
/// `None` when PowerShell is unavailable or the file carries no description.
pub fn file_description(exe: &Path) -> Option<String> {
    let script = format!("(Get-Item {}).VersionInfo.FileDescription", ps_quote(exe));
    let output = hidden_powershell(POWERSHELL, &script)
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let description = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!description.is_empty()).then_some(description)
}

fn hidden_powershell(program: &str, script: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.args([
        "-NoLogo",
        "-NoProfile",
        "-NonInteractive",
        "-ExecutionPolicy",
        "Bypass",
        "-WindowStyle",
        "Hidden",
        "-Command",
        script,
    ])
    .stdin(Stdio::null());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

/// Single-quoted PowerShell string literal.
fn ps_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn missing_source_never_reaches_converter() {
        let dir = tempfile::tempdir().unwrap();
        let calls = AtomicUsize::new(0);
        let converter = |_: &Path, _: &Path, _: ConvertOp| -> Result<(), ConvertError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        let err = convert(
            &converter,
            &dir.path().join("gone.exe"),
            &dir.path().join("btn_gone.png"),
            ConvertOp::ExtractToRaster,
        )
        .unwrap_err();

        assert!(matches!(err, ConvertError::SourceMissing(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reported_success_without_file_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.exe");
        fs::write(&source, b"MZ").unwrap();
        let converter = |_: &Path, _: &Path, _: ConvertOp| -> Result<(), ConvertError> { Ok(()) };

        let err = convert(
            &converter,
            &source,
            &dir.path().join("btn_app.png"),
            ConvertOp::ExtractToRaster,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::NoOutput(_)));
    }

    #[test]
    fn empty_output_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.ico");
        let target = dir.path().join("btn_app.png");
        fs::write(&source, b"ico").unwrap();
        let converter = |_: &Path, target: &Path, _: ConvertOp| -> Result<(), ConvertError> {
            fs::write(target, b"").unwrap();
            Ok(())
        };

        let err = convert(&converter, &source, &target, ConvertOp::IconToRaster).unwrap_err();
        assert!(matches!(err, ConvertError::NoOutput(_)));
        assert!(!target.exists());
    }

    #[test]
    fn failed_run_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.exe");
        let target = dir.path().join("window_icon.ico");
        fs::write(&source, b"MZ").unwrap();
        let converter = |_: &Path, target: &Path, _: ConvertOp| -> Result<(), ConvertError> {
            fs::write(target, b"half").unwrap();
            Err(ConvertError::Exit {
                code: Some(1),
                stderr: String::new(),
            })
        };

        let err =
            convert(&converter, &source, &target, ConvertOp::ExtractToIconContainer).unwrap_err();
        assert!(matches!(err, ConvertError::Exit { code: Some(1), .. }));
        assert!(!target.exists());
    }

    #[test]
    fn written_file_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.exe");
        let target = dir.path().join("btn_app.png");
        fs::write(&source, b"MZ").unwrap();
        let converter = |_: &Path, target: &Path, _: ConvertOp| -> Result<(), ConvertError> {
            fs::write(target, b"\x89PNG").unwrap();
            Ok(())
        };

        convert(&converter, &source, &target, ConvertOp::ExtractToRaster).unwrap();
        assert!(target.exists());
    }

    #[test]
    fn unavailable_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.exe");
        fs::write(&source, b"MZ").unwrap();
        let converter = PowerShellConverter::new("deck-icons-no-such-powershell");

        let err = convert(
            &converter,
            &source,
            &dir.path().join("btn_app.png"),
            ConvertOp::ExtractToRaster,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Spawn(_)));
    }

    #[test]
    fn paths_are_quoted_for_powershell() {
        assert_eq!(ps_quote(Path::new("C:/Bob's Games/a.exe")), "'C:/Bob''s Games/a.exe'");

        let script = PowerShellConverter::script(
            Path::new("C:/a.ico"),
            Path::new("C:/out/btn_a.png"),
            ConvertOp::IconToRaster,
        );
        assert!(script.contains("New-Object System.Drawing.Icon('C:/a.ico')"));
        assert!(script.contains("Save('C:/out/btn_a.png'"));
    }
}
