//! Process launching.
//!
//! Apps start in their executable's directory. Elevated apps go through the
//! platform's elevation prompt instead of being spawned directly.

use deck_conf::{AppRecord, LauncherPaths};
use log::info;
use std::io;
use std::path::Path;
use std::process::Command;

/// Start `app`. A missing executable is reported as `NotFound`.
pub fn launch(paths: &LauncherPaths, app: &AppRecord) -> io::Result<()> {
    let exe = paths.resolve(&app.exe);
    if !exe.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", exe.display()),
        ));
    }

    let workdir = exe.parent().unwrap_or(&paths.base_dir);

    if app.elevated {
        launch_elevated(&exe, &app.args, workdir)
    } else {
        let child = Command::new(&exe)
            .args(split_args(&app.args))
            .current_dir(workdir)
            .spawn()?;
        info!("Started {} (pid {})", exe.display(), child.id());
        Ok(())
    }
}

#[cfg(windows)]
fn launch_elevated(exe: &Path, args: &str, workdir: &Path) -> io::Result<()> {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let mut script = format!(
        "Start-Process -FilePath {} -WorkingDirectory {} -Verb RunAs",
        ps_quote(&exe.to_string_lossy()),
        ps_quote(&workdir.to_string_lossy())
    );
    if !args.trim().is_empty() {
        script.push_str(&format!(" -ArgumentList {}", ps_quote(args)));
    }

    // Waits for the elevation prompt only, not for the app itself
    let status = Command::new("powershell")
        .args(["-NoLogo", "-NoProfile", "-NonInteractive", "-Command", &script])
        .creation_flags(CREATE_NO_WINDOW)
        .status()?;

    if status.success() {
        info!("Started {} elevated", exe.display());
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "elevation of {} failed or was declined ({})",
            exe.display(),
            status
        )))
    }
}

#[cfg(not(windows))]
fn launch_elevated(exe: &Path, args: &str, workdir: &Path) -> io::Result<()> {
    let child = Command::new("pkexec")
        .arg(exe)
        .args(split_args(args))
        .current_dir(workdir)
        .spawn()?;
    info!("Started {} via pkexec (pid {})", exe.display(), child.id());
    Ok(())
}

#[cfg(windows)]
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Split an argument string on whitespace. Double quotes group words and
/// are removed; `""` yields an empty argument.
pub fn split_args(args: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for ch in args.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    result.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }

    if pending {
        result.push(current);
    }

    result
}
