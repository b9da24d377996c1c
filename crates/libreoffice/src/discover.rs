//! Locating the `soffice` executable.

use ppt2pdf_core::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Where the macOS app bundle installs `soffice`.
pub const MACOS_BUNDLE: &str = "/Applications/LibreOffice.app/Contents/MacOS/soffice";

/// Executable names searched for on `PATH`, in order.
pub const PROGRAM_NAMES: &[&str] = &["soffice", "libreoffice"];

const REMEDY: &str = "Install LibreOffice (macOS: brew install --cask libreoffice; \
                      Linux: your package manager's libreoffice package) \
                      or pass --soffice <path>.";

/// Find a LibreOffice executable.
///
/// An explicit path wins and must exist. Otherwise the macOS bundle location
/// is tried, then each of [`PROGRAM_NAMES`] on `PATH`.
pub fn find_soffice(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::NoEngineAvailable {
            dependency: format!("LibreOffice at {}", path.display()),
            remedy: "Check the --soffice path or PPT2PDF_SOFFICE.".into(),
        });
    }

    let bundle = Path::new(MACOS_BUNDLE);
    if bundle.is_file() {
        return Ok(bundle.to_path_buf());
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    PROGRAM_NAMES
        .iter()
        .find_map(|name| search_path(name, &path_var))
        .ok_or_else(|| Error::NoEngineAvailable {
            dependency: "LibreOffice".into(),
            remedy: REMEDY.into(),
        })
}

/// Look for `name` in each directory of a `PATH`-style list.
pub fn search_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| {
            candidate_names(name)
                .into_iter()
                .map(|n| dir.join(n))
                .find(|p| is_executable(p))
        })
}

fn candidate_names(name: &str) -> Vec<String> {
    if cfg!(windows) {
        vec![format!("{name}.exe"), format!("{name}.com"), name.to_string()]
    } else {
        vec![name.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
