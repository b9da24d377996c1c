//! Discovery of presentation files in a folder.

use crate::error::{Error, Result};
use crate::types::PresentationFormat;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// List the PPT/PPTX files directly inside `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are skipped. The folder is
/// not searched recursively.
pub fn presentation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingInputDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Follows symlinks, so a link to a deck counts as a deck.
        if !path.is_file() {
            continue;
        }
        if PresentationFormat::from_path(&path).is_some() {
            files.push(path);
        } else {
            log::trace!("Skipping {}", path.display());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} presentation(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Validate a single input file and return its format.
pub fn presentation_file(path: &Path) -> Result<PresentationFormat> {
    if !path.is_file() {
        return Err(Error::MissingInputFile(path.to_path_buf()));
    }
    PresentationFormat::from_path(path).ok_or_else(|| {
        Error::UnsupportedFormat(format!("{} is not a .ppt or .pptx file", path.display()))
    })
}

/// Read the first bytes of `path` and detect its format from the content.
///
/// Returns `None` when the header matches neither PPTX nor PPT or the file
/// cannot be read.
pub fn sniff_format(path: &Path) -> Option<PresentationFormat> {
    let mut file = File::open(path).ok()?;
    let mut magic = [0u8; 8];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return None,
        }
    }
    PresentationFormat::from_magic(&magic[..filled])
}
