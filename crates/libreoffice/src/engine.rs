//! LibreOffice engine and per-batch session.

use crate::discover::find_soffice;
use ppt2pdf_core::{ConversionEngine, ConversionJob, EngineKind, EngineSession, Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Converts presentations with a headless `soffice`.
#[derive(Debug, Clone)]
pub struct LibreOfficeEngine {
    program: PathBuf,
}

impl LibreOfficeEngine {
    /// Use the given `soffice` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate `soffice` (see [`find_soffice`]) and build an engine for it.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        find_soffice(explicit).map(Self::new)
    }

    /// The executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ConversionEngine for LibreOfficeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::HeadlessSuite
    }

    fn describe(&self) -> String {
        format!("LibreOffice ({})", self.program.display())
    }

    fn open_session(&self) -> Result<Box<dyn EngineSession>> {
        Ok(Box::new(LibreOfficeSession::start(&self.program)?))
    }
}

/// One batch worth of `soffice` runs sharing a private profile.
struct LibreOfficeSession {
    program: PathBuf,
    profile_url: String,
    profile: TempDir,
}

impl LibreOfficeSession {
    /// Create the private profile shared by every run in the batch.
    fn start(program: &Path) -> Result<Self> {
        let profile = tempfile::Builder::new()
            .prefix("ppt2pdf-profile-")
            .tempdir()
            .map_err(|e| Error::Session(format!("Failed to create LibreOffice profile: {}", e)))?;
        log::debug!("Using LibreOffice profile {}", profile.path().display());

        Ok(Self {
            program: program.to_path_buf(),
            profile_url: file_url(profile.path()),
            profile,
        })
    }
}

impl EngineSession for LibreOfficeSession {
    fn convert(&mut self, job: &ConversionJob) -> Result<()> {
        let outdir = output_dir(&job.destination);
        let args = conversion_args(&self.profile_url, outdir, &job.source);
        log::debug!("Running {} {:?}", self.program.display(), args);

        // A PDF left by an earlier run must not count as this run's output.
        let produced = ConversionJob::into_dir(&job.source, outdir).destination;
        remove_stale(&job.source, &job.destination)?;
        if produced != job.destination {
            remove_stale(&job.source, &produced)?;
        }

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                Error::conversion(
                    &job.source,
                    format!("failed to run {}: {}", self.program.display(), e),
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !output.status.success() {
            return Err(Error::conversion(
                &job.source,
                format!("soffice exited with {}: {}", output.status, stderr),
            ));
        }

        // soffice names the PDF after the source stem.
        if produced != job.destination && produced.is_file() {
            std::fs::rename(&produced, &job.destination).map_err(|e| {
                Error::conversion(
                    &job.source,
                    format!("failed to move {}: {}", produced.display(), e),
                )
            })?;
        }

        // Load failures still exit 0, so the PDF itself is the success signal.
        if !job.destination.is_file() {
            let detail = if stderr.is_empty() { "no output" } else { stderr };
            return Err(Error::conversion(
                &job.source,
                format!("soffice did not write a PDF ({})", detail),
            ));
        }

        Ok(())
    }

    fn shutdown(self: Box<Self>) -> Result<()> {
        log::debug!("Removing LibreOffice profile {}", self.profile.path().display());
        self.profile.close()?;
        Ok(())
    }
}

fn remove_stale(source: &Path, pdf: &Path) -> Result<()> {
    match std::fs::remove_file(pdf) {
        Ok(()) => {
            log::debug!("Removed existing {}", pdf.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::conversion(
            source,
            format!("failed to replace existing {}: {}", pdf.display(), e),
        )),
    }
}

fn output_dir(destination: &Path) -> &Path {
    match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Arguments for converting one file into `outdir`.
fn conversion_args(profile_url: &str, outdir: &Path, source: &Path) -> Vec<OsString> {
    vec![
        format!("-env:UserInstallation={}", profile_url).into(),
        "--headless".into(),
        "--norestore".into(),
        "--convert-to".into(),
        "pdf".into(),
        "--outdir".into(),
        outdir.as_os_str().to_owned(),
        source.as_os_str().to_owned(),
    ]
}

/// Build a `file://` URL for a local path, percent-encoding unsafe bytes.
fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut url = String::from(if raw.starts_with('/') { "file://" } else { "file:///" });
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' | b':' => {
                url.push(byte as char)
            }
            _ => url.push_str(&format!("%{:02X}", byte)),
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_unix() {
        assert_eq!(file_url(Path::new("/tmp/profile")), "file:///tmp/profile");
        assert_eq!(
            file_url(Path::new("/tmp/my profile")),
            "file:///tmp/my%20profile"
        );
    }

    #[test]
    fn test_file_url_drive_letter() {
        assert_eq!(
            file_url(Path::new("C:/Users/a b/Temp")),
            "file:///C:/Users/a%20b/Temp"
        );
    }

    #[test]
    fn test_conversion_args() {
        let args = conversion_args("file:///p", Path::new("/out"), Path::new("/in/a.pptx"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-env:UserInstallation=file:///p",
                "--headless",
                "--norestore",
                "--convert-to",
                "pdf",
                "--outdir",
                "/out",
                "/in/a.pptx",
            ]
        );
    }

    #[test]
    fn test_output_dir_defaults_to_cwd() {
        assert_eq!(output_dir(Path::new("a.pdf")), Path::new("."));
        assert_eq!(output_dir(Path::new("/x/a.pdf")), Path::new("/x"));
    }

    #[test]
    fn test_session_removes_profile_on_shutdown() {
        let session = LibreOfficeSession::start(Path::new("soffice")).unwrap();
        let profile = session.profile.path().to_path_buf();
        assert!(profile.is_dir());
        assert!(session.profile_url.ends_with(
            profile.file_name().unwrap().to_str().unwrap()
        ));

        Box::new(session).shutdown().unwrap();
        assert!(!profile.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_with_stub_program() {
        use std::os::unix::fs::PermissionsExt;

        // Stub that mimics soffice: writes <outdir>/<stem>.pdf.
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("soffice");
        std::fs::write(
            &stub,
            "#!/bin/sh\n\
             while [ \"$1\" != \"--outdir\" ]; do shift; done\n\
             out=\"$2\"; src=\"$3\"\n\
             case \"$src\" in *broken*) echo 'Error: source file could not be loaded' >&2; exit 0;; esac\n\
             name=$(basename \"$src\"); printf '%%PDF' > \"$out/${name%.*}.pdf\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let input = dir.path().join("deck.pptx");
        let broken = dir.path().join("broken.pptx");
        std::fs::write(&input, b"PK\x03\x04").unwrap();
        std::fs::write(&broken, b"PK\x03\x04").unwrap();

        let engine = LibreOfficeEngine::new(&stub);
        let mut session = engine.open_session().unwrap();

        let ok = ConversionJob::into_dir(&input, dir.path());
        session.convert(&ok).unwrap();
        assert!(dir.path().join("deck.pdf").is_file());

        let renamed = ConversionJob::new(&input, dir.path().join("renamed.pdf"));
        session.convert(&renamed).unwrap();
        assert!(dir.path().join("renamed.pdf").is_file());

        let bad = ConversionJob::into_dir(&broken, dir.path());
        let err = session.convert(&bad).unwrap_err();
        assert!(matches!(err, Error::Conversion { ref reason, .. } if reason.contains("could not be loaded")));

        session.shutdown().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_leftover_pdf_does_not_mask_load_failure() {
        use std::os::unix::fs::PermissionsExt;

        // Reports a load failure on stderr but exits 0, as soffice does.
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("soffice");
        std::fs::write(
            &stub,
            "#!/bin/sh
echo 'Error: source file could not be loaded' >&2
exit 0
",
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let deck = dir.path().join("deck.pptx");
        std::fs::write(&deck, b"PK\x03\x04").unwrap();
        let previous = dir.path().join("deck.pdf");
        std::fs::write(&previous, b"%PDF from an earlier run").unwrap();
        let renamed = dir.path().join("renamed.pdf");
        std::fs::write(&renamed, b"%PDF from an earlier run").unwrap();

        let mut session = LibreOfficeEngine::new(&stub).open_session().unwrap();

        let job = ConversionJob::into_dir(&deck, dir.path());
        let err = session.convert(&job).unwrap_err();
        assert!(matches!(err, Error::Conversion { ref reason, .. } if reason.contains("could not be loaded")));
        assert!(!previous.exists());

        // A stale stem-named PDF must not be renamed into place either.
        std::fs::write(&previous, b"%PDF from an earlier run").unwrap();
        let job = ConversionJob::new(&deck, &renamed);
        assert!(session.convert(&job).is_err());
        assert!(!renamed.exists());

        session.shutdown().unwrap();
    }

    #[test]
    fn test_missing_program_is_a_conversion_failure() {
        let dir = tempfile::tempdir().unwrap();
        let engine = LibreOfficeEngine::new(dir.path().join("no-such-soffice"));
        let mut session = engine.open_session().unwrap();
        let job = ConversionJob::into_dir(dir.path().join("a.pptx"), dir.path());
        assert!(matches!(session.convert(&job), Err(Error::Conversion { .. })));
        session.shutdown().unwrap();
    }
}
