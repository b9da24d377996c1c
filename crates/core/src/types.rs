//! Domain types for conversion jobs, engines and batch results.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The format of a source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary).
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from the end of a path's file name.
    ///
    /// Matches on the `.ppt`/`.pptx` suffix rather than `Path::extension`, so
    /// a file named just `.pptx` still counts.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".pptx") {
            Some(Self::Pptx)
        } else if name.ends_with(".ppt") {
            Some(Self::Ppt)
        } else {
            None
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// One file to convert: where it comes from and where the PDF goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Source presentation.
    pub source: PathBuf,
    /// Destination PDF.
    pub destination: PathBuf,
}

impl ConversionJob {
    /// Create a job with an explicit destination.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Create a job writing `<stem>.pdf` into `output_dir`.
    pub fn into_dir(source: impl Into<PathBuf>, output_dir: &Path) -> Self {
        let source = source.into();
        let stem = source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "output".into());
        let mut name = stem;
        name.push(".pdf");
        let destination = output_dir.join(name);
        Self {
            source,
            destination,
        }
    }

    /// Create a job writing the PDF next to its source.
    pub fn alongside(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::into_dir(source, &dir)
    }

    /// File name of the source, for log messages.
    pub fn source_name(&self) -> String {
        display_name(&self.source)
    }

    /// File name of the destination, for log messages.
    pub fn destination_name(&self) -> String {
        display_name(&self.destination)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The two kinds of backend that can perform a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineKind {
    /// Microsoft PowerPoint driven through its automation interface.
    NativeAutomation,
    /// A headless office suite (LibreOffice).
    HeadlessSuite,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NativeAutomation => f.write_str("PowerPoint automation"),
            Self::HeadlessSuite => f.write_str("LibreOffice headless"),
        }
    }
}

/// Which engine the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnginePreference {
    /// Native automation where available, headless suite otherwise.
    #[default]
    Auto,
    /// Only native automation.
    NativeAutomation,
    /// Only the headless suite.
    HeadlessSuite,
}

/// Engine selection settings.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Requested engine.
    pub preference: EnginePreference,
    /// Explicit path to the `soffice` executable.
    pub soffice: Option<PathBuf>,
}

impl EngineConfig {
    /// Create a config with automatic selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine preference.
    pub fn with_preference(mut self, preference: EnginePreference) -> Self {
        self.preference = preference;
        self
    }

    /// Set an explicit `soffice` path.
    pub fn with_soffice(mut self, soffice: Option<PathBuf>) -> Self {
        self.soffice = soffice;
        self
    }
}

/// A job that did not produce a PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedJob {
    /// The job that failed.
    pub job: ConversionJob,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Jobs whose PDF was written.
    pub converted: Vec<ConversionJob>,
    /// Jobs that failed.
    pub failed: Vec<FailedJob>,
}

impl BatchReport {
    /// True when no job failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of jobs attempted.
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_is_case_insensitive() {
        assert_eq!(PresentationFormat::from_extension("PPTX"), Some(PresentationFormat::Pptx));
        assert_eq!(PresentationFormat::from_extension("Ppt"), Some(PresentationFormat::Ppt));
        assert_eq!(PresentationFormat::from_extension("pdf"), None);
    }

    #[test]
    fn test_from_path_matches_suffix() {
        assert_eq!(PresentationFormat::from_path(Path::new("/a/Deck.PPTX")), Some(PresentationFormat::Pptx));
        assert_eq!(PresentationFormat::from_path(Path::new(".pptx")), Some(PresentationFormat::Pptx));
        assert_eq!(PresentationFormat::from_path(Path::new("old.ppt")), Some(PresentationFormat::Ppt));
        assert_eq!(PresentationFormat::from_path(Path::new("pptx")), None);
        assert_eq!(PresentationFormat::from_path(Path::new("deck.pptx.bak")), None);
    }

    #[test]
    fn test_from_magic() {
        assert_eq!(
            PresentationFormat::from_magic(b"PK\x03\x04rest"),
            Some(PresentationFormat::Pptx)
        );
        assert_eq!(
            PresentationFormat::from_magic(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Some(PresentationFormat::Ppt)
        );
        assert_eq!(PresentationFormat::from_magic(b"PK"), None);
        assert_eq!(PresentationFormat::from_magic(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_job_into_dir() {
        let job = ConversionJob::into_dir("/in/talk.final.pptx", Path::new("/out"));
        assert_eq!(job.destination, PathBuf::from("/out/talk.final.pdf"));
        assert_eq!(job.source_name(), "talk.final.pptx");
        assert_eq!(job.destination_name(), "talk.final.pdf");
    }

    #[test]
    fn test_job_alongside() {
        let job = ConversionJob::alongside("/slides/b.ppt");
        assert_eq!(job.destination, PathBuf::from("/slides/b.pdf"));

        let bare = ConversionJob::alongside("a.pptx");
        assert_eq!(bare.destination, PathBuf::from("a.pdf"));
    }

    #[test]
    fn test_report_success() {
        let mut report = BatchReport::default();
        assert!(report.is_success());
        report.failed.push(FailedJob {
            job: ConversionJob::new("a.ppt", "a.pdf"),
            reason: "broken".into(),
        });
        assert!(!report.is_success());
        assert_eq!(report.attempted(), 1);
    }
}
