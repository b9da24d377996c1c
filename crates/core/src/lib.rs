//! Core types, file discovery, engine traits and the batch driver
//! for converting PowerPoint presentations to PDF.

pub mod driver;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod types;

pub use driver::BatchConverter;
pub use engine::{ConversionEngine, EngineSession, SessionGuard};
pub use enumerate::{presentation_file, presentation_files, sniff_format};
pub use error::{Error, Result};
pub use types::{
    BatchReport, ConversionJob, EngineConfig, EngineKind, EnginePreference, FailedJob,
    PresentationFormat,
};
