//! Headless LibreOffice backend for PowerPoint to PDF conversion.
//!
//! Runs `soffice --headless --convert-to pdf` once per presentation, sharing a
//! private user profile across the batch.

pub mod discover;
pub mod engine;

pub use discover::find_soffice;
pub use engine::LibreOfficeEngine;
