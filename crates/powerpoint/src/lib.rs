//! Microsoft PowerPoint automation backend for PowerPoint to PDF conversion.
//!
//! PowerPoint's `PowerPoint.Application` COM object is hosted in one
//! long-running PowerShell process per batch. Commands go in on stdin, one
//! line each, and every command answers with a single marker line.

pub mod engine;
pub mod script;

pub use engine::PowerPointEngine;
