//! Sequential batch conversion through a single engine session.

use crate::engine::{ConversionEngine, SessionGuard};
use crate::enumerate::sniff_format;
use crate::error::{Error, Result};
use crate::types::{BatchReport, ConversionJob, FailedJob, PresentationFormat};
use std::collections::BTreeSet;
use std::path::Path;

/// Converts a list of jobs one at a time with one engine session.
pub struct BatchConverter<'a> {
    engine: &'a dyn ConversionEngine,
}

impl<'a> BatchConverter<'a> {
    /// Create a converter driving `engine`.
    pub fn new(engine: &'a dyn ConversionEngine) -> Self {
        Self { engine }
    }

    /// Convert every job in order.
    ///
    /// Destination folders are created before the first conversion. A job
    /// that fails is recorded in the report and the batch moves on. Errors
    /// are returned only when the batch cannot start at all.
    pub fn run(&self, jobs: &[ConversionJob]) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        prepare_destinations(jobs)?;
        if jobs.is_empty() {
            return Ok(report);
        }

        let mut session = SessionGuard::acquire(self.engine)?;
        for (idx, job) in jobs.iter().enumerate() {
            log::debug!(
                "[{}/{}] {} -> {}",
                idx + 1,
                jobs.len(),
                job.source.display(),
                job.destination.display()
            );
            warn_on_format_mismatch(&job.source);

            match session.convert(job) {
                Ok(()) => {
                    log::info!("Converted: {} -> {}", job.source_name(), job.destination_name());
                    report.converted.push(job.clone());
                }
                Err(e) => {
                    let reason = failure_reason(e);
                    log::error!("Error converting {}: {}", job.source_name(), reason);
                    report.failed.push(FailedJob {
                        job: job.clone(),
                        reason,
                    });
                }
            }
        }

        if let Err(e) = session.release() {
            log::warn!("Failed to shut down {}: {}", self.engine.describe(), e);
        }

        Ok(report)
    }
}

/// Create each distinct destination folder once.
fn prepare_destinations(jobs: &[ConversionJob]) -> Result<()> {
    let dirs: BTreeSet<&Path> = jobs
        .iter()
        .filter_map(|job| job.destination.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
        .collect();

    for dir in dirs {
        if !dir.is_dir() {
            log::debug!("Creating output folder {}", dir.display());
        }
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn warn_on_format_mismatch(source: &Path) {
    let Some(declared) = PresentationFormat::from_path(source) else {
        return;
    };
    match sniff_format(source) {
        Some(actual) if actual != declared => log::warn!(
            "{} looks like {:?} content despite its extension",
            source.display(),
            actual
        ),
        None => log::warn!("{} does not have a PowerPoint file header", source.display()),
        _ => {}
    }
}

fn failure_reason(err: Error) -> String {
    match err {
        Error::Conversion { reason, .. } => reason,
        other => other.to_string(),
    }
}
