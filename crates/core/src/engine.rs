//! Conversion engine abstraction and scoped session handling.
//!
//! An engine is the external software that actually writes the PDF. Each
//! batch opens one [`EngineSession`] through a [`SessionGuard`], which shuts
//! the session down exactly once however the batch ends.

use crate::error::{Error, Result};
use crate::types::{ConversionJob, EngineKind};

/// A backend able to convert presentations to PDF.
pub trait ConversionEngine {
    /// Which kind of backend this is.
    fn kind(&self) -> EngineKind;

    /// Short description for log messages, e.g. the executable in use.
    fn describe(&self) -> String;

    /// Start the external engine and return a session for a batch.
    fn open_session(&self) -> Result<Box<dyn EngineSession>>;
}

/// A live handle to an external engine.
pub trait EngineSession {
    /// Convert one file, blocking until the PDF is written or the engine fails.
    fn convert(&mut self, job: &ConversionJob) -> Result<()>;

    /// Release the engine. Consumes the session so it cannot run twice.
    fn shutdown(self: Box<Self>) -> Result<()>;
}

/// Owns an [`EngineSession`] for the duration of a batch.
///
/// The session is shut down by [`SessionGuard::release`], or on drop if the
/// guard goes out of scope first (early return, panic).
pub struct SessionGuard {
    session: Option<Box<dyn EngineSession>>,
}

impl SessionGuard {
    /// Open a session on `engine`.
    pub fn acquire(engine: &dyn ConversionEngine) -> Result<Self> {
        log::debug!("Starting {}", engine.describe());
        let session = engine.open_session()?;
        Ok(Self {
            session: Some(session),
        })
    }

    /// Convert one job through the held session.
    pub fn convert(&mut self, job: &ConversionJob) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.convert(job),
            None => Err(Error::Session("session already released".into())),
        }
    }

    /// Shut the session down and report any teardown error.
    pub fn release(mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session.shutdown(),
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.shutdown() {
                log::warn!("Failed to shut down conversion engine: {}", e);
            }
        }
    }
}
