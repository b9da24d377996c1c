//! Choosing a conversion engine for this machine.

use ppt2pdf_core::{ConversionEngine, EngineConfig, EnginePreference, Error, Result};
use ppt2pdf_libreoffice::LibreOfficeEngine;
use ppt2pdf_powerpoint::PowerPointEngine;

/// Pick the engine to use for this run.
///
/// `Auto` prefers PowerPoint automation on Windows and falls back to
/// LibreOffice everywhere.
pub fn select_engine(config: &EngineConfig) -> Result<Box<dyn ConversionEngine>> {
    match config.preference {
        EnginePreference::NativeAutomation => Ok(Box::new(PowerPointEngine::detect()?)),
        EnginePreference::HeadlessSuite => Ok(Box::new(LibreOfficeEngine::discover(
            config.soffice.as_deref(),
        )?)),
        EnginePreference::Auto => {
            if cfg!(windows) {
                match PowerPointEngine::detect() {
                    Ok(engine) => return Ok(Box::new(engine)),
                    Err(e) => log::debug!("{}; trying LibreOffice", e),
                }
            }

            match LibreOfficeEngine::discover(config.soffice.as_deref()) {
                Ok(engine) => Ok(Box::new(engine)),
                Err(_) if cfg!(windows) && config.soffice.is_none() => {
                    Err(Error::NoEngineAvailable {
                        dependency: "Microsoft PowerPoint or LibreOffice".into(),
                        remedy: "Install Microsoft PowerPoint, or install LibreOffice \
                                 and pass --soffice <path>."
                            .into(),
                    })
                }
                Err(e) => Err(e),
            }
        }
    }
}
