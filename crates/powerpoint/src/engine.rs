//! PowerPoint engine and the PowerShell-hosted session.

use crate::script;
use ppt2pdf_core::{ConversionEngine, ConversionJob, EngineKind, EngineSession, Error, Result};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

const DEFAULT_SHELL: &str = "powershell";
const HOST_ARGS: &[&str] = &["-NoProfile", "-NonInteractive", "-Command", "-"];

/// Converts presentations by automating Microsoft PowerPoint.
#[derive(Debug, Clone)]
pub struct PowerPointEngine {
    shell: PathBuf,
}

impl PowerPointEngine {
    /// Use the default `powershell` host.
    pub fn new() -> Self {
        Self::with_shell(DEFAULT_SHELL)
    }

    /// Use a specific PowerShell executable (e.g. `pwsh`).
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Return an engine if PowerPoint automation is usable on this machine.
    pub fn detect() -> Result<Self> {
        let engine = Self::new();
        if engine.is_available() {
            Ok(engine)
        } else {
            Err(Error::NoEngineAvailable {
                dependency: "Microsoft PowerPoint".into(),
                remedy: "Run on Windows with Microsoft PowerPoint installed.".into(),
            })
        }
    }

    /// Whether PowerPoint is registered for automation. Always false off Windows.
    pub fn is_available(&self) -> bool {
        if !cfg!(windows) {
            return false;
        }

        let output = Command::new(&self.shell)
            .args(["-NoProfile", "-NonInteractive", "-Command", script::probe_registration()])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) => String::from_utf8_lossy(&out.stdout).trim() == "yes",
            Err(e) => {
                log::debug!("Could not run {}: {}", self.shell.display(), e);
                false
            }
        }
    }
}

impl Default for PowerPointEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionEngine for PowerPointEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::NativeAutomation
    }

    fn describe(&self) -> String {
        format!("PowerPoint via {}", self.shell.display())
    }

    fn open_session(&self) -> Result<Box<dyn EngineSession>> {
        let mut child = Command::new(&self.shell)
            .args(HOST_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                Error::Session(format!("Failed to start {}: {}", self.shell.display(), e))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Session("PowerShell host has no stdio pipes".into()));
        };

        let mut session = PowerPointSession {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        };

        if let Err(e) = session.request(&script::start_application()) {
            session.terminate();
            return Err(Error::Session(format!("Failed to start PowerPoint: {}", e)));
        }

        Ok(Box::new(session))
    }
}

/// A PowerShell process holding one `PowerPoint.Application`.
struct PowerPointSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl PowerPointSession {
    /// Send one command line and wait for its marker reply.
    fn request(&mut self, command: &str) -> std::result::Result<(), String> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| "host input is closed".to_string())?;
        writeln!(stdin, "{}", command)
            .and_then(|_| stdin.flush())
            .map_err(|e| format!("failed to write to PowerShell: {}", e))?;

        // Stray output may be in the console code page, so decode lossily
        // rather than fail and leave this command's reply unread.
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = self
                .stdout
                .read_until(b'\n', &mut buf)
                .map_err(|e| format!("failed to read from PowerShell: {}", e))?;
            if read == 0 {
                return Err("PowerShell exited unexpectedly".into());
            }
            let line = String::from_utf8_lossy(&buf);
            match script::parse_reply(&line) {
                Some(outcome) => return outcome,
                None => log::debug!("powershell: {}", line.trim_end()),
            }
        }
    }

    /// Close input and wait for the host to exit.
    fn terminate(&mut self) {
        if let Some(mut stdin) = self.stdin.take() {
            let _ = writeln!(stdin, "exit");
        }
        if let Err(e) = self.child.wait() {
            log::warn!("Failed to wait for PowerShell: {}", e);
        }
    }
}

impl EngineSession for PowerPointSession {
    fn convert(&mut self, job: &ConversionJob) -> Result<()> {
        // PowerPoint resolves relative paths against its own working directory.
        let source = absolute(&job.source)?;
        let destination = absolute(&job.destination)?;
        let command = script::save_as_pdf(&source.to_string_lossy(), &destination.to_string_lossy());
        self.request(&command)
            .map_err(|reason| Error::conversion(&job.source, reason))
    }

    fn shutdown(mut self: Box<Self>) -> Result<()> {
        let quit = self.request(&script::quit_application());
        self.terminate();
        quit.map_err(|e| Error::Session(format!("PowerPoint did not quit cleanly: {}", e)))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
