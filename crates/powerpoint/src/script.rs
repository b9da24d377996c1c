//! PowerShell command lines sent to the automation host, and reply parsing.

/// `ppSaveAsPDF` from the `PpSaveAsFileType` enumeration.
pub const PP_SAVE_AS_PDF: i32 = 32;

const OK_MARKER: &str = "@@OK";
const ERR_MARKER: &str = "@@ERR";

/// Quote `s` as a PowerShell single-quoted string literal.
///
/// PowerShell also accepts the typographic single quotes as delimiters, so
/// those are doubled too.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            out.push(c);
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Wrap `body` so it answers with exactly one marker line.
fn guarded(body: &str) -> String {
    format!(
        "try {{ {body}; Write-Output '{OK_MARKER}' }} catch {{ Write-Output ('{ERR_MARKER} ' + ($_.Exception.Message -replace '[\\r\\n]+', ' ')) }}"
    )
}

/// Create the application object for the session.
pub fn start_application() -> String {
    guarded(
        "$ErrorActionPreference = 'Stop'; \
         [Console]::InputEncoding = [Console]::OutputEncoding = [Text.UTF8Encoding]::new($false); \
         $app = New-Object -ComObject PowerPoint.Application; \
         $app.Visible = -1",
    )
}

/// Open `source` read-only without a window, save it as PDF and close it.
pub fn save_as_pdf(source: &str, destination: &str) -> String {
    guarded(&format!(
        "$p = $app.Presentations.Open({}, -1, 0, 0); \
         try {{ $p.SaveAs({}, {}) }} finally {{ $p.Close() }}",
        quote(source),
        quote(destination),
        PP_SAVE_AS_PDF
    ))
}

/// Quit the application.
pub fn quit_application() -> String {
    guarded("if ($app) { $app.Quit() }")
}

/// Check whether the PowerPoint ProgID is registered; prints `yes` or `no`.
pub fn probe_registration() -> &'static str {
    "if ([type]::GetTypeFromProgID('PowerPoint.Application')) { 'yes' } else { 'no' }"
}

/// Interpret one stdout line from the host.
///
/// Returns `None` for lines that are not replies (stray output), otherwise
/// the outcome of the command.
pub fn parse_reply(line: &str) -> Option<Result<(), String>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line == OK_MARKER {
        return Some(Ok(()));
    }
    line.strip_prefix(ERR_MARKER)
        .map(|message| Err(message.trim().to_string()))
}
