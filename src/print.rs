//! Print dispatch.
//!
//! Thin wrapper around the platform spooler: `lp`/`lpstat` on Unix and
//! PowerShell on Windows. Printing is best-effort by design; callers
//! treat a [`Error::Print`] as a warning, not a pipeline failure.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// A known printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub name: String,
    pub is_default: bool,
}

/// How a print attempt ended, recorded per processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum PrintOutcome {
    /// Job handed to the spooler for the named printer
    Sent(String),
    /// Printing was not requested
    Skipped,
    /// Dispatch failed; the error text
    Failed(String),
}

/// Dispatches print jobs to the platform spooler.
#[derive(Debug, Clone, Default)]
pub struct PrintDispatcher {
    /// Configured printer, used when no explicit printer is given
    pub printer: Option<String>,
    /// Fall back to the OS default printer when nothing is configured
    pub use_default: bool,
}

impl PrintDispatcher {
    pub fn new(printer: Option<String>, use_default: bool) -> Self {
        Self {
            printer,
            use_default,
        }
    }

    /// Resolve the target printer: explicit request, then configured
    /// printer, then the OS default if allowed.
    fn resolve(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(name) = explicit {
            return Ok(name.to_string());
        }
        if let Some(name) = &self.printer {
            return Ok(name.clone());
        }
        if self.use_default {
            if let Some(name) = default_printer() {
                return Ok(name);
            }
            return Err(Error::Print("no default printer available".into()));
        }
        Err(Error::Print("no printer configured".into()))
    }

    /// Send a file to a printer. Returns the printer name used.
    pub fn dispatch(&self, path: &Path, explicit: Option<&str>) -> Result<String> {
        let printer = self.resolve(explicit)?;
        log::info!("printing {} on {printer}", path.display());
        send_to_spooler(path, &printer)?;
        Ok(printer)
    }
}

#[cfg(unix)]
fn send_to_spooler(path: &Path, printer: &str) -> Result<()> {
    let output = Command::new("lp")
        .arg("-d")
        .arg(printer)
        .arg(path)
        .output()
        .map_err(|e| Error::Print(format!("cannot run lp: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Print(format!("lp failed: {}", stderr.trim())));
    }
    Ok(())
}

#[cfg(windows)]
fn send_to_spooler(path: &Path, printer: &str) -> Result<()> {
    let command = format!(
        "Start-Process -FilePath \"{}\" -Verb Print -ArgumentList \"/d:{printer}\"",
        path.display()
    );
    let output = Command::new("powershell")
        .args(["-Command", &command])
        .output()
        .map_err(|e| Error::Print(format!("cannot run powershell: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Print(format!("print command failed: {}", stderr.trim())));
    }
    Ok(())
}

/// The OS default printer, if one is set.
#[cfg(unix)]
pub fn default_printer() -> Option<String> {
    let output = Command::new("lpstat").arg("-d").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    // "system default destination: printername"
    stdout
        .lines()
        .find_map(|line| line.rsplit_once(": ").map(|(_, name)| name.trim().to_string()))
        .filter(|name| !name.is_empty())
}

#[cfg(windows)]
pub fn default_printer() -> Option<String> {
    let output = Command::new("powershell")
        .args([
            "-Command",
            "(Get-CimInstance Win32_Printer | Where-Object Default).Name",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// List printers known to the spooler.
#[cfg(unix)]
pub fn list_printers() -> Result<Vec<PrinterInfo>> {
    let output = Command::new("lpstat")
        .arg("-p")
        .output()
        .map_err(|e| Error::Print(format!("cannot run lpstat: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Print(format!("lpstat failed: {}", stderr.trim())));
    }

    let default = default_printer();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let printers = stdout
        .lines()
        .filter(|line| line.starts_with("printer"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|name| PrinterInfo {
            name: name.to_string(),
            is_default: default.as_deref() == Some(name),
        })
        .collect();
    Ok(printers)
}

#[cfg(windows)]
pub fn list_printers() -> Result<Vec<PrinterInfo>> {
    let output = Command::new("powershell")
        .args(["-Command", "(Get-Printer).Name"])
        .output()
        .map_err(|e| Error::Print(format!("cannot run powershell: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Print(format!("Get-Printer failed: {}", stderr.trim())));
    }

    let default = default_printer();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let printers = stdout
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| PrinterInfo {
            name: name.to_string(),
            is_default: default.as_deref() == Some(name),
        })
        .collect();
    Ok(printers)
}
