//! Rolling log-file handler for long-running services
//!
//! Writes into a dedicated directory, cycling to a fresh file when the
//! current one reaches its size budget or at local midnight, and pruning
//! the oldest files so the directory never outgrows its reserved space.

use crate::core::error::{LoggerError, Result};
use crate::core::format::FormatInfo;
use crate::core::handler::Handler;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Per-file size budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFileSize {
    OneMegabyte,
    TwoMegabytes,
    FourMegabytes,
    EightMegabytes,
    SixteenMegabytes,
}

impl LogFileSize {
    pub fn bytes(self) -> u64 {
        const MIB: u64 = 1024 * 1024;
        match self {
            LogFileSize::OneMegabyte => MIB,
            LogFileSize::TwoMegabytes => 2 * MIB,
            LogFileSize::FourMegabytes => 4 * MIB,
            LogFileSize::EightMegabytes => 8 * MIB,
            LogFileSize::SixteenMegabytes => 16 * MIB,
        }
    }
}

/// Whole-directory space budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFileSpace {
    OneGigabyte,
    TwoGigabytes,
}

impl LogFileSpace {
    pub fn bytes(self) -> u64 {
        const GIB: u64 = 1024 * 1024 * 1024;
        match self {
            LogFileSpace::OneGigabyte => GIB,
            LogFileSpace::TwoGigabytes => 2 * GIB,
        }
    }
}

/// After a failed cycle the handler refuses writes until this much time
/// has passed, so a full disk is not hammered on every line.
const RETRY_WINDOW: Duration = Duration::from_secs(5 * 60);

const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S%.3f";

struct Inner {
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    written: u64,
    next_retry: Option<Instant>,
    rollover_at: DateTime<Local>,
}

/// Rolling file handler named after a service.
///
/// Files are named `{service} - {timestamp}.log`, with a ` (NNN)` suffix
/// when two cycles land on the same timestamp. Cycling happens when the
/// current file reaches the size budget and at the first write past local
/// midnight. Before each new file is opened, the oldest `.log` files in
/// the directory are deleted until the reserved space can absorb another
/// full file.
pub struct ServiceFileHandler {
    directory: PathBuf,
    service_name: String,
    max_file_size: u64,
    reserved_space: u64,
    inner: Mutex<Inner>,
}

impl ServiceFileHandler {
    /// Handler with the default budgets of 8 MiB per file inside 1 GiB of
    /// reserved space.
    pub fn new(directory: impl Into<PathBuf>, service_name: impl Into<String>) -> Result<Self> {
        Self::with_presets(
            directory,
            service_name,
            LogFileSize::EightMegabytes,
            LogFileSpace::OneGigabyte,
        )
    }

    pub fn with_presets(
        directory: impl Into<PathBuf>,
        service_name: impl Into<String>,
        size: LogFileSize,
        space: LogFileSpace,
    ) -> Result<Self> {
        Self::with_limits(directory, service_name, size.bytes(), space.bytes())
    }

    /// Handler with explicit byte budgets. Fails fast when the reserved
    /// space cannot hold even one full file.
    pub fn with_limits(
        directory: impl Into<PathBuf>,
        service_name: impl Into<String>,
        max_file_size: u64,
        reserved_space: u64,
    ) -> Result<Self> {
        if max_file_size == 0 {
            return Err(LoggerError::config(
                "service file handler",
                "max file size must be positive",
            ));
        }
        if reserved_space < max_file_size {
            return Err(LoggerError::config(
                "service file handler",
                format!(
                    "reserved space ({reserved_space} bytes) is smaller than one \
                     log file ({max_file_size} bytes)"
                ),
            ));
        }

        Ok(Self {
            directory: directory.into(),
            service_name: service_name.into(),
            max_file_size,
            reserved_space,
            inner: Mutex::new(Inner {
                writer: None,
                current_path: None,
                written: 0,
                next_retry: None,
                rollover_at: next_midnight(),
            }),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Path of the file currently being written, if one is open.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.inner.lock().current_path.clone()
    }

    /// Delete every `.log` file in the directory except the one currently
    /// being written.
    pub fn clear_all_logs(&self) -> Result<()> {
        let current = self.inner.lock().current_path.clone();
        for (path, _, _) in scan_logs(&self.directory)? {
            if current.as_deref() == Some(path.as_path()) {
                continue;
            }
            fs::remove_file(&path).map_err(|e| {
                LoggerError::io_operation("delete log file", path.display().to_string(), e)
            })?;
        }
        Ok(())
    }

    /// Close the current file (if any), prune the directory to budget, and
    /// open a fresh one. On failure the handler stays closed and arms the
    /// retry window.
    fn cycle(&self, inner: &mut Inner) -> Result<()> {
        inner.next_retry = Some(Instant::now() + RETRY_WINDOW);

        if let Some(mut writer) = inner.writer.take() {
            let _ = writer.flush();
        }
        inner.current_path = None;

        self.prune_to_budget()?;

        let now = Local::now();
        let stamp = now.format(FILE_TIMESTAMP_FORMAT).to_string();
        let mut path = self
            .directory
            .join(format!("{} - {}.log", self.service_name, stamp));
        let mut attempt = 2u32;
        while path.exists() {
            path = self
                .directory
                .join(format!("{} - {} ({:03}).log", self.service_name, stamp, attempt));
            attempt += 1;
        }

        let file = File::create(&path).map_err(|e| {
            LoggerError::io_operation("create log file", path.display().to_string(), e)
        })?;

        inner.writer = Some(BufWriter::new(file));
        inner.current_path = Some(path);
        inner.written = 0;
        inner.rollover_at = next_midnight();
        inner.next_retry = None;
        Ok(())
    }

    /// Delete the oldest `.log` files until one more full-size file fits
    /// inside the reserved space.
    fn prune_to_budget(&self) -> Result<()> {
        let mut files = scan_logs(&self.directory)?;
        let mut total: u64 = files.iter().map(|(_, len, _)| len).sum();

        while total + self.max_file_size > self.reserved_space {
            let Some((path, len, _)) = files.first().cloned() else {
                break;
            };
            fs::remove_file(&path).map_err(|e| {
                LoggerError::io_operation("prune log file", path.display().to_string(), e)
            })?;
            total -= len;
            files.remove(0);
        }
        Ok(())
    }
}

impl Handler for ServiceFileHandler {
    fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                self.directory.display().to_string(),
                e,
            )
        })?;

        let mut inner = self.inner.lock();
        self.cycle(&mut inner)
    }

    fn write(&self, _format: Option<&FormatInfo>, line: &str) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.writer.is_none() {
            if let Some(at) = inner.next_retry {
                if Instant::now() < at {
                    return Err(LoggerError::writer(
                        "log file unavailable, waiting out the retry window",
                    ));
                }
            }
            self.cycle(&mut inner)?;
        }

        let line_bytes = line.len() as u64 + 1;
        if inner.written + line_bytes > self.max_file_size || Local::now() >= inner.rollover_at {
            self.cycle(&mut inner)?;
        }

        let writer = inner
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("log file is not open"))?;
        writeln!(writer, "{line}")?;
        inner.written += line_bytes;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.inner.lock().writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn cleanup(&self) {
        let mut inner = self.inner.lock();
        if let Some(mut writer) = inner.writer.take() {
            let _ = writer.flush();
        }
        inner.current_path = None;
        inner.next_retry = None;
    }

    fn name(&self) -> &str {
        "service file"
    }
}

impl Drop for ServiceFileHandler {
    fn drop(&mut self) {
        if let Some(mut writer) = self.inner.lock().writer.take() {
            let _ = writer.flush();
        }
    }
}

/// Every `.log` file in `directory` with its length, oldest first by
/// modification time.
fn scan_logs(directory: &Path) -> Result<Vec<(PathBuf, u64, std::time::SystemTime)>> {
    let entries = fs::read_dir(directory).map_err(|e| {
        LoggerError::io_operation("read log directory", directory.display().to_string(), e)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            LoggerError::io_operation("read log directory", directory.display().to_string(), e)
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| {
            LoggerError::io_operation("stat log file", path.display().to_string(), e)
        })?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        files.push((path, metadata.len(), modified));
    }

    files.sort_by_key(|(_, _, modified)| *modified);
    Ok(files)
}

fn next_midnight() -> DateTime<Local> {
    let now = Local::now();
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).single())
        .unwrap_or(now + chrono::Duration::hours(24))
}
