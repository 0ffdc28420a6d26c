//! Single-file handler

use crate::core::error::{LoggerError, Result};
use crate::core::format::FormatInfo;
use crate::core::handler::Handler;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends lines to one file, truncated when the handler is initialized.
/// Formatting is ignored; the file gets plain text.
pub struct FileHandler {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileHandler {
    /// Does not touch the filesystem; the file is created in `initialize`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handler for FileHandler {
    fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation(
                        "create log directory",
                        parent.display().to_string(),
                        e,
                    )
                })?;
            }
        }

        let file = File::create(&self.path).map_err(|e| {
            LoggerError::io_operation("create log file", self.path.display().to_string(), e)
        })?;
        *self.writer.lock() = Some(BufWriter::new(file));
        Ok(())
    }

    fn write(&self, _format: Option<&FormatInfo>, line: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        let writer = writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("log file is not open"))?;
        writeln!(writer, "{line}")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.writer.lock().as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn cleanup(&self) {
        if let Some(mut writer) = self.writer.lock().take() {
            let _ = writer.flush();
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileHandler {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.lock().take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_before_initialize_fails() {
        let handler = FileHandler::new("never-created.log");
        assert!(handler.write(None, "x").is_err());
    }

    #[test]
    fn test_initialize_truncates_and_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, "stale contents\n").unwrap();

        let handler = FileHandler::new(&path);
        handler.initialize().unwrap();
        handler.write(None, "fresh").unwrap();
        handler.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
        handler.cleanup();
    }

    #[test]
    fn test_initialize_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.log");

        let handler = FileHandler::new(&path);
        handler.initialize().unwrap();
        handler.write(None, "hello").unwrap();
        handler.cleanup();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_after_cleanup_fails() {
        let dir = tempdir().unwrap();
        let handler = FileHandler::new(dir.path().join("out.log"));
        handler.initialize().unwrap();
        handler.cleanup();

        assert!(handler.write(None, "late").is_err());
    }
}
