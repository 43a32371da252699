//! Size-based log file rotation.
//!
//! [`RotatingFileWriter`] appends to a file and, once the next write would
//! push it past `max_bytes`, shifts the existing backups up by one
//! (`app.log.1` becomes `app.log.2`, and so on), moves the live file to
//! `app.log.1`, and starts a fresh file. At most `backup_count` backups are
//! kept; the oldest is deleted. With no backups allowed the file is never
//! rotated and keeps growing.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default rotation threshold (10 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of backups kept.
pub const DEFAULT_BACKUP_COUNT: usize = 10;

/// A file writer that rotates by size.
///
/// Rotation is disabled when either `max_bytes` or `backup_count` is zero.
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    /// Path of the live log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently in the live file.
    pub fn len(&self) -> u64 {
        self.written
    }

    /// Whether the live file is empty.
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Path of backup number `index` (1 is the most recent).
    pub fn backup_path(&self, index: usize) -> PathBuf {
        backup_path(&self.path, index)
    }

    fn should_roll(&self, incoming: usize) -> bool {
        self.max_bytes > 0
            && self.backup_count > 0
            && self.written > 0
            && self.written + incoming as u64 >= self.max_bytes
    }

    /// Rotate now, regardless of size. Does nothing beyond a flush when no
    /// backups are kept.
    pub fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backup_count == 0 {
            return Ok(());
        }

        for index in (1..self.backup_count).rev() {
            let src = self.backup_path(index);
            if src.exists() {
                replace(&src, &self.backup_path(index + 1))?;
            }
        }
        replace(&self.path, &self.backup_path(1))?;
        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_roll(buf.len()) {
            self.roll()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

// Rename, removing the destination first so this also works where rename
// does not overwrite.
fn replace(src: &Path, dst: &Path) -> io::Result<()> {
    if dst.exists() {
        fs::remove_file(dst)?;
    }
    fs::rename(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/app.log");
        let writer = RotatingFileWriter::open(&path, 100, 2).unwrap();
        assert!(path.exists());
        assert!(writer.is_empty());
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();

        let mut writer = RotatingFileWriter::open(&path, 0, 2).unwrap();
        assert_eq!(writer.len(), 4);
        writer.write_all(b"new\n").unwrap();
        assert_eq!(read(&path), "old\nnew\n");
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 10, 2).unwrap();

        writer.write_all(b"aaaaaa\n").unwrap();
        writer.write_all(b"bbbbbb\n").unwrap();
        writer.write_all(b"cccccc\n").unwrap();
        writer.write_all(b"dddddd\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(read(&path), "dddddd\n");
        assert_eq!(read(&writer.backup_path(1)), "cccccc\n");
        assert_eq!(read(&writer.backup_path(2)), "bbbbbb\n");
        assert!(!writer.backup_path(3).exists());
    }

    #[test]
    fn test_zero_backups_keeps_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 10, 0).unwrap();

        writer.write_all(b"aaaaaa\n").unwrap();
        writer.write_all(b"bbbbbb\n").unwrap();
        writer.roll().unwrap();
        writer.write_all(b"cccccc\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(read(&path), "aaaaaa\nbbbbbb\ncccccc\n");
        assert_eq!(writer.len(), 21);
        assert!(!writer.backup_path(1).exists());
    }

    #[test]
    fn test_zero_max_bytes_never_rotates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 0, 3).unwrap();

        for _ in 0..100 {
            writer.write_all(b"line\n").unwrap();
        }

        assert_eq!(writer.len(), 500);
        assert!(!writer.backup_path(1).exists());
    }

    #[test]
    fn test_oversized_record_into_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 4, 1).unwrap();

        writer.write_all(b"longer than four\n").unwrap();
        assert!(!writer.backup_path(1).exists());
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/var/log/app.log"), 3),
            PathBuf::from("/var/log/app.log.3")
        );
    }
}
