//! Line-oriented storage backends.
//!
//! The log is a sequence of text lines in append order. Backends only move
//! lines around; parsing and validation live in `sl-core`.

use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fs2::FileExt;

/// Exclusive writer lock, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    /// A lock for backends that need no cross-process exclusion.
    pub const fn none() -> Self {
        Self { _file: None }
    }
}

/// Storage for the raw lines of the log.
///
/// Writers serialize through [`LineStore::lock`]; the other methods never
/// lock on their own, so a caller holding the lock can read, validate and
/// write in one pass.
pub trait LineStore {
    /// Returns the stored bytes unchanged. A missing log reads as empty.
    fn read_raw(&self) -> io::Result<Vec<u8>>;

    /// Appends one line, starting a new line first if the content does not
    /// end with one.
    fn append_line(&self, line: &str) -> io::Result<()>;

    /// Replaces the entire contents.
    fn overwrite_all(&self, content: &[u8]) -> io::Result<()>;

    /// Last modification time, `None` when nothing has been written yet.
    fn last_modified(&self) -> io::Result<Option<SystemTime>>;

    /// Acquires the writer lock.
    fn lock(&self) -> io::Result<StoreLock>;

    /// Returns all non-empty lines, oldest first.
    fn read_lines(&self) -> io::Result<Vec<String>> {
        // Undecodable bytes only spoil their own line, which then fails to parse.
        let raw = self.read_raw()?;
        Ok(String::from_utf8_lossy(&raw)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// A log stored as a comma-separated text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store for the given file. Nothing is touched until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lock file: the log's full name plus `.lock`, so it never
    /// coincides with the log itself.
    pub fn lock_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    fn ensure_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

impl LineStore for FileStore {
    fn read_raw(&self) -> io::Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn append_line(&self, line: &str) -> io::Result<()> {
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;

        let len = file.metadata()?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        writeln!(file, "{line}")?;
        tracing::debug!(path = %self.path.display(), "appended line");
        Ok(())
    }

    fn overwrite_all(&self, content: &[u8]) -> io::Result<()> {
        self.ensure_parent()?;
        fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), bytes = content.len(), "rewrote log");
        Ok(())
    }

    fn last_modified(&self) -> io::Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(meta) => meta.modified().map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn lock(&self) -> io::Result<StoreLock> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(StoreLock { _file: Some(file) })
    }
}

/// An in-memory log.
///
/// Useful for testing. Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: RefCell<Vec<u8>>,
    modified: RefCell<Option<SystemTime>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with lines in append order.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let content = lines.into_iter().fold(Vec::new(), |mut content, line| {
            content.extend_from_slice(line.into().as_bytes());
            content.push(b'\n');
            content
        });
        Self::with_raw(content)
    }

    /// Creates a store holding exactly `content`.
    pub fn with_raw(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: RefCell::new(content.into()),
            modified: RefCell::new(Some(SystemTime::now())),
        }
    }

    fn touch(&self) {
        *self.modified.borrow_mut() = Some(SystemTime::now());
    }
}

impl LineStore for MemoryStore {
    fn read_raw(&self) -> io::Result<Vec<u8>> {
        Ok(self.content.borrow().clone())
    }

    fn append_line(&self, line: &str) -> io::Result<()> {
        {
            let mut content = self.content.borrow_mut();
            if content.last().is_some_and(|last| *last != b'\n') {
                content.push(b'\n');
            }
            content.extend_from_slice(line.as_bytes());
            content.push(b'\n');
        }
        self.touch();
        Ok(())
    }

    fn overwrite_all(&self, content: &[u8]) -> io::Result<()> {
        *self.content.borrow_mut() = content.to_vec();
        self.touch();
        Ok(())
    }

    fn last_modified(&self) -> io::Result<Option<SystemTime>> {
        Ok(*self.modified.borrow())
    }

    fn lock(&self) -> io::Result<StoreLock> {
        Ok(StoreLock::none())
    }
}
