//! Positional page I/O over a single backing file.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use kestrel_common::{page_offset, PageBuf, Result, StorageConfig, PAGE_SIZE};

/// State behind the handle guard: the open file and its logical page count.
struct FileState {
    file: File,
    page_count: u32,
}

/// Owns one open backing file and performs raw page-granular I/O.
///
/// There is no page cache: every call is a real positional read or write
/// against the file, and each access is recorded in an append-only log for
/// diagnostics. The logs have no effect on correctness.
///
/// A file is a plain concatenation of fixed-size pages with no file-level
/// header. Even a brand-new empty file counts as one logical page.
pub struct PagedFile {
    path: PathBuf,
    state: Mutex<FileState>,
    reads: Mutex<Vec<u32>>,
    writes: Mutex<Vec<u32>>,
    fsync_enabled: bool,
}

impl PagedFile {
    /// Opens the backing file, creating it if absent.
    ///
    /// Failure to open is fatal and surfaces immediately. The page count is
    /// derived from the file size, clamped to a minimum of one page.
    pub fn open(path: impl AsRef<Path>, config: &StorageConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let file_size = file.metadata()?.len();
        let page_count = ((file_size / PAGE_SIZE as u64) as u32).max(1);
        debug!(path = %path.display(), page_count, "opened paged file");

        Ok(Self {
            path,
            state: Mutex::new(FileState { file, page_count }),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            fsync_enabled: config.fsync_enabled,
        })
    }

    /// Reads the page at `index` into a fresh buffer.
    ///
    /// Bytes past the end of the on-disk data read back as zeros, so a
    /// logical page that has never been written appears empty.
    pub fn read_page(&self, index: u32) -> Result<PageBuf> {
        self.reads.lock().push(index);

        let mut state = self.state.lock();
        state.file.seek(SeekFrom::Start(page_offset(index)))?;

        let mut buf = [0u8; PAGE_SIZE];
        match state.file.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                buf = [0u8; PAGE_SIZE];
            }
            Err(e) => return Err(e.into()),
        }

        trace!(index, "read page");
        Ok(buf)
    }

    /// Writes `data` as the page at `index`, extending the file (and the
    /// page count) when `index` is beyond the current extent.
    pub fn write_page(&self, index: u32, data: &PageBuf) -> Result<()> {
        self.writes.lock().push(index);

        let mut state = self.state.lock();
        state.file.seek(SeekFrom::Start(page_offset(index)))?;
        state.file.write_all(data)?;

        if self.fsync_enabled {
            state.file.sync_all()?;
        }

        if index >= state.page_count {
            state.page_count = index + 1;
        }

        trace!(index, "wrote page");
        Ok(())
    }

    /// Current number of logical pages.
    pub fn page_count(&self) -> u32 {
        self.state.lock().page_count
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Page indices read so far, in order.
    pub fn reads(&self) -> Vec<u32> {
        self.reads.lock().clone()
    }

    /// Page indices written so far, in order.
    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().clone()
    }
}

impl Drop for PagedFile {
    fn drop(&mut self) {
        let _ = self.state.lock().file.sync_all();
    }
}
