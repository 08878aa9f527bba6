//! Heap file: the cursor protocol over [`PagedFile`] + [`HeapPage`].
//!
//! Every operation performs direct positional I/O: the page is read, a
//! fresh slotted view is built over the bytes, the page is mutated and
//! written back. There is no cache and no deferred flush, so the paged
//! file's access log reflects each operation exactly.

use std::path::Path;
use tracing::debug;

use kestrel_common::{KestrelError, Result, StorageConfig, PAGE_SIZE};

use crate::disk::PagedFile;
use crate::heap::page::HeapPage;
use crate::schema::Schema;
use crate::tuple::{Cursor, Tuple};

/// Heap storage for one table: a single paged file of slotted pages, all
/// sharing the table's schema.
pub struct HeapFile {
    file: PagedFile,
    schema: Schema,
}

impl HeapFile {
    /// Opens (or creates) the heap file at `path` for `schema`.
    ///
    /// Fails with `TupleTooLarge` for schemas whose rows cannot fit in a
    /// single page slot; such a file could never accept an insert.
    pub fn open(path: impl AsRef<Path>, schema: Schema, config: &StorageConfig) -> Result<Self> {
        if HeapPage::capacity_for(&schema) == 0 {
            return Err(KestrelError::TupleTooLarge {
                size: schema.row_len(),
                max: PAGE_SIZE,
            });
        }
        let file = PagedFile::open(path, config)?;
        Ok(Self { file, schema })
    }

    /// The table schema shared by every page of this file.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Current number of pages.
    pub fn page_count(&self) -> u32 {
        self.file.page_count()
    }

    /// Page indices read so far, in order (diagnostics).
    pub fn reads(&self) -> Vec<u32> {
        self.file.reads()
    }

    /// Page indices written so far, in order (diagnostics).
    pub fn writes(&self) -> Vec<u32> {
        self.file.writes()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Inserts a tuple, growing the file when the last page is full.
    ///
    /// Insertion of a schema-compatible tuple always succeeds: a full last
    /// page triggers allocation of a fresh page rather than an error.
    pub fn insert(&self, tuple: &Tuple) -> Result<()> {
        self.schema.check_compatible(tuple)?;

        let last = self.file.page_count() - 1;
        let mut buf = self.file.read_page(last)?;
        let inserted = {
            let mut page = HeapPage::new(&mut buf, &self.schema);
            page.insert(tuple)?
        };
        if inserted {
            return self.file.write_page(last, &buf);
        }

        // Last page full: start a fresh page one past it. Capacity is at
        // least one (checked at open), so this insert cannot come back
        // false.
        debug!(page = last + 1, "allocating heap page");
        buf = [0u8; PAGE_SIZE];
        {
            let mut page = HeapPage::new(&mut buf, &self.schema);
            page.insert(tuple)?;
        }
        self.file.write_page(last + 1, &buf)
    }

    /// Deletes the tuple at `cursor`, writing the page back.
    ///
    /// A stale cursor (slot already empty) is a caller protocol violation
    /// and surfaces as `SlotAlreadyEmpty`.
    pub fn delete(&self, cursor: Cursor) -> Result<()> {
        let mut buf = self.file.read_page(cursor.page)?;
        {
            let mut page = HeapPage::new(&mut buf, &self.schema);
            page.delete(cursor.slot)?;
        }
        self.file.write_page(cursor.page, &buf)
    }

    /// Reads the tuple at `cursor` without checking occupancy.
    ///
    /// A deleted slot yields whatever stale bytes remain; walk with
    /// [`HeapFile::begin`] / [`HeapFile::next`] to see only live tuples.
    pub fn get(&self, cursor: Cursor) -> Result<Tuple> {
        let mut buf = self.file.read_page(cursor.page)?;
        let page = HeapPage::new(&mut buf, &self.schema);
        page.get(cursor.slot)
    }

    /// Cursor at the first live tuple, or [`HeapFile::end`] when the file
    /// holds none.
    pub fn begin(&self) -> Result<Cursor> {
        let page_count = self.file.page_count();
        for index in 0..page_count {
            let mut buf = self.file.read_page(index)?;
            let page = HeapPage::new(&mut buf, &self.schema);
            let slot = page.begin();
            if slot != page.end() {
                return Ok(Cursor::new(index, slot));
            }
        }
        Ok(self.end())
    }

    /// Advances `cursor` to the next live tuple, or to [`HeapFile::end`].
    ///
    /// Walks across page boundaries: after exhausting the current page it
    /// keeps taking each subsequent page's first occupied slot, skipping
    /// pages that are entirely empty or whose leading slots were deleted.
    pub fn next(&self, cursor: &mut Cursor) -> Result<()> {
        let page_count = self.file.page_count();

        let mut slot = {
            let mut buf = self.file.read_page(cursor.page)?;
            HeapPage::new(&mut buf, &self.schema).next(cursor.slot)
        };

        let capacity = HeapPage::capacity_for(&self.schema);
        while slot == capacity && cursor.page + 1 < page_count {
            cursor.page += 1;
            let mut buf = self.file.read_page(cursor.page)?;
            slot = HeapPage::new(&mut buf, &self.schema).begin();
        }

        cursor.slot = slot;
        Ok(())
    }

    /// The end sentinel: one past the last valid slot of the last page.
    ///
    /// Capacity is uniform across pages (one schema per file), so the
    /// sentinel is computed without reading any page.
    pub fn end(&self) -> Cursor {
        Cursor::new(
            self.file.page_count() - 1,
            HeapPage::capacity_for(&self.schema),
        )
    }

    /// Iterates every live tuple in cursor order.
    pub fn iter(&self) -> HeapFileIter<'_> {
        HeapFileIter {
            heap: self,
            cursor: None,
            done: false,
        }
    }
}

/// Iterator over the live tuples of a heap file.
///
/// Yields each tuple with the cursor locating it. An I/O error is yielded
/// once and ends the iteration.
pub struct HeapFileIter<'a> {
    heap: &'a HeapFile,
    cursor: Option<Cursor>,
    done: bool,
}

impl<'a> Iterator for HeapFileIter<'a> {
    type Item = Result<(Cursor, Tuple)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = match self.cursor {
            None => self.heap.begin(),
            Some(mut prev) => self.heap.next(&mut prev).map(|()| prev),
        };
        let cursor = match step {
            Ok(cursor) => cursor,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.cursor = Some(cursor);
        if cursor == self.heap.end() {
            self.done = true;
            return None;
        }

        match self.heap.get(cursor) {
            Ok(tuple) => Some(Ok((cursor, tuple))),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
