//! Kestrel storage engine.
//!
//! This crate provides:
//! - Typed tuples and the schema-driven fixed-width row codec
//! - A paged file abstraction for positional page I/O
//! - Bitmap slotted pages for fixed-width tuple storage
//! - A heap file with a (page, slot) cursor protocol over all live tuples
//!
//! Every page access is direct, uncached disk I/O; there is no buffer pool
//! and no write batching in this layer.

mod disk;
mod heap;
mod schema;
mod tuple;

pub use disk::PagedFile;
pub use heap::{HeapFile, HeapFileIter, HeapPage};
pub use schema::{Field, Schema};
pub use tuple::{Cursor, Tuple, Value};
