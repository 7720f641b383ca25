//! Metadata heaps for plugin module images.
//!
//! This module implements the parsing and construction of the heaps a module unit carries
//! alongside its tables. Heaps store the variable-length data that table rows reference by
//! index, keeping the rows themselves fixed-width.
//!
//! # Heap Types
//!
//! The image format defines three heaps, each serving a specific purpose:
//!
//! - **`#Strings`** - UTF-8 identifier strings (type names, namespaces, member names,
//!   module names). The first entry is always null (`\0`); all entries are NUL-terminated
//!   and referenced by byte offset.
//! - **`#Blob`** - Variable-length binary data (public keys, key tokens, member
//!   signatures), each entry prefixed with a compressed length. Offset 0 is the empty blob.
//! - **`#GUID`** - Sequence of 128-bit GUIDs (module MVIDs), referenced by 1-based index.
//!
//! # Architecture
//!
//! Each heap has two faces: a borrowing *reader* ([`crate::metadata::streams::Strings`],
//! [`crate::metadata::streams::Blob`], [`crate::metadata::streams::Guid`]) used while
//! parsing raw rows into the owned model, and an owning *builder*
//! ([`crate::metadata::streams::StringsBuilder`], [`crate::metadata::streams::BlobBuilder`],
//! [`crate::metadata::streams::GuidBuilder`]) used by the emitter to rebuild heaps with
//! deduplicated entries in first-use order. Builders are what make emission canonical: the
//! heap bytes are a pure function of the order in which the emitter interns values.

mod blob;
pub use blob::{Blob, BlobBuilder};

mod guid;
pub use guid::{Guid, GuidBuilder};

mod strings;
pub use strings::{Strings, StringsBuilder};

pub(crate) use blob::write_compressed_uint;
