//! File loading and access abstractions for plugin module images.
//!
//! This module provides the infrastructure for getting raw image bytes into the parser:
//! a [`crate::file::Backend`] trait abstracting over where the bytes live, two backend
//! implementations (memory buffer and memory-mapped file), and the [`crate::file::File`]
//! wrapper that the image reader consumes.
//!
//! # Architecture
//!
//! Module images are parsed into an owned model (see [`crate::metadata::image`]), so the
//! file layer stays deliberately thin: it hands out bounds-checked slices of the raw input
//! and nothing else. Once parsing completes, the backing [`crate::file::File`] can be
//! dropped; no parsed structure borrows from it.
//!
//! # Key Components
//!
//! - [`crate::file::Backend`] - Data source abstraction (in-memory or on-disk)
//! - [`crate::file::File`] - Entry point wrapping a backend
//! - [`crate::file::Parser`] - Cursor-based bounds-checked reader
//! - [`crate::file::io`] - Endian-aware primitive read/write helpers
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use rebind::file::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("plugin.pmi"))?;
//! println!("Image size: {} bytes", file.len());
//!
//! let magic = file.data_slice(0, 4)?;
//! # Ok::<(), rebind::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of image data, allowing for both in-memory and
/// on-disk representations. All implementations must be thread-safe.
///
/// The trait provides a common interface for accessing image data regardless of whether
/// it's loaded from a file on disk or from a memory buffer. This enables flexible handling
/// of different data sources while maintaining performance.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// This method provides bounds-checked access to the underlying data.
    /// It's used internally by the `File` struct to safely read portions
    /// of the image data.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    ///
    /// This provides access to the complete image data as a single slice.
    /// For file-based backends, this typically maps the entire file into memory.
    /// For memory-based backends, this returns the underlying buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    ///
    /// This is equivalent to `self.data().len()` but may be more efficient
    /// for some backend implementations.
    fn len(&self) -> usize;
}

/// A loaded module image file.
///
/// `File` wraps a [`crate::file::Backend`] and is the raw-bytes entry point for image
/// parsing. It supports loading from both files (memory-mapped) and memory buffers, and
/// rejects empty input up front so the parser can assume a non-empty buffer.
///
/// # Examples
///
/// ## Loading from a file
///
/// ```rust,no_run
/// use rebind::file::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("plugin.pmi"))?;
/// println!("Loaded image with {} bytes", file.len());
/// # Ok::<(), rebind::Error>(())
/// ```
///
/// ## Loading from memory
///
/// ```rust,no_run
/// use rebind::file::File;
/// use std::fs;
///
/// let data = fs::read("plugin.pmi")?;
/// let file = File::from_mem(data)?;
/// # Ok::<(), rebind::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl File {
    /// Load a module image from a file on disk.
    ///
    /// The file is memory-mapped rather than read into a buffer, so opening large images
    /// is cheap regardless of their size.
    ///
    /// # Arguments
    /// * `file` - The path of the file to load
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened,
    /// [`crate::Error::Error`] if memory mapping fails, or [`crate::Error::Empty`]
    /// if the file contains no data.
    pub fn from_file(file: &Path) -> Result<File> {
        File::load(Physical::new(file)?)
    }

    /// Load a module image from a buffer in memory.
    ///
    /// # Arguments
    /// * `data` - The data buffer to consume
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if the buffer contains no data.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        File::load(Memory::new(data))
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
        })
    }

    /// Returns the total size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the image contains no data.
    ///
    /// Construction rejects empty input, so this is always `false` for a loaded `File`;
    /// provided for API completeness alongside [`File::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the entire image as a byte slice.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a bounds-checked slice of the image data.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the requested range does not fit
    /// within the image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }
}
