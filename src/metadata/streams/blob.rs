//! Blob heap (`#Blob`) for plugin module images.
//!
//! Provides access to the blob heap, which stores variable-length binary data referenced
//! by metadata table rows: public keys, key tokens and member signatures. Each entry is
//! prefixed with a compressed length; offset 0 is the empty blob. The builder half
//! reconstructs the heap during emission.

use std::collections::HashMap;

use crate::{file::parser::Parser, Result};

/// '#Blob' is a heap containing length-prefixed binary entries, referenced by byte offset.
///
/// The `Blob` object provides helper methods to access the data within this heap and
/// return proper byte views of the entries.
///
/// # Examples
///
/// ```rust
/// use rebind::metadata::streams::Blob;
/// let data = &[0u8, 0x03, 0x41, 0x42, 0x43];
/// let blob = Blob::from(data).unwrap();
/// let b = blob.get(1).unwrap();
/// assert_eq!(b, &[0x41, 0x42, 0x43]);
/// ```
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a `Blob` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data'    - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is empty or doesn't start with a null byte (invalid blob heap format)
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Get a view into the bytes contained at the provided offset.
    ///
    /// ## Arguments
    /// * 'index' - The offset within the heap to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or if the blob data cannot be parsed
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let skip = parser.pos();

        let Some(data_start) = index.checked_add(skip) else {
            return Err(out_of_bounds_error!());
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if data_start > self.data.len() || data_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[data_start..data_end])
    }
}

/// Append a compressed unsigned integer to a buffer.
///
/// Same encoding [`crate::file::parser::Parser::read_compressed_uint`] reads: 1 byte below
/// 0x80, 2 bytes below 0x4000, 4 bytes below 0x2000_0000.
pub(crate) fn write_compressed_uint(buffer: &mut Vec<u8>, value: u32) -> Result<()> {
    if value < 0x80 {
        buffer.push(value as u8);
    } else if value < 0x4000 {
        buffer.push(0x80 | (value >> 8) as u8);
        buffer.push((value & 0xFF) as u8);
    } else if value < 0x2000_0000 {
        buffer.push(0xC0 | (value >> 24) as u8);
        buffer.push(((value >> 16) & 0xFF) as u8);
        buffer.push(((value >> 8) & 0xFF) as u8);
        buffer.push((value & 0xFF) as u8);
    } else {
        return Err(malformed_error!(
            "Value {} exceeds the compressed uint range",
            value
        ));
    }

    Ok(())
}

/// Builder that reconstructs a `#Blob` heap during emission.
///
/// Entries are deduplicated; interning the same bytes twice yields the same offset. As
/// with [`crate::metadata::streams::StringsBuilder`], the layout is a pure function of
/// the intern order.
pub struct BlobBuilder {
    data: Vec<u8>,
    offsets: HashMap<Vec<u8>, u32>,
}

impl BlobBuilder {
    /// Create an empty builder holding only the null entry at offset 0.
    #[must_use]
    pub fn new() -> Self {
        BlobBuilder {
            data: vec![0],
            offsets: HashMap::new(),
        }
    }

    /// Intern a blob and return its heap offset.
    ///
    /// The empty blob always maps to offset 0 without growing the heap.
    ///
    /// ## Arguments
    /// * 'value' - The bytes to intern
    ///
    /// # Errors
    /// Returns an error if the blob is too large for the compressed length prefix.
    pub fn intern(&mut self, value: &[u8]) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }

        if let Some(&offset) = self.offsets.get(value) {
            return Ok(offset);
        }

        let offset = u32::try_from(self.data.len())
            .map_err(|_| malformed_error!("#Blob heap exceeds the 4 GiB index space"))?;

        let len = u32::try_from(value.len())
            .map_err(|_| malformed_error!("Blob of {} bytes is too large", value.len()))?;
        write_compressed_uint(&mut self.data, len)?;
        self.data.extend_from_slice(value);
        self.offsets.insert(value.to_vec(), offset);

        Ok(offset)
    }

    /// Returns the current size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if only the null entry is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }

    /// Consume the builder and return the finished heap bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

impl Default for BlobBuilder {
    fn default() -> Self {
        Self::new()
    }
}
