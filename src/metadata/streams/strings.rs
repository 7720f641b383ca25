//! String heap (`#Strings`) for plugin module images.
//!
//! Provides access to the string heap, which stores the NUL-terminated UTF-8 identifiers
//! referenced by metadata table rows (module names, type names, namespaces, member names),
//! plus the builder used to reconstruct the heap during emission.

use std::collections::HashMap;
use std::ffi::CStr;

use crate::Result;

/// '#Strings' is a heap containing NUL-terminated UTF-8 strings, referenced by byte offset.
///
/// The `Strings` object provides helper methods to access the data within this heap and
/// return proper string views of the entries. Offset 0 is always the empty string.
///
/// # Examples
///
/// ```rust
/// use rebind::metadata::streams::Strings;
/// let data = &[0x00, b'F', b'o', b'o', 0x00];
/// let strings = Strings::from(data).unwrap();
/// assert_eq!(strings.get(1).unwrap(), "Foo");
/// ```
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data'    - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the string heap data is empty or doesn't start with the null entry
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Get a view into the string contained at the provided offset.
    ///
    /// ## Arguments
    /// * 'index' - The offset within the heap to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or the string data is invalid UTF-8
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }
}

/// Builder that reconstructs a `#Strings` heap during emission.
///
/// Entries are deduplicated; interning the same string twice yields the same offset. The
/// heap layout is a pure function of the intern order, which is what makes emission
/// deterministic.
pub struct StringsBuilder {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringsBuilder {
    /// Create an empty builder holding only the null entry at offset 0.
    #[must_use]
    pub fn new() -> Self {
        StringsBuilder {
            data: vec![0],
            offsets: HashMap::new(),
        }
    }

    /// Intern a string and return its heap offset.
    ///
    /// The empty string always maps to offset 0 without growing the heap.
    ///
    /// ## Arguments
    /// * 'value' - The string to intern
    ///
    /// # Errors
    /// Returns an error if the string contains an interior NUL byte, which the heap
    /// encoding cannot represent.
    pub fn intern(&mut self, value: &str) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }

        if value.as_bytes().contains(&0) {
            return Err(malformed_error!(
                "String '{}' contains an interior NUL byte",
                value.escape_debug()
            ));
        }

        if let Some(&offset) = self.offsets.get(value) {
            return Ok(offset);
        }

        let offset = u32::try_from(self.data.len())
            .map_err(|_| malformed_error!("#Strings heap exceeds the 4 GiB index space"))?;

        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset);

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

impl Default for StringsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
