//! GUID heap (`#GUID`) for plugin module images.
//!
//! Provides access to the GUID heap, which stores the 128-bit identifiers modules carry
//! (MVIDs), and the builder used to reconstruct the heap during emission. Entries are
//! referenced by 1-based index; index 0 means "no GUID".

use crate::Result;

/// '#GUID' is a heap containing a sequence of 128-bit GUIDs, referenced by 1-based index.
///
/// The `Guid` object provides helper methods to access the entries within this heap.
///
/// # Examples
///
/// ```rust
/// use rebind::metadata::streams::Guid;
/// let data = [0xAA_u8; 16];
/// let guids = Guid::from(&data).unwrap();
/// assert_eq!(guids.get(1).unwrap(), uguid::guid!("AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA"));
/// ```
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data'    - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data length is not a multiple of 16 bytes
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "#GUID heap size {} is not a multiple of 16",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// Returns the GUID at the specified 1-based index
    ///
    /// GUID has to be built, hence no 'view' possible
    ///
    /// ## Arguments
    /// * 'index' - The index of the GUID to be accessed within the heap (comes from metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is zero or out of bounds
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index < 1 || index * 16 > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let offset = (index - 1) * 16;

        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[offset..offset + 16]);

        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Returns the number of GUIDs in the heap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }
}

/// Builder that reconstructs a `#GUID` heap during emission.
///
/// Entries are deduplicated; interning the same GUID twice yields the same 1-based index.
pub struct GuidBuilder {
    entries: Vec<uguid::Guid>,
}

impl GuidBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        GuidBuilder {
            entries: Vec::new(),
        }
    }

    /// Intern a GUID and return its 1-based heap index.
    ///
    /// ## Arguments
    /// * 'value' - The GUID to intern
    #[must_use]
    pub fn intern(&mut self, value: uguid::Guid) -> u32 {
        if let Some(pos) = self.entries.iter().position(|g| *g == value) {
            return (pos + 1) as u32;
        }

        self.entries.push(value);
        self.entries.len() as u32
    }

    /// Returns the number of GUIDs interned so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Consume the builder and return the finished heap bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.entries.len() * 16);
        for guid in self.entries {
            data.extend_from_slice(&guid.to_bytes());
        }
        data
    }
}

impl Default for GuidBuilder {
    fn default() -> Self {
        Self::new()
    }
}
