//! Cursor-based binary parser for module image data.
//!
//! This module provides the [`crate::file::parser::Parser`] struct, a safe, bounds-checked
//! reader over a byte buffer with an internal cursor. It is the workhorse underneath the
//! image reader: headers, heaps and table rows are all decoded through it.
//!
//! # Architecture
//!
//! The parser borrows its input and never copies more than the value being decoded. Every
//! read validates against the buffer bounds before touching the data, and the cursor only
//! advances on success, so a failed read leaves the parser in a usable state.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - The cursor itself
//! - [`crate::file::parser::Parser::read_le`] - Typed little-endian reads
//! - [`crate::file::parser::Parser::read_compressed_uint`] - Variable-length unsigned integers
//! - [`crate::file::parser::Parser::read_string_utf8`] - NUL-terminated UTF-8 strings
//!
//! # Usage Examples
//!
//! ```rust
//! use rebind::Parser;
//!
//! let data = [0x02, 0x00, 0x41, 0x00];
//! let mut parser = Parser::new(&data);
//!
//! let count: u16 = parser.read_le()?;
//! assert_eq!(count, 2);
//! let name = parser.read_string_utf8()?;
//! assert_eq!(name, "A");
//! # Ok::<(), rebind::Error>(())
//! ```

use crate::{file::io::read_le_at, file::io::ImageIO, Result};

/// A safe, cursor-based binary parser for module image data.
///
/// `Parser` wraps a byte slice with a position cursor and provides bounds-checked reads of
/// primitive values, variable-length integers, strings and raw byte runs. All methods
/// return [`crate::Result`] and never panic on malformed input.
///
/// # Examples
///
/// ```rust
/// use rebind::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut parser = Parser::new(&data);
///
/// let value: u32 = parser.read_le()?;
/// assert_eq!(value, 0x04030201);
/// # Ok::<(), rebind::Error>(())
/// ```
pub struct Parser<'a> {
    /// The buffer being parsed
    data: &'a [u8],
    /// The current position within the buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser over the given buffer, with the cursor at the start.
    ///
    /// # Arguments
    /// * `data` - The byte buffer to parse
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the cursor has not yet reached the end of the buffer.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the cursor to an absolute position.
    ///
    /// # Arguments
    /// * `pos` - The position to move the cursor to
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the cursor forward by the specified number of bytes.
    ///
    /// # Arguments
    /// * `step` - Amount of bytes to advance
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Get the current position of the cursor within the buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Verify that at least `needed` bytes remain after the cursor.
    ///
    /// # Arguments
    /// * `needed` - The number of bytes a subsequent read requires
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(out_of_bounds_error!());
        }

        Ok(())
    }

    /// Read a type `T` from the current position in little-endian format and advance
    /// the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: ImageIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a compressed unsigned integer.
    ///
    /// Compressed integers use variable-length encoding to efficiently store small values,
    /// in the same scheme blob heap entries use for their length prefixes:
    /// - Values 0-127: 1 byte (`0xxxxxxx`)
    /// - Values 128-16383: 2 bytes (`10xxxxxx xxxxxxxx`)
    /// - Values 16384-536870911: 4 bytes (`11xxxxxx xxxxxxxx xxxxxxxx xxxxxxxx`)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for an invalid compressed uint format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rebind::Parser;
    ///
    /// // Single byte encoding (value < 128)
    /// let data = [0x7F];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_compressed_uint()?, 127);
    ///
    /// // Two byte encoding
    /// let data = [0x80, 0x80];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_compressed_uint()?, 128);
    /// # Ok::<(), rebind::Error>(())
    /// ```
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok(value);
        }

        // 4-byte encoding: 11xxxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a NUL-terminated UTF-8 string from the current position.
    ///
    /// The cursor advances past the terminating NUL byte. A string that runs to the end of
    /// the buffer without a terminator is accepted; the cursor then rests at the end.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let mut end = start;

        while end < self.data.len() && self.data[end] != 0 {
            end += 1;
        }

        // Handle two cases:
        // 1. Found null terminator (end < data.len()): normal null-terminated string
        // 2. Reached end of data (end == data.len()): string without null terminator (valid case)
        let string_data = &self.data[start..end];

        if end < self.data.len() {
            self.position = end + 1;
        } else {
            self.position = end;
        }

        String::from_utf8(string_data.to_vec()).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                end,
                e.utf8_error()
            )
        })
    }

    /// Read `length` raw bytes from the current position and advance the cursor.
    ///
    /// # Arguments
    /// * `length` - The number of bytes to read
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(out_of_bounds_error!());
        };

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_advances() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u16>().unwrap(), 0x0201);
        assert_eq!(parser.pos(), 2);
        assert_eq!(parser.read_le::<u32>().unwrap(), 0x0605_0403);
        assert_eq!(parser.pos(), 6);
        assert!(!parser.has_more_data());
        assert!(parser.read_le::<u8>().is_err());
    }

    #[test]
    fn seek_and_advance() {
        let data = [0u8; 16];
        let mut parser = Parser::new(&data);

        parser.seek(8).unwrap();
        assert_eq!(parser.pos(), 8);
        assert_eq!(parser.remaining(), 8);

        parser.advance_by(8).unwrap();
        assert_eq!(parser.pos(), 16);
        assert!(parser.advance_by(1).is_err());
        assert!(parser.seek(16).is_err());
    }

    #[test]
    fn compressed_uint_encodings() {
        let mut parser = Parser::new(&[0x03]);
        assert_eq!(parser.read_compressed_uint().unwrap(), 3);

        let mut parser = Parser::new(&[0xBF, 0xFF]);
        assert_eq!(parser.read_compressed_uint().unwrap(), 0x3FFF);

        let mut parser = Parser::new(&[0xC0, 0x00, 0x40, 0x00]);
        assert_eq!(parser.read_compressed_uint().unwrap(), 0x4000);

        // 0xE0 prefix is not a valid encoding
        let mut parser = Parser::new(&[0xE0, 0x00, 0x00, 0x00]);
        assert!(parser.read_compressed_uint().is_err());

        // Truncated multi-byte encoding
        let mut parser = Parser::new(&[0x80]);
        assert!(parser.read_compressed_uint().is_err());
    }

    #[test]
    fn string_utf8() {
        let data = [b'F', b'o', b'o', 0, b'B', b'a', b'r'];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_string_utf8().unwrap(), "Foo");
        assert_eq!(parser.pos(), 4);

        // No trailing terminator is accepted
        assert_eq!(parser.read_string_utf8().unwrap(), "Bar");
        assert_eq!(parser.pos(), 7);
    }

    #[test]
    fn string_utf8_invalid() {
        let data = [0xFF, 0xFE, 0x00];
        let mut parser = Parser::new(&data);
        assert!(parser.read_string_utf8().is_err());
    }

    #[test]
    fn read_bytes_bounds() {
        let data = [1, 2, 3, 4];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_bytes(2).unwrap(), &[1, 2]);
        assert_eq!(parser.read_bytes(2).unwrap(), &[3, 4]);
        assert!(parser.read_bytes(1).is_err());

        let mut parser = Parser::new(&data);
        assert!(parser.read_bytes(usize::MAX).is_err());
        parser.ensure_remaining(4).unwrap();
        assert!(parser.ensure_remaining(5).is_err());
    }
}
