//! Low-level byte order and safe reading/writing utilities for module image parsing.
//!
//! This module provides endian-aware binary data reading and writing functionality for
//! parsing plugin module images. It implements safe, bounds-checked operations for reading
//! and writing primitive types from/to byte buffers, ensuring data integrity and preventing
//! buffer overruns during binary analysis and generation.
//!
//! # Architecture
//!
//! The module is built around the [`crate::file::io::ImageIO`] trait which provides a
//! unified interface for reading and writing binary data in a type-safe manner:
//!
//! - Generic trait-based reading and writing for the primitive types the image format uses
//! - Automatic bounds checking to prevent buffer overruns
//! - Consistent error handling through the [`crate::Result`] type
//!
//! The plugin module image format is little-endian throughout, so only little-endian
//! accessors are provided.
//!
//! # Key Components
//!
//! - [`crate::file::io::ImageIO`] - Trait defining byte-order conversions for primitive types
//! - [`crate::file::io::read_le`] - Read values from the start of a buffer
//! - [`crate::file::io::read_le_at`] - Read values at a specific offset with auto-advance
//! - [`crate::file::io::write_le_at`] - Write values at a specific offset with auto-advance
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use rebind::file::io::{read_le_at, write_le_at};
//!
//! let mut buffer = [0u8; 4];
//! let mut offset = 0;
//! write_le_at::<u32>(&mut buffer, &mut offset, 0x11223344)?;
//!
//! let mut offset = 0;
//! let value: u32 = read_le_at(&buffer, &mut offset)?;
//! assert_eq!(value, 0x11223344);
//! # Ok::<(), rebind::Error>(())
//! ```

use crate::Result;

/// Trait for types that can be read from and written to byte buffers in little-endian order.
///
/// Implemented for the unsigned integer types the plugin module image format is built from.
/// All implementations are pure conversions without shared state, so they are safe to use
/// concurrently.
pub trait ImageIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    ///
    /// This type must be convertible from a byte slice and is used for reading
    /// binary data in little-endian format.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

// Implement ImageIO support for u64
impl ImageIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u64::to_le_bytes(self)
    }
}

// Implement ImageIO support for u32
impl ImageIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u32::to_le_bytes(self)
    }
}

// Implement ImageIO support for u16
impl ImageIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u16::to_le_bytes(self)
    }
}

// Implement ImageIO support for u8
impl ImageIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u8::to_le_bytes(self)
    }
}

/// Safely reads a value of type `T` in little-endian byte order from a data buffer.
///
/// This function reads from the beginning of the buffer and supports all types that
/// implement the [`crate::file::io::ImageIO`] trait.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le<T: ImageIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// This function reads from the specified offset and automatically advances the offset by
/// the number of bytes read.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: ImageIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Safely writes a value of type `T` in little-endian byte order at a specific offset.
///
/// This function writes at the specified offset and automatically advances the offset by
/// the number of bytes written.
///
/// # Arguments
///
/// * `data` - The byte buffer to write into
/// * `offset` - Mutable reference to the offset position (will be advanced after writing)
/// * `value` - The value to write
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small for the value.
pub fn write_le_at<T: ImageIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(out_of_bounds_error!());
    }

    let bytes = value.to_le_bytes();
    let bytes_ref: &[u8] =
        unsafe { std::slice::from_raw_parts(&bytes as *const _ as *const u8, type_len) };

    data[*offset..*offset + type_len].copy_from_slice(bytes_ref);
    *offset += type_len;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_values() {
        let data = [0x44, 0x33, 0x22, 0x11, 0x88, 0x77];

        assert_eq!(read_le::<u8>(&data).unwrap(), 0x44);
        assert_eq!(read_le::<u16>(&data).unwrap(), 0x3344);
        assert_eq!(read_le::<u32>(&data).unwrap(), 0x1122_3344);

        let mut offset = 0;
        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 0x1122_3344);
        assert_eq!(offset, 4);
        assert_eq!(read_le_at::<u16>(&data, &mut offset).unwrap(), 0x7788);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_le_out_of_bounds() {
        let data = [0x01, 0x02];

        assert!(read_le::<u32>(&data).is_err());

        let mut offset = 1;
        assert!(read_le_at::<u16>(&data, &mut offset).is_err());
        assert_eq!(offset, 1);
    }

    #[test]
    fn read_le_u64() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80];
        assert_eq!(read_le::<u64>(&data).unwrap(), 0x8000_0000_0000_0001);
    }

    #[test]
    fn write_le_roundtrip() {
        let mut data = [0u8; 8];
        let mut offset = 0;

        write_le_at::<u16>(&mut data, &mut offset, 0xAABB).unwrap();
        write_le_at::<u32>(&mut data, &mut offset, 0x1122_3344).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(data, [0xBB, 0xAA, 0x44, 0x33, 0x22, 0x11, 0x00, 0x00]);

        let mut offset = 0;
        assert_eq!(read_le_at::<u16>(&data, &mut offset).unwrap(), 0xAABB);
        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 0x1122_3344);
    }

    #[test]
    fn write_le_out_of_bounds() {
        let mut data = [0u8; 3];
        let mut offset = 0;

        assert!(write_le_at::<u32>(&mut data, &mut offset, 1).is_err());
        assert_eq!(offset, 0);
        assert!(write_le_at::<u16>(&mut data, &mut offset, 1).is_ok());
    }
}
