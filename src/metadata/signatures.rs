//! Helpers for authoring member signature blobs.
//!
//! The rewrite engine never interprets signatures: resolution simulation and
//! facade lookup both compare the blob bytes verbatim. Hosts still need to
//! *author* signatures when they build facade tables or synthetic modules, so
//! this module provides the small canonical encoding the platform toolchain
//! emits: a convention byte, a compressed parameter count, then one element
//! code per type.
//!
//! # Layout
//!
//! ```text
//! method:   [convention] [param_count] [return] [param]*
//! property: [convention | PROPERTY] [value type]
//! ```
//!
//! The convention byte carries [`HAS_THIS`] for instance members. Two members
//! that differ only in instance-ness therefore have different first bytes,
//! which is exactly what lets a facade mapping distinguish an instance member
//! from its static replacement.

use crate::{metadata::streams::write_compressed_uint, Result};

/// Convention bit marking an instance member (receiver expected).
pub const HAS_THIS: u8 = 0x20;

/// Convention bit marking a property signature rather than a method.
pub const PROPERTY: u8 = 0x08;

/// Element type codes used in signature blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeCode {
    /// No value (return type only).
    Void = 0x01,
    /// Boolean.
    Boolean = 0x02,
    /// 32-bit signed integer.
    I4 = 0x08,
    /// 64-bit signed integer.
    I8 = 0x0A,
    /// 64-bit floating point.
    R8 = 0x0D,
    /// Character string.
    String = 0x0E,
    /// Any object reference.
    Object = 0x1C,
}

/// Author a method signature blob.
///
/// # Arguments
/// * 'instance'    - `true` for instance methods, `false` for static
/// * '`return_type`' - Element code of the return type
/// * 'params'      - Element codes of the parameters, in order
///
/// # Errors
/// Returns an error if the parameter count exceeds the compressed integer range.
pub fn method(instance: bool, return_type: TypeCode, params: &[TypeCode]) -> Result<Vec<u8>> {
    let mut blob = Vec::with_capacity(params.len() + 3);
    blob.push(if instance { HAS_THIS } else { 0x00 });

    let count = u32::try_from(params.len())
        .map_err(|_| malformed_error!("Signature with {} parameters", params.len()))?;
    write_compressed_uint(&mut blob, count)?;

    blob.push(return_type as u8);
    for param in params {
        blob.push(*param as u8);
    }

    Ok(blob)
}

/// Author a property signature blob.
///
/// # Arguments
/// * 'instance'     - `true` for instance properties, `false` for static
/// * '`value_type`' - Element code of the property value
#[must_use]
pub fn property(instance: bool, value_type: TypeCode) -> Vec<u8> {
    let convention = if instance {
        PROPERTY | HAS_THIS
    } else {
        PROPERTY
    };

    vec![convention, value_type as u8]
}

/// Whether a signature blob describes an instance member.
///
/// Empty blobs are treated as static; the engine never authors them but
/// foreign images may carry them.
#[must_use]
pub fn is_instance(signature: &[u8]) -> bool {
    signature.first().is_some_and(|first| first & HAS_THIS != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_method_layout() {
        let blob = method(false, TypeCode::Void, &[TypeCode::I4, TypeCode::String]).unwrap();
        assert_eq!(blob, vec![0x00, 0x02, 0x01, 0x08, 0x0E]);
        assert!(!is_instance(&blob));
    }

    #[test]
    fn instance_method_layout() {
        let blob = method(true, TypeCode::Object, &[]).unwrap();
        assert_eq!(blob, vec![0x20, 0x00, 0x1C]);
        assert!(is_instance(&blob));
    }

    #[test]
    fn instance_and_static_signatures_differ() {
        let stat = method(false, TypeCode::Void, &[TypeCode::I4]).unwrap();
        let inst = method(true, TypeCode::Void, &[TypeCode::I4]).unwrap();

        assert_ne!(stat, inst);
        assert_eq!(&stat[1..], &inst[1..]);
    }

    #[test]
    fn property_layout() {
        assert_eq!(property(true, TypeCode::R8), vec![0x28, 0x0D]);
        assert_eq!(property(false, TypeCode::Boolean), vec![0x08, 0x02]);
    }

    #[test]
    fn empty_blob_is_static() {
        assert!(!is_instance(&[]));
    }
}
