//! Module identity descriptors and key token derivation.
//!
//! This module provides the types that describe *which* module a reference points at:
//! the module name, the three-part [`ModuleVersion`], and the publisher key as a
//! [`KeyIdentity`] (either the full public key or its derived 8-byte token). The
//! [`ModuleIdentity`] descriptor bundles these into the canonical form the rewrite
//! engine stamps into transplanted module references.
//!
//! # Key Types
//! - [`ModuleVersion`] - ordered `major.minor.patch` triple
//! - [`KeyIdentity`] - full public key or hashed token, with MD5/SHA-1 derivation
//! - [`ModuleIdentity`] - canonical descriptor with display-name rendering
//!
//! # Example
//! ```rust,no_run
//! use rebind::metadata::identity::{KeyIdentity, ModuleVersion};
//! use rebind::metadata::tables::HashAlgorithm;
//!
//! let key = KeyIdentity::from(&[1, 2, 3, 4, 5, 6, 7, 8], true)?;
//! let token = key.to_token(HashAlgorithm::SHA1)?;
//! let version = ModuleVersion::parse("2.1.0")?;
//! # let _ = (token, version);
//! # Ok::<(), rebind::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::{
    file::io::read_le,
    metadata::tables::{HashAlgorithm, Module, ModuleRef, ModuleRefFlags},
    Error, Result,
};

/// Three-part version a module carries or a reference was compiled against.
///
/// Versions order lexicographically by `(major, minor, patch)` and render as
/// dotted notation (`"1.2.3"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Patch version component.
    pub patch: u16,
}

impl ModuleVersion {
    /// Create a version from its three components.
    #[must_use]
    pub fn new(major: u16, minor: u16, patch: u16) -> Self {
        ModuleVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version from dotted notation.
    ///
    /// Accepts one to three dot-separated components; omitted components default
    /// to zero, so `"2"` parses as `2.0.0`.
    ///
    /// # Arguments
    /// * 'version_str' - The string to parse, e.g. `"1.2.3"`
    ///
    /// # Errors
    /// Returns an error if the string is empty, has more than three components,
    /// or a component is not a valid `u16`.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.is_empty() || parts.len() > 3 {
            return Err(malformed_error!(
                "Invalid version string '{}' - expected 1 to 3 components",
                version_str
            ));
        }

        let mut components = [0_u16; 3];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part.parse::<u16>().map_err(|_| {
                malformed_error!("Invalid version component '{}' in '{}'", part, version_str)
            })?;
        }

        Ok(ModuleVersion::new(
            components[0],
            components[1],
            components[2],
        ))
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ModuleVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Publisher key material identifying who produced a module.
///
/// A module's own row stores the full public key; references to it usually store
/// only the token, the trailing 8 bytes of the key's hash. Which form a raw blob
/// holds is indicated by [`ModuleRefFlags::FULL_KEY`] on the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    /// The full public key blob.
    PubKey(Vec<u8>),
    /// Trailing 8 bytes of the hashed public key, read as little-endian.
    Token(u64),
}

impl KeyIdentity {
    /// Create a `KeyIdentity` from a raw key blob.
    ///
    /// # Arguments
    /// * 'data'    - The blob bytes to interpret
    /// * 'is_full' - `true` if the blob holds the full public key, `false` for an 8-byte token
    ///
    /// # Errors
    /// Returns an error if a token blob is shorter than 8 bytes.
    pub fn from(data: &[u8], is_full: bool) -> Result<Self> {
        Ok(if is_full {
            KeyIdentity::PubKey(data.to_vec())
        } else {
            KeyIdentity::Token(read_le::<u64>(data)?)
        })
    }

    /// Get the token form of this identity, hashing the public key if necessary.
    ///
    /// The token is the last 8 bytes of the hash of the public key, interpreted
    /// as a little-endian `u64`. Token identities are returned unchanged.
    ///
    /// # Arguments
    /// * 'algo' - The [`HashAlgorithm`] the owning module declares
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] if the hash algorithm is unknown.
    pub fn to_token(&self, algo: u32) -> Result<u64> {
        match &self {
            KeyIdentity::PubKey(data) => match algo {
                HashAlgorithm::MD5 => {
                    let mut hasher = Md5::new();
                    hasher.update(data);

                    let result = hasher.finalize();

                    read_le::<u64>(&result[result.len() - 8..])
                }
                HashAlgorithm::NONE | HashAlgorithm::SHA1 => {
                    let mut hasher = Sha1::new();
                    hasher.update(data);

                    let result = hasher.finalize();

                    read_le::<u64>(&result[result.len() - 8..])
                }
                _ => Err(Error::NotSupported),
            },
            KeyIdentity::Token(token) => Ok(*token),
        }
    }
}

/// Canonical identity descriptor for one module.
///
/// This is the full name a reference needs to locate a module: logical name,
/// compile-time version, publisher key and (optionally) the module variant id.
/// The rewrite engine derives one descriptor per target module and stamps it
/// into every module reference it adds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    /// Logical module name, e.g. `"Platform.Core"`.
    pub name: String,
    /// Version the module carries.
    pub version: ModuleVersion,
    /// Publisher key, if the module is signed.
    pub key: Option<KeyIdentity>,
    /// Module variant identifier, if the module carries one.
    pub mvid: Option<uguid::Guid>,
}

impl ModuleIdentity {
    /// Create an unsigned identity from name and version.
    #[must_use]
    pub fn new(name: &str, version: ModuleVersion) -> Self {
        ModuleIdentity {
            name: name.to_string(),
            version,
            key: None,
            mvid: None,
        }
    }

    /// Derive the canonical identity from a module's own definition row.
    ///
    /// The module row stores the full public key; references store the token,
    /// so the key is hashed down with the module's declared algorithm here.
    /// Unsigned modules (empty key blob) yield `key: None`.
    ///
    /// # Arguments
    /// * 'module' - The definition row of the module to describe
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] if the module declares an unknown
    /// hash algorithm for a non-empty key.
    pub fn from_module(module: &Module) -> Result<Self> {
        let key = if module.key.is_empty() {
            None
        } else {
            let token = KeyIdentity::PubKey(module.key.clone()).to_token(module.hash_algo)?;
            Some(KeyIdentity::Token(token))
        };

        Ok(ModuleIdentity {
            name: module.name.clone(),
            version: module.version,
            key,
            mvid: module.mvid,
        })
    }

    /// Build the module reference row that names this identity.
    ///
    /// Token identities are written as an 8-byte little-endian blob; full keys
    /// are written verbatim with [`ModuleRefFlags::FULL_KEY`] set, and unsigned
    /// identities leave the key blob empty.
    #[must_use]
    pub fn as_module_ref(&self) -> ModuleRef {
        let (flags, key) = match &self.key {
            None => (ModuleRefFlags::empty(), Vec::new()),
            Some(KeyIdentity::Token(token)) => {
                (ModuleRefFlags::empty(), token.to_le_bytes().to_vec())
            }
            Some(KeyIdentity::PubKey(data)) => (ModuleRefFlags::FULL_KEY, data.clone()),
        };

        ModuleRef {
            flags,
            name: self.name.clone(),
            version: self.version,
            key,
        }
    }

    /// Render the identity as a display name.
    ///
    /// Produces `"Name, Version=1.2.3"`, followed by `", KeyToken=..."` when the
    /// identity is signed (token bytes rendered in blob order) and `", Mvid=..."`
    /// when a module variant id is present.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = format!("{}, Version={}", self.name, self.version);

        match &self.key {
            Some(KeyIdentity::Token(token)) => {
                result.push_str(", KeyToken=");
                for byte in token.to_le_bytes() {
                    result.push_str(&format!("{byte:02x}"));
                }
            }
            Some(KeyIdentity::PubKey(data)) => {
                result.push_str(", KeyToken=");
                for byte in data.iter().take(8) {
                    result.push_str(&format!("{byte:02x}"));
                }
            }
            None => {}
        }

        if let Some(mvid) = &self.mvid {
            result.push_str(&format!(", Mvid={mvid}"));
        }

        result
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
