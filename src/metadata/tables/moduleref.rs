//! `ModuleRef` table: module-level references to external modules.
//!
//! One row per external module a unit depends on, carrying the name, version and
//! key identity the reference was compiled against. This is the table the
//! reference transplant rewrites: strip-listed rows are removed in a batch and a
//! canonical row per target module is appended in their place.

use bitflags::bitflags;

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        identity::{KeyIdentity, ModuleVersion},
        streams::{Blob, BlobBuilder, Strings, StringsBuilder},
        tables::{RowDefinition, TableId},
        token::Token,
    },
    Result,
};

bitflags! {
    /// Flags describing how a module reference stores its key identity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModuleRefFlags: u32 {
        /// The key blob holds the full (unhashed) public key instead of the
        /// 8-byte token; resolvers derive the token with the referenced
        /// module's declared hash algorithm.
        const FULL_KEY = 0x0001;
    }
}

/// Raw representation of a `ModuleRef` table entry with unresolved heap indexes.
///
/// Use [`ModuleRefRaw::to_owned`] to resolve the heap indexes against the unit's
/// streams and obtain a [`ModuleRef`].
#[derive(Clone, Debug)]
pub struct ModuleRefRaw {
    /// Row identifier within the `ModuleRef` table.
    pub rid: u32,
    /// Metadata token for this row.
    pub token: Token,
    /// Byte offset of this row inside the serialized table section.
    pub offset: usize,
    /// Raw [`ModuleRefFlags`] bits.
    pub flags: u32,
    /// Index into `#Strings` containing the referenced module's name.
    pub name: u32,
    /// Major version component the reference was compiled against.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Patch version component.
    pub patch: u16,
    /// Index into `#Blob` containing the key (token or full key, per flags).
    pub key: u32,
}

impl ModuleRefRaw {
    /// Convert this raw row into an owned [`ModuleRef`] with resolved heap data.
    ///
    /// ## Arguments
    /// * 'strings' - The `#Strings` heap of the owning unit
    /// * 'blob'    - The `#Blob` heap of the owning unit
    ///
    /// # Errors
    /// Returns an error if a heap index is out of bounds or malformed.
    pub fn to_owned(&self, strings: &Strings, blob: &Blob) -> Result<ModuleRef> {
        Ok(ModuleRef {
            flags: ModuleRefFlags::from_bits_retain(self.flags),
            name: strings.get(self.name as usize)?.to_string(),
            version: ModuleVersion::new(self.major, self.minor, self.patch),
            key: blob.get(self.key as usize)?.to_vec(),
        })
    }
}

impl RowDefinition for ModuleRefRaw {
    #[rustfmt::skip]
    fn row_size() -> u32 {
        /* flags */ 4 +
        /* name */  4 +
        /* major */ 2 +
        /* minor */ 2 +
        /* patch */ 2 +
        /* key */   4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self> {
        Ok(ModuleRefRaw {
            rid,
            token: Token::from_parts(TableId::ModuleRef as u8, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at::<u32>(data, offset)?,
            major: read_le_at::<u16>(data, offset)?,
            minor: read_le_at::<u16>(data, offset)?,
            patch: read_le_at::<u16>(data, offset)?,
            key: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// A module-level reference to an external module, with resolved name and key.
///
/// Owned variant of [`ModuleRefRaw`]. The row's 1-based position inside
/// [`crate::metadata::image::ModuleUnit::module_refs`] is the RID that
/// type-reference scopes point at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRef {
    /// Flags describing the key blob.
    pub flags: ModuleRefFlags,
    /// Name of the referenced module.
    pub name: String,
    /// Version the reference was compiled against.
    pub version: ModuleVersion,
    /// Key blob; empty when the referenced module is unsigned.
    pub key: Vec<u8>,
}

impl ModuleRef {
    /// Interpret the key blob, honoring [`ModuleRefFlags::FULL_KEY`].
    ///
    /// Returns `None` for references to unsigned modules.
    ///
    /// # Errors
    /// Returns an error if a token-form blob is shorter than 8 bytes.
    pub fn key_identity(&self) -> Result<Option<KeyIdentity>> {
        if self.key.is_empty() {
            return Ok(None);
        }

        KeyIdentity::from(&self.key, self.flags.contains(ModuleRefFlags::FULL_KEY)).map(Some)
    }

    /// Serialize this row, interning heap values into the given builders.
    ///
    /// # Errors
    /// Returns an error if the output buffer is too small or a heap grows past
    /// its index space.
    pub(crate) fn write_row(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        strings: &mut StringsBuilder,
        blob: &mut BlobBuilder,
    ) -> Result<()> {
        write_le_at::<u32>(data, offset, self.flags.bits())?;
        write_le_at::<u32>(data, offset, strings.intern(&self.name)?)?;
        write_le_at::<u16>(data, offset, self.version.major)?;
        write_le_at::<u16>(data, offset, self.version.minor)?;
        write_le_at::<u16>(data, offset, self.version.patch)?;
        write_le_at::<u32>(data, offset, blob.intern(&self.key)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::MetadataTable;

    #[test]
    fn crafted_rows() {
        #[rustfmt::skip]
        let data = [
            // row 1
            0x00, 0x00, 0x00, 0x00, // flags
            0x01, 0x00, 0x00, 0x00, // name
            0x01, 0x00,             // major
            0x04, 0x00,             // minor
            0x00, 0x00,             // patch
            0x01, 0x00, 0x00, 0x00, // key
            // row 2
            0x01, 0x00, 0x00, 0x00, // flags (FULL_KEY)
            0x0E, 0x00, 0x00, 0x00, // name
            0x02, 0x00,             // major
            0x00, 0x00,             // minor
            0x00, 0x00,             // patch
            0x00, 0x00, 0x00, 0x00, // key
        ];

        let table = MetadataTable::<ModuleRefRaw>::new(&data, 2).unwrap();

        let first = table.get(1).unwrap();
        assert_eq!(first.rid, 1);
        assert_eq!(first.token.table(), TableId::ModuleRef as u8);
        assert_eq!(first.name, 1);
        assert_eq!(first.major, 1);
        assert_eq!(first.minor, 4);
        assert_eq!(first.key, 1);

        let second = table.get(2).unwrap();
        assert_eq!(second.rid, 2);
        assert_eq!(second.flags, ModuleRefFlags::FULL_KEY.bits());
        assert_eq!(second.name, 0x0E);

        assert!(table.get(3).is_none());
    }

    #[test]
    fn resolve_to_owned() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // flags
            0x01, 0x00, 0x00, 0x00, // name
            0x01, 0x00,             // major
            0x04, 0x00,             // minor
            0x02, 0x00,             // patch
            0x01, 0x00, 0x00, 0x00, // key
        ];

        let strings_data = b"\0Legacy.Platform\0";
        let strings = Strings::from(strings_data).unwrap();
        let blob_data = [0x00, 0x08, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        let blob = Blob::from(&blob_data).unwrap();

        let table = MetadataTable::<ModuleRefRaw>::new(&data, 1).unwrap();
        let owned = table.get(1).unwrap().to_owned(&strings, &blob).unwrap();

        assert_eq!(owned.name, "Legacy.Platform");
        assert_eq!(owned.version, ModuleVersion::new(1, 4, 2));
        assert_eq!(owned.key.len(), 8);
        assert_eq!(
            owned.key_identity().unwrap(),
            Some(KeyIdentity::Token(0x8877_6655_4433_2211))
        );
    }

    #[test]
    fn key_identity_full_key() {
        let module_ref = ModuleRef {
            flags: ModuleRefFlags::FULL_KEY,
            name: "Signed.Module".to_string(),
            version: ModuleVersion::new(1, 0, 0),
            key: vec![1, 2, 3, 4],
        };

        assert_eq!(
            module_ref.key_identity().unwrap(),
            Some(KeyIdentity::PubKey(vec![1, 2, 3, 4]))
        );
    }

    #[test]
    fn key_identity_unsigned() {
        let module_ref = ModuleRef {
            flags: ModuleRefFlags::empty(),
            name: "Open.Module".to_string(),
            version: ModuleVersion::default(),
            key: Vec::new(),
        };

        assert_eq!(module_ref.key_identity().unwrap(), None);
    }

    #[test]
    fn write_row_round_trips() {
        let module_ref = ModuleRef {
            flags: ModuleRefFlags::empty(),
            name: "Host.Api".to_string(),
            version: ModuleVersion::new(2, 1, 0),
            key: vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88],
        };

        let mut strings = StringsBuilder::new();
        let mut blob = BlobBuilder::new();

        let mut buffer = vec![0_u8; ModuleRefRaw::row_size() as usize];
        let mut offset = 0;
        module_ref
            .write_row(&mut buffer, &mut offset, &mut strings, &mut blob)
            .unwrap();

        let strings_data = strings.finish();
        let blob_data = blob.finish();

        let table = MetadataTable::<ModuleRefRaw>::new(&buffer, 1).unwrap();
        let owned = table
            .get(1)
            .unwrap()
            .to_owned(
                &Strings::from(&strings_data).unwrap(),
                &Blob::from(&blob_data).unwrap(),
            )
            .unwrap();

        assert_eq!(owned, module_ref);
    }
}
