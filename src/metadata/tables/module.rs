//! `Module` table: the identity row of a module unit.
//!
//! Every unit carries exactly one `Module` row describing the unit itself: logical
//! name, three-part version, hash algorithm, public key blob and optional MVID.
//! The rewrite engine reads this row from target modules to derive the canonical
//! [`crate::metadata::identity::ModuleIdentity`] it stamps into transplanted
//! references.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        identity::ModuleVersion,
        streams::{Blob, BlobBuilder, Guid, GuidBuilder, Strings, StringsBuilder},
        tables::{RowDefinition, TableId},
        token::Token,
    },
    Result,
};

/// All possible values for a module's declared hash algorithm.
///
/// The algorithm governs how publisher key tokens are derived from the full
/// public key (trailing 8 bytes of the hash, little-endian).
#[allow(non_snake_case)]
pub mod HashAlgorithm {
    /// No hash algorithm specified; token derivation falls back to SHA-1.
    pub const NONE: u32 = 0x0000;
    /// MD5 hash algorithm.
    pub const MD5: u32 = 0x8003;
    /// SHA-1 hash algorithm.
    pub const SHA1: u32 = 0x8004;
}

/// Raw representation of the `Module` table entry with unresolved heap indexes.
///
/// Contains the on-disk column values exactly as serialized. Use [`ModuleRaw::to_owned`]
/// to resolve the heap indexes against the unit's streams and obtain a [`Module`].
#[derive(Clone, Debug)]
pub struct ModuleRaw {
    /// Row identifier within the `Module` table (always 1; units carry one row).
    pub rid: u32,
    /// Metadata token for this row.
    pub token: Token,
    /// Byte offset of this row inside the serialized table section.
    pub offset: usize,
    /// Reserved flag bits; written back verbatim.
    pub flags: u32,
    /// Index into `#Strings` containing the module name.
    pub name: u32,
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Patch version component.
    pub patch: u16,
    /// Declared [`HashAlgorithm`] for key token derivation.
    pub hash_algo: u32,
    /// Index into `#Blob` containing the full public key (0 = unsigned).
    pub key: u32,
    /// Index into `#GUID` containing the MVID (0 = none).
    pub mvid: u32,
}

impl ModuleRaw {
    /// Convert this raw row into an owned [`Module`] with resolved heap data.
    ///
    /// ## Arguments
    /// * 'strings' - The `#Strings` heap of the owning unit
    /// * 'blob'    - The `#Blob` heap of the owning unit
    /// * 'guids'   - The `#GUID` heap of the owning unit
    ///
    /// # Errors
    /// Returns an error if any heap index is out of bounds or malformed.
    pub fn to_owned(&self, strings: &Strings, blob: &Blob, guids: &Guid) -> Result<Module> {
        Ok(Module {
            flags: self.flags,
            name: strings.get(self.name as usize)?.to_string(),
            version: ModuleVersion::new(self.major, self.minor, self.patch),
            hash_algo: self.hash_algo,
            key: blob.get(self.key as usize)?.to_vec(),
            mvid: if self.mvid == 0 {
                None
            } else {
                Some(guids.get(self.mvid as usize)?)
            },
        })
    }
}

impl RowDefinition for ModuleRaw {
    #[rustfmt::skip]
    fn row_size() -> u32 {
        /* flags */     4 +
        /* name */      4 +
        /* major */     2 +
        /* minor */     2 +
        /* patch */     2 +
        /* hash_algo */ 4 +
        /* key */       4 +
        /* mvid */      4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self> {
        Ok(ModuleRaw {
            rid,
            token: Token::from_parts(TableId::Module as u8, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at::<u32>(data, offset)?,
            major: read_le_at::<u16>(data, offset)?,
            minor: read_le_at::<u16>(data, offset)?,
            patch: read_le_at::<u16>(data, offset)?,
            hash_algo: read_le_at::<u32>(data, offset)?,
            key: read_le_at::<u32>(data, offset)?,
            mvid: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// The identity row of a module unit, with resolved name and key material.
///
/// Owned variant of [`ModuleRaw`]. The position of the row is fixed (units carry
/// exactly one), so no RID is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    /// Reserved flag bits; written back verbatim.
    pub flags: u32,
    /// Logical module name.
    pub name: String,
    /// Version the module carries.
    pub version: ModuleVersion,
    /// Declared [`HashAlgorithm`] for key token derivation.
    pub hash_algo: u32,
    /// Full public key blob; empty for unsigned modules.
    pub key: Vec<u8>,
    /// Module variant identifier, if present.
    pub mvid: Option<uguid::Guid>,
}

impl Module {
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
        guids: &mut GuidBuilder,
    ) -> Result<()> {
        write_le_at::<u32>(data, offset, self.flags)?;
        write_le_at::<u32>(data, offset, strings.intern(&self.name)?)?;
        write_le_at::<u16>(data, offset, self.version.major)?;
        write_le_at::<u16>(data, offset, self.version.minor)?;
        write_le_at::<u16>(data, offset, self.version.patch)?;
        write_le_at::<u32>(data, offset, self.hash_algo)?;
        write_le_at::<u32>(data, offset, blob.intern(&self.key)?)?;
        write_le_at::<u32>(data, offset, self.mvid.map_or(0, |g| guids.intern(g)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::MetadataTable;

    #[test]
    fn crafted_row() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // flags
            0x01, 0x00, 0x00, 0x00, // name
            0x02, 0x00,             // major
            0x01, 0x00,             // minor
            0x07, 0x00,             // patch
            0x04, 0x80, 0x00, 0x00, // hash_algo (SHA1)
            0x00, 0x00, 0x00, 0x00, // key
            0x01, 0x00, 0x00, 0x00, // mvid
        ];

        let table = MetadataTable::<ModuleRaw>::new(&data, 1).unwrap();
        let row = table.get(1).unwrap();

        assert_eq!(row.rid, 1);
        assert_eq!(row.token.table(), TableId::Module as u8);
        assert_eq!(row.token.row(), 1);
        assert_eq!(row.name, 1);
        assert_eq!(row.major, 2);
        assert_eq!(row.minor, 1);
        assert_eq!(row.patch, 7);
        assert_eq!(row.hash_algo, HashAlgorithm::SHA1);
        assert_eq!(row.key, 0);
        assert_eq!(row.mvid, 1);
    }

    #[test]
    fn resolve_to_owned() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // flags
            0x01, 0x00, 0x00, 0x00, // name
            0x01, 0x00,             // major
            0x00, 0x00,             // minor
            0x00, 0x00,             // patch
            0x03, 0x80, 0x00, 0x00, // hash_algo (MD5)
            0x00, 0x00, 0x00, 0x00, // key (unsigned)
            0x00, 0x00, 0x00, 0x00, // mvid (none)
        ];

        let strings_data = b"\0Plugin.Core\0";
        let strings = Strings::from(strings_data).unwrap();
        let blob = Blob::from(&[0]).unwrap();
        let guids = Guid::from(&[]).unwrap();

        let table = MetadataTable::<ModuleRaw>::new(&data, 1).unwrap();
        let owned = table.get(1).unwrap().to_owned(&strings, &blob, &guids).unwrap();

        assert_eq!(owned.name, "Plugin.Core");
        assert_eq!(owned.version, ModuleVersion::new(1, 0, 0));
        assert_eq!(owned.hash_algo, HashAlgorithm::MD5);
        assert!(owned.key.is_empty());
        assert!(owned.mvid.is_none());
    }

    #[test]
    fn write_row_round_trips() {
        let module = Module {
            flags: 0,
            name: "Plugin.Core".to_string(),
            version: ModuleVersion::new(3, 2, 1),
            hash_algo: HashAlgorithm::SHA1,
            key: vec![0xAA, 0xBB],
            mvid: Some(uguid::guid!("01020304-0506-0708-090a-0b0c0d0e0f10")),
        };

        let mut strings = StringsBuilder::new();
        let mut blob = BlobBuilder::new();
        let mut guids = GuidBuilder::new();

        let mut buffer = vec![0_u8; ModuleRaw::row_size() as usize];
        let mut offset = 0;
        module
            .write_row(&mut buffer, &mut offset, &mut strings, &mut blob, &mut guids)
            .unwrap();
        assert_eq!(offset, buffer.len());

        let strings_data = strings.finish();
        let blob_data = blob.finish();
        let guid_data = guids.finish();

        let table = MetadataTable::<ModuleRaw>::new(&buffer, 1).unwrap();
        let owned = table
            .get(1)
            .unwrap()
            .to_owned(
                &Strings::from(&strings_data).unwrap(),
                &Blob::from(&blob_data).unwrap(),
                &Guid::from(&guid_data).unwrap(),
            )
            .unwrap();

        assert_eq!(owned, module);
    }
}
