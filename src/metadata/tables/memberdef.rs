//! `MemberDef` table: members defined by a unit's types.
//!
//! Methods and properties with their owning `TypeDef`, accessibility flags, name
//! and signature blob. Facade resolution simulation scans these rows: a member
//! reference resolves when the owning target defines a public member with the
//! same name and byte-identical signature.

use bitflags::bitflags;

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        streams::{Blob, BlobBuilder, Strings, StringsBuilder},
        tables::{RowDefinition, TableId},
        token::Token,
    },
    Result,
};

bitflags! {
    /// Accessibility and shape flags for a member definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u32 {
        /// The member is callable from other modules.
        const PUBLIC = 0x0001;

        /// The member has no instance receiver.
        const STATIC = 0x0002;

        /// The member is a property accessor pair rather than a method.
        const PROPERTY = 0x0004;
    }
}

/// Raw representation of a `MemberDef` table entry with unresolved heap indexes.
///
/// Use [`MemberDefRaw::to_owned`] to resolve the heap indexes against the unit's
/// streams and obtain a [`MemberDef`].
#[derive(Clone, Debug)]
pub struct MemberDefRaw {
    /// Row identifier within the `MemberDef` table.
    pub rid: u32,
    /// Metadata token for this row.
    pub token: Token,
    /// Byte offset of this row inside the serialized table section.
    pub offset: usize,
    /// RID of the owning `TypeDef`.
    pub owner: u32,
    /// Raw [`MemberFlags`] bits.
    pub flags: u32,
    /// Index into `#Strings` containing the member name.
    pub name: u32,
    /// Index into `#Blob` containing the member signature.
    pub signature: u32,
}

impl MemberDefRaw {
    /// Convert this raw row into an owned [`MemberDef`] with resolved heap data.
    ///
    /// ## Arguments
    /// * 'strings' - The `#Strings` heap of the owning unit
    /// * 'blob'    - The `#Blob` heap of the owning unit
    ///
    /// # Errors
    /// Returns an error if a heap index is out of bounds or malformed.
    pub fn to_owned(&self, strings: &Strings, blob: &Blob) -> Result<MemberDef> {
        Ok(MemberDef {
            owner: self.owner,
            flags: MemberFlags::from_bits_retain(self.flags),
            name: strings.get(self.name as usize)?.to_string(),
            signature: blob.get(self.signature as usize)?.to_vec(),
        })
    }
}

impl RowDefinition for MemberDefRaw {
    #[rustfmt::skip]
    fn row_size() -> u32 {
        /* owner */     4 +
        /* flags */     4 +
        /* name */      4 +
        /* signature */ 4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self> {
        Ok(MemberDefRaw {
            rid,
            token: Token::from_parts(TableId::MemberDef as u8, rid),
            offset: *offset,
            owner: read_le_at::<u32>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at::<u32>(data, offset)?,
            signature: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// A member defined by one of the unit's types, with resolved name and signature.
///
/// Owned variant of [`MemberDefRaw`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDef {
    /// RID of the owning `TypeDef`.
    pub owner: u32,
    /// Accessibility and shape flags.
    pub flags: MemberFlags,
    /// Member name.
    pub name: String,
    /// Signature blob; compared byte-for-byte during resolution.
    pub signature: Vec<u8>,
}

impl MemberDef {
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
        write_le_at::<u32>(data, offset, self.owner)?;
        write_le_at::<u32>(data, offset, self.flags.bits())?;
        write_le_at::<u32>(data, offset, strings.intern(&self.name)?)?;
        write_le_at::<u32>(data, offset, blob.intern(&self.signature)?)?;
        Ok(())
    }
}
