//! `MemberRef` table: references to members of external types.
//!
//! Each row names a member on a `TypeRef` together with the signature blob the
//! call site was compiled against. The facade mapping pass keys its lookups on
//! the resolved declaring type, the member name and these exact signature bytes.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        streams::{Blob, BlobBuilder, Strings, StringsBuilder},
        tables::{RowDefinition, TableId},
        token::Token,
    },
    Result,
};

/// Raw representation of a `MemberRef` table entry with unresolved heap indexes.
///
/// Use [`MemberRefRaw::to_owned`] to resolve the heap indexes against the unit's
/// streams and obtain a [`MemberRef`].
#[derive(Clone, Debug)]
pub struct MemberRefRaw {
    /// Row identifier within the `MemberRef` table.
    pub rid: u32,
    /// Metadata token for this row.
    pub token: Token,
    /// Byte offset of this row inside the serialized table section.
    pub offset: usize,
    /// RID of the `TypeRef` declaring the member (0 = dangling).
    pub class: u32,
    /// Index into `#Strings` containing the member name.
    pub name: u32,
    /// Index into `#Blob` containing the member signature.
    pub signature: u32,
}

impl MemberRefRaw {
    /// Convert this raw row into an owned [`MemberRef`] with resolved heap data.
    ///
    /// ## Arguments
    /// * 'strings' - The `#Strings` heap of the owning unit
    /// * 'blob'    - The `#Blob` heap of the owning unit
    ///
    /// # Errors
    /// Returns an error if a heap index is out of bounds or malformed.
    pub fn to_owned(&self, strings: &Strings, blob: &Blob) -> Result<MemberRef> {
        Ok(MemberRef {
            class: self.class,
            name: strings.get(self.name as usize)?.to_string(),
            signature: blob.get(self.signature as usize)?.to_vec(),
        })
    }
}

impl RowDefinition for MemberRefRaw {
    #[rustfmt::skip]
    fn row_size() -> u32 {
        /* class */     4 +
        /* name */      4 +
        /* signature */ 4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            token: Token::from_parts(TableId::MemberRef as u8, rid),
            offset: *offset,
            class: read_le_at::<u32>(data, offset)?,
            name: read_le_at::<u32>(data, offset)?,
            signature: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// A reference site naming a member of an external type.
///
/// Owned variant of [`MemberRefRaw`]. The facade mapping pass may replace all
/// three fields at once when redirecting a call site to its replacement member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRef {
    /// RID of the `TypeRef` declaring the member (0 = dangling).
    pub class: u32,
    /// Member name.
    pub name: String,
    /// Signature blob the call site was compiled against.
    pub signature: Vec<u8>,
}

impl MemberRef {
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
        write_le_at::<u32>(data, offset, self.class)?;
        write_le_at::<u32>(data, offset, strings.intern(&self.name)?)?;
        write_le_at::<u32>(data, offset, blob.intern(&self.signature)?)?;
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
            0x02, 0x00, 0x00, 0x00, // class
            0x01, 0x00, 0x00, 0x00, // name
            0x01, 0x00, 0x00, 0x00, // signature
            // row 2: dangling class
            0x00, 0x00, 0x00, 0x00, // class
            0x09, 0x00, 0x00, 0x00, // name
            0x05, 0x00, 0x00, 0x00, // signature
        ];

        let table = MetadataTable::<MemberRefRaw>::new(&data, 2).unwrap();

        let first = table.get(1).unwrap();
        assert_eq!(first.rid, 1);
        assert_eq!(first.token.table(), TableId::MemberRef as u8);
        assert_eq!(first.class, 2);

        let second = table.get(2).unwrap();
        assert_eq!(second.class, 0);
        assert_eq!(second.signature, 5);
    }

    #[test]
    fn resolve_to_owned() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x00, 0x00, // class
            0x01, 0x00, 0x00, 0x00, // name
            0x01, 0x00, 0x00, 0x00, // signature
        ];

        let strings = Strings::from(b"\0Draw\0").unwrap();
        let blob_data = [0x00, 0x03, 0x20, 0x01, 0x0E];
        let blob = Blob::from(&blob_data).unwrap();

        let table = MetadataTable::<MemberRefRaw>::new(&data, 1).unwrap();
        let owned = table.get(1).unwrap().to_owned(&strings, &blob).unwrap();

        assert_eq!(owned.class, 1);
        assert_eq!(owned.name, "Draw");
        assert_eq!(owned.signature, vec![0x20, 0x01, 0x0E]);
    }

    #[test]
    fn write_row_round_trips() {
        let member_ref = MemberRef {
            class: 7,
            name: "GetValue".to_string(),
            signature: vec![0x20, 0x00, 0x1C],
        };

        let mut strings = StringsBuilder::new();
        let mut blob = BlobBuilder::new();
        let mut buffer = vec![0_u8; MemberRefRaw::row_size() as usize];
        let mut offset = 0;
        member_ref
            .write_row(&mut buffer, &mut offset, &mut strings, &mut blob)
            .unwrap();

        let strings_data = strings.finish();
        let blob_data = blob.finish();

        let table = MetadataTable::<MemberRefRaw>::new(&buffer, 1).unwrap();
        let owned = table
            .get(1)
            .unwrap()
            .to_owned(
                &Strings::from(&strings_data).unwrap(),
                &Blob::from(&blob_data).unwrap(),
            )
            .unwrap();

        assert_eq!(owned, member_ref);
    }
}
