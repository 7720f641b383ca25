//! `TypeDef` table: types defined within a module unit.
//!
//! Each row describes one type definition with its visibility flags, name,
//! namespace and (for nested types) the RID of the enclosing definition. The
//! symbol index is built from these rows: public, non-synthetic definitions of
//! target modules become index entries keyed by their full name.

use bitflags::bitflags;

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        streams::{Strings, StringsBuilder},
        tables::{RowDefinition, TableId},
        token::Token,
    },
    Result,
};

bitflags! {
    /// Visibility and shape flags for a type definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// The type is visible outside its defining module. For nested types
        /// the whole enclosing chain must carry this flag for the type to be
        /// reachable from other modules.
        const PUBLIC = 0x0001;

        /// Compiler-generated metadata that never appears in user source.
        /// Synthetic definitions are excluded from the symbol index.
        const SYNTHETIC = 0x0002;

        /// The type cannot be extended.
        const SEALED = 0x0004;

        /// The type is a contract without implementation.
        const INTERFACE = 0x0008;
    }
}

/// Raw representation of a `TypeDef` table entry with unresolved heap indexes.
///
/// Use [`TypeDefRaw::to_owned`] to resolve the heap indexes against the unit's
/// streams and obtain a [`TypeDef`].
#[derive(Clone, Debug)]
pub struct TypeDefRaw {
    /// Row identifier within the `TypeDef` table.
    pub rid: u32,
    /// Metadata token for this row.
    pub token: Token,
    /// Byte offset of this row inside the serialized table section.
    pub offset: usize,
    /// Raw [`TypeFlags`] bits.
    pub flags: u32,
    /// Index into `#Strings` containing the type name.
    pub name: u32,
    /// Index into `#Strings` containing the namespace (0 = empty).
    pub namespace: u32,
    /// RID of the enclosing `TypeDef` (0 = top-level).
    pub enclosing: u32,
}

impl TypeDefRaw {
    /// Convert this raw row into an owned [`TypeDef`] with resolved heap data.
    ///
    /// ## Arguments
    /// * 'strings' - The `#Strings` heap of the owning unit
    ///
    /// # Errors
    /// Returns an error if a heap index is out of bounds or malformed.
    pub fn to_owned(&self, strings: &Strings) -> Result<TypeDef> {
        Ok(TypeDef {
            flags: TypeFlags::from_bits_retain(self.flags),
            name: strings.get(self.name as usize)?.to_string(),
            namespace: strings.get(self.namespace as usize)?.to_string(),
            enclosing: self.enclosing,
        })
    }
}

impl RowDefinition for TypeDefRaw {
    #[rustfmt::skip]
    fn row_size() -> u32 {
        /* flags */     4 +
        /* name */      4 +
        /* namespace */ 4 +
        /* enclosing */ 4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            token: Token::from_parts(TableId::TypeDef as u8, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at::<u32>(data, offset)?,
            namespace: read_le_at::<u32>(data, offset)?,
            enclosing: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// A type defined by a module unit, with resolved name and namespace.
///
/// Owned variant of [`TypeDefRaw`]. Nested definitions keep an empty namespace
/// and point at their enclosing definition by RID; a nested row always appears
/// after its enclosing row, so the enclosing RID is strictly smaller than the
/// row's own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    /// Visibility and shape flags.
    pub flags: TypeFlags,
    /// Simple type name.
    pub name: String,
    /// Namespace; empty for nested types.
    pub namespace: String,
    /// RID of the enclosing `TypeDef` (0 = top-level).
    pub enclosing: u32,
}

impl TypeDef {
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
    ) -> Result<()> {
        write_le_at::<u32>(data, offset, self.flags.bits())?;
        write_le_at::<u32>(data, offset, strings.intern(&self.name)?)?;
        write_le_at::<u32>(data, offset, strings.intern(&self.namespace)?)?;
        write_le_at::<u32>(data, offset, self.enclosing)?;
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
            // row 1: public top-level type
            0x01, 0x00, 0x00, 0x00, // flags (PUBLIC)
            0x01, 0x00, 0x00, 0x00, // name
            0x08, 0x00, 0x00, 0x00, // namespace
            0x00, 0x00, 0x00, 0x00, // enclosing
            // row 2: public type nested in row 1
            0x01, 0x00, 0x00, 0x00, // flags (PUBLIC)
            0x10, 0x00, 0x00, 0x00, // name
            0x00, 0x00, 0x00, 0x00, // namespace (empty)
            0x01, 0x00, 0x00, 0x00, // enclosing
        ];

        let table = MetadataTable::<TypeDefRaw>::new(&data, 2).unwrap();

        let outer = table.get(1).unwrap();
        assert_eq!(outer.rid, 1);
        assert_eq!(outer.token.table(), TableId::TypeDef as u8);
        assert_eq!(outer.flags, TypeFlags::PUBLIC.bits());
        assert_eq!(outer.enclosing, 0);

        let nested = table.get(2).unwrap();
        assert_eq!(nested.namespace, 0);
        assert_eq!(nested.enclosing, 1);
    }

    #[test]
    fn resolve_to_owned() {
        #[rustfmt::skip]
        let data = [
            0x03, 0x00, 0x00, 0x00, // flags (PUBLIC | SYNTHETIC)
            0x0A, 0x00, 0x00, 0x00, // name
            0x01, 0x00, 0x00, 0x00, // namespace
            0x00, 0x00, 0x00, 0x00, // enclosing
        ];

        let strings_data = b"\0Host.Api\0Widget\0";
        let strings = Strings::from(strings_data).unwrap();

        let table = MetadataTable::<TypeDefRaw>::new(&data, 1).unwrap();
        let owned = table.get(1).unwrap().to_owned(&strings).unwrap();

        assert_eq!(owned.name, "Widget");
        assert_eq!(owned.namespace, "Host.Api");
        assert!(owned.flags.contains(TypeFlags::PUBLIC));
        assert!(owned.flags.contains(TypeFlags::SYNTHETIC));
    }

    #[test]
    fn unknown_flag_bits_are_retained() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x00, 0x80, // flags (PUBLIC plus an undefined bit)
            0x01, 0x00, 0x00, 0x00, // name
            0x00, 0x00, 0x00, 0x00, // namespace
            0x00, 0x00, 0x00, 0x00, // enclosing
        ];

        let strings = Strings::from(b"\0T\0").unwrap();
        let table = MetadataTable::<TypeDefRaw>::new(&data, 1).unwrap();
        let owned = table.get(1).unwrap().to_owned(&strings).unwrap();

        assert!(owned.flags.contains(TypeFlags::PUBLIC));
        assert_eq!(owned.flags.bits(), 0x8000_0001);
    }

    #[test]
    fn write_row_round_trips() {
        let type_def = TypeDef {
            flags: TypeFlags::PUBLIC | TypeFlags::SEALED,
            name: "Facade".to_string(),
            namespace: "Host.Compat".to_string(),
            enclosing: 0,
        };

        let mut strings = StringsBuilder::new();
        let mut buffer = vec![0_u8; TypeDefRaw::row_size() as usize];
        let mut offset = 0;
        type_def
            .write_row(&mut buffer, &mut offset, &mut strings)
            .unwrap();

        let strings_data = strings.finish();
        let table = MetadataTable::<TypeDefRaw>::new(&buffer, 1).unwrap();
        let owned = table
            .get(1)
            .unwrap()
            .to_owned(&Strings::from(&strings_data).unwrap())
            .unwrap();

        assert_eq!(owned, type_def);
    }
}
