//! `TypeRef` table: references to types defined in other modules.
//!
//! Each row is one reference site. The scope column names the `ModuleRef` the
//! type is claimed to come from and is the single mutable piece of state the
//! scope rewriter updates; 0 means the reference is currently unresolved.
//! Nested references encode the nesting chain in the name column itself
//! (`Outer/Inner`), so a site's full name never needs another table.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        streams::{Strings, StringsBuilder},
        tables::{RowDefinition, TableId},
        token::Token,
    },
    Result,
};

/// Raw representation of a `TypeRef` table entry with unresolved heap indexes.
///
/// Use [`TypeRefRaw::to_owned`] to resolve the heap indexes against the unit's
/// streams and obtain a [`TypeRef`].
#[derive(Clone, Debug)]
pub struct TypeRefRaw {
    /// Row identifier within the `TypeRef` table.
    pub rid: u32,
    /// Metadata token for this row.
    pub token: Token,
    /// Byte offset of this row inside the serialized table section.
    pub offset: usize,
    /// RID of the `ModuleRef` this site resolves against (0 = unresolved).
    pub scope: u32,
    /// Index into `#Strings` containing the type name.
    pub name: u32,
    /// Index into `#Strings` containing the namespace (0 = empty).
    pub namespace: u32,
}

impl TypeRefRaw {
    /// Convert this raw row into an owned [`TypeRef`] with resolved heap data.
    ///
    /// ## Arguments
    /// * 'strings' - The `#Strings` heap of the owning unit
    ///
    /// # Errors
    /// Returns an error if a heap index is out of bounds or malformed.
    pub fn to_owned(&self, strings: &Strings) -> Result<TypeRef> {
        Ok(TypeRef {
            scope: self.scope,
            name: strings.get(self.name as usize)?.to_string(),
            namespace: strings.get(self.namespace as usize)?.to_string(),
        })
    }
}

impl RowDefinition for TypeRefRaw {
    #[rustfmt::skip]
    fn row_size() -> u32 {
        /* scope */     4 +
        /* name */      4 +
        /* namespace */ 4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            token: Token::from_parts(TableId::TypeRef as u8, rid),
            offset: *offset,
            scope: read_le_at::<u32>(data, offset)?,
            name: read_le_at::<u32>(data, offset)?,
            namespace: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// A reference site naming a type defined elsewhere.
///
/// Owned variant of [`TypeRefRaw`]. The row's 1-based position inside
/// [`crate::metadata::image::ModuleUnit::type_refs`] is the RID that member
/// references point at with their class column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    /// RID of the `ModuleRef` this site resolves against (0 = unresolved).
    pub scope: u32,
    /// Simple type name; nested chains join segments with `/`.
    pub name: String,
    /// Namespace; empty when the type lives in the global namespace.
    pub namespace: String,
}

impl TypeRef {
    /// The full name of the referenced type.
    ///
    /// Renders `Namespace.Name`, or the bare name when the namespace is empty.
    /// Nesting is already encoded in the name column, so `Outer/Inner` chains
    /// come through unchanged.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
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
    ) -> Result<()> {
        write_le_at::<u32>(data, offset, self.scope)?;
        write_le_at::<u32>(data, offset, strings.intern(&self.name)?)?;
        write_le_at::<u32>(data, offset, strings.intern(&self.namespace)?)?;
        Ok(())
    }
}
