//! Metadata table infrastructure for plugin module images.
//!
//! A module unit stores its definitions and references in six fixed-width tables,
//! serialized back to back in a well-known order. This module provides the shared
//! machinery for reading those tables plus one submodule per table with the raw
//! (unresolved heap indexes) and owned (resolved, mutable) row variants.
//!
//! # Architecture
//!
//! Tables follow a dual-variant pattern:
//! - `XxxRaw`: the on-disk row with heap indexes and RID cross-references, produced
//!   by [`MetadataTable`] directly from the mapped bytes.
//! - `Xxx`: the owned row with resolved strings/blobs, produced via `to_owned` and
//!   assembled into a [`crate::metadata::image::ModuleUnit`]. Owned rows carry no
//!   RID; their position inside the unit's row vector defines it (1-based).
//!
//! # Key Components
//!
//! - [`TableId`]: identifies each of the six tables and orders them on disk
//! - [`RowDefinition`]: trait implemented by every raw row type
//! - [`MetadataTable`]: typed view over one table's bytes with row access/iteration
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use rebind::metadata::tables::{MetadataTable, TypeRefRaw};
//!
//! # fn example(data: &[u8]) -> rebind::Result<()> {
//! let table = MetadataTable::<TypeRefRaw>::new(data, 3)?;
//! for row in &table {
//!     println!("scope for row {} is {}", row.rid, row.scope);
//! }
//! # Ok(())
//! # }
//! ```

mod memberdef;
mod memberref;
mod module;
mod moduleref;
mod typedef;
mod typeref;

use std::marker::PhantomData;

use strum::{EnumCount, EnumIter};

use crate::Result;

pub use memberdef::{MemberDef, MemberDefRaw, MemberFlags};
pub use memberref::{MemberRef, MemberRefRaw};
pub use module::{HashAlgorithm, Module, ModuleRaw};
pub use moduleref::{ModuleRef, ModuleRefFlags, ModuleRefRaw};
pub use typedef::{TypeDef, TypeDefRaw, TypeFlags};
pub use typeref::{TypeRef, TypeRefRaw};

/// Identifies the metadata tables a module unit can contain.
///
/// The discriminant doubles as the table's position in the unit header's row-count
/// array and in the serialized table section, and as the table tag in
/// [`crate::metadata::token::Token`] values.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumIter, EnumCount)]
pub enum TableId {
    /// `Module` table (0x00) - The identity of the unit itself.
    ///
    /// Every unit carries exactly one row describing the module: name, version,
    /// hash algorithm, public key and MVID.
    Module = 0x00,

    /// `ModuleRef` table (0x01) - Module-level references to external modules.
    ///
    /// One row per external module this unit depends on, including the version
    /// and key identity the reference was compiled against. This is the table
    /// the reference transplant mutates.
    ModuleRef = 0x01,

    /// `TypeDef` table (0x02) - Types defined within this unit.
    ///
    /// Contains all type definitions with their visibility flags, name, namespace
    /// and (for nested types) the RID of the enclosing definition.
    TypeDef = 0x02,

    /// `TypeRef` table (0x03) - References to types defined elsewhere.
    ///
    /// Each row is one reference site with a mutable scope column naming the
    /// `ModuleRef` the type is claimed to come from (0 = unresolved).
    TypeRef = 0x03,

    /// `MemberDef` table (0x04) - Members defined by this unit's types.
    ///
    /// Methods and properties with their owning `TypeDef`, accessibility flags,
    /// name and signature blob.
    MemberDef = 0x04,

    /// `MemberRef` table (0x05) - References to members of external types.
    ///
    /// Each row names a member on a `TypeRef` together with the signature blob
    /// the call site was compiled against.
    MemberRef = 0x05,
}

/// Trait defining the interface for reading metadata table rows.
///
/// Implemented by every raw row type. All plugin module tables are fixed-width
/// (heap indexes are always 4 bytes), so the row size is a constant per table
/// rather than a function of heap sizes.
pub trait RowDefinition: Sized {
    /// The size in bytes of a single row of this table.
    fn row_size() -> u32;

    /// Read and parse a single row from `data`.
    ///
    /// ## Arguments
    /// * 'data'    - The byte buffer containing the table data
    /// * 'offset'  - Current read position, advanced by the bytes consumed
    /// * 'rid'     - The 1-based row identifier for this entry
    ///
    /// # Errors
    /// Returns an error if the buffer contains insufficient data for a complete row
    fn read_row(data: &[u8], offset: &mut usize, rid: u32) -> Result<Self>;
}

/// Typed view over the raw bytes of one metadata table.
///
/// Provides 1-based row access and sequential iteration over rows of type `T`.
/// Rows are parsed on demand; the table itself only borrows the underlying bytes.
pub struct MetadataTable<'a, T> {
    /// Reference to the raw table data bytes
    data: &'a [u8],
    /// Total number of rows in this table
    row_count: u32,
    /// Size in bytes of each row
    row_size: u32,
    /// Phantom data to maintain type information
    _phantom: PhantomData<T>,
}

impl<'a, T: RowDefinition> MetadataTable<'a, T> {
    /// Create a new metadata table over `data`.
    ///
    /// ## Arguments
    /// * 'data'        - The raw bytes of the table (may extend past the table end)
    /// * '`row_count`' - The number of rows present
    ///
    /// # Errors
    /// Returns an error if `data` is too small to hold `row_count` rows
    pub fn new(data: &'a [u8], row_count: u32) -> Result<Self> {
        let row_size = T::row_size();
        if (data.len() as u64) < u64::from(row_count) * u64::from(row_size) {
            return Err(out_of_bounds_error!());
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            _phantom: PhantomData,
        })
    }

    /// Returns the total size of this table in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Returns the size of a single row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Returns the total number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Retrieves a specific row by its 1-based RID.
    ///
    /// Returns `None` if the RID is 0, out of bounds, or the row fails to parse.
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<T> {
        if rid == 0 || self.row_count < rid {
            return None;
        }

        T::read_row(
            self.data,
            &mut ((rid as usize - 1) * self.row_size as usize),
            rid,
        )
        .ok()
    }

    /// Creates a sequential iterator over all rows in the table.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            position: 1,
        }
    }
}

impl<'a, 'b, T: RowDefinition> IntoIterator for &'b MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'b, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
///
/// Yields parsed rows in RID order, starting at RID 1.
pub struct TableIterator<'b, 'a, T> {
    table: &'b MetadataTable<'a, T>,
    position: u32,
}

impl<'b, 'a, T: RowDefinition> Iterator for TableIterator<'b, 'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.position > self.table.row_count {
            return None;
        }

        let row = self.table.get(self.position);
        self.position += 1;
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn table_id_order_matches_disk_layout() {
        let ids: Vec<TableId> = TableId::iter().collect();
        assert_eq!(
            ids,
            [
                TableId::Module,
                TableId::ModuleRef,
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::MemberDef,
                TableId::MemberRef,
            ]
        );
        assert_eq!(TableId::COUNT, 6);
    }

    #[test]
    fn rejects_truncated_table() {
        // TypeRef rows are 12 bytes; 23 bytes cannot hold two rows
        let data = [0u8; 23];
        assert!(MetadataTable::<TypeRefRaw>::new(&data, 2).is_err());
        assert!(MetadataTable::<TypeRefRaw>::new(&data, 1).is_ok());
    }

    #[test]
    fn get_rejects_out_of_range_rids() {
        let data = [0u8; 24];
        let table = MetadataTable::<TypeRefRaw>::new(&data, 2).unwrap();

        assert!(table.get(0).is_none());
        assert!(table.get(3).is_none());
        assert!(table.get(1).is_some());
        assert!(table.get(2).is_some());
    }
}
