//! Parsing of serialized plugin module images.
//!
//! The reader walks the container front to back: file header, then per unit the
//! unit header, the three heaps and the six tables. All heap indexes are
//! resolved eagerly into owned rows, and [`super::ModuleUnit::validate`] runs on
//! every unit before it is accepted, so a successfully parsed image never
//! carries dangling RID cross-references beyond the legal 0 values.

use std::path::Path;

use strum::IntoEnumIterator;

use crate::{
    file::{parser::Parser, File},
    metadata::{
        image::{ModuleImage, ModuleUnit, FORMAT_VERSION, MAGIC},
        streams::{Blob, Guid, Strings},
        tables::{
            MemberDefRaw, MemberRefRaw, MetadataTable, ModuleRaw, ModuleRefRaw, RowDefinition,
            TableId, TypeDefRaw, TypeRefRaw,
        },
    },
    Error, Result,
};

impl ModuleImage {
    /// Load and parse a plugin module image from disk.
    ///
    /// The file is memory-mapped while parsing and released afterwards; the
    /// returned image owns all of its data.
    ///
    /// # Arguments
    /// * 'path' - Path of the image file to load
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or is not a valid image.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::from_file(path)?;
        Self::from_data(file.data())
    }

    /// Parse a plugin module image from an in-memory buffer.
    ///
    /// # Arguments
    /// * 'data' - The raw image bytes
    ///
    /// # Errors
    /// Returns an error if the buffer is empty or not a valid image.
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        let file = File::from_mem(data)?;
        Self::from_data(file.data())
    }

    /// Parse an image from a borrowed byte slice.
    pub(crate) fn from_data(data: &[u8]) -> Result<Self> {
        let mut parser = Parser::new(data);

        if parser.read_bytes(4)? != MAGIC {
            return Err(malformed_error!("Invalid image magic"));
        }

        let version = parser.read_le::<u16>()?;
        if version != FORMAT_VERSION {
            return Err(Error::NotSupported);
        }

        let unit_count = parser.read_le::<u16>()?;
        if unit_count == 0 {
            return Err(malformed_error!("Image declares zero units"));
        }

        let mut units = Vec::with_capacity(unit_count as usize);
        for _ in 0..unit_count {
            units.push(read_unit(&mut parser)?);
        }

        ModuleImage::from_units(units)
    }
}

fn read_unit(parser: &mut Parser) -> Result<ModuleUnit> {
    let strings_bytes = parser.read_le::<u32>()? as usize;
    let blob_bytes = parser.read_le::<u32>()? as usize;
    let guid_count = parser.read_le::<u32>()? as usize;

    let mut row_counts = [0_u32; 6];
    for id in TableId::iter() {
        row_counts[id as usize] = parser.read_le::<u32>()?;
    }

    if row_counts[TableId::Module as usize] != 1 {
        return Err(malformed_error!(
            "Unit must carry exactly one Module row, found {}",
            row_counts[TableId::Module as usize]
        ));
    }

    let guid_bytes = guid_count
        .checked_mul(16)
        .ok_or_else(|| out_of_bounds_error!())?;

    let strings = Strings::from(parser.read_bytes(strings_bytes)?)?;
    let blob = Blob::from(parser.read_bytes(blob_bytes)?)?;
    let guids = Guid::from(parser.read_bytes(guid_bytes)?)?;

    let modules = read_table::<ModuleRaw>(parser, row_counts[TableId::Module as usize])?;
    let module_refs = read_table::<ModuleRefRaw>(parser, row_counts[TableId::ModuleRef as usize])?;
    let type_defs = read_table::<TypeDefRaw>(parser, row_counts[TableId::TypeDef as usize])?;
    let type_refs = read_table::<TypeRefRaw>(parser, row_counts[TableId::TypeRef as usize])?;
    let member_defs = read_table::<MemberDefRaw>(parser, row_counts[TableId::MemberDef as usize])?;
    let member_refs = read_table::<MemberRefRaw>(parser, row_counts[TableId::MemberRef as usize])?;

    let module = modules
        .get(1)
        .ok_or_else(|| malformed_error!("Module table has no row"))?
        .to_owned(&strings, &blob, &guids)?;

    let mut unit = ModuleUnit::new(module);

    for row in &module_refs {
        unit.module_refs.push(row.to_owned(&strings, &blob)?);
    }
    for row in &type_defs {
        unit.type_defs.push(row.to_owned(&strings)?);
    }
    for row in &type_refs {
        unit.type_refs.push(row.to_owned(&strings)?);
    }
    for row in &member_defs {
        unit.member_defs.push(row.to_owned(&strings, &blob)?);
    }
    for row in &member_refs {
        unit.member_refs.push(row.to_owned(&strings, &blob)?);
    }

    unit.validate()?;
    Ok(unit)
}

fn read_table<'a, T: RowDefinition>(
    parser: &mut Parser<'a>,
    row_count: u32,
) -> Result<MetadataTable<'a, T>> {
    let table_bytes = (row_count as usize)
        .checked_mul(T::row_size() as usize)
        .ok_or_else(|| out_of_bounds_error!())?;

    MetadataTable::new(parser.read_bytes(table_bytes)?, row_count)
}
