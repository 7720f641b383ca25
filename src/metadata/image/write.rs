//! Canonical emission of plugin module images.
//!
//! Heaps are rebuilt from scratch on every write: rows serialize in schema
//! order and intern their strings, blobs and GUIDs as they are encountered, so
//! the heap layout is a pure function of the owned model. Two equal
//! [`ModuleImage`] values always produce byte-identical files, which is what
//! makes no-op rewrites verifiable by comparing output bytes.

use std::path::Path;

use strum::IntoEnumIterator;

use crate::{
    metadata::{
        image::{ModuleImage, ModuleUnit, FORMAT_VERSION, MAGIC},
        streams::{BlobBuilder, GuidBuilder, StringsBuilder},
        tables::{
            MemberDefRaw, MemberRefRaw, ModuleRaw, ModuleRefRaw, RowDefinition, TableId,
            TypeDefRaw, TypeRefRaw,
        },
    },
    Result,
};

impl ModuleImage {
    /// Serialize the image into its canonical byte form.
    ///
    /// # Errors
    /// Returns an error if a table exceeds the RID space, a heap exceeds its
    /// index space, or the image holds more than `u16::MAX` units.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let unit_count = u16::try_from(self.units().len())
            .map_err(|_| malformed_error!("Image of {} units exceeds the unit count field", self.units().len()))?;

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&unit_count.to_le_bytes());

        for unit in self.units() {
            write_unit(unit, &mut out)?;
        }

        Ok(out)
    }

    /// Serialize the image and write it to disk.
    ///
    /// # Arguments
    /// * 'path' - Destination path; an existing file is replaced
    ///
    /// # Errors
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

fn write_unit(unit: &ModuleUnit, out: &mut Vec<u8>) -> Result<()> {
    let mut strings = StringsBuilder::new();
    let mut blob = BlobBuilder::new();
    let mut guids = GuidBuilder::new();

    let row_counts = [
        1_u32,
        row_count(unit.module_refs.len())?,
        row_count(unit.type_defs.len())?,
        row_count(unit.type_refs.len())?,
        row_count(unit.member_defs.len())?,
        row_count(unit.member_refs.len())?,
    ];

    let table_bytes = table_section_size(&row_counts);
    let mut tables = vec![0_u8; table_bytes];
    let mut offset = 0;

    unit.module
        .write_row(&mut tables, &mut offset, &mut strings, &mut blob, &mut guids)?;
    for row in &unit.module_refs {
        row.write_row(&mut tables, &mut offset, &mut strings, &mut blob)?;
    }
    for row in &unit.type_defs {
        row.write_row(&mut tables, &mut offset, &mut strings)?;
    }
    for row in &unit.type_refs {
        row.write_row(&mut tables, &mut offset, &mut strings)?;
    }
    for row in &unit.member_defs {
        row.write_row(&mut tables, &mut offset, &mut strings, &mut blob)?;
    }
    for row in &unit.member_refs {
        row.write_row(&mut tables, &mut offset, &mut strings, &mut blob)?;
    }

    let strings_data = strings.finish();
    let blob_data = blob.finish();
    let guid_data = guids.finish();

    let strings_bytes = u32::try_from(strings_data.len())
        .map_err(|_| malformed_error!("#Strings heap exceeds the 4 GiB index space"))?;
    let blob_bytes = u32::try_from(blob_data.len())
        .map_err(|_| malformed_error!("#Blob heap exceeds the 4 GiB index space"))?;
    let guid_count = u32::try_from(guid_data.len() / 16)
        .map_err(|_| malformed_error!("#GUID heap exceeds the index space"))?;

    out.extend_from_slice(&strings_bytes.to_le_bytes());
    out.extend_from_slice(&blob_bytes.to_le_bytes());
    out.extend_from_slice(&guid_count.to_le_bytes());
    for id in TableId::iter() {
        out.extend_from_slice(&row_counts[id as usize].to_le_bytes());
    }

    out.extend_from_slice(&strings_data);
    out.extend_from_slice(&blob_data);
    out.extend_from_slice(&guid_data);
    out.extend_from_slice(&tables);

    Ok(())
}

fn row_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| malformed_error!("table of {} rows exceeds the RID space", len))
}

fn table_section_size(row_counts: &[u32; 6]) -> usize {
    let row_sizes = [
        ModuleRaw::row_size(),
        ModuleRefRaw::row_size(),
        TypeDefRaw::row_size(),
        TypeRefRaw::row_size(),
        MemberDefRaw::row_size(),
        MemberRefRaw::row_size(),
    ];

    row_counts
        .iter()
        .zip(row_sizes)
        .map(|(count, size)| *count as usize * size as usize)
        .sum()
}
