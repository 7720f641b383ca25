//! Owned in-memory model of a plugin module image.
//!
//! A plugin module image is the little-endian container the rewrite engine
//! operates on: a small file header followed by one or more module units. Each
//! [`ModuleUnit`] bundles the three heaps (`#Strings`, `#Blob`, `#GUID`) with the
//! six metadata tables; once parsed, a [`ModuleImage`] owns everything and the
//! backing bytes can be dropped.
//!
//! # Architecture
//!
//! The split mirrors how the engine uses the data:
//! - this module defines the owned model, its invariants and [`ModuleUnit::validate`]
//! - [`read`](self) logic (`from_file`/`from_mem`) parses and validates bytes
//! - write logic (`to_bytes`/`write_file`) emits the canonical serialized form,
//!   rebuilding heaps in first-use order so emission is a pure function of the
//!   model: equal models produce byte-identical files
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use rebind::metadata::image::ModuleImage;
//!
//! let mut image = ModuleImage::from_file("plugin.pmi".as_ref())?;
//! let unit = image.primary_unit()?;
//! println!("{} type refs", unit.type_refs.len());
//! # Ok::<(), rebind::Error>(())
//! ```

mod read;
mod write;

use crate::{
    metadata::{
        tables::{MemberDef, MemberRef, Module, ModuleRef, TableId, TypeDef, TypeRef},
        token::Token,
    },
    Error, Result,
};

/// Magic bytes opening every plugin module image.
pub const MAGIC: [u8; 4] = *b"PMI\0";

/// The container format version this crate reads and writes.
pub const FORMAT_VERSION: u16 = 1;

/// One module unit: a module definition row plus its heaps and tables.
///
/// Tables are held as owned row vectors. A row's RID is its 1-based position in
/// the vector, so removals shift the RIDs of every later row; the rewrite engine
/// remaps cross-references when it removes module references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleUnit {
    /// The unit's own identity row.
    pub module: Module,
    /// Module-level references to external modules.
    pub module_refs: Vec<ModuleRef>,
    /// Types defined by this unit.
    pub type_defs: Vec<TypeDef>,
    /// References to types defined elsewhere.
    pub type_refs: Vec<TypeRef>,
    /// Members defined by this unit's types.
    pub member_defs: Vec<MemberDef>,
    /// References to members of external types.
    pub member_refs: Vec<MemberRef>,
}

impl ModuleUnit {
    /// Create a unit containing only the given module row, with empty tables.
    #[must_use]
    pub fn new(module: Module) -> Self {
        ModuleUnit {
            module,
            module_refs: Vec::new(),
            type_defs: Vec::new(),
            type_refs: Vec::new(),
            member_defs: Vec::new(),
            member_refs: Vec::new(),
        }
    }

    /// The full name of the type definition with the given RID.
    ///
    /// Renders `Namespace.Name` and joins nested chains with `/`, taking the
    /// namespace from the outermost enclosing definition. Returns `None` if the
    /// RID is 0, out of range, or the enclosing chain is malformed.
    #[must_use]
    pub fn type_def_full_name(&self, rid: u32) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = rid;

        // The enclosing chain strictly decreases in a valid unit; the step
        // bound makes malformed chains terminate instead of spinning.
        for _ in 0..=self.type_defs.len() {
            let def = self.type_defs.get(usize::try_from(current).ok()?.checked_sub(1)?)?;
            segments.push(def.name.as_str());

            if def.enclosing == 0 {
                let nested = {
                    segments.reverse();
                    segments.join("/")
                };
                return Some(if def.namespace.is_empty() {
                    nested
                } else {
                    format!("{}.{}", def.namespace, nested)
                });
            }

            if def.enclosing >= current {
                return None;
            }
            current = def.enclosing;
        }

        None
    }

    /// The full name of the type reference with the given RID.
    ///
    /// Returns `None` if the RID is 0 or out of range.
    #[must_use]
    pub fn type_ref_full_name(&self, rid: u32) -> Option<String> {
        let index = usize::try_from(rid).ok()?.checked_sub(1)?;
        self.type_refs.get(index).map(TypeRef::full_name)
    }

    /// Check every cross-table RID reference in this unit.
    ///
    /// Verifies that type-reference scopes stay within the `ModuleRef` table,
    /// that nested definitions appear after their enclosing definition, that
    /// every member definition names an existing owner and that member-reference
    /// classes stay within the `TypeRef` table. Scope 0 (unresolved) and class 0
    /// (dangling) are legal.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] naming the offending row token on the
    /// first violation.
    pub fn validate(&self) -> Result<()> {
        let module_refs = table_len(self.module_refs.len())?;
        let type_defs = table_len(self.type_defs.len())?;
        let type_refs = table_len(self.type_refs.len())?;
        table_len(self.member_defs.len())?;
        table_len(self.member_refs.len())?;

        for (i, type_ref) in self.type_refs.iter().enumerate() {
            let token = Token::from_parts(TableId::TypeRef as u8, i as u32 + 1);
            if type_ref.scope > module_refs {
                return Err(malformed_error!(
                    "{} scope {} exceeds ModuleRef row count {}",
                    token,
                    type_ref.scope,
                    module_refs
                ));
            }
        }

        for (i, type_def) in self.type_defs.iter().enumerate() {
            let rid = i as u32 + 1;
            if type_def.enclosing >= rid {
                return Err(malformed_error!(
                    "{} enclosing {} does not precede the row",
                    Token::from_parts(TableId::TypeDef as u8, rid),
                    type_def.enclosing
                ));
            }
        }

        for (i, member) in self.member_defs.iter().enumerate() {
            let token = Token::from_parts(TableId::MemberDef as u8, i as u32 + 1);
            if member.owner == 0 || member.owner > type_defs {
                return Err(malformed_error!(
                    "{} owner {} is not a TypeDef row (1..={})",
                    token,
                    member.owner,
                    type_defs
                ));
            }
        }

        for (i, member_ref) in self.member_refs.iter().enumerate() {
            let token = Token::from_parts(TableId::MemberRef as u8, i as u32 + 1);
            if member_ref.class > type_refs {
                return Err(malformed_error!(
                    "{} class {} exceeds TypeRef row count {}",
                    token,
                    member_ref.class,
                    type_refs
                ));
            }
        }

        Ok(())
    }
}

fn table_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| malformed_error!("table of {} rows exceeds the RID space", len))
}

/// A complete plugin module image: one or more module units.
///
/// Parse one with [`ModuleImage::from_file`] or [`ModuleImage::from_mem`], or
/// construct one programmatically through
/// [`crate::metadata::builder::ModuleBuilder`]. An image always holds at least
/// one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImage {
    units: Vec<ModuleUnit>,
}

impl ModuleImage {
    /// Assemble an image from already-built units.
    ///
    /// # Arguments
    /// * 'units' - The module units, in serialization order
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if no units are given.
    pub fn from_units(units: Vec<ModuleUnit>) -> Result<Self> {
        if units.is_empty() {
            return Err(Error::Empty);
        }

        Ok(ModuleImage { units })
    }

    /// The logical name of the image, taken from the first unit's module row.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.units[0].module.name
    }

    /// All units in serialization order.
    #[must_use]
    pub fn units(&self) -> &[ModuleUnit] {
        &self.units
    }

    /// Mutable access to all units.
    pub fn units_mut(&mut self) -> &mut [ModuleUnit] {
        &mut self.units
    }

    /// Number of units in the image.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// The single unit of a single-unit image.
    ///
    /// The rewrite engine operates on exactly one unit per image; multi-unit
    /// images must be split by the host before rewriting.
    ///
    /// # Errors
    /// Returns [`crate::Error::MultiUnit`] if the image holds more than one unit.
    pub fn primary_unit(&self) -> Result<&ModuleUnit> {
        if self.units.len() > 1 {
            return Err(Error::MultiUnit(self.units.len()));
        }

        Ok(&self.units[0])
    }

    /// Mutable variant of [`ModuleImage::primary_unit`].
    ///
    /// # Errors
    /// Returns [`crate::Error::MultiUnit`] if the image holds more than one unit.
    pub fn primary_unit_mut(&mut self) -> Result<&mut ModuleUnit> {
        if self.units.len() > 1 {
            return Err(Error::MultiUnit(self.units.len()));
        }

        Ok(&mut self.units[0])
    }
}
