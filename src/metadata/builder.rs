//! Fluent construction of plugin module images.
//!
//! [`ModuleBuilder`] assembles the same owned model the parser produces, which
//! makes it the natural way to author fixtures in tests and synthetic modules
//! in host tooling. Rows are numbered in insertion order starting at 1, so the
//! RID of a definition is known at the call site: the first `module_ref` is
//! RID 1, the second RID 2, and so on per table.
//!
//! # Usage Examples
//!
//! ```rust
//! use rebind::metadata::builder::ModuleBuilder;
//! use rebind::metadata::identity::ModuleVersion;
//! use rebind::metadata::tables::TypeFlags;
//!
//! let image = ModuleBuilder::new("Plugin.Sample")
//!     .version(1, 2, 0)
//!     .module_ref("Legacy.Platform", ModuleVersion::new(1, 4, 0))
//!     .type_def("Plugin.Sample", "Entry", TypeFlags::PUBLIC)
//!     .type_ref(1, "Legacy.Api", "Widget")
//!     .build()?;
//!
//! assert_eq!(image.name(), "Plugin.Sample");
//! # Ok::<(), rebind::Error>(())
//! ```

use crate::{
    metadata::{
        identity::{ModuleIdentity, ModuleVersion},
        image::{ModuleImage, ModuleUnit},
        tables::{
            HashAlgorithm, MemberDef, MemberFlags, MemberRef, Module, ModuleRef, ModuleRefFlags,
            TypeDef, TypeFlags, TypeRef,
        },
    },
    Result,
};

/// Fluent builder producing a [`ModuleUnit`] or single-unit [`ModuleImage`].
///
/// All cross-table RIDs are supplied by the caller and checked once on build
/// via [`ModuleUnit::validate`].
pub struct ModuleBuilder {
    unit: ModuleUnit,
}

impl ModuleBuilder {
    /// Start a builder for a module with the given name.
    ///
    /// The module defaults to version `0.0.0`, SHA-1 key hashing, no public key
    /// and no MVID.
    #[must_use]
    pub fn new(name: &str) -> Self {
        ModuleBuilder {
            unit: ModuleUnit::new(Module {
                flags: 0,
                name: name.to_string(),
                version: ModuleVersion::default(),
                hash_algo: HashAlgorithm::SHA1,
                key: Vec::new(),
                mvid: None,
            }),
        }
    }

    /// Set the module version.
    #[must_use]
    pub fn version(mut self, major: u16, minor: u16, patch: u16) -> Self {
        self.unit.module.version = ModuleVersion::new(major, minor, patch);
        self
    }

    /// Set the declared hash algorithm for key token derivation.
    #[must_use]
    pub fn hash_algorithm(mut self, algo: u32) -> Self {
        self.unit.module.hash_algo = algo;
        self
    }

    /// Sign the module with the given full public key.
    #[must_use]
    pub fn public_key(mut self, key: &[u8]) -> Self {
        self.unit.module.key = key.to_vec();
        self
    }

    /// Set the module variant identifier.
    #[must_use]
    pub fn mvid(mut self, mvid: uguid::Guid) -> Self {
        self.unit.module.mvid = Some(mvid);
        self
    }

    /// Add an unsigned module-level reference.
    ///
    /// ## Arguments
    /// * 'name'    - Name of the referenced module
    /// * 'version' - Version the reference was compiled against
    #[must_use]
    pub fn module_ref(mut self, name: &str, version: ModuleVersion) -> Self {
        self.unit.module_refs.push(ModuleRef {
            flags: ModuleRefFlags::empty(),
            name: name.to_string(),
            version,
            key: Vec::new(),
        });
        self
    }

    /// Add a module-level reference carrying the given identity's name, version
    /// and key.
    #[must_use]
    pub fn module_ref_identity(mut self, identity: &ModuleIdentity) -> Self {
        self.unit.module_refs.push(identity.as_module_ref());
        self
    }

    /// Add a top-level type definition.
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace of the type (may be empty)
    /// * 'name'      - Simple type name
    /// * 'flags'     - Visibility and shape flags
    #[must_use]
    pub fn type_def(mut self, namespace: &str, name: &str, flags: TypeFlags) -> Self {
        self.unit.type_defs.push(TypeDef {
            flags,
            name: name.to_string(),
            namespace: namespace.to_string(),
            enclosing: 0,
        });
        self
    }

    /// Add a type definition nested inside an earlier one.
    ///
    /// Nested definitions keep an empty namespace; the full name is derived
    /// from the enclosing chain. The enclosing definition must already have
    /// been added, so 'enclosing' is always smaller than the new row's RID.
    ///
    /// ## Arguments
    /// * 'name'      - Simple type name
    /// * 'flags'     - Visibility and shape flags
    /// * 'enclosing' - RID of the enclosing type definition
    #[must_use]
    pub fn nested_type_def(mut self, name: &str, flags: TypeFlags, enclosing: u32) -> Self {
        self.unit.type_defs.push(TypeDef {
            flags,
            name: name.to_string(),
            namespace: String::new(),
            enclosing,
        });
        self
    }

    /// Add a type-reference site.
    ///
    /// ## Arguments
    /// * 'scope'     - RID of the module reference the site resolves against (0 = unresolved)
    /// * 'namespace' - Namespace of the referenced type (may be empty)
    /// * 'name'      - Type name; nested chains join segments with `/`
    #[must_use]
    pub fn type_ref(mut self, scope: u32, namespace: &str, name: &str) -> Self {
        self.unit.type_refs.push(TypeRef {
            scope,
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
        self
    }

    /// Add a member definition.
    ///
    /// ## Arguments
    /// * 'owner'     - RID of the owning type definition
    /// * 'name'      - Member name
    /// * 'flags'     - Accessibility and shape flags
    /// * 'signature' - Signature blob, e.g. from [`crate::metadata::signatures`]
    #[must_use]
    pub fn member_def(mut self, owner: u32, name: &str, flags: MemberFlags, signature: &[u8]) -> Self {
        self.unit.member_defs.push(MemberDef {
            owner,
            flags,
            name: name.to_string(),
            signature: signature.to_vec(),
        });
        self
    }

    /// Add a member-reference site.
    ///
    /// ## Arguments
    /// * 'class'     - RID of the type reference declaring the member
    /// * 'name'      - Member name
    /// * 'signature' - Signature blob the call site was compiled against
    #[must_use]
    pub fn member_ref(mut self, class: u32, name: &str, signature: &[u8]) -> Self {
        self.unit.member_refs.push(MemberRef {
            class,
            name: name.to_string(),
            signature: signature.to_vec(),
        });
        self
    }

    /// Finish and return the unit, checking all cross-table RIDs.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a RID reference is invalid; see
    /// [`ModuleUnit::validate`].
    pub fn build_unit(self) -> Result<ModuleUnit> {
        self.unit.validate()?;
        Ok(self.unit)
    }

    /// Finish and return a single-unit image, checking all cross-table RIDs.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a RID reference is invalid.
    pub fn build(self) -> Result<ModuleImage> {
        ModuleImage::from_units(vec![self.build_unit()?])
    }
}
