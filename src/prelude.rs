//! # rebind Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the rebind library. Import this module to get quick access
//! to the essential types for loading, inspecting, and rewriting plugin
//! module images.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all rebind operations
pub use crate::Error;

/// The result type used throughout rebind
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Owned module image model and its units
pub use crate::{ModuleImage, ModuleUnit};

/// Fluent construction of module images
pub use crate::ModuleBuilder;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Metadata token type for referencing table rows
pub use crate::metadata::token::Token;

/// Metadata table identifiers
pub use crate::metadata::tables::TableId;

/// Generic fixed-width table over raw rows
pub use crate::metadata::tables::{MetadataTable, RowDefinition};

// ================================================================================================
// Module Identity
// ================================================================================================

/// Identity descriptors and key token derivation
pub use crate::metadata::identity::{KeyIdentity, ModuleIdentity, ModuleVersion};

// ================================================================================================
// Metadata Tables - Owned Row Types
// ================================================================================================

/// Owned rows as produced by parsing and consumed by emission
pub use crate::metadata::tables::{Module, ModuleRef, TypeDef, TypeRef};

/// Owned member rows
pub use crate::metadata::tables::{MemberDef, MemberRef};

// ================================================================================================
// Raw Metadata Table Types
// ================================================================================================

/// Raw rows carrying unresolved heap indexes
pub use crate::metadata::tables::{
    MemberDefRaw, MemberRefRaw, ModuleRaw, ModuleRefRaw, TypeDefRaw, TypeRefRaw,
};

// ================================================================================================
// Attributes and Flags
// ================================================================================================

/// Row flag types
pub use crate::metadata::tables::{MemberFlags, ModuleRefFlags, TypeFlags};

// ================================================================================================
// Metadata Streams - Heaps
// ================================================================================================

/// Metadata heap access
pub use crate::metadata::streams::{Blob, Guid, Strings};

// ================================================================================================
// Rewrite Engine
// ================================================================================================

/// Engine construction and per-subject rewriting
pub use crate::rewrite::{Rewriter, RewriterConfig, TargetSource};

/// Loaded targets and the symbol index over them
pub use crate::rewrite::{IdentityRegistry, SymbolIndex, TargetModule};

/// Facade member mappings
pub use crate::rewrite::{FacadeMap, FacadeMapBuilder, MemberKey, MemberMapping};

/// Rewrite events, journaling, and reports
pub use crate::rewrite::{RewriteEvent, RewriteLog, RewriteReport, RewriteSink};
