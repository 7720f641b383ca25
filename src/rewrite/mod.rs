//! Reference rewriting over plugin module images.
//!
//! This module keeps previously compiled plugin modules loadable after the
//! host's own modules change shape. An engine is built once over the
//! current target modules and then rewrites any number of subjects in
//! place:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Rewrite Pipeline                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Construction (fail-fast)                                    │
//! │    load targets → derive identities → build symbol index     │
//! │    → validate facade replacements                            │
//! │                                                              │
//! │  Per subject (in place, single unit)                         │
//! │    1. transplant: strip listed module references, remap      │
//! │       scopes, append canonical target references             │
//! │    2. scope walk: repoint resolvable type reference sites,   │
//! │       sorted by full name, notices deduplicated              │
//! │    3. facade pass: redirect mapped member references,        │
//! │       gated by resolution simulation                         │
//! │                                                              │
//! │  When step 1 strips nothing, the subject is left untouched   │
//! │  and steps 2 and 3 never run.                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything notice-worthy flows to a [`RewriteSink`]; the bundled
//! [`RewriteLog`] journals events in order, and [`RewriteReport`] carries
//! the journal plus per-pass counters.

mod config;
mod engine;
mod events;
mod facade;
mod registry;
mod retarget;
mod scopes;
mod symbols;

pub use config::{RewriterConfig, TargetSource};
pub use engine::Rewriter;
pub use events::{RewriteEvent, RewriteLog, RewriteReport, RewriteSink};
pub use facade::{FacadeMap, FacadeMapBuilder, MemberKey, MemberMapping};
pub use registry::IdentityRegistry;
pub use symbols::{SymbolIndex, TargetModule};
