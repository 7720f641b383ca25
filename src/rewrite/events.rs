//! Rewrite event journal and run report.
//!
//! Every notice-worthy action the engine takes (dropping a module reference,
//! adding one, repointing a type or member site) is described by a
//! [`RewriteEvent`] and delivered to a [`RewriteSink`]. The default sink is
//! [`RewriteLog`], an in-memory journal that preserves delivery order, which
//! is exactly the deterministic order the rewrite passes visit their sites in.
//!
//! Counters live in [`RewriteReport`] rather than in the sink so that a
//! custom sink (progress bar, structured logger) still gets accurate totals.

use std::fmt;

/// A single notice-worthy action taken during a rewrite.
///
/// Events carry the structured fields needed to render the human-readable
/// notices; the [`fmt::Display`] impl produces the canonical wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteEvent {
    /// A module reference matching the strip list was removed.
    ReferenceRemoved {
        /// Name of the removed module reference.
        name: String,
    },
    /// A canonical reference to a target module was added.
    ReferenceAdded {
        /// Name of the target module now referenced.
        name: String,
    },
    /// A type reference site was repointed at a target module.
    TypeRedirected {
        /// Full name of the referenced type.
        full_name: String,
        /// Name of the module the site previously pointed at, if any.
        from: Option<String>,
        /// Name of the target module the site now points at.
        to: String,
    },
    /// A member reference site was redirected to a replacement member.
    MemberRedirected {
        /// Full name of the type the site originally named.
        type_name: String,
        /// Name of the member the site originally named.
        member: String,
        /// Full name of the replacement member's declaring type.
        to_type: String,
        /// Name of the replacement member.
        to_member: String,
    },
}

impl fmt::Display for RewriteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteEvent::ReferenceRemoved { name } => {
                write!(f, "removing reference to {name}")
            }
            RewriteEvent::ReferenceAdded { name } => {
                write!(f, "adding reference to {name}")
            }
            RewriteEvent::TypeRedirected {
                full_name,
                from,
                to,
            } => {
                let from = from.as_deref().unwrap_or("(unresolved)");
                write!(f, "redirecting {full_name} from {from} to {to}")
            }
            RewriteEvent::MemberRedirected {
                type_name,
                member,
                to_type,
                to_member,
            } => {
                write!(f, "redirecting {type_name}.{member} to {to_type}.{to_member}")
            }
        }
    }
}

/// Receiver for rewrite events.
///
/// The engine calls [`record`](RewriteSink::record) at most once per
/// notice-worthy event; repeated sites with the same full name are
/// deduplicated by the passes before an event is ever emitted, so a sink
/// never has to filter.
pub trait RewriteSink {
    /// Record one rewrite event.
    fn record(&mut self, event: RewriteEvent);
}

/// In-memory journal of rewrite events, in the order they occurred.
#[derive(Debug, Clone, Default)]
pub struct RewriteLog {
    events: Vec<RewriteEvent>,
}

impl RewriteLog {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in delivery order.
    #[must_use]
    pub fn events(&self) -> &[RewriteEvent] {
        &self.events
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the recorded events in delivery order.
    pub fn iter(&self) -> std::slice::Iter<'_, RewriteEvent> {
        self.events.iter()
    }
}

impl RewriteSink for RewriteLog {
    fn record(&mut self, event: RewriteEvent) {
        self.events.push(event);
    }
}

impl<'a> IntoIterator for &'a RewriteLog {
    type Item = &'a RewriteEvent;
    type IntoIter = std::slice::Iter<'a, RewriteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Outcome of rewriting one subject module.
///
/// Counters tally individual sites, not log entries; with deduplication a
/// hundred redirected sites for the same type produce one journal entry but
/// count as a hundred in [`type_sites_redirected`](Self::type_sites_redirected).
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    /// Journal of the run.
    ///
    /// Empty when events were streamed to a caller-supplied sink instead.
    pub log: RewriteLog,
    /// Module references removed from the subject.
    pub refs_removed: usize,
    /// Canonical target references added to the subject.
    pub refs_added: usize,
    /// Type reference sites whose scope was repointed.
    pub type_sites_redirected: usize,
    /// Member reference sites redirected to a replacement.
    pub member_sites_redirected: usize,
}

impl RewriteReport {
    /// Returns `true` if the rewrite changed the subject module in any way.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.refs_removed > 0
            || self.refs_added > 0
            || self.type_sites_redirected > 0
            || self.member_sites_redirected > 0
    }
}
