//! Seen-link set for duplicate suppression.

use std::collections::HashSet;

/// Append-only set of article links that have already been reported.
///
/// A link present in this set is never reported again for the lifetime
/// of the session, regardless of keyword or time-window changes.
#[derive(Debug, Clone, Default)]
pub struct SeenLinks {
    links: HashSet<String>,
}

impl SeenLinks {
    /// Creates an empty seen-link set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a link has already been reported.
    #[must_use]
    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Records a link as reported.
    ///
    /// Returns `true` if the link was new. Check-then-insert callers
    /// must hold exclusive access across the whole operation, which the
    /// `&mut` receiver guarantees.
    pub fn insert_if_new(&mut self, link: &str) -> bool {
        self.links.insert(link.to_owned())
    }

    /// Returns the number of recorded links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Checks if no links have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
