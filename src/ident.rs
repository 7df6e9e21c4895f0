//! Zettelkasten-style note identifiers.
//!
//! An identifier is the note's creation time in UTC, truncated to the second
//! and formatted as `YYYYMMDDHHMMSS`. Identifiers are unique within a run:
//! on a clash the time is bumped one second at a time until a free slot is
//! found, so the result depends on the order notes are assigned in.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn format_id(at: DateTime<Utc>) -> String {
    at.format(ID_FORMAT).to_string()
}

/// Identifiers handed out so far in this run.
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the first free identifier at or after `created`.
    pub fn assign(&mut self, created: DateTime<Utc>) -> String {
        let mut at = created;
        let mut id = format_id(at);
        while self.used.contains(&id) {
            at += TimeDelta::seconds(1);
            id = format_id(at);
        }
        if at != created {
            tracing::debug!(
                from = %format_id(created),
                to = %id,
                "Identifier taken, bumped"
            );
        }
        self.used.insert(id.clone());
        id
    }

    #[cfg(test)]
    pub(crate) fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.used.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
