//! Merge the flat backup item list into one record per note.
//!
//! Tags point at notes, never the other way around, and a tag may appear in
//! the list before the note it references. Records are therefore upserted by
//! uuid and only judged "real" once every item has been seen.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::importer::{Backup, BackupItem, ItemKind, NoteContent, TagContent};
use crate::utils::parse_timestamp;

/// Synthetic keyword added to pinned notes.
pub const PINNED_TAG: &str = "pinned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Trashed,
    Archived,
}

impl Status {
    /// Trashed is checked first and wins over archived.
    fn of(note: &NoteContent) -> Option<Self> {
        if note.is_trashed() {
            Some(Self::Trashed)
        } else if note.is_archived() {
            Some(Self::Archived)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct NoteRecord {
    pub title: Option<String>,
    pub text: String,
    pub created_at: Option<String>,
    /// The client edit time, not the item's sync `updated_at`.
    pub updated_at: Option<String>,
    pub status: Option<Status>,
    /// Tag titles in encounter order, without duplicates.
    pub tags: Vec<String>,
}

impl NoteRecord {
    fn add_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Whether a Note item was seen for this uuid, as opposed to a shell
    /// created only by tag references.
    pub fn is_note(&self) -> bool {
        self.created_at.is_some() && self.title.is_some()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// `uuid -> NoteRecord`, built in one pass over the backup items.
#[derive(Debug, Default)]
pub struct NoteIndex {
    notes: HashMap<String, NoteRecord>,
    count_notes: usize,
    count_tags: usize,
    count_ignored: usize,
}

impl NoteIndex {
    pub fn from_backup(backup: &Backup) -> Self {
        let mut index = Self::default();
        for item in &backup.items {
            index.ingest(item);
        }
        tracing::debug!(
            notes = index.count_notes,
            tags = index.count_tags,
            ignored = index.count_ignored,
            "Classified backup items"
        );
        index
    }

    pub fn ingest(&mut self, item: &BackupItem) {
        match item.kind() {
            ItemKind::Note(content) => {
                self.count_notes += 1;
                self.ingest_note(item, content);
            }
            ItemKind::Tag(content) => {
                self.count_tags += 1;
                self.ingest_tag(&content);
            }
            ItemKind::Other => self.count_ignored += 1,
        }
    }

    fn ingest_note(&mut self, item: &BackupItem, content: NoteContent) {
        if item.uuid.is_empty() {
            tracing::warn!(title = ?content.title, "Skipping note without a uuid");
            return;
        }
        let status = Status::of(&content);
        let pinned = content.is_pinned();
        let updated_at = content.client_updated_at().map(str::to_string);

        let record = self.notes.entry(item.uuid.clone()).or_default();
        if status.is_some() {
            record.status = status;
        }
        record.title = Some(content.title.unwrap_or_default());
        record.text = content.text;
        record.created_at = item.created_at.clone();
        record.updated_at = updated_at;
        if pinned {
            record.add_tag(PINNED_TAG);
        }
    }

    fn ingest_tag(&mut self, content: &TagContent) {
        for uuid in content.references.iter().filter_map(|r| r.note_uuid()) {
            self.notes
                .entry(uuid.to_string())
                .or_default()
                .add_tag(&content.title);
        }
    }

    #[cfg(test)]
    fn get(&self, uuid: &str) -> Option<&NoteRecord> {
        self.notes.get(uuid)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.notes.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Real notes in export order: oldest `created_at` first, ties broken by
    /// uuid. Shells left behind by dangling tag references are dropped.
    pub fn into_exportable(self) -> Vec<(String, NoteRecord)> {
        let total = self.notes.len();
        let mut notes: Vec<_> = self
            .notes
            .into_iter()
            .filter(|(_, record)| record.is_note())
            .collect();
        if notes.len() < total {
            tracing::debug!(
                dropped = total - notes.len(),
                "Dropped tag references without a matching note"
            );
        }
        notes.sort_by_cached_key(|(uuid, record)| (record.created(), uuid.clone()));
        notes
    }
}
