/// Type definitions for a decrypted Standard Notes backup export.
///
/// The export is a single JSON document:
/// ```json
/// { "version": "004", "items": [ { "uuid": "...", "content_type": "Note", ... } ] }
/// ```
///
/// Only `Note` and `Tag` items are modelled. Every other item type is kept as a
/// raw [`BackupItem`] whose `content` is never inspected.
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Export format version this tool was written against.
pub const SUPPORTED_VERSION: &str = "004";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct Backup {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub version: Option<String>,
    /// A missing list is the same as an empty one.
    #[serde(default, deserialize_with = "null_default")]
    pub items: Vec<BackupItem>,
}

/// One entry of the flat `items` list.
///
/// The item-level `updated_at` is sync metadata rather than the user's edit
/// time, and `duplicate_of` is irrelevant to an export; neither is read.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub uuid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content_type: String,
    /// Type specific payload. Left untyped so that unknown (or still
    /// encrypted) item kinds never fail the whole document.
    #[serde(default)]
    pub content: Value,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
}

/// `null` reads as the type's default, same as a missing field.
fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any non-string value reads as an empty string.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

/// Any non-string value reads as `None`.
fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// A [`BackupItem`] narrowed to the kinds this tool understands.
#[derive(Debug)]
pub enum ItemKind {
    Note(NoteContent),
    Tag(TagContent),
    Other,
}

impl BackupItem {
    /// Decode `content` according to `content_type`.
    ///
    /// Returns [`ItemKind::Other`] for unrelated types and for Note/Tag items
    /// whose content is not an object.
    pub fn kind(&self) -> ItemKind {
        match self.content_type.as_str() {
            "Note" => match serde_json::from_value::<NoteContent>(self.content.clone()) {
                Ok(c) => ItemKind::Note(c),
                Err(e) => {
                    tracing::warn!(uuid = %self.uuid, "Skipping note with unreadable content: {}", e);
                    ItemKind::Other
                }
            },
            "Tag" => match serde_json::from_value::<TagContent>(self.content.clone()) {
                Ok(c) => ItemKind::Tag(c),
                Err(e) => {
                    tracing::warn!(uuid = %self.uuid, "Skipping tag with unreadable content: {}", e);
                    ItemKind::Other
                }
            },
            _ => ItemKind::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Deserialize)]
pub struct NoteContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default, rename = "appData", deserialize_with = "null_default")]
    pub app_data: AppData,

    // Older clients store the location flags on the content itself.
    #[serde(default)]
    pub trashed: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

/// `appData` keyed by application domain. Only the web client's
/// `org.standardnotes.sn` domain is read.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppData {
    #[serde(
        default,
        rename = "org.standardnotes.sn",
        deserialize_with = "null_default"
    )]
    pub client: ClientData,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClientData {
    #[serde(default)]
    pub client_updated_at: Option<String>,
    #[serde(default)]
    pub trashed: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

impl NoteContent {
    // The client domain wins; the content-level flag is the fallback.
    pub fn is_trashed(&self) -> bool {
        self.app_data.client.trashed.or(self.trashed).unwrap_or(false)
    }

    pub fn is_archived(&self) -> bool {
        self.app_data
            .client
            .archived
            .or(self.archived)
            .unwrap_or(false)
    }

    pub fn is_pinned(&self) -> bool {
        self.app_data.client.pinned.or(self.pinned).unwrap_or(false)
    }

    /// When the user last edited the note.
    pub fn client_updated_at(&self) -> Option<&str> {
        self.app_data.client.client_updated_at.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TagContent {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl Reference {
    /// The referenced uuid, if this reference points at a note.
    pub fn note_uuid(&self) -> Option<&str> {
        match self.content_type.as_deref() {
            Some("Note") => self.uuid.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and parse the backup document at `path`.
pub fn load_backup(path: &Path) -> Result<Backup> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read backup: {}", path.display()))?;
    let backup = parse_backup(&raw)
        .wrap_err_with(|| format!("Failed to parse backup: {}", path.display()))?;

    match backup.version.as_deref() {
        Some(SUPPORTED_VERSION) => {}
        other => tracing::warn!(
            version = other.unwrap_or("<none>"),
            "Untested export version, expected {}",
            SUPPORTED_VERSION
        ),
    }
    Ok(backup)
}

pub fn parse_backup(raw: &str) -> Result<Backup> {
    serde_json::from_str(raw).wrap_err("Backup is not valid JSON")
}
