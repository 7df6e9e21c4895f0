//! # standardnotes-export
//!
//! A CLI tool that converts a decrypted [Standard Notes](https://standardnotes.com)
//! JSON backup into one Markdown file per note.
//!
//! ## What it does
//!
//! The backup is a flat list of items. Notes carry their title, body and
//! timestamps; tags carry a list of references to the notes they are applied
//! to. This tool merges both into one record per note and writes it out with
//! YAML frontmatter:
//!
//! ```text
//! ---
//! title: personal-todo
//! created: 2014-05-30T15:39:59.000Z
//! uuid: 1fa7d986-e8f7-4121-bcf2-7f408c85ed03
//! id: '20140530153959'
//! keywords:
//! - personal.prose
//! status: trashed
//! ---
//!
//! <note body>
//! ```
//!
//! `id` is a Zettelkasten-style timestamp, unique within an export. Files are
//! named `<title> <id>.md` and their modification time is set to the note's
//! last edit. `keywords` is the field name Zettlr reads tags from.
//!
//! ## Usage
//!
//! ```sh
//! # Export next to the binary, into ./notes
//! standardnotes-export "Standard Notes Backup.txt"
//!
//! # Export somewhere else
//! standardnotes-export "Standard Notes Backup.txt" /tmp/notes
//! ```
//!
//! The target directory must not exist yet; nothing is ever overwritten.

pub mod aggregate;
pub mod exporter;
pub mod ident;
pub mod importer;
pub mod renderer;
pub mod utils;
