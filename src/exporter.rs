use crate::aggregate::{NoteIndex, NoteRecord};
use crate::ident::IdAllocator;
use crate::importer;
use crate::renderer;
use crate::utils::{self, ExportConfig, ExportSummary, note_filename, parse_timestamp};
use eyre::{Context, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Run a full export, reporting to stdout.
pub fn execute(config: &ExportConfig) -> Result<ExportSummary> {
    let stdout = io::stdout();
    execute_with_report(config, &mut stdout.lock())
}

/// Run a full export: refuse an existing target, load and index the backup,
/// then write one Markdown file per note.
///
/// One line per exported note and a final total go to `report` unless
/// `quiet` is set. Per-note errors are always reported.
pub fn execute_with_report<W: Write>(
    config: &ExportConfig,
    report: &mut W,
) -> Result<ExportSummary> {
    if config.target_dir.try_exists().unwrap_or(true) {
        return Err(already_exists(&config.target_dir));
    }

    let backup = importer::load_backup(&config.source)?;
    let notes = NoteIndex::from_backup(&backup).into_exportable();

    create_target_dir(&config.target_dir)?;

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(notes.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
        );
        bar
    };

    let mut ids = IdAllocator::new();
    let mut summary = ExportSummary::default();

    for (uuid, note) in &notes {
        match export_note(uuid, note, &config.target_dir, &mut ids) {
            Ok(filename) => {
                if !config.quiet {
                    pb.suspend(|| writeln!(report, "Exported '{}' ({})", filename, uuid))
                        .wrap_err("Failed to write report")?;
                }
                summary.exported.push((filename, uuid.clone()));
            }
            Err(e) => {
                pb.suspend(|| writeln!(report, "Error [{}]: {:#}", uuid, e))
                    .wrap_err("Failed to write report")?;
                summary.failures.push((uuid.clone(), format!("{:#}", e)));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if !config.quiet {
        let mut line = format!(
            "Exported {} notes to: {}",
            summary.count(),
            config.target_dir.display()
        );
        if !summary.failures.is_empty() {
            line.push_str(&format!(" Completed with {} error(s).", summary.failures.len()));
        }
        writeln!(report, "{}", line).wrap_err("Failed to write report")?;
    }

    Ok(summary)
}

fn already_exists(path: &Path) -> eyre::Report {
    eyre!(
        "Export path already exists: {}\nDelete it or choose another path.",
        path.display()
    )
}

/// Create the (single, flat) target directory. Parents must already exist.
fn create_target_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(already_exists(path)),
        Err(e) => Err(e).wrap_err_with(|| {
            format!("Failed to create target directory: {}", path.display())
        }),
    }
}

/// Assign an identifier, render and write one note. Returns the file name.
fn export_note(
    uuid: &str,
    note: &NoteRecord,
    target_dir: &Path,
    ids: &mut IdAllocator,
) -> Result<String> {
    let created = note
        .created()
        .ok_or_else(|| eyre!("Unreadable created_at: {:?}", note.created_at))?;
    let id = ids.assign(created);

    let filename = note_filename(note.title(), &id);
    let path = target_dir.join(&filename);

    let md_file =
        File::create(&path).wrap_err_with(|| format!("Failed to create: {}", path.display()))?;
    let mut writer = BufWriter::new(md_file);
    renderer::render_note(&mut writer, uuid, &id, note)
        .wrap_err_with(|| format!("Failed to write: {}", path.display()))?;
    writer.flush().wrap_err("Failed to flush markdown file")?;
    drop(writer);

    match note.updated_at.as_deref().and_then(parse_timestamp) {
        Some(updated) => {
            if let Err(e) = utils::set_modified(&path, updated) {
                tracing::warn!(uuid, "{:#}", e);
            }
        }
        None => tracing::warn!(
            uuid,
            updated_at = ?note.updated_at,
            "No usable client_updated_at, keeping write time"
        ),
    }

    Ok(filename)
}
