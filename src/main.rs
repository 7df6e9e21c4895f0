use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use standardnotes_export::{exporter, utils};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_TARGET_DIR: &str = "notes";

/// Export a decrypted Standard Notes backup to Markdown files with YAML frontmatter.
/// Written against export format version 004.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Decrypted backup JSON file.
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Directory to export markdown files into. Must not exist yet.
    /// Relative paths are taken from the executable's directory.
    /// Defaults to ./notes next to the executable if not set in config.
    #[arg(value_name = "OUTPUT_DIR")]
    target_dir: Option<PathBuf>,

    /// Path to a configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Suppress per-note output and the progress bar.
    #[arg(short, long)]
    quiet: bool,

    /// Diagnostic output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    output_dir: Option<PathBuf>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = explicit_path else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Err(eyre!("Config file not found: {}", path.display()));
    }
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).wrap_err_with(|| format!("Failed to parse config: {}", path.display()))
}

/// CLI > config file > default.
fn pick_target_dir(cli: Option<PathBuf>, config: Option<PathBuf>) -> PathBuf {
    cli.or(config)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR))
}

/// Relative output paths hang off `base`; absolute ones are kept.
fn resolve_target_dir(requested: &Path, base: &Path) -> PathBuf {
    let trimmed = PathBuf::from(requested.to_string_lossy().trim());
    if trimmed.is_absolute() {
        trimmed
    } else {
        base.join(trimmed)
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().wrap_err("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| eyre!("Executable has no parent directory: {}", exe.display()))
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(level))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // 1. Load config file (explicit only)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve target_dir (CLI > Config > Default)
    let requested = pick_target_dir(cli.target_dir, file_cfg.output_dir);
    let target_dir = resolve_target_dir(&requested, &executable_dir()?);

    // 3. Build the Export Config
    let config = utils::ExportConfig {
        source: cli.source,
        target_dir,
        quiet: cli.quiet,
    };

    // 4. Run the Business Logic
    exporter::execute(&config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_beats_config_beats_default() {
        let cli = Some(PathBuf::from("from-cli"));
        let cfg = Some(PathBuf::from("from-config"));
        assert_eq!(pick_target_dir(cli, cfg.clone()), PathBuf::from("from-cli"));
        assert_eq!(pick_target_dir(None, cfg), PathBuf::from("from-config"));
        assert_eq!(pick_target_dir(None, None), PathBuf::from("notes"));
    }

    #[test]
    fn relative_target_sits_next_to_executable() {
        let base = Path::new("/opt/tools");
        assert_eq!(
            resolve_target_dir(Path::new("notes"), base),
            PathBuf::from("/opt/tools/notes")
        );
        assert_eq!(
            resolve_target_dir(Path::new("  export/dir \n"), base),
            PathBuf::from("/opt/tools/export/dir")
        );
    }

    #[test]
    fn absolute_target_is_kept() {
        assert_eq!(
            resolve_target_dir(Path::new(" /tmp/notes "), Path::new("/opt/tools")),
            PathBuf::from("/tmp/notes")
        );
    }

    #[test]
    fn config_file_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "output_dir = \"exported\"\n").unwrap();
        let cfg = load_file_config(Some(&path)).unwrap();
        assert_eq!(cfg.output_dir, Some(PathBuf::from("exported")));
        assert!(load_file_config(None).unwrap().output_dir.is_none());
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "target = \"exported\"\n").unwrap();
        let err = load_file_config(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn source_argument_is_required() {
        assert!(Cli::try_parse_from(["standardnotes-export"]).is_err());
        let cli = Cli::try_parse_from(["standardnotes-export", "backup.txt", "out"]).unwrap();
        assert_eq!(cli.source, PathBuf::from("backup.txt"));
        assert_eq!(cli.target_dir, Some(PathBuf::from("out")));
    }
}
