// ============================================================================
// src/util/output.rs – key rendering and private key files
// ============================================================================

use crate::ui::UX;
use anyhow::{bail, Context, Result};
use pbkdf2_forge::config::OutputFormat;
use pbkdf2_forge::{BlockIndexEncoding, PrfKind};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

/// Everything needed to re-derive a key, minus the password.
#[derive(Debug, Serialize)]
pub struct KeyReport<'a> {
    pub prf: PrfKind,
    pub iterations: u32,
    pub key_size: usize,
    pub block_index: BlockIndexEncoding,
    pub salt: String,
    pub key: String,
    #[serde(skip)]
    pub raw_key: &'a [u8],
}

/// Encode a derived key for output. `Raw` passes the bytes through untouched.
pub fn render(format: OutputFormat, report: &KeyReport<'_>) -> Result<Vec<u8>> {
    Ok(match format {
        OutputFormat::Hex => format!("{}\n", report.key).into_bytes(),
        OutputFormat::Raw => report.raw_key.to_vec(),
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(report).context("serialize key report")?;
            s.push('\n');
            s.into_bytes()
        }
    })
}

/// Permissions for key files written with `--out`.
pub const KEY_FILE_MODE: u32 = 0o600;

/// Send rendered key material to `path` or to stdout.
pub fn emit(ui: &UX, bytes: &[u8], path: Option<&Path>, force: bool) -> Result<()> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes).context("write key to stdout")?;
        return stdout.flush().context("flush stdout");
    };
    write_key_file(path, bytes, force)?;
    ui.success(&format!("Key written to {} ({:o}).", path.display(), KEY_FILE_MODE));
    Ok(())
}

/// Replace `path` with `bytes` so that readers see either the old key file or
/// the complete new one. The key is staged next to the target, synced, then
/// renamed into place. Symlinked targets are never followed.
pub fn write_key_file(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            bail!("{} is a symlink; refusing to write a key through it", path.display())
        }
        Ok(_) if !force => bail!("{} already exists; pass --force to replace it", path.display()),
        _ => {}
    }

    let dir = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
        Some(p) => p.to_path_buf(),
        None => bail!("{} has no parent directory", path.display()),
    };
    fs::create_dir_all(&dir).with_context(|| format!("create key directory {}", dir.display()))?;

    let name = path
        .file_name()
        .context("key path has no file name")?
        .to_string_lossy();
    let (staged, mut file) = stage_file(&dir, &name)?;

    let written = file
        .write_all(bytes)
        .and_then(|_| file.sync_all())
        .with_context(|| format!("write staged key {}", staged.display()));
    if let Err(e) = written.and_then(|_| {
        fs::rename(&staged, path)
            .with_context(|| format!("move staged key into place at {}", path.display()))
    }) {
        let _ = fs::remove_file(&staged);
        return Err(e);
    }

    // the process umask may have narrowed the create mode
    fs::set_permissions(path, fs::Permissions::from_mode(KEY_FILE_MODE))
        .with_context(|| format!("restrict permissions on {}", path.display()))?;
    File::open(&dir)
        .and_then(|d| d.sync_all())
        .with_context(|| format!("sync key directory {}", dir.display()))
}

/// Create a fresh sibling of `name` in `dir`, retrying on name collisions.
fn stage_file(dir: &Path, name: &str) -> Result<(PathBuf, File)> {
    let mut last_err = None;
    for _ in 0..8 {
        let staged = dir.join(format!(".{name}.{}", nanoid::nanoid!(8)));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(KEY_FILE_MODE)
            .open(&staged)
        {
            Ok(file) => return Ok((staged, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => last_err = Some(e),
            Err(e) => {
                return Err(e).with_context(|| format!("stage key file in {}", dir.display()))
            }
        }
    }
    Err(last_err.unwrap_or_else(|| std::io::ErrorKind::AlreadyExists.into()))
        .with_context(|| format!("no free staging name in {}", dir.display()))
}
