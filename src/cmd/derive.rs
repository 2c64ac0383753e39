// ============================================================================
// src/cmd/derive.rs – derive a key from a password and salt
// ============================================================================

use crate::ui::UX;
use crate::util::output::{emit, render, KeyReport};
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use dialoguer::Password;
use pbkdf2_forge::config::{Config, OutputFormat};
use pbkdf2_forge::{BlockIndexEncoding, PrfKind};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Args)]
pub struct DeriveArgs {
    /// Derivation profile (TOML if *.toml, YAML otherwise)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub prf: Option<PrfKind>,

    #[arg(long)]
    pub iterations: Option<u32>,

    /// Derived key length in bytes
    #[arg(long)]
    pub key_size: Option<usize>,

    #[arg(long, value_enum)]
    pub block_index: Option<BlockIndexEncoding>,

    /// Compute blocks on all cores
    #[arg(long)]
    pub parallel: bool,

    #[command(flatten)]
    pub salt: SaltArgs,

    /// Read the password from this environment variable
    #[arg(long, conflicts_with = "password_file")]
    pub password_env: Option<String>,

    /// Read the password from a file (one trailing newline is dropped)
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the key to this file (mode 0600) instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing --out file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SaltArgs {
    /// Salt as hex
    #[arg(long)]
    pub salt: Option<String>,

    /// Salt as literal UTF-8 text
    #[arg(long)]
    pub salt_text: Option<String>,

    /// Generate a random salt of this many bytes
    #[arg(long, value_name = "BYTES")]
    pub random_salt: Option<usize>,
}

pub fn run_derive(ui: &UX, args: &DeriveArgs) -> Result<()> {
    ui.banner();

    let cfg = resolve_config(args)?;
    let engine = cfg.engine()?;
    let (salt, generated) = resolve_salt(&args.salt)?;
    let password = resolve_password(args)?;

    ui.data_panel(
        "Derivation Parameters",
        &[
            ("PRF", cfg.kdf.prf.to_string()),
            ("Iterations", engine.iterations().to_string()),
            ("Key size", format!("{} bytes", engine.key_size())),
            (
                "Blocks",
                format!(
                    "{} (last block {} bytes)",
                    engine.layout().blocks,
                    engine.layout().last_block_size
                ),
            ),
            ("Block index", engine.encoding().to_string()),
        ],
    );
    if generated {
        ui.notice(&salt_notice(&salt));
    }

    let started = Instant::now();
    let key = if cfg.kdf.parallel {
        engine.derive_parallel(&password, &salt)?
    } else {
        engine.derive(&password, &salt)?
    };
    let elapsed = started.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        parallel = cfg.kdf.parallel,
        "derivation finished"
    );
    ui.info(&format!("Derived {} bytes in {:.2?}.", key.len(), elapsed));

    let report = KeyReport {
        prf: cfg.kdf.prf,
        iterations: engine.iterations(),
        key_size: engine.key_size(),
        block_index: engine.encoding(),
        salt: hex::encode(&salt),
        key: hex::encode(&key),
        raw_key: &key,
    };
    let bytes = render(cfg.output.format, &report)?;
    let out = cfg.output.path.as_ref().map(PathBuf::from);
    emit(ui, &bytes, out.as_deref(), args.force)?;

    ui.success("Key forged.");
    Ok(())
}

/// Profile from --config (or defaults) with command-line flags layered on top.
fn resolve_config(args: &DeriveArgs) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(prf) = args.prf {
        cfg.kdf.prf = prf;
    }
    if let Some(iterations) = args.iterations {
        cfg.kdf.iterations = iterations;
    }
    if let Some(key_size) = args.key_size {
        cfg.kdf.key_size = key_size;
    }
    if let Some(encoding) = args.block_index {
        cfg.kdf.block_index = encoding;
    }
    if args.parallel {
        cfg.kdf.parallel = true;
    }
    if let Some(format) = args.format {
        cfg.output.format = format;
    }
    if let Some(out) = &args.out {
        cfg.output.path = Some(out.to_string_lossy().into_owned());
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Returns the salt and whether it was freshly generated.
fn resolve_salt(args: &SaltArgs) -> Result<(Vec<u8>, bool)> {
    if let Some(hex_salt) = &args.salt {
        let salt = hex::decode(hex_salt.trim()).context("salt is not valid hex")?;
        return Ok((salt, false));
    }
    if let Some(text) = &args.salt_text {
        return Ok((text.as_bytes().to_vec(), false));
    }
    if let Some(len) = args.random_salt {
        if len == 0 {
            bail!("--random-salt needs at least 1 byte");
        }
        let mut salt = vec![0u8; len];
        OsRng.fill_bytes(&mut salt);
        return Ok((salt, true));
    }
    Err(anyhow!("no salt given (use --salt, --salt-text or --random-salt)"))
}

fn salt_notice(salt: &[u8]) -> String {
    format!(
        "salt={} (generated; the key cannot be re-derived without it)",
        hex::encode(salt)
    )
}

fn resolve_password(args: &DeriveArgs) -> Result<Vec<u8>> {
    if let Some(var) = &args.password_env {
        let value = std::env::var(var)
            .with_context(|| format!("read password from environment variable {var}"))?;
        return Ok(value.into_bytes());
    }
    if let Some(path) = &args.password_file {
        let mut data = fs::read(path)
            .with_context(|| format!("read password file {}", path.display()))?;
        strip_line_ending(&mut data);
        return Ok(data);
    }

    let value = Password::new()
        .with_prompt("Password")
        .allow_empty_password(false)
        .interact()
        .context("read password input")?;
    Ok(value.into_bytes())
}

fn strip_line_ending(data: &mut Vec<u8>) {
    if data.last() == Some(&b'\n') {
        data.pop();
        if data.last() == Some(&b'\r') {
            data.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt_args(salt: Option<&str>, text: Option<&str>, random: Option<usize>) -> SaltArgs {
        SaltArgs {
            salt: salt.map(String::from),
            salt_text: text.map(String::from),
            random_salt: random,
        }
    }

    #[test]
    fn salt_sources() {
        let (salt, generated) = resolve_salt(&salt_args(Some("73616c74"), None, None)).unwrap();
        assert_eq!(salt, b"salt");
        assert!(!generated);

        let (salt, _) = resolve_salt(&salt_args(None, Some("salt"), None)).unwrap();
        assert_eq!(salt, b"salt");

        let (a, generated) = resolve_salt(&salt_args(None, None, Some(16))).unwrap();
        let (b, _) = resolve_salt(&salt_args(None, None, Some(16))).unwrap();
        assert!(generated);
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);

        assert!(resolve_salt(&salt_args(Some("xyz"), None, None)).is_err());
        assert!(resolve_salt(&salt_args(None, None, Some(0))).is_err());
    }

    #[test]
    fn generated_salt_notice_carries_the_salt() {
        let (salt, generated) = resolve_salt(&salt_args(None, None, Some(16))).unwrap();
        assert!(generated);

        let line = salt_notice(&salt);
        let hex_salt = line
            .strip_prefix("salt=")
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap();
        assert_eq!(hex::decode(hex_salt).unwrap(), salt);
    }

    #[test]
    fn password_file_drops_one_line_ending() {
        let mut data = b"hunter2\r\n".to_vec();
        strip_line_ending(&mut data);
        assert_eq!(data, b"hunter2");

        let mut data = b"two\n\n".to_vec();
        strip_line_ending(&mut data);
        assert_eq!(data, b"two\n");
    }
}
