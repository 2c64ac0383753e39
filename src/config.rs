// ============================================================================
// src/config.rs – derivation profile loader (TOML or YAML)
// ============================================================================

use crate::kdf::{BlockIndexEncoding, Pbkdf2};
use crate::prf::PrfKind;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfCfg {
    #[serde(default)]
    pub prf: PrfKind,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_key_size")]
    pub key_size: usize,
    /// Block index layout appended to the salt; `rfc8018` unless you need
    /// to reproduce keys from the legacy zero-based layouts.
    #[serde(default)]
    pub block_index: BlockIndexEncoding,
    /// Derive blocks on a thread pool; output is identical either way.
    #[serde(default)]
    pub parallel: bool,
}

fn default_iterations() -> u32 {
    600_000
}

fn default_key_size() -> usize {
    32
}

impl Default for KdfCfg {
    fn default() -> Self {
        Self {
            prf: PrfKind::default(),
            iterations: default_iterations(),
            key_size: default_key_size(),
            block_index: BlockIndexEncoding::default(),
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Hex,
    Raw,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputCfg {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the key here instead of stdout.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kdf: KdfCfg,
    #[serde(default)]
    pub output: OutputCfg,
}

impl Config {
    pub fn load<P: AsRef<Path>>(p: P) -> Result<Self> {
        let s = fs::read_to_string(&p)
            .with_context(|| format!("read config: {}", p.as_ref().display()))?;
        let cfg: Self = if p.as_ref().extension().and_then(|e| e.to_str()) == Some("toml") {
            toml::from_str(&s).context("toml parse")?
        } else {
            serde_yaml::from_str(&s).context("yaml parse")?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kdf.iterations == 0 {
            bail!("kdf.iterations must be at least 1");
        }
        if self.kdf.key_size == 0 {
            bail!("kdf.key_size must be at least 1");
        }
        Ok(())
    }

    /// Build an engine for the configured PRF, sizes and block encoding.
    pub fn engine(&self) -> Result<Pbkdf2<PrfKind>> {
        let prf = self.kdf.prf;
        Pbkdf2::with_encoding(
            prf,
            prf.output_size(),
            self.kdf.iterations,
            self.kdf.key_size,
            self.kdf.block_index,
        )
        .context("invalid derivation parameters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_toml_profile() {
        let f = write_temp(
            ".toml",
            r#"
[kdf]
prf = "hmac-sha512"
iterations = 4096
key_size = 80
block_index = "le64"

[output]
format = "json"
"#,
        );
        let cfg = Config::load(f.path()).unwrap();
        assert_eq!(cfg.kdf.prf, PrfKind::HmacSha512);
        assert_eq!(cfg.kdf.iterations, 4096);
        assert_eq!(cfg.kdf.block_index, BlockIndexEncoding::Le64);
        assert_eq!(cfg.output.format, OutputFormat::Json);

        let engine = cfg.engine().unwrap();
        assert_eq!(engine.h_size(), 64);
        assert_eq!(engine.layout().blocks, 2);
        assert_eq!(engine.layout().last_block_size, 16);
    }

    #[test]
    fn loads_yaml_profile_with_defaults() {
        let f = write_temp(".yaml", "kdf:\n  iterations: 10\n");
        let cfg = Config::load(f.path()).unwrap();
        assert_eq!(cfg.kdf.iterations, 10);
        assert_eq!(cfg.kdf.key_size, 32);
        assert_eq!(cfg.kdf.prf, PrfKind::HmacSha256);
        assert_eq!(cfg.kdf.block_index, BlockIndexEncoding::Rfc8018);
        assert!(!cfg.kdf.parallel);
        assert!(cfg.output.path.is_none());
    }

    #[test]
    fn rejects_zero_iterations() {
        let f = write_temp(".toml", "[kdf]\niterations = 0\n");
        let err = Config::load(f.path()).unwrap_err();
        assert!(err.to_string().contains("iterations"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = Config::load("/nonexistent/pbkdf2_forge.toml").unwrap_err();
        assert!(err.to_string().contains("read config"));
    }
}
