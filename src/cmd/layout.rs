// ============================================================================
// src/cmd/layout.rs – show how a key size splits into PRF blocks
// ============================================================================

use crate::ui::UX;
use anyhow::{Context, Result};
use clap::Args;
use pbkdf2_forge::{BlockIndexEncoding, Pbkdf2, PrfKind};

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Derived key length in bytes
    #[arg(long)]
    pub key_size: usize,

    #[arg(long, value_enum, default_value_t = PrfKind::HmacSha256)]
    pub prf: PrfKind,

    #[arg(long, value_enum, default_value_t = BlockIndexEncoding::Rfc8018)]
    pub block_index: BlockIndexEncoding,
}

pub fn run_layout(ui: &UX, args: &LayoutArgs) -> Result<()> {
    let engine = Pbkdf2::with_encoding(
        args.prf,
        args.prf.output_size(),
        1,
        args.key_size,
        args.block_index,
    )
    .context("invalid layout request")?;
    let layout = engine.layout();

    ui.data_panel(
        "Block Layout",
        &[
            ("PRF", format!("{} ({} byte blocks)", args.prf, engine.h_size())),
            ("Key size", format!("{} bytes", args.key_size)),
            ("Block index", args.block_index.to_string()),
        ],
    );
    println!("blocks={} last_block_size={}", layout.blocks, layout.last_block_size);
    Ok(())
}
