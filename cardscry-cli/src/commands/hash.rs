//! Hash command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use cardscry_core::detect;

use crate::utils::read_image;

/// Execute the hash command: print all five fingerprints as hex.
pub async fn execute(file: PathBuf) -> Result<()> {
    let image = read_image(&file)?;

    let set = detect(&image).with_context(|| format!("No card detected in {}", file.display()))?;

    // Fixed-width labels keep the hex column aligned for eyeballing diffs
    for (variant, hash) in set.iter() {
        println!("{:<11} {}", variant.label(), hash.to_hex());
    }

    Ok(())
}
