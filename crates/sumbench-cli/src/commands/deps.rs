//! The `sumbench deps` command.

use std::path::PathBuf;

use anyhow::Result;

use sumbench_core::manifest::load_manifest;

pub fn execute(manifest_path: PathBuf) -> Result<()> {
    let manifest = load_manifest(&manifest_path)?;

    let enabled: Vec<_> = manifest.enabled().collect();
    let disabled: Vec<_> = manifest.disabled().collect();

    println!("Enabled ({}):", enabled.len());
    for req in &enabled {
        println!("  {req}");
    }

    if !disabled.is_empty() {
        println!("\nDisabled ({}):", disabled.len());
        for req in &disabled {
            println!("  {req}  (line {})", req.line);
        }
    }

    Ok(())
}
