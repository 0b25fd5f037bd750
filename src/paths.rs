use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn log_file_path() -> Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(dirs::data_dir)
        .context("unable to resolve state or data directory")?;
    Ok(base.join("streamplan").join("streamplan.log"))
}
