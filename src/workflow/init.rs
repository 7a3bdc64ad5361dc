//! Init writes a config stub into the state directory.
use crate::cli::InitArgs;
use crate::config;
use anyhow::{anyhow, Result};
use std::path::Path;

/// Does not read the existing config, so `--force` also replaces an invalid one.
pub fn run_init(state_dir: &Path, args: &InitArgs) -> Result<()> {
    let path = config::config_path(state_dir);
    if path.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    config::write_config(state_dir, &config::default_config())?;
    println!("wrote {}", path.display());
    println!(
        "set backend.url and backend.anon_key, or export {} and {}",
        config::BACKEND_URL_ENV,
        config::ANON_KEY_ENV
    );
    Ok(())
}
