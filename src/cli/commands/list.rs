//! Downloaded file listing.

use std::path::{Path, PathBuf};

use crate::config::Config;

/// Print every file in the download directory.
pub fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let dir = config.download_dir();
    let files = downloaded_files(&dir)?;

    if files.is_empty() {
        println!("No files in {}", dir.display());
        return Ok(());
    }

    println!("{} file(s) in {}:", files.len(), dir.display());
    for file in files {
        println!("  {}", file.display());
    }
    Ok(())
}

/// Regular files in `dir`, sorted by path. Creates `dir` if missing.
pub fn downloaded_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    files.sort();
    Ok(files)
}
