use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Resolves the CLI path argument into the list of log files to analyze.
///
/// A file is returned as is, regardless of its name. For a directory, all
/// regular files directly inside of it whose name ends with
/// `.<extension>` are returned, sorted by path.
#[instrument(skip(extension))]
pub async fn discover_log_files(path: &Path, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let suffix = format!(".{extension}");

    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Failed to list directory {}", path.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list directory {}", path.display()))?
    {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            warn!(?file_name, "Skipping file with non UTF-8 name");
            continue;
        };

        if !file_name.ends_with(&suffix) {
            continue;
        }

        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("Failed to read {}", entry_path.display()))?;

        // Follow symlinks, so that linked log files are picked up too.
        let is_file = if file_type.is_symlink() {
            tokio::fs::metadata(&entry_path)
                .await
                .is_ok_and(|metadata| metadata.is_file())
        } else {
            file_type.is_file()
        };

        if !is_file {
            debug!(path = %entry_path.display(), "Skipping non-file directory entry");
            continue;
        }

        files.push(entry_path);
    }

    files.sort();

    debug!(num_files = files.len(), "Found log files");

    Ok(files)
}
