//! TEX to PNG conversion, one file or a whole folder

use crate::progress::ProgressTracker;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tqtex_decoder::{into_rgba_image, TexDecoder};
use tracing::{debug, info, warn};

/// Outcome of a folder conversion
#[derive(Debug, Default)]
pub struct ConversionSummary {
    /// Number of files written
    pub converted: usize,
    /// File names that were skipped, with the reason
    pub failed: Vec<(String, String)>,
}

/// Converts one TEX file to a PNG at `out_path`, creating parent folders
pub fn convert_file(decoder: &TexDecoder, tex_path: &Path, out_path: &Path) -> Result<()> {
    let raw = fs::read(tex_path)
        .with_context(|| format!("Failed to read {}", tex_path.display()))?;
    let buffer = decoder.decode_tex(&raw)?;
    let image = into_rgba_image(buffer)?;

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    image
        .save(out_path)
        .with_context(|| format!("Failed to save {}", out_path.display()))?;

    debug!(
        "Converted {} -> {} ({}x{})",
        tex_path.display(),
        out_path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

/// PNG path for `tex_path` inside `output_dir`: same stem, `.png` extension
pub fn default_output_path(tex_path: &Path, output_dir: &Path) -> PathBuf {
    let mut name = tex_path
        .file_stem()
        .unwrap_or(tex_path.as_os_str())
        .to_os_string();
    name.push(".png");
    output_dir.join(name)
}

/// Creates the input and output folders, optionally emptying the output folder
pub fn prepare_folders(input_dir: &Path, output_dir: &Path, clean: bool) -> Result<()> {
    fs::create_dir_all(input_dir).with_context(|| {
        format!("Cannot create or access import folder '{}'", input_dir.display())
    })?;
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Cannot create or access export folder '{}'", output_dir.display())
    })?;

    if clean {
        clean_folder(output_dir)?;
    }
    Ok(())
}

fn clean_folder(dir: &Path) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(e) = removed {
            warn!("Error while cleaning export folder: {}: {}", path.display(), e);
        }
    }
    Ok(())
}

/// Lists `*.tex` files (any case) directly inside `dir`, sorted by name
pub fn find_tex_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Cannot read from import folder '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_tex = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tex"));
        if is_tex && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Converts every TEX file in `input_dir` to a PNG in `output_dir`
///
/// Files are converted in parallel. A file that fails to convert is logged and
/// recorded in the summary; it does not stop the others.
pub fn convert_folder(
    decoder: &TexDecoder,
    input_dir: &Path,
    output_dir: &Path,
    clean: bool,
) -> Result<ConversionSummary> {
    prepare_folders(input_dir, output_dir, clean)?;
    let files = find_tex_files(input_dir)?;

    if files.is_empty() {
        info!("No .tex files found in {}", input_dir.display());
        return Ok(ConversionSummary::default());
    }

    info!(
        "Converting {} files from {} to {}",
        files.len(),
        input_dir.display(),
        output_dir.display()
    );

    let progress = ProgressTracker::new(files.len() as u64, "Progress");
    let results: Vec<(String, Result<()>)> = files
        .par_iter()
        .map(|tex_path| {
            let out_path = default_output_path(tex_path, output_dir);
            let result = convert_file(decoder, tex_path, &out_path);
            progress.increment();
            (file_name(tex_path), result)
        })
        .collect();

    let mut summary = ConversionSummary::default();
    for (name, result) in results {
        match result {
            Ok(()) => summary.converted += 1,
            Err(e) => {
                warn!("[Skipped] {}: {:#}", name, e);
                summary.failed.push((name, format!("{:#}", e)));
            }
        }
    }
    Ok(summary)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
