//! # Fact Input
//!
//! Reads usage facts from JSON or JSON Lines files.
//!
//! Record shape:
//! ```json
//! {"database": "hive", "cluster": "gold", "schema": "sales", "table": "orders",
//!  "column": "*", "user_email": "alice@co", "read_count": 3}
//! ```
//! `column` defaults to `"*"` and `read_count` to `1`. Validation of the
//! facts themselves happens in the engine.

use crate::config::InputFormat;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use usagecast_core::UsageFact;
use usagecast_core::primitives::MAX_FACT_COUNT;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum fact file size (256 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
pub const MAX_INPUT_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Resolve `path` to a regular file.
///
/// Canonicalizes the path (resolving `..` and symlinks) and rejects
/// directories.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|e| {
        AppError::Input(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(AppError::Input(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate file size before reading.
pub(crate) fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path)?;

    if metadata.len() > max_size {
        return Err(AppError::Input(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve the destination of a file about to be written.
///
/// The parent directory must already exist; the returned path joins its
/// canonical form with the original file name.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, AppError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| {
        AppError::Input(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(AppError::Input(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| AppError::Input("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse facts from text in the given format.
pub fn parse_facts(contents: &str, format: InputFormat) -> Result<Vec<UsageFact>, AppError> {
    let facts = match format {
        InputFormat::Json => serde_json::from_str::<Vec<UsageFact>>(contents)?,
        InputFormat::Jsonl => {
            let mut facts = Vec::new();
            for (number, line) in contents.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let fact = serde_json::from_str::<UsageFact>(line).map_err(|e| {
                    AppError::Input(format!("Line {}: {}", number + 1, e))
                })?;
                facts.push(fact);
                if facts.len() > MAX_FACT_COUNT {
                    break;
                }
            }
            facts
        }
    };

    if facts.len() > MAX_FACT_COUNT {
        return Err(AppError::Input(format!(
            "Fact count exceeds maximum allowed {}",
            MAX_FACT_COUNT
        )));
    }

    Ok(facts)
}

/// Read facts from a file.
pub fn read_facts(path: &Path, format: InputFormat) -> Result<Vec<UsageFact>, AppError> {
    tracing::info!("Reading facts from {:?} (format: {})", path, format);

    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_INPUT_FILE_SIZE)?;

    let contents = std::fs::read_to_string(&validated_path)?;
    let facts = parse_facts(&contents, format)?;

    tracing::info!("Read {} facts", facts.len());
    Ok(facts)
}

// =============================================================================
// TESTS
// =============================================================================
