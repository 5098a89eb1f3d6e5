//! # CLI Command Implementations

use crate::config::{InputFormat, unique_models};
use crate::error::AppError;
use crate::input::{
    MAX_INPUT_FILE_SIZE, read_facts, validate_file_path, validate_file_size, validate_output_path,
};
use crate::sink::{DirectorySink, ProjectionSummary, StreamSink, project};
use std::path::{Path, PathBuf};
use usagecast_core::export::canonical_crypto_hash;
use usagecast_core::{
    Model, ProjectionOptions, UsageEngine, canonical_bytes, entity_key, fingerprint,
    read_canonical_header, reader_key, user_key,
};

/// How results are reported on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
}

/// Resolved settings of a `project` run (CLI flags over config file).
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub format: InputFormat,
    pub models: Vec<Model>,
    pub dir: Option<PathBuf>,
    pub options: ProjectionOptions,
}

/// Read and validate a fact file into an engine.
fn load_engine(
    input: &Path,
    format: InputFormat,
    options: ProjectionOptions,
) -> Result<UsageEngine, AppError> {
    let facts = read_facts(input, format)?;
    Ok(UsageEngine::with_options(facts, options)?)
}

// =============================================================================
// PROJECT COMMAND
// =============================================================================

/// Project facts into every requested model.
///
/// Without an output directory the units go to stdout as enveloped JSON
/// Lines, and the summary goes to the log.
pub fn cmd_project(
    input: &Path,
    request: &ProjectRequest,
    mode: OutputMode,
) -> Result<(), AppError> {
    let engine = load_engine(input, request.format, request.options)?;
    let models = unique_models(request.models.iter().copied());

    match &request.dir {
        Some(dir) => {
            let mut sink = DirectorySink::create(dir, &models)?;
            let summary = project(&engine, &models, &mut sink)?;
            report_summary(&summary, mode)?;
            tracing::info!("Wrote {} models to {:?}", models.len(), dir);
        }
        None => {
            let stdout = std::io::stdout();
            let mut sink = StreamSink::new(stdout.lock());
            let summary = project(&engine, &models, &mut sink)?;
            tracing::info!(facts = summary.facts, units = ?summary.units, "Projection complete");
        }
    }

    Ok(())
}

fn report_summary(summary: &ProjectionSummary, mode: OutputMode) -> Result<(), AppError> {
    if mode.quiet {
        return Ok(());
    }
    if mode.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Projected {} facts", summary.facts);
    for (sequence, count) in &summary.units {
        println!("  {:<26} {}", sequence, count);
    }
    Ok(())
}

// =============================================================================
// KEYS COMMAND
// =============================================================================

/// Print the keys every fact maps to.
pub fn cmd_keys(input: &Path, format: InputFormat, mode: OutputMode) -> Result<(), AppError> {
    let engine = load_engine(input, format, ProjectionOptions::default())?;

    for fact in engine.facts() {
        let entity = entity_key(fact);
        let user = user_key(&fact.user_email);
        let reader = reader_key(&entity, &fact.user_email);

        if mode.json {
            println!(
                "{}",
                serde_json::json!({
                    "entity": entity,
                    "user": user,
                    "reader": reader,
                })
            );
        } else {
            println!("{}\t{}\t{}", entity, user, reader);
        }
    }

    Ok(())
}

// =============================================================================
// FINGERPRINT COMMAND
// =============================================================================

/// Print the checksum and BLAKE3 hash of each model's canonical output.
pub fn cmd_fingerprint(
    input: &Path,
    format: InputFormat,
    mode: OutputMode,
) -> Result<(), AppError> {
    let engine = load_engine(input, format, ProjectionOptions::default())?;
    let checksums = fingerprint(&engine)?;

    let mut rows = Vec::with_capacity(Model::ALL.len());
    for model in Model::ALL {
        let hash = canonical_crypto_hash(&engine, model)?;
        rows.push((model, checksums.get(model), hash));
    }

    if mode.json {
        let models: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|(model, checksum, hash)| {
                (
                    model.name().to_string(),
                    serde_json::json!({ "checksum": checksum, "blake3": hash }),
                )
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "facts": engine.facts().len(),
                "models": models,
            }))?
        );
        return Ok(());
    }

    println!("Fingerprint of {} facts", engine.facts().len());
    for (model, checksum, hash) in &rows {
        println!("  {:<11} {:016x}  {}", model.name(), checksum, hash);
    }
    Ok(())
}

// =============================================================================
// EXPORT / INSPECT COMMANDS
// =============================================================================

/// Write one model's canonical export to `output`.
pub fn cmd_export(
    input: &Path,
    format: InputFormat,
    model: Model,
    output: &Path,
    mode: OutputMode,
) -> Result<(), AppError> {
    let output = validate_output_path(output)?;
    let engine = load_engine(input, format, ProjectionOptions::default())?;
    let data = canonical_bytes(&engine, model)?;
    std::fs::write(&output, &data)?;

    tracing::info!("Exported {} model ({} bytes) to {:?}", model, data.len(), output);
    if !mode.quiet && !mode.json {
        println!("Exported {} model to {:?}", model, output);
    }
    Ok(())
}

/// Verify a canonical export and print its header.
pub fn cmd_inspect(file: &Path, mode: OutputMode) -> Result<(), AppError> {
    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_INPUT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)?;
    let header = read_canonical_header(&data)?;

    if mode.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "version": header.version,
                "model": header.model,
                "unit_count": header.unit_count,
                "checksum": header.checksum,
            }))?
        );
        return Ok(());
    }

    println!("Canonical export v{}", header.version);
    println!("Model:    {}", header.model);
    println!("Units:    {}", header.unit_count);
    println!("Checksum: {:016x}", header.checksum);
    Ok(())
}
