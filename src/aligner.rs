use crate::error::PipelineError;
use anyhow::{anyhow, Result};
use needletail::parse_fastx_file;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Id of the first sequence in the reference FASTA; used for the `Reference`
/// column of the output table. A reference with zero sequences is a fatal
/// input error.
pub fn reference_id(path: &Path) -> Result<String> {
    let mut reader = parse_fastx_file(path)
        .map_err(|e| anyhow!("failed to open reference FASTA {}: {}", path.display(), e))?;
    match reader.next() {
        Some(record) => {
            let record =
                record.map_err(|e| anyhow!("failed to parse reference FASTA record: {}", e))?;
            let id = std::str::from_utf8(record.id()).unwrap_or("").to_string();
            // Keep only the accession, not the free-text description.
            Ok(id.split_whitespace().next().unwrap_or("").to_string())
        }
        None => Err(PipelineError::InvalidInput(format!(
            "reference FASTA {} contains no sequences",
            path.display()
        ))
        .into()),
    }
}

/// Mutant id derived from the input file name, without extension.
pub fn mutant_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Produce one mutant's raw diff table.
///
/// In precomputed mode the mutant input already is the diff table and is read
/// back as-is. Otherwise the MUMmer pair nucmer + show-snps is invoked; both
/// are treated as black boxes whose non-zero exit, unspawnable binary or empty
/// output propagates as a collaborator failure naming the mutant.
pub fn diff_records(
    reference: &Path,
    mutant_input: &Path,
    mutant: &str,
    precomputed: bool,
    work_dir: &Path,
) -> Result<String> {
    if precomputed {
        return std::fs::read_to_string(mutant_input).map_err(|e| {
            PipelineError::InvalidInput(format!(
                "failed to read diff table {}: {}",
                mutant_input.display(),
                e
            ))
            .into()
        });
    }

    let prefix: PathBuf = work_dir.join(mutant);
    run_collaborator(
        Command::new("nucmer")
            .arg("--prefix")
            .arg(&prefix)
            .arg(reference)
            .arg(mutant_input),
        "nucmer",
        mutant,
    )?;

    // nucmer appends ".delta" to the prefix; with_extension would clobber
    // any dot already in the mutant name.
    let delta = PathBuf::from(format!("{}.delta", prefix.display()));
    let snps = run_collaborator(
        Command::new("show-snps")
            .arg("-CTlr")
            .arg("-x")
            .arg("1")
            .arg(&delta),
        "show-snps",
        mutant,
    )?;
    let _ = std::fs::remove_file(&delta);

    if snps.is_empty() {
        return Err(PipelineError::CollaboratorFailure {
            tool: "show-snps".to_string(),
            mutant: mutant.to_string(),
            message: "produced no output".to_string(),
        }
        .into());
    }
    Ok(snps)
}

fn run_collaborator(command: &mut Command, tool: &str, mutant: &str) -> Result<String> {
    let output = command.output().map_err(|e| PipelineError::CollaboratorFailure {
        tool: tool.to_string(),
        mutant: mutant.to_string(),
        message: format!("failed to spawn: {e}"),
    })?;
    if !output.status.success() {
        return Err(PipelineError::CollaboratorFailure {
            tool: tool.to_string(),
            mutant: mutant.to_string(),
            message: format!(
                "exit {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
