//! Replay script for the import batches
//!
//! Renders `import.sh`, which feeds every batch file once, in category
//! order, to the external memory binary and counts successes and failures.

use std::fs;
use std::path::{Path, PathBuf};

use super::batcher::{BatchCategory, BatchSummary};
use crate::export::{ExportError, ExportResult};

pub const IMPORT_SCRIPT_FILE: &str = "import.sh";

/// Render the script text for `summary`
pub fn render_import_script(summary: &BatchSummary, memory_binary: &str) -> String {
    let mut script = String::new();

    script.push_str("#!/bin/bash\n");
    script.push_str("# Auto-generated memory import script\n");
    script.push_str(&format!("# Generated: {}\n", summary.timestamp.to_rfc3339()));
    script.push_str(&format!("# Total Records: {}\n", summary.total_records));
    script.push_str(&format!(
        "# Target Collections: {}\n",
        comment_text(&summary.target_collections.join(", "))
    ));
    script.push_str("#\n# Usage: ./import.sh\n#\n");
    script.push_str("# Override the importer with MEMORY_BIN=/path/to/memory ./import.sh\n#\n\n");

    script.push_str("set -euo pipefail\n\n");
    script.push_str(&format!(
        "DEFAULT_MEMORY_BIN={}\n",
        shell_quote(memory_binary)
    ));
    script.push_str("MEMORY_BIN=\"${MEMORY_BIN:-${DEFAULT_MEMORY_BIN}}\"\n");
    script.push_str("SCRIPT_DIR=\"$(cd \"$(dirname \"${BASH_SOURCE[0]}\")\" && pwd)\"\n");
    script.push_str("LOG_FILE=\"${SCRIPT_DIR}/import.log\"\n");
    script.push_str("ERROR_LOG=\"${SCRIPT_DIR}/import_errors.log\"\n\n");

    script.push_str(
        "log() { echo \"[$(date +'%Y-%m-%d %H:%M:%S')] $*\" | tee -a \"${LOG_FILE}\"; }\n",
    );
    script.push_str(
        "error() { echo \"[$(date +'%Y-%m-%d %H:%M:%S')] ERROR: $*\" | tee -a \"${LOG_FILE}\" \"${ERROR_LOG}\" >&2; }\n\n",
    );

    script.push_str("if ! command -v \"${MEMORY_BIN}\" &> /dev/null; then\n");
    script.push_str("    error \"Memory binary '${MEMORY_BIN}' not found in PATH\"\n");
    script.push_str("    error \"Install memory or set MEMORY_BIN\"\n");
    script.push_str("    exit 1\n");
    script.push_str("fi\n\n");

    script.push_str("log \"Starting memory import\"\n");
    script.push_str(&format!("log \"Total batches: {}\"\n", summary.total_batches()));
    script.push_str(&format!("log \"Total records: {}\"\n\n", summary.total_records));

    script.push_str("TOTAL_IMPORTED=0\n");
    script.push_str("TOTAL_FAILED=0\n\n");

    script.push_str("import_batch() {\n");
    script.push_str("    local batch_file=\"$1\"\n");
    script.push_str("    local batch_name\n");
    script.push_str("    batch_name=$(basename \"${batch_file}\")\n\n");
    script.push_str("    log \"Importing ${batch_name}...\"\n");
    script.push_str(
        "    if \"${MEMORY_BIN}\" tools run --tool memory_memory_create --input \"${batch_file}\" >> \"${LOG_FILE}\" 2>> \"${ERROR_LOG}\"; then\n",
    );
    script.push_str("        log \"Imported ${batch_name}\"\n");
    script.push_str("        TOTAL_IMPORTED=$((TOTAL_IMPORTED + 1))\n");
    script.push_str("    else\n");
    script.push_str("        error \"Failed to import ${batch_name}\"\n");
    script.push_str("        TOTAL_FAILED=$((TOTAL_FAILED + 1))\n");
    script.push_str("    fi\n");
    script.push_str("}\n\n");

    for category in BatchCategory::ALL {
        let batches = summary.batches(category);
        if batches == 0 {
            continue;
        }

        let label = category.as_str().replace('_', " ");
        script.push_str(&format!(
            "# {} ({} batches, {} records)\n",
            label,
            batches,
            summary.records(category)
        ));
        script.push_str(&format!("log \"Importing {} batches...\"\n", label));
        for batch in 1..=batches {
            script.push_str(&format!(
                "import_batch \"${{SCRIPT_DIR}}/{}\"\n",
                category.file_name(batch)
            ));
        }
        script.push('\n');
    }

    script.push_str("log \"Import complete\"\n");
    script.push_str("log \"Successfully imported: ${TOTAL_IMPORTED} batches\"\n");
    script.push_str("log \"Failed imports: ${TOTAL_FAILED} batches\"\n\n");
    script.push_str("if [ \"${TOTAL_FAILED}\" -gt 0 ]; then\n");
    script.push_str("    error \"Some batches failed to import. Check ${ERROR_LOG} for details.\"\n");
    script.push_str("    exit 1\n");
    script.push_str("fi\n\n");
    script.push_str("log \"All batches imported successfully\"\n");
    script.push_str("exit 0\n");

    script
}

/// Single-quote `raw` for bash; embedded `'` becomes `'\''`
fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "'\\''"))
}

/// Keep free text on its comment line
fn comment_text(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ")
}

/// Write `import.sh` into `import_dir`, executable on Unix
pub fn write_import_script(
    summary: &BatchSummary,
    memory_binary: &str,
    import_dir: &Path,
) -> ExportResult<PathBuf> {
    let path = import_dir.join(IMPORT_SCRIPT_FILE);
    let script = render_import_script(summary, memory_binary);

    fs::create_dir_all(import_dir).map_err(|e| ExportError::io(import_dir, e))?;
    fs::write(&path, script).map_err(|e| ExportError::io(&path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .map_err(|e| ExportError::io(&path, e))?;
    }

    tracing::debug!(file = %path.display(), "Wrote import script");
    Ok(path)
}
