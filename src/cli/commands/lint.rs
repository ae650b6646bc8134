//! Lint command implementation
//!
//! Expands directories into `.gd` files and lints them with a bounded number
//! of concurrent subprocesses.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use futures::StreamExt;

use crate::app::App;
use crate::cli::response::{DiagnosticOutput, FileDiagnostics, LintResponse};
use crate::models::diagnostic::DiagnosticSeverity;
use crate::models::document::Document;
use crate::services::linter::LintOutcome;

const SCRIPT_EXTENSION: &str = "gd";
const MAX_DEFAULT_JOBS: usize = 16;

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Files or directories to lint
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only report these severities (comma-separated: error,warning)
    #[arg(long, value_delimiter = ',')]
    pub severity: Option<Vec<String>>,

    /// Maximum number of formatter processes running at once
    #[arg(short, long, default_value_t = default_jobs())]
    pub jobs: usize,
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(MAX_DEFAULT_JOBS)
}

pub async fn execute(args: LintArgs, app: &App) -> Result<()> {
    let ctx = &app.output;

    if !app.config().enabled_lint {
        ctx.print_error("Linter is disabled");
        return Ok(());
    }

    let severities = match parse_severities(args.severity.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            ctx.print_error(&e);
            return Ok(());
        }
    };

    let roots: Vec<PathBuf> = args.paths.iter().map(|p| ctx.absolute_path(p)).collect();
    let mut results = lint_paths(app, &roots, args.jobs).await;

    if let Some(allowed) = &severities {
        for file in &mut results {
            file.diagnostics.retain(|d| allowed.contains(&d.severity));
            file.count = file.diagnostics.len();
        }
    }

    let response = LintResponse {
        total: results.iter().map(|f| f.count).sum(),
        failed: results.iter().filter(|f| f.error.is_some()).count(),
        files: results,
    };
    ctx.print_success_flat(response);

    Ok(())
}

/// Lint every script under `roots`; inputs that do not exist are reported as failed files
async fn lint_paths(app: &App, roots: &[PathBuf], jobs: usize) -> Vec<FileDiagnostics> {
    let scripts = collect_scripts(roots);
    tracing::debug!(
        "Linting {} files with {} jobs ({} missing inputs)",
        scripts.files.len(),
        jobs,
        scripts.missing.len()
    );

    let mut results: Vec<FileDiagnostics> = scripts
        .missing
        .iter()
        .map(|path| failed(app.output.relative_path(path), "Path not found".to_string()))
        .collect();

    let linted: Vec<FileDiagnostics> = futures::stream::iter(&scripts.files)
        .map(|path| lint_file(app, path))
        .buffered(jobs.max(1))
        .collect()
        .await;
    results.extend(linted);
    results
}

async fn lint_file(app: &App, path: &Path) -> FileDiagnostics {
    let file = app.output.relative_path(path);

    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => return failed(file, format!("Failed to read file: {e}")),
    };
    let document = Document::from_file(path, text);

    let result = match app.on_document_opened(&document).await {
        LintOutcome::Published(diagnostics) => {
            let diagnostics: Vec<DiagnosticOutput> =
                diagnostics.iter().map(DiagnosticOutput::from).collect();
            FileDiagnostics {
                file,
                count: diagnostics.len(),
                diagnostics,
                error: None,
            }
        }
        LintOutcome::Failed(message) => failed(file, message),
        LintOutcome::Disabled => failed(file, "Linter is disabled".to_string()),
        LintOutcome::Superseded => failed(file, "Lint request was superseded".to_string()),
    };

    // one-shot run: nothing stays open
    app.on_document_closed(document.id());
    result
}

fn failed(file: String, error: String) -> FileDiagnostics {
    FileDiagnostics {
        file,
        count: 0,
        diagnostics: Vec::new(),
        error: Some(error),
    }
}

fn parse_severities(raw: Option<&[String]>) -> Result<Option<BTreeSet<String>>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.iter()
        .map(|s| {
            DiagnosticSeverity::from_token(s.trim())
                .map(|sev| sev.to_string())
                .ok_or_else(|| format!("Unknown severity '{}' (expected error or warning)", s))
        })
        .collect::<Result<BTreeSet<_>, _>>()
        .map(Some)
}

/// Scripts found under the lint inputs
#[derive(Debug, Default, PartialEq, Eq)]
struct ScriptSet {
    /// Sorted and de-duplicated
    files: Vec<PathBuf>,
    /// Inputs that do not exist
    missing: Vec<PathBuf>,
}

fn collect_scripts(paths: &[PathBuf]) -> ScriptSet {
    let mut files = BTreeSet::new();
    let mut missing = Vec::new();

    for path in paths {
        if path.is_file() {
            files.insert(path.clone());
            continue;
        }
        if !path.exists() {
            missing.push(path.clone());
            continue;
        }

        let walker = walkdir::WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0 || !name.starts_with('.')
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                    continue;
                }
            };
            let is_script = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == SCRIPT_EXTENSION);
            if entry.file_type().is_file() && is_script {
                files.insert(entry.into_path());
            }
        }
    }

    ScriptSet {
        files: files.into_iter().collect(),
        missing,
    }
}
