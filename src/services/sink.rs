//! Applying decoded results to the host
//!
//! Format results go to an [`EditSurface`]; lint results go to the
//! [`DiagnosticRegistry`]. Failures are written to the [`LogSink`] and never
//! partially applied.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::registry::{DiagnosticRegistry, RequestToken};
use crate::error::{FormatterError, FormatterResult, InvokeError};
use crate::infra::log::LogSink;
use crate::models::diagnostic::Diagnostic;
use crate::models::document::{Document, DocumentId};
use crate::models::edit::TextEdit;

/// Host surface that accepts document edits
#[async_trait]
pub trait EditSurface: Send + Sync {
    async fn apply_edit(&self, document: &Document, edit: TextEdit) -> FormatterResult<()>;
}

/// Writes the edited text back to the document's file
#[derive(Debug, Default, Clone, Copy)]
pub struct FileEditSurface;

#[async_trait]
impl EditSurface for FileEditSurface {
    async fn apply_edit(&self, document: &Document, edit: TextEdit) -> FormatterResult<()> {
        let path: PathBuf = document
            .path()
            .map(PathBuf::from)
            .ok_or_else(|| FormatterError::Edit(format!("{} has no file path", document.id())))?;

        let updated = document.apply(&edit);
        if updated == document.text() {
            tracing::debug!("{} already formatted", path.display());
            return Ok(());
        }
        tokio::fs::write(&path, updated).await?;
        Ok(())
    }
}

/// Routes pipeline results to the registry and the log channel
pub struct ResultSink {
    registry: Arc<DiagnosticRegistry>,
    log: Arc<LogSink>,
}

impl ResultSink {
    /// Create a sink over a registry and a log channel
    pub fn new(registry: Arc<DiagnosticRegistry>, log: Arc<LogSink>) -> Self {
        Self { registry, log }
    }

    /// Registry receiving lint results
    pub fn registry(&self) -> &Arc<DiagnosticRegistry> {
        &self.registry
    }

    /// Log channel receiving failures
    pub fn log(&self) -> &Arc<LogSink> {
        &self.log
    }

    /// Apply a format result; on failure the document is left untouched
    pub async fn apply_format(
        &self,
        document: &Document,
        result: Result<TextEdit, InvokeError>,
        surface: &dyn EditSurface,
    ) -> FormatterResult<()> {
        let edit = match result {
            Ok(edit) => edit,
            Err(err) => {
                self.record_failure(format!("Formatting failed: {}", err), &err);
                return Err(err.into());
            }
        };

        surface.apply_edit(document, edit).await.inspect_err(|err| {
            self.log
                .append_line(format!("Applying formatting to {} failed: {}", document.id(), err));
        })
    }

    /// Record a format failure without an edit surface involved
    pub fn format_failed(&self, err: &InvokeError) {
        self.record_failure(format!("Formatting failed: {}", err), err);
    }

    /// Replace or clear the document's diagnostics depending on the outcome
    pub fn apply_lint(
        &self,
        id: &DocumentId,
        token: RequestToken,
        result: Result<Vec<Diagnostic>, InvokeError>,
    ) -> bool {
        match result {
            Ok(diagnostics) => self.registry.publish(id, token, diagnostics),
            Err(err) => {
                self.record_failure(format!("Linting {} failed: {}", id, err), &err);
                self.registry.clear_current(id, token);
                false
            }
        }
    }

    /// Drop the entry of a closed document
    pub fn document_closed(&self, id: &DocumentId) {
        self.registry.remove(id);
    }

    /// Drop the entry of a document linted while linting is off
    pub fn lint_disabled(&self, id: &DocumentId) {
        self.registry.remove(id);
    }

    fn record_failure(&self, line: String, err: &InvokeError) {
        tracing::debug!(
            command = err.command(),
            exit_code = ?err.exit_code(),
            spawn_failure = err.is_spawn_failure(),
            "External formatter failed"
        );
        self.log.append_line(line);
    }
}
