//! Lint pipeline: configuration snapshot → command → process → diagnostics
//!
//! Lint failures never propagate to the caller: they clear the document's
//! diagnostics and are written to the log sink.

use std::sync::Arc;

use super::registry::DiagnosticRegistry;
use super::settings::SettingsResolver;
use super::sink::ResultSink;
use crate::error::InvokeError;
use crate::infra::command::{CommandBuilder, Mode, stdin_payload};
use crate::infra::decoder::decode_lint;
use crate::infra::process::ProcessInvoker;
use crate::models::config::Configuration;
use crate::models::diagnostic::Diagnostic;
use crate::models::document::{Document, DocumentId};

/// What happened to a lint request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// Diagnostics replaced the document's entry
    Published(Vec<Diagnostic>),
    /// A newer request or a close superseded this one
    Superseded,
    /// Linting is disabled; the entry was removed
    Disabled,
    /// The process failed; the entry was cleared
    Failed(String),
}

/// Runs the external linter and publishes diagnostics
pub struct LintService {
    resolver: Arc<SettingsResolver>,
    builder: CommandBuilder,
    invoker: Arc<dyn ProcessInvoker>,
    sink: Arc<ResultSink>,
}

impl LintService {
    /// Create a lint service; clears every diagnostic whenever linting gets disabled
    pub fn new(
        resolver: Arc<SettingsResolver>,
        builder: CommandBuilder,
        invoker: Arc<dyn ProcessInvoker>,
        sink: Arc<ResultSink>,
    ) -> Self {
        let registry = Arc::clone(sink.registry());
        resolver.on_change(move |config| {
            if !config.enabled_lint {
                tracing::debug!("Linter disabled, clearing all diagnostics");
                registry.clear_all();
            }
        });

        Self {
            resolver,
            builder,
            invoker,
            sink,
        }
    }

    /// Registry the service publishes into
    pub fn registry(&self) -> &Arc<DiagnosticRegistry> {
        self.sink.registry()
    }

    /// Lint a document and publish the result to the registry
    pub async fn lint_document(&self, document: &Document) -> LintOutcome {
        let id = document.id();

        // token before snapshot: a concurrent disable then always drops the slot
        let token = self.registry().begin(id);
        let config = self.resolver.snapshot();

        if !config.enabled_lint {
            self.sink.lint_disabled(id);
            return LintOutcome::Disabled;
        }

        let result = self.run(document, &config).await;
        let failure = result.as_ref().err().map(ToString::to_string);
        let diagnostics = result.as_ref().ok().cloned();

        let published = self.sink.apply_lint(id, token, result);
        match (failure, diagnostics) {
            (Some(message), _) => LintOutcome::Failed(message),
            (None, Some(diagnostics)) if published => LintOutcome::Published(diagnostics),
            _ => LintOutcome::Superseded,
        }
    }

    /// Run the linter once without touching the registry
    pub async fn run(
        &self,
        document: &Document,
        config: &Configuration,
    ) -> Result<Vec<Diagnostic>, InvokeError> {
        let command = self.builder.build(Mode::Lint, config, document.path());
        let outcome = self
            .invoker
            .invoke(&command, stdin_payload(document.text()))
            .await?
            .check(&command)?;

        Ok(decode_lint(&outcome.stdout, document))
    }

    /// Forget the document and any lint still running for it
    pub fn document_closed(&self, id: &DocumentId) {
        self.sink.document_closed(id);
    }
}
