//! Application context for godot-formatter
//!
//! Owns the state shared by every request: the cached configuration, the
//! diagnostic registry and the log sink. The host creates one `App` at
//! startup, forwards editor events to it and calls [`App::shutdown`] on exit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::OutputContext;
use crate::error::FormatterResult;
use crate::infra::command::CommandBuilder;
use crate::infra::log::LogSink;
use crate::infra::process::{ProcessInvoker, TokioProcessInvoker};
use crate::models::config::Configuration;
use crate::models::diagnostic::Diagnostic;
use crate::models::document::{Document, DocumentId};
use crate::models::edit::TextEdit;
use crate::services::formatter::FormatService;
use crate::services::linter::{LintOutcome, LintService};
use crate::services::registry::DiagnosticRegistry;
use crate::services::settings::{SettingsChange, SettingsResolver, SettingsSource};
use crate::services::sink::{EditSurface, ResultSink};

/// Application context shared by every host event
pub struct App {
    root: PathBuf,
    pub(crate) output: OutputContext,
    resolver: Arc<SettingsResolver>,
    registry: Arc<DiagnosticRegistry>,
    log: Arc<LogSink>,
    formatter: FormatService,
    linter: LintService,
}

impl App {
    /// Create the application with the real process invoker
    pub fn new(root: &Path, source: Arc<dyn SettingsSource>, built_in: PathBuf) -> Self {
        Self::with_invoker(root, source, built_in, Arc::new(TokioProcessInvoker))
    }

    /// Create the application with a custom process invoker
    pub fn with_invoker(
        root: &Path,
        source: Arc<dyn SettingsSource>,
        built_in: PathBuf,
        invoker: Arc<dyn ProcessInvoker>,
    ) -> Self {
        let resolver = Arc::new(SettingsResolver::new(source));
        let registry = Arc::new(DiagnosticRegistry::new());
        let log = Arc::new(LogSink::default());
        let sink = Arc::new(ResultSink::new(Arc::clone(&registry), Arc::clone(&log)));
        let builder = CommandBuilder::new(built_in);

        let formatter = FormatService::new(
            Arc::clone(&resolver),
            builder.clone(),
            Arc::clone(&invoker),
            Arc::clone(&sink),
        );
        let linter = LintService::new(Arc::clone(&resolver), builder, invoker, sink);

        tracing::info!("godot-formatter initialized at {:?}", root);

        Self {
            root: root.to_path_buf(),
            output: OutputContext::new(root.to_path_buf()),
            resolver,
            registry,
            log,
            formatter,
            linter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<Configuration> {
        self.resolver.snapshot()
    }

    pub fn resolver(&self) -> &Arc<SettingsResolver> {
        &self.resolver
    }

    pub fn log(&self) -> &Arc<LogSink> {
        &self.log
    }

    pub fn formatter(&self) -> &FormatService {
        &self.formatter
    }

    pub fn linter(&self) -> &LintService {
        &self.linter
    }

    /// Edits for a host formatting request; empty on failure
    pub async fn provide_formatting_edits(&self, document: &Document) -> Vec<TextEdit> {
        self.formatter.provide_edits(document).await
    }

    /// Format a document and apply the edit to `surface`
    pub async fn format_document(
        &self,
        document: &Document,
        surface: &dyn EditSurface,
    ) -> FormatterResult<bool> {
        self.formatter.format_document(document, surface).await
    }

    /// Lint a newly opened document
    pub async fn on_document_opened(&self, document: &Document) -> LintOutcome {
        self.linter.lint_document(document).await
    }

    /// Re-lint a saved document
    pub async fn on_document_saved(&self, document: &Document) -> LintOutcome {
        self.linter.lint_document(document).await
    }

    /// Drop the document's diagnostics and invalidate in-flight lints
    pub fn on_document_closed(&self, id: &DocumentId) {
        self.linter.document_closed(id);
    }

    /// Forward a settings change; returns whether the configuration was re-resolved
    pub fn on_settings_changed(&self, change: &SettingsChange) -> bool {
        self.resolver.handle_change(change)
    }

    /// Published diagnostics for a document
    pub fn diagnostics(&self, id: &DocumentId) -> Option<Vec<Diagnostic>> {
        self.registry.get(id)
    }

    /// Drop all published diagnostics and the log buffer
    pub fn shutdown(&self) {
        tracing::debug!("Shutting down, clearing {} diagnostic entries", self.registry.len());
        self.registry.clear_all();
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::config::{SETTINGS_NAMESPACE, keys};
    use crate::services::settings::MemorySettings;
    use crate::services::testing::{Reply, ScriptedInvoker};

    fn app(replies: Vec<Reply>) -> (Arc<MemorySettings>, App) {
        let settings = Arc::new(MemorySettings::new());
        let app = App::with_invoker(
            Path::new("/proj"),
            settings.clone(),
            PathBuf::from("/ext/binaries/gdscript-formatter"),
            Arc::new(ScriptedInvoker::new(replies)),
        );
        (settings, app)
    }

    fn document() -> Document {
        Document::from_file(Path::new("/proj/player.gd"), "extends Node\nvar x\n")
    }

    #[tokio::test]
    async fn test_open_then_close_clears_diagnostics() {
        let (_, app) = app(vec![Reply::exit(
            1,
            "/proj/player.gd:2:unused-var:warning: unused variable x\n",
            "",
        )]);
        let doc = document();

        app.on_document_opened(&doc).await;
        assert_eq!(app.diagnostics(doc.id()).unwrap().len(), 1);

        app.on_document_closed(doc.id());
        assert!(app.diagnostics(doc.id()).is_none());
    }

    #[tokio::test]
    async fn test_settings_change_disabling_lint_clears_everything() {
        let (settings, app) = app(vec![Reply::exit(
            1,
            "/proj/player.gd:1:class-name:error: missing class_name\n",
            "",
        )]);
        let doc = document();
        app.on_document_saved(&doc).await;
        assert!(app.diagnostics(doc.id()).is_some());

        settings.set(SETTINGS_NAMESPACE, keys::ENABLE_LINTER, json!(false));
        assert!(!app.on_settings_changed(&SettingsChange::sections(["files.exclude"])));
        assert!(app.diagnostics(doc.id()).is_some());

        assert!(app.on_settings_changed(&SettingsChange::sections(["godotFormatter"])));
        assert!(app.diagnostics(doc.id()).is_none());
        assert!(!app.config().enabled_lint);
    }

    #[tokio::test]
    async fn test_formatting_edits() {
        let (_, app) = app(vec![Reply::ok("extends Node\nvar x\n")]);
        let doc = document();
        let edits = app.provide_formatting_edits(&doc).await;
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, doc.full_range());
        assert_eq!(doc.apply(&edits[0]), doc.text());
    }

    #[tokio::test]
    async fn test_shutdown_clears_shared_state() {
        let (_, app) = app(vec![
            Reply::exit(1, "/proj/player.gd:1:r:error: m\n", ""),
            Reply::SpawnFailure,
        ]);
        let doc = document();
        app.on_document_opened(&doc).await;
        app.provide_formatting_edits(&doc).await;
        assert!(!app.log().lines().is_empty());

        app.shutdown();
        assert!(app.diagnostics(doc.id()).is_none());
        assert!(app.log().lines().is_empty());
    }
}
