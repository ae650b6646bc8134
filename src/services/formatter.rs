//! Format pipeline: configuration snapshot → command → process → whole-text edit

use std::path::PathBuf;
use std::sync::Arc;

use super::settings::SettingsResolver;
use super::sink::{EditSurface, ResultSink};
use crate::error::{FormatterResult, InvokeError};
use crate::infra::command::{CommandBuilder, Mode, stdin_payload};
use crate::infra::decoder::decode_format;
use crate::infra::process::ProcessInvoker;
use crate::models::config::Configuration;
use crate::models::document::Document;
use crate::models::edit::TextEdit;

/// Runs the external formatter over whole documents
pub struct FormatService {
    resolver: Arc<SettingsResolver>,
    builder: CommandBuilder,
    invoker: Arc<dyn ProcessInvoker>,
    sink: Arc<ResultSink>,
}

impl FormatService {
    /// Create a format service
    pub fn new(
        resolver: Arc<SettingsResolver>,
        builder: CommandBuilder,
        invoker: Arc<dyn ProcessInvoker>,
        sink: Arc<ResultSink>,
    ) -> Self {
        Self {
            resolver,
            builder,
            invoker,
            sink,
        }
    }

    /// Executable the next invocation would run
    pub fn executable(&self, config: &Configuration) -> PathBuf {
        self.builder.executable(config)
    }

    /// Run the formatter; `Ok(None)` when formatting is disabled
    pub async fn format_edit(&self, document: &Document) -> Result<Option<TextEdit>, InvokeError> {
        let config = self.resolver.snapshot();
        if !config.enabled_format {
            tracing::debug!("Formatter disabled, skipping {}", document.id());
            return Ok(None);
        }

        let command = self.builder.build(Mode::Format, &config, document.path());
        let outcome = self
            .invoker
            .invoke(&command, stdin_payload(document.text()))
            .await?
            .check(&command)?;

        Ok(Some(decode_format(outcome.stdout, document)))
    }

    /// Edits for a formatting request; failures are logged and yield no edits
    pub async fn provide_edits(&self, document: &Document) -> Vec<TextEdit> {
        match self.format_edit(document).await {
            Ok(edit) => edit.into_iter().collect(),
            Err(err) => {
                self.sink.format_failed(&err);
                Vec::new()
            }
        }
    }

    /// Format and apply the result to the surface. Returns whether an edit was applied.
    pub async fn format_document(
        &self,
        document: &Document,
        surface: &dyn EditSurface,
    ) -> FormatterResult<bool> {
        let edit = match self.format_edit(document).await {
            Ok(None) => return Ok(false),
            Ok(Some(edit)) => Ok(edit),
            Err(err) => Err(err),
        };
        self.sink.apply_format(document, edit, surface).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::infra::command::LINE_ENDING;
    use crate::infra::log::LogSink;
    use crate::models::config::{SETTINGS_NAMESPACE, keys};
    use crate::models::document::DocumentId;
    use crate::models::edit::{Position, Range};
    use crate::services::registry::DiagnosticRegistry;
    use crate::services::settings::MemorySettings;
    use crate::services::testing::{Reply, ScriptedInvoker};

    #[derive(Default)]
    struct RecordingSurface {
        edits: Mutex<Vec<TextEdit>>,
    }

    #[async_trait]
    impl EditSurface for RecordingSurface {
        async fn apply_edit(&self, _document: &Document, edit: TextEdit) -> FormatterResult<()> {
            self.edits.lock().unwrap().push(edit);
            Ok(())
        }
    }

    struct Fixture {
        settings: Arc<MemorySettings>,
        resolver: Arc<SettingsResolver>,
        invoker: Arc<ScriptedInvoker>,
        log: Arc<LogSink>,
        service: FormatService,
    }

    fn fixture(replies: Vec<Reply>) -> Fixture {
        let settings = Arc::new(MemorySettings::new());
        let resolver = Arc::new(SettingsResolver::new(settings.clone()));
        let invoker = Arc::new(ScriptedInvoker::new(replies));
        let log = Arc::new(LogSink::default());
        let sink = Arc::new(ResultSink::new(
            Arc::new(DiagnosticRegistry::new()),
            log.clone(),
        ));
        let service = FormatService::new(
            resolver.clone(),
            CommandBuilder::new("/ext/binaries/gdscript-formatter"),
            invoker.clone(),
            sink,
        );
        Fixture {
            settings,
            resolver,
            invoker,
            log,
            service,
        }
    }

    fn doc(text: &str) -> Document {
        Document::new(DocumentId::new("file:///proj/a.gd"), None, text)
    }

    #[tokio::test]
    async fn test_single_line_replaced_with_stdout() {
        let f = fixture(vec![Reply::ok("X")]);
        let document = doc("var   y");

        let edit = f.service.format_edit(&document).await.unwrap().unwrap();
        assert_eq!(
            edit.range,
            Range::new(Position::new(0, 0), Position::new(0, 7))
        );
        assert_eq!(edit.new_text, "X");

        let calls = f.invoker.calls();
        assert_eq!(calls.len(), 1);
        let (command, stdin) = &calls[0];
        assert_eq!(command.args, vec!["--indent-size=4", "--safe"]);
        assert_eq!(stdin, &format!("var   y{}", LINE_ENDING).into_bytes());
    }

    #[tokio::test]
    async fn test_exit_one_is_failure_without_edit() {
        let f = fixture(vec![Reply::exit(1, "", "syntax error")]);
        let surface = RecordingSurface::default();

        let err = f
            .service
            .format_document(&doc("func"), &surface)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
        assert!(surface.edits.lock().unwrap().is_empty());
        assert!(f.log.lines()[0].contains("syntax error"));
    }

    #[tokio::test]
    async fn test_spawn_failure_logged_and_no_edits() {
        let f = fixture(vec![Reply::SpawnFailure]);
        let edits = f.service.provide_edits(&doc("var x")).await;
        assert!(edits.is_empty());
        let lines = f.log.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Failed to start"));
    }

    #[tokio::test]
    async fn test_disabled_formatter_does_not_spawn() {
        let f = fixture(Vec::new());
        f.settings
            .set(SETTINGS_NAMESPACE, keys::ENABLE_FORMATTER, json!(false));
        f.resolver.reload();

        let surface = RecordingSurface::default();
        let applied = f
            .service
            .format_document(&doc("var x"), &surface)
            .await
            .unwrap();
        assert!(!applied);
        assert!(f.invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_format_document_applies_edit() {
        let f = fixture(vec![Reply::ok("var x\n")]);
        let surface = RecordingSurface::default();

        let applied = f
            .service
            .format_document(&doc("var  x"), &surface)
            .await
            .unwrap();
        assert!(applied);
        assert_eq!(surface.edits.lock().unwrap()[0].new_text, "var x\n");
    }

    #[tokio::test]
    async fn test_uses_snapshot_of_current_settings() {
        let f = fixture(vec![Reply::ok(""), Reply::ok("")]);
        f.service.format_edit(&doc("")).await.unwrap();

        f.settings.set(SETTINGS_NAMESPACE, keys::SAFE, json!(false));
        f.settings
            .set(SETTINGS_NAMESPACE, keys::REORDER_CODE, json!(true));
        f.settings
            .set(SETTINGS_NAMESPACE, keys::USE_BUILT_IN, json!(false));
        f.resolver.reload();
        f.service.format_edit(&doc("")).await.unwrap();

        let calls = f.invoker.calls();
        assert_eq!(
            calls[0].0.program,
            std::path::PathBuf::from("/ext/binaries/gdscript-formatter")
        );
        assert_eq!(
            calls[1].0.program,
            std::path::PathBuf::from("gdscript-formatter")
        );
        assert_eq!(calls[1].0.args, vec!["--indent-size=4", "--reorder-code"]);
    }
}
