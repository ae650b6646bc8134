//! Format command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::cli::response::{EditOutput, FormatResponse};
use crate::models::document::Document;
use crate::services::sink::{EditSurface, FileEditSurface};

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// GDScript file to format
    pub file: PathBuf,

    /// Write the formatted text back to the file
    #[arg(short, long)]
    pub write: bool,
}

pub async fn execute(args: FormatArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let path = ctx.absolute_path(&args.file);
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::from_file(&path, text);

    let edit = match app.formatter().format_edit(&document).await {
        Ok(Some(edit)) => edit,
        Ok(None) => {
            ctx.print_success_flat(FormatResponse {
                file: ctx.relative_path(&path),
                changed: false,
                written: false,
                edit: None,
                message: Some("Formatter is disabled".to_string()),
            });
            return Ok(());
        }
        Err(e) => {
            ctx.print_error(&format!("Formatting failed: {e}"));
            return Ok(());
        }
    };

    let changed = document.apply(&edit) != document.text();
    let written = args.write && changed;
    if written {
        FileEditSurface.apply_edit(&document, edit.clone()).await?;
    }

    ctx.print_success_flat(FormatResponse {
        file: ctx.relative_path(&path),
        changed,
        written,
        edit: (changed && !args.write).then(|| EditOutput::from(&edit)),
        message: None,
    });

    Ok(())
}
