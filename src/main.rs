//! godot-formatter - format and lint GDScript through gdscript-formatter
//!
//! Command-line host for the formatter pipeline. Every command prints a JSON
//! document; failures exit with code 2.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use godot_formatter::app::App;
use godot_formatter::cli::{Cli, Commands};
use godot_formatter::infra::command::default_built_in_path;
use godot_formatter::services::config::{TomlSettings, global_settings_path};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose raises the default from warn to debug
    let default_filter = if cli.verbose {
        "godot_formatter=debug"
    } else {
        "godot_formatter=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!(
                r#"{{"success":false,"error":"Failed to create runtime: {}"}}"#,
                e
            );
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(async_main(cli));

    if let Err(e) = result {
        let response = serde_json::json!({
            "success": false,
            "error": format!("{:#}", e)
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, e))
        );
        std::process::exit(2);
    }
}

async fn async_main(cli: Cli) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;

    let settings = Arc::new(match cli.settings {
        Some(path) => TomlSettings::with_paths(global_settings_path(), root.join(path)),
        None => TomlSettings::for_root(&root),
    });
    settings
        .reload()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;

    let built_in = cli.builtin.unwrap_or_else(default_built_in_path);
    let app = App::new(&root, settings.clone(), built_in);

    let result = execute_command(cli.command, &app, &settings).await;
    app.shutdown();
    result
}

async fn execute_command(
    command: Commands,
    app: &App,
    settings: &TomlSettings,
) -> anyhow::Result<()> {
    use godot_formatter::cli::commands;

    match command {
        Commands::Format(args) => commands::format::execute(args, app).await,
        Commands::Lint(args) => commands::lint::execute(args, app).await,
        Commands::Config(args) => commands::config::execute(args, app, settings).await,
    }
}
