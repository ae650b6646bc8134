//! Config command implementation

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::App;
use crate::models::config::Configuration;
use crate::services::config::TomlSettings;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a settings file with the default values
    Init {
        /// Initialize global settings (~/.config/godot-formatter)
        #[arg(long)]
        global: bool,

        /// Force overwrite existing settings
        #[arg(short, long)]
        force: bool,
    },

    /// Show the resolved configuration
    Show,

    /// Show settings file path
    Path {
        /// Show global settings path
        #[arg(long)]
        global: bool,
    },
}

#[derive(Serialize)]
struct ConfigInitResponse {
    status: &'static str,
    path: String,
    level: &'static str,
}

#[derive(Serialize)]
struct ConfigShowResponse {
    config: Configuration,
    executable: String,
    reorder_allowed: bool,
}

#[derive(Serialize)]
struct ConfigPathResponse {
    level: &'static str,
    path: String,
    exists: bool,
}

fn level(global: bool) -> &'static str {
    if global { "global" } else { "project" }
}

pub async fn execute(args: ConfigArgs, app: &App, settings: &TomlSettings) -> Result<()> {
    let ctx = &app.output;

    match args.command {
        ConfigCommand::Init { global, force } => match settings.init(global, force).await {
            Ok(path) => ctx.print_success_flat(ConfigInitResponse {
                status: "created",
                path: path.display().to_string(),
                level: level(global),
            }),
            Err(e) => ctx.print_error(&e.to_string()),
        },

        ConfigCommand::Show => {
            let config = app.config();
            ctx.print_success_flat(ConfigShowResponse {
                executable: app.formatter().executable(&config).display().to_string(),
                reorder_allowed: config.reorder_allowed(),
                config: (*config).clone(),
            });
        }

        ConfigCommand::Path { global } => {
            let path = settings.settings_path(global);
            ctx.print_success_flat(ConfigPathResponse {
                level: level(global),
                path: path.display().to_string(),
                exists: path.exists(),
            });
        }
    }

    Ok(())
}
