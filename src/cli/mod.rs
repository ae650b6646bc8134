//! CLI module for godot-formatter
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod output;
pub mod response;

pub use output::OutputContext;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, format::FormatArgs, lint::LintArgs};

const LONG_ABOUT: &str = r#"
godot-formatter - run gdscript-formatter from the command line or an editor host

Formats GDScript documents and reports lint diagnostics by driving the
external gdscript-formatter binary over its stdin/stdout contract.

QUICK START:
  1. Create settings:         godot-formatter config init
  2. Format a file:           godot-formatter format player.gd --write
  3. Lint a project:          godot-formatter lint .

SETTINGS:
  Project settings live in .godot-formatter/settings.toml, global settings in
  ~/.config/godot-formatter/settings.toml, both under a [godotFormatter] table.
  GODOT_FORMATTER_PATH overrides the executable and disables the built-in binary.
"#;

/// godot-formatter - format and lint GDScript through gdscript-formatter
#[derive(Parser, Debug)]
#[command(name = "godot-formatter")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(
    after_help = "Use 'godot-formatter <COMMAND> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project settings file (replaces .godot-formatter/settings.toml)
    #[arg(long, global = true, env = "GODOT_FORMATTER_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Location of the bundled gdscript-formatter binary
    #[arg(long, global = true)]
    pub builtin: Option<PathBuf>,

    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Format a GDScript file
    Format(FormatArgs),

    /// Lint GDScript files or directories
    Lint(LintArgs),

    /// Settings management
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lint_with_globals() {
        let cli = Cli::parse_from([
            "godot-formatter",
            "lint",
            "src",
            "main.gd",
            "--settings",
            "custom.toml",
        ]);
        assert_eq!(cli.settings, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Lint(args) => assert_eq!(args.paths.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_format_write() {
        let cli = Cli::parse_from(["godot-formatter", "format", "player.gd", "--write"]);
        match cli.command {
            Commands::Format(args) => {
                assert!(args.write);
                assert_eq!(args.file, PathBuf::from("player.gd"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
