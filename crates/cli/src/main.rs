use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pseudoview::commands::{
    import_symbols_command, init_project_command, project_info_command, replay_command,
    resolve_command,
};
use pseudoview_core::tagged::TextPosition;
use tracing_subscriber::EnvFilter;

/// Explorer for colour-tagged decompiler pseudocode.
///
/// This CLI is a thin wrapper around `pseudoview-core` (exposed in code as `pseudoview_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "pseudoview",
    version,
    about = "Explore tagged decompiler pseudocode: resolve, navigate, rename",
    long_about = None
)]
struct Cli {
    /// Log debug events to stderr (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new pseudoview project at the given root.
    ///
    /// This will:
    /// - Create a `.pseudoview` metadata directory.
    /// - Write a `.pseudoview/project.json` config file.
    /// - Create the symbol database.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Load functions and globals from a JSON symbol file into the project database.
    ImportSymbols {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// JSON file with `functions` and `globals` arrays.
        #[arg(long)]
        file: PathBuf,
    },

    /// Resolve the word under a cursor in a function's pseudocode.
    Resolve {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// JSON code fixture: an array of `{address, code}` entries.
        #[arg(long)]
        code: PathBuf,

        /// Decompiler to use.
        #[arg(long, default_value = "fixture")]
        decompiler: String,

        /// Function to show.
        #[arg(long)]
        function: String,

        /// Zero-based line in the stripped text.
        #[arg(long)]
        line: usize,

        /// Zero-based column in the stripped text.
        #[arg(long)]
        column: usize,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Replay a YAML script of viewer interactions against the project.
    Replay {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// JSON code fixture: an array of `{address, code}` entries.
        #[arg(long)]
        code: PathBuf,

        /// Decompiler to use.
        #[arg(long, default_value = "fixture")]
        decompiler: String,

        /// YAML script with a `steps` list.
        #[arg(long)]
        script: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::ImportSymbols { root, file } => import_symbols_command(&root, &file)?,
        Command::Resolve { root, code, decompiler, function, line, column, json } => {
            resolve_command(&root, &code, &decompiler, &function, TextPosition::new(line, column), json)?
        }
        Command::Replay { root, code, decompiler, script, json } => {
            replay_command(&root, &code, &decompiler, &script, json)?
        }
    }

    Ok(())
}
