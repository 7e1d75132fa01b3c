//! Command-line interface for tensorgrab.

use std::path::PathBuf;

use clap::Parser;

use crate::io::format::tensorgrab_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a tensorgrab heading to the `tensorgrab-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    tensorgrab_output!("╭───────────────────────────────────────────────────────────────────────────────────────╮");
    tensorgrab_output!("│  tensorgrab                                                                           │");
    tensorgrab_output!("│  Reading, expanding and comparing tensors dumped by quantum-chemistry programs        │");
    tensorgrab_output!("│                                                                         {version:>13} │");
    tensorgrab_output!("╰───────────────────────────────────────────────────────────────────────────────────────╯");
    tensorgrab_output!("");
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML input file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Name of the output file (without extension). The program output is written to
    /// `<OUTPUT>.out`. If not given, the output goes to the console.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Writes a template YAML input file with this name (without extension) and exits.
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Increases the verbosity of the diagnostic log. May be given more than once.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
