//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::application::Format;

/// Edit behavior trees stored as flat node documents
#[derive(Parser, Debug)]
#[command(name = "btedit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Tree document (default: `default_file` from config)
    #[arg(short, long, global = true, env = "BTEDIT_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Document format, overrides file extension and config
    #[arg(long, global = true, value_parser = parse_format)]
    pub format: Option<Format>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a document holding a single root node
    Init {
        /// Payload of the root node
        #[arg(default_value = "Root")]
        payload: String,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Add a node under a parent (the root when omitted)
    Add {
        /// Parent node id
        #[arg(short, long)]
        parent: Option<u32>,

        /// Node payload, e.g. "Sequence" or "Wait 2s"
        payload: String,
    },

    /// Remove a node and its whole subtree
    Remove {
        /// Node id
        id: u32,
    },

    /// Re-parent a node under another node
    Move {
        /// Node to move
        from: u32,
        /// New parent
        to: u32,
    },

    /// Print the visible tree
    Show {
        /// Fold these nodes before printing
        #[arg(long, num_args = 1..)]
        fold: Vec<u32>,

        /// Include layout coordinates
        #[arg(long)]
        positions: bool,

        /// Shift the whole tree by DX DY before printing (implies --positions)
        #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_negative_numbers = true)]
        offset: Option<Vec<f64>>,
    },

    /// Show node count, depth and leaves
    Info,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Print a commented config template
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_negative_offset_when_parsing_show_then_accepted() {
        let cli = Cli::try_parse_from(["btedit", "show", "--offset", "-10", "-2.5"]).unwrap();
        match cli.command {
            Some(Commands::Show { offset, .. }) => {
                assert_eq!(offset, Some(vec![-10.0, -2.5]));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_format_flag_then_parsed() {
        let cli = Cli::try_parse_from(["btedit", "--format", "toml", "info"]).unwrap();
        assert_eq!(cli.format, Some(Format::Toml));
        assert!(Cli::try_parse_from(["btedit", "--format", "yaml", "info"]).is_err());
    }
}
