// certexport — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: export, list.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// certexport — export code signing identities from the macOS keychain.
#[derive(Parser, Debug)]
#[command(name = "certexport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one or more identities into a PKCS#12 bundle.
    Export {
        /// Identity label to export, exactly as shown in Keychain Access.
        /// Repeat the flag to export several identities into one bundle.
        #[arg(long = "label", required = true)]
        labels: Vec<String>,

        /// Directory the bundle is written into (created if missing).
        #[arg(long, default_value = "./certexport_exports")]
        output_dir: PathBuf,
    },

    /// List the identity labels currently in the keychain.
    List,
}
