// certexport — CLI Command Handlers
//
// Each function handles one CLI subcommand, driving the keychain engine
// against the Security framework backend. The keychain is a macOS facility;
// on other platforms the commands report that instead of pretending.

use std::path::PathBuf;

use crate::error::CertexportError;

use super::Commands;

/// Execute the parsed CLI command.
pub fn execute(command: Commands) -> Result<(), CertexportError> {
    match command {
        Commands::Export { labels, output_dir } => cmd_export(labels, output_dir),
        Commands::List => cmd_list(),
    }
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
fn cmd_export(labels: Vec<String>, output_dir: PathBuf) -> Result<(), CertexportError> {
    use crate::keychain::{export_batch, SecurityFrameworkKeychain};

    println!("Exporting {} identit{} with an empty passphrase.", labels.len(),
        if labels.len() == 1 { "y" } else { "ies" });
    println!("You will most likely see keychain prompts, one per identity —");
    println!("you have to Allow those for the export to proceed.");
    println!();

    let keychain = SecurityFrameworkKeychain::new();
    let out_path = export_batch(&keychain, &labels, &output_dir)?;

    println!("✓ Export finished");
    println!("  Bundle: {}", out_path.display());

    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn cmd_export(_labels: Vec<String>, _output_dir: PathBuf) -> Result<(), CertexportError> {
    Err(unsupported_platform())
}

// ─── List ────────────────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
fn cmd_list() -> Result<(), CertexportError> {
    use crate::keychain::{list_identity_labels, SecurityFrameworkKeychain};

    let keychain = SecurityFrameworkKeychain::new();
    let labels = list_identity_labels(&keychain)?;

    if labels.is_empty() {
        println!("No identities found in the keychain.");
        return Ok(());
    }

    println!("Identities in the keychain ({}):\n", labels.len());
    for label in labels {
        println!("  {}", label);
    }

    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn cmd_list() -> Result<(), CertexportError> {
    Err(unsupported_platform())
}

#[cfg(not(target_os = "macos"))]
fn unsupported_platform() -> CertexportError {
    CertexportError::Other(
        "identity export requires the macOS Security framework — run this tool on the Mac that holds the certificates".to_string(),
    )
}
