// certexport — Library root
//
// Re-exports the CLI and keychain modules.

pub mod cli;
pub mod error;
pub mod keychain;

pub use error::{CertexportError, Result};
