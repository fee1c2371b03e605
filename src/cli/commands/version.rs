//! Version information display
//!
//! Prints the package name, version and trial defaults in human or JSON
//! format.

use serde_json::json;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::config::TrialConfig;

/// Print version information.
pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version}");
        }
        OutputFormat::Json => {
            let info = json!({
                "name": name,
                "version": version,
                "defaults": TrialConfig::default(),
            });
            println!("{info}");
        }
    }
}
