//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("flowmgr - workflow automation manager");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  flowmgr-client  Typed API client, templates, backup");
    println!("  flowmgr-cli     Command-line interface");

    Ok(())
}
