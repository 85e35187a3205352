//! Health command - check the API connection.

use super::ConnectionArgs;
use anyhow::Result;

/// Run the health command.
pub async fn run(conn: &ConnectionArgs) -> Result<()> {
    let client = conn.connect()?;
    client.health_check().await?;

    println!("✓ Connection healthy");
    println!("  API URL: {}", client.base_url());

    client.close();
    Ok(())
}
