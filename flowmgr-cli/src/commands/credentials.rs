//! Credentials command - list stored credentials.

use super::ConnectionArgs;
use anyhow::Result;

/// Run the list-credentials command.
pub async fn list(conn: &ConnectionArgs, credential_type: Option<&str>) -> Result<()> {
    let client = conn.connect()?;
    let credentials = client.credentials().list(credential_type).await?;

    if credentials.is_empty() {
        println!("No credentials found.");
        return Ok(());
    }

    println!("{:<12}  {:<30}  TYPE", "ID", "NAME");
    println!("{:<12}  {:<30}  ----", "--", "----");
    for credential in &credentials {
        println!(
            "{:<12}  {:<30}  {}",
            credential.id.as_deref().unwrap_or("N/A"),
            credential.name,
            credential.credential_type
        );
    }

    Ok(())
}
