//! Token command implementation.

use anyhow::{Context, Result};
use tickhist_lib::prelude::*;

use crate::Connection;

/// Exchange the credentials for a token and report the outcome.
pub(crate) async fn token(connection: &Connection) -> Result<()> {
    let credential = super::credential(connection)?;
    let client = ExtractionClient::new(connection.config()).context("Failed to create client")?;

    let token = client
        .request_token(&credential)
        .await
        .context("Token request failed")?;

    println!("Authenticated as {}", credential.username);
    if let Some(context) = &token.context {
        println!("Context: {context}");
    }
    Ok(())
}
