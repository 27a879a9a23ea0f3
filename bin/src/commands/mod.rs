//! CLI command implementations.

use anyhow::{Context, Result};
use inquire::Password;
use tickhist_lib::prelude::*;

use crate::Connection;

pub(crate) mod extract;
pub(crate) mod token;

/// Resolves the login from options, prompting for a missing password.
pub(crate) fn credential(connection: &Connection) -> Result<Credential> {
    let username = connection
        .username
        .clone()
        .context("No username given (use --username or TICKHIST_USERNAME)")?;
    let password = match &connection.password {
        Some(password) => password.clone(),
        None => Password::new(&format!("Password for {username}:"))
            .without_confirmation()
            .prompt()
            .context("Password prompt cancelled")?,
    };
    Ok(Credential::new(username, password))
}
