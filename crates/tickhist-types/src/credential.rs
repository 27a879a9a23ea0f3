//! Login credential for the token exchange.

use secrecy::{ExposeSecret, SecretString};

use crate::{Result, wire};

/// Username and password exchanged once for a bearer token.
///
/// The password is only exposed while the request body is encoded.
#[derive(Debug)]
pub struct Credential {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: SecretString,
}

impl Credential {
    /// Creates a credential.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Encodes the `Authentication/RequestToken` body,
    /// `{"Credentials": {"Username": .., "Password": ..}}`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_request_body(&self) -> Result<Vec<u8>> {
        let body = wire::TokenRequest {
            credentials: wire::Credentials {
                username: &self.username,
                password: self.password.expose_secret(),
            },
        };
        Ok(serde_json::to_vec(&body)?)
    }
}
