use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub login: String,
    pub senha: String,
}

impl Credentials {
    pub fn new(
        login: &str,
        senha: &str,
    ) -> Self {
        Self {
            login: login.trim().to_string(),
            senha: senha.trim().to_string(),
        }
    }

    /// Both user and password are required before a login is attempted.
    pub fn is_complete(&self) -> bool {
        !self.login.is_empty() && !self.senha.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("senha", &"***")
            .finish()
    }
}

/// Opaque session token issued by `/login` and sent as `X-Auth-Token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
