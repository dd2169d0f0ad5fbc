//! Authentication session snapshot supplied by the identity provider.
//!
//! The identity provider owns sign-in and token refresh. shareview only reads
//! these snapshots: `is_authenticated` gates loading and the access token is
//! handed to the data provider unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token for the file-sharing API.
///
/// The value is redacted from `Debug` output so sessions can be logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Signed-in account details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_account_id: Option<String>,
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn authenticated(account: AccountInfo, token: AccessToken) -> Self {
        Self {
            is_authenticated: true,
            account: Some(account),
            access_token: Some(token),
            error: None,
        }
    }

    /// Sign-in attempt that failed; not authenticated.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Token to use for data requests, only while authenticated.
    pub fn usable_token(&self) -> Option<&AccessToken> {
        if self.is_authenticated {
            self.access_token.as_ref()
        } else {
            None
        }
    }
}
