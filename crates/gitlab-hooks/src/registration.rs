//! Registration mode policy: whether hooks are managed, and with which credential.

use std::fmt;
use std::str::FromStr;

use crate::config::ServerConfig;
use crate::error::ScmError;
use crate::models::Token;

/// Who is allowed to manage hooks for a navigator or source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Never touch hooks. Also the mode used when none is specified.
    #[default]
    Disabled,
    /// Use the server's own credential, if the server allows hook management.
    SystemManaged,
    /// Use the credential configured on the item itself.
    ItemManaged,
}

impl RegistrationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disable",
            Self::SystemManaged => "system",
            Self::ItemManaged => "item",
        }
    }
}

impl fmt::Display for RegistrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationMode {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" | "disabled" => Ok(Self::Disabled),
            "system" => Ok(Self::SystemManaged),
            "item" => Ok(Self::ItemManaged),
            other => Err(ScmError::Config(format!(
                "unknown registration mode '{other}' (expected disable, system or item)"
            ))),
        }
    }
}

/// Pick the credential reconciliation runs with, or `None` to not run at all.
///
/// `item_credentials` is only consulted in [`RegistrationMode::ItemManaged`].
pub fn select_credential<F>(
    mode: RegistrationMode,
    server: &ServerConfig,
    item_credentials: F,
) -> Option<Token>
where
    F: FnOnce() -> Option<Token>,
{
    match mode {
        RegistrationMode::Disabled => None,
        RegistrationMode::SystemManaged if server.manage_hooks => server.credentials.clone(),
        RegistrationMode::SystemManaged => None,
        RegistrationMode::ItemManaged => item_credentials(),
    }
}
