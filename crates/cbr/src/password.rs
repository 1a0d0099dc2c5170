//! Temporary passwords for restored users.
//!
//! A [`PasswordResolver`] either hands out one fixed password or asks a
//! [`PasswordStrategy`] per user, falling back to the fixed password when
//! the strategy fails for that user. With no fixed password the service
//! generates one. Strategies are validated when they are built, so a broken
//! configuration fails before any user is created.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use cbr_core::Username;

use crate::error::PipelineError;

/// Error returned by a strategy for a single user.
pub type StrategyError = Box<dyn std::error::Error + Send + Sync>;

/// Produces the temporary password of one user.
#[async_trait]
pub trait PasswordStrategy: Send + Sync {
    /// Returns the password for `username`.
    async fn password_for(&self, username: &Username) -> Result<String, StrategyError>;
}

/// Chooses the temporary password of each restored user.
///
/// `None` means the service generates the password.
pub enum PasswordResolver {
    /// The same password for every user.
    Fixed(Option<String>),
    /// Per-user passwords from a strategy, with a fixed fallback.
    Pluggable {
        strategy: Box<dyn PasswordStrategy>,
        fallback: Option<String>,
    },
}

impl PasswordResolver {
    /// Resolver that always returns `password`.
    pub fn fixed(password: impl Into<String>) -> Self {
        Self::Fixed(Some(password.into()))
    }

    /// Resolver that leaves every password to the service.
    pub fn generated() -> Self {
        Self::Fixed(None)
    }

    /// Resolver that asks `strategy` first and uses `fallback` when it fails.
    pub fn pluggable(strategy: impl PasswordStrategy + 'static, fallback: impl Into<String>) -> Self {
        Self::Pluggable {
            strategy: Box::new(strategy),
            fallback: Some(fallback.into()),
        }
    }

    /// Resolver that asks `strategy` first and lets the service generate
    /// the password when it fails.
    pub fn pluggable_or_generated(strategy: impl PasswordStrategy + 'static) -> Self {
        Self::Pluggable {
            strategy: Box::new(strategy),
            fallback: None,
        }
    }

    /// The password for `username`. Never fails.
    pub async fn resolve(&self, username: &Username) -> Option<String> {
        match self {
            Self::Fixed(password) => password.clone(),
            Self::Pluggable { strategy, fallback } => {
                match strategy.password_for(username).await {
                    Ok(password) => Some(password),
                    Err(error) => {
                        warn!(
                            %username,
                            %error,
                            generated = fallback.is_none(),
                            "Password module failed, using fallback password"
                        );
                        fallback.clone()
                    }
                }
            }
        }
    }
}

impl fmt::Debug for PasswordResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(_) => f.debug_tuple("Fixed").field(&"[REDACTED]").finish(),
            Self::Pluggable { .. } => f
                .debug_struct("Pluggable")
                .field("fallback", &"[REDACTED]")
                .finish_non_exhaustive(),
        }
    }
}

/// Runs an external program as `<program> <username>` for each user.
///
/// The first line of its standard output is the password. A non-zero exit
/// status, an empty first line, or a run longer than the timeout is a
/// failure for that user.
#[derive(Debug, Clone)]
pub struct CommandStrategy {
    program: PathBuf,
    timeout: Duration,
}

/// How long one password module run may take.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

impl CommandStrategy {
    /// Validate `path` and build a strategy around it.
    ///
    /// The program must be an existing regular file and, on Unix, carry an
    /// execute permission bit.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let config_err = |reason: String| PipelineError::PasswordModuleConfig {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = std::fs::metadata(path).map_err(|e| config_err(e.to_string()))?;
        if !metadata.is_file() {
            return Err(config_err("not a regular file".to_string()));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(config_err("not executable".to_string()));
            }
        }

        debug!(program = %path.display(), "Loaded password module");
        Ok(Self {
            program: path.to_path_buf(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    /// Set the per-user time limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PasswordStrategy for CommandStrategy {
    async fn password_for(&self, username: &Username) -> Result<String, StrategyError> {
        let run = Command::new(&self.program)
            .arg(username.as_str())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| format!("password module timed out after {:?}", self.timeout))??;

        if !output.status.success() {
            return Err(format!("password module exited with {}", output.status).into());
        }

        let stdout = String::from_utf8(output.stdout)?;
        match stdout.lines().next().map(str::trim_end) {
            Some(line) if !line.is_empty() => Ok(line.to_string()),
            _ => Err("password module printed no password".into()),
        }
    }
}
