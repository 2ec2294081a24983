use std::fmt;
use std::time::Duration;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Dispatch-level errors (resolved into per-destination outcomes)
    Dispatch(DispatchError),
    /// Browser session lifecycle errors
    Session(SessionError),
    /// Interaction step errors (timeouts)
    Step(StepError),
    /// Input validation errors
    Validation(ValidationError),
    /// Raw CDP command failures
    Browser(BrowserError),
    /// File operation errors
    File(FileError),
    /// Configuration errors
    Config(ConfigError),
    /// Anything else (wraps third-party errors)
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Dispatch(e) => write!(f, "dispatch error: {}", e),
            AppError::Session(e) => write!(f, "session error: {}", e),
            AppError::Step(e) => write!(f, "step error: {}", e),
            AppError::Validation(e) => write!(f, "validation error: {}", e),
            AppError::Browser(e) => write!(f, "browser error: {}", e),
            AppError::File(e) => write!(f, "file error: {}", e),
            AppError::Config(e) => write!(f, "config error: {}", e),
            AppError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Dispatch(e) => Some(e),
            AppError::Session(e) => Some(e),
            AppError::Step(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Browser(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// Errors the dispatcher converts into per-destination outcomes.
///
/// The display strings double as the outcome error text, so they stay short.
#[derive(Debug)]
pub enum DispatchError {
    /// Destination key not present in the registry
    ConfigNotFound { key: String },
    /// No handler registered for the destination key
    ModuleMissing { key: String },
    /// Handler registered but could not be constructed
    NoEntrypoint { key: String, reason: String },
    /// Handler ran but failed
    Handler { key: String, message: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::ConfigNotFound { key } => write!(f, "{}: config not found", key),
            DispatchError::ModuleMissing { key } => write!(f, "{}: module missing", key),
            DispatchError::NoEntrypoint { key, reason } => {
                write!(f, "{}: no entrypoint ({})", key, reason)
            }
            DispatchError::Handler { key, message } => write!(f, "{}: {}", key, message),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Browser session lifecycle errors
#[derive(Debug)]
pub enum SessionError {
    /// The browser process could not be launched at all
    LaunchFailed {
        profile: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Launch options were rejected by the builder
    ConfigurationFailed { profile: String, reason: String },
    /// The initial page could not be created
    PageCreationFailed {
        profile: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::LaunchFailed { profile, source } => {
                write!(
                    f,
                    "failed to launch browser for profile '{}': {}",
                    profile, source
                )
            }
            SessionError::ConfigurationFailed { profile, reason } => {
                write!(f, "bad browser config for profile '{}': {}", profile, reason)
            }
            SessionError::PageCreationFailed { profile, source } => {
                write!(f, "failed to open page for profile '{}': {}", profile, source)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::LaunchFailed { source, .. }
            | SessionError::PageCreationFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            SessionError::ConfigurationFailed { .. } => None,
        }
    }
}

/// Interaction step errors
#[derive(Debug)]
pub enum StepError {
    /// A required condition-wait exceeded its budget
    Timeout { step: String, waited: Duration },
    /// The login flow did not complete in time
    AuthTimeout { step: String, waited: Duration },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Timeout { step, waited } => {
                write!(
                    f,
                    "step '{}' timed out after {:.1}s",
                    step,
                    waited.as_secs_f64()
                )
            }
            StepError::AuthTimeout { step, waited } => {
                write!(
                    f,
                    "login not completed in '{}' after {:.1}s",
                    step,
                    waited.as_secs_f64()
                )
            }
        }
    }
}

impl std::error::Error for StepError {}

/// Input validation errors
#[derive(Debug)]
pub enum ValidationError {
    /// No media file was given
    MissingFilePath,
    /// The media file does not exist on disk
    FileNotFound { path: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFilePath => write!(f, "media file not specified"),
            ValidationError::FileNotFound { path } => write!(f, "media file not found: {}", path),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Raw CDP command failures
#[derive(Debug)]
pub struct BrowserError {
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CDP command failed: {}", self.source)
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// File operation errors
#[derive(Debug)]
pub enum FileError {
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// A destination parameter required by its handler is missing
    MissingParameter { key: String, parameter: String },
    /// A required environment variable is missing
    EnvVarNotFound { var_name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingParameter { key, parameter } => {
                write!(f, "destination '{}' is missing parameter '{}'", key, parameter)
            }
            ConfigError::EnvVarNotFound { var_name } => {
                write!(f, "environment variable {} is not set", var_name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== Conversions from common error types ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== Convenience constructors ==========

impl AppError {
    pub fn config_not_found(key: impl Into<String>) -> Self {
        AppError::Dispatch(DispatchError::ConfigNotFound { key: key.into() })
    }

    pub fn module_missing(key: impl Into<String>) -> Self {
        AppError::Dispatch(DispatchError::ModuleMissing { key: key.into() })
    }

    pub fn no_entrypoint(key: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Dispatch(DispatchError::NoEntrypoint {
            key: key.into(),
            reason: reason.into(),
        })
    }

    pub fn handler(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Dispatch(DispatchError::Handler {
            key: key.into(),
            message: message.into(),
        })
    }

    pub fn launch_failed(
        profile: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Session(SessionError::LaunchFailed {
            profile: profile.into(),
            source: Box::new(source),
        })
    }

    pub fn step_timeout(step: impl Into<String>, waited: Duration) -> Self {
        AppError::Step(StepError::Timeout {
            step: step.into(),
            waited,
        })
    }

    pub fn auth_timeout(step: impl Into<String>, waited: Duration) -> Self {
        AppError::Step(StepError::AuthTimeout {
            step: step.into(),
            waited,
        })
    }

    pub fn missing_parameter(key: impl Into<String>, parameter: impl Into<String>) -> Self {
        AppError::Config(ConfigError::MissingParameter {
            key: key.into(),
            parameter: parameter.into(),
        })
    }

    /// True when the error is a step or auth timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Step(_))
    }
}

// ========== Result type alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
