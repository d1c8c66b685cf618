use std::error;
use std::fmt;
use std::io;

use backtrace::Backtrace;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub enum ErrorKind {
    // Credential errors reported by the auth provider.
    InvalidCredential,
    UserNotFound,
    EmailAlreadyInUse,
    WeakPassword { min_length: usize },
    // Local form validation, checked before calling the provider.
    Validation { field: &'static str, reason: String },
    // Operation requires an admitted admin session.
    Unauthorized(String),
    NotFound { collection: String, id: String },
    Provider(String),
    Store(String),
    Io(io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    Internal(String),
}

/// Broad grouping of failures, used by callers to decide how to present them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Credential,
    Validation,
    Access,
    Transport,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::InvalidCredential => {
                write!(f, "The password is invalid or the user does not have a password.")
            }
            ErrorKind::UserNotFound => write!(
                f,
                "There is no user record corresponding to this identifier. The user may have been deleted."
            ),
            ErrorKind::EmailAlreadyInUse => {
                write!(f, "The email address is already in use by another account.")
            }
            ErrorKind::WeakPassword { min_length } => {
                write!(f, "Password should be at least {} characters.", min_length)
            }
            ErrorKind::Validation { reason, .. } => write!(f, "{}", reason),
            ErrorKind::Unauthorized(description) => write!(f, "unauthorized. {}", description),
            ErrorKind::NotFound { collection, id } => {
                write!(f, "document {}/{} not found", collection, id)
            }
            ErrorKind::Provider(description) => write!(f, "{}", description),
            ErrorKind::Store(description) => write!(f, "store error. {}", description),
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::Yaml(err) => err.fmt(f),
            ErrorKind::Json(err) => err.fmt(f),
            ErrorKind::Internal(description) => write!(f, "internal error. {}", description),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from(ErrorKind::Io(err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::from(ErrorKind::Yaml(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(ErrorKind::Json(err))
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Error::from(ErrorKind::Internal(format!("password hash: {}", err)))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn category(&self) -> Category {
        match self.kind() {
            ErrorKind::InvalidCredential
            | ErrorKind::UserNotFound
            | ErrorKind::EmailAlreadyInUse
            | ErrorKind::WeakPassword { .. } => Category::Credential,
            ErrorKind::Validation { .. } => Category::Validation,
            ErrorKind::Unauthorized(_) | ErrorKind::NotFound { .. } => Category::Access,
            ErrorKind::Provider(_)
            | ErrorKind::Store(_)
            | ErrorKind::Io(_)
            | ErrorKind::Yaml(_)
            | ErrorKind::Json(_)
            | ErrorKind::Internal(_) => Category::Transport,
        }
    }

    /// Human readable text meant to be shown to the user as is.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound { .. })
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::from(ErrorKind::Validation {
            field,
            reason: reason.into(),
        })
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Yaml(err) => Some(err),
            ErrorKind::Json(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_messages_are_user_facing() {
        let err = Error::from(ErrorKind::InvalidCredential);
        assert_eq!(err.category(), Category::Credential);
        assert!(!err.message().is_empty());

        let err = Error::from(ErrorKind::WeakPassword { min_length: 6 });
        assert_eq!(err.message(), "Password should be at least 6 characters.");
    }

    #[test]
    fn categories() {
        assert_eq!(
            Error::validation("email", "Email is required").category(),
            Category::Validation
        );
        assert_eq!(
            Error::from(ErrorKind::Unauthorized("admin required".into())).category(),
            Category::Access
        );
        assert_eq!(
            Error::from(io::Error::new(io::ErrorKind::Other, "boom")).category(),
            Category::Transport
        );
    }
}
