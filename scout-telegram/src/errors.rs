//! Error types for scout-telegram.
//!
//! Network failures keep the client's [`InvocationError`] intact so callers
//! can still ask `err.is("CHANNEL_PRIVATE")` and friends.

use std::{fmt, io};

use layer_client::{InvocationError, SignInError};

// ─── Error ────────────────────────────────────────────────────────────────────

/// The error type returned by every folder, dialog and search operation.
#[derive(Debug)]
pub enum Error {
    /// No regular or shared folder carries this ID.
    FolderNotFound(i32),
    /// The folder exists but has no explicitly included chats.
    FolderEmpty(i32),
    /// The phone number has no Telegram account yet.
    SignUpRequired,
    /// Login failed (wrong code, wrong password, …).
    SignIn(SignInError),
    /// Telegram rejected the request or the connection failed.
    Invocation(InvocationError),
    /// Local I/O (session directory, stdin prompt).
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FolderNotFound(id) => write!(f, "folder with ID {id} not found"),
            Self::FolderEmpty(id)    => write!(f, "folder {id} has no included chats"),
            Self::SignUpRequired     => write!(f, "this number is not registered; sign up via the official Telegram app first"),
            Self::SignIn(e)          => write!(f, "sign in failed: {e}"),
            Self::Invocation(e)      => write!(f, "{e}"),
            Self::Io(e)              => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SignIn(e)     => Some(e),
            Self::Invocation(e) => Some(e),
            Self::Io(e)         => Some(e),
            _                   => None,
        }
    }
}

impl From<InvocationError> for Error {
    fn from(e: InvocationError) -> Self { Self::Invocation(e) }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl From<SignInError> for Error {
    fn from(e: SignInError) -> Self {
        match e {
            SignInError::SignUpRequired => Self::SignUpRequired,
            SignInError::Other(inner)   => Self::Invocation(inner),
            other                       => Self::SignIn(other),
        }
    }
}

impl Error {
    /// Returns `true` for the "logical not found" family (missing or empty folder).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FolderNotFound(_) | Self::FolderEmpty(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
