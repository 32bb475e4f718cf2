//! Error types.

use diesel::result::DatabaseErrorKind;

#[doc(no_inline)]
pub use diesel::result::{ConnectionError, Error as DieselError};

/// Cache database related errors.
#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("connection failed")]
    ConnectionError(#[from] ConnectionError),

    #[error("migration failed: {0}")]
    MigrationError(String),

    #[error(transparent)]
    DieselError(#[from] DieselError),
}

impl DatabaseError {
    /// Whether the error is unique key violation.
    ///
    /// The `images` table carries a UNIQUE constraint on the fingerprint
    /// column, so a racing insert of already-recorded content surfaces as
    /// this instead of a silent duplicate.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            *self,
            DatabaseError::DieselError(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _
            ))
        )
    }
}

/// APOD desktop error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("database error")]
    DatabaseError(#[from] DatabaseError),

    #[error("I/O error")]
    IoError(#[from] std::io::Error),

    #[error("download error")]
    DownloadError(#[from] reqwest::Error),

    #[error("malformed APOD response")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("APOD for {date} is of media type '{media_type}', not an image")]
    NotAnImage { date: String, media_type: String },

    #[error(transparent)]
    NonUtf8PathError(#[from] NonUtf8PathError),
}

/// Non UTF-8 symbol in path.
#[derive(thiserror::Error, Debug)]
#[error("non-UTF-8 symbol in path")]
pub struct NonUtf8PathError;

/// Value is not a 64-character hexadecimal SHA-256 digest.
#[derive(thiserror::Error, Debug)]
#[error("invalid fingerprint")]
pub struct InvalidFingerprintError;

/// Desktop background setter error.
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("'{command}' exited with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("no desktop background facility known for this platform")]
    Unsupported,
}
