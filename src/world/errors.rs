use thiserror::Error;

/// Errors that can arise while interacting with the world storage layer.
///
/// The credential variants render without prose on purpose: command
/// handlers embed them in player-facing strings such as
/// `"Error creating user: usernameAlreadyTaken"`.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// A user with the requested username already exists.
    #[error("usernameAlreadyTaken")]
    UsernameAlreadyTaken,

    /// Supplied credentials do not match the stored hash, or the user
    /// does not exist (deliberately indistinguishable).
    #[error("passwordMismatch")]
    PasswordMismatch,

    /// Password hashing / verification machinery failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),
}

impl From<password_hash::Error> for WorldError {
    fn from(err: password_hash::Error) -> Self {
        match err {
            password_hash::Error::Password => WorldError::PasswordMismatch,
            other => WorldError::PasswordHash(other.to_string()),
        }
    }
}
