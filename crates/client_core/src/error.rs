use thiserror::Error;

pub const INVALID_CREDENTIALS: &str = "Invalid username/password";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Bad credentials, or a missing/rejected bearer token.
    #[error("{0}")]
    Auth(String),
    /// Registration input rejected by the backend, with its message.
    #[error("{0}")]
    Validation(String),
    #[error("Registration failed")]
    Registration,
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    Submit(String),
    #[error("No cart found")]
    NoCart,
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Validation,
    Registration,
    Fetch,
    Submit,
    NoCart,
    MissingField,
}

impl ClientError {
    pub fn invalid_credentials() -> Self {
        Self::Auth(INVALID_CREDENTIALS.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Auth,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Registration => ErrorKind::Registration,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Submit(_) => ErrorKind::Submit,
            Self::NoCart => ErrorKind::NoCart,
            Self::MissingField { .. } => ErrorKind::MissingField,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

/// Required-field presence is the only input check made before a request.
pub fn require(value: &str, field: &'static str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::MissingField { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(
            require("  ", "username"),
            Err(ClientError::MissingField { field: "username" })
        );
        assert!(require("alice", "username").is_ok());
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(ClientError::NoCart.to_string(), "No cart found");
        assert_eq!(
            ClientError::invalid_credentials().to_string(),
            "Invalid username/password"
        );
        assert_eq!(
            ClientError::MissingField { field: "password" }.to_string(),
            "password is required"
        );
    }
}
