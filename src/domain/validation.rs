use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingCustomerIdentity,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCustomerIdentity => write!(
                f,
                "either externalCustomerId or onchainAddress must be provided"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
