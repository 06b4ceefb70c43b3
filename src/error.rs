use thiserror::Error;

/// Errors raised while reading a CIDR string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("Invalid CIDR format: {0}")]
    InvalidCidrFormat(String),

    #[error("Invalid prefix length: {0}")]
    InvalidPrefixLength(String),
}
