/// Error returned by the store adapter boundary.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("write conflict: a precondition version no longer holds")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Error surface of the ledger operations.
#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transaction conflict after {attempts} attempts; safe to retry")]
    Conflict { attempts: u32 },
    #[error("debt {0} is already paid")]
    AlreadyPaid(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            // A conflict reaching this conversion was not absorbed by a
            // retry loop; report a single failed attempt.
            StoreError::Conflict => LedgerError::Conflict { attempts: 1 },
            StoreError::Unavailable(msg) => LedgerError::StoreUnavailable(msg),
        }
    }
}

impl LedgerError {
    /// Whether the caller may safely re-issue the same operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict { .. })
    }
}
