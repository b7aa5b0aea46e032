use std::time::Duration;

use serde::{Deserialize, Serialize};
use strata_core::{ConfigError, ContentAddress, ContentAddressError, JobIdError, UnknownJobStatus};

/// Rejections reported by the service itself.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceError {
    /// A non-default config exists for `cid` and the push did not set the
    /// override flag.
    #[error("{cid} already has a custom config; push with override to replace it")]
    PolicyConflict { cid: String },
    /// Hot or cold storage is still enabled for `cid`.
    #[error("{cid} is still active in hot or cold storage")]
    ActiveInStorage { cid: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// A field of a service message that could not be decoded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("content address: {0}")]
    ContentAddress(#[from] ContentAddressError),
    #[error("identifier: {0}")]
    Identifier(#[from] JobIdError),
    #[error("job status: {0}")]
    JobStatus(#[from] UnknownJobStatus),
    #[error("timestamp {0} is out of range")]
    Timestamp(i64),
    #[error("service returned an empty job id")]
    EmptyJobId,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Rpc(#[from] irpc::Error),
    /// A channel of an open stream failed.
    #[error("stream failed: {0}")]
    Stream(String),
    #[error("failed to decode service message: {0}")]
    Decode(#[from] DecodeError),
    #[error("{0} already has a custom config; push with override to replace it")]
    PolicyConflict(ContentAddress),
    #[error("{0} is still active in hot or cold storage")]
    ActiveInStorage(ContentAddress),
    #[error(transparent)]
    Service(ServiceError),
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An upload frame was rejected and the service never explained why.
    #[error("upload aborted ({cause}); no response from service after {after:?}")]
    UploadResponseTimeout { after: Duration, cause: String },
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::PolicyConflict { cid } => match ContentAddress::parse(&cid) {
                Ok(cid) => Error::PolicyConflict(cid),
                Err(err) => Error::Decode(err.into()),
            },
            ServiceError::ActiveInStorage { cid } => match ContentAddress::parse(&cid) {
                Ok(cid) => Error::ActiveInStorage(cid),
                Err(err) => Error::Decode(err.into()),
            },
            other => Error::Service(other),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_keep_their_address() {
        let cid = ContentAddress::for_bytes(b"conflict");
        let err = Error::from(ServiceError::PolicyConflict {
            cid: cid.to_string(),
        });
        assert!(matches!(err, Error::PolicyConflict(c) if c == cid));

        let err = Error::from(ServiceError::ActiveInStorage {
            cid: cid.to_string(),
        });
        assert!(matches!(err, Error::ActiveInStorage(c) if c == cid));
    }

    #[test]
    fn conflict_with_garbled_address_is_a_decode_error() {
        let err = Error::from(ServiceError::PolicyConflict {
            cid: "zzz".to_string(),
        });
        assert!(matches!(err, Error::Decode(DecodeError::ContentAddress(_))));
    }

    #[test]
    fn other_rejections_pass_through() {
        let err = Error::from(ServiceError::NotFound("x".to_string()));
        assert!(matches!(err, Error::Service(ServiceError::NotFound(_))));
    }
}
