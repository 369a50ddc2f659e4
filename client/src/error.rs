use thiserror::Error;

use wraith_shared::ReplicationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Replication(#[from] ReplicationError),
    #[error("No entity is under local control")]
    NoControlledEntity,
}

impl ClientError {
    /// True when the connection can't continue without a reset
    pub fn is_fatal(&self) -> bool {
        match self {
            ClientError::Replication(error) => error.is_fatal(),
            ClientError::NoControlledEntity => false,
        }
    }
}
