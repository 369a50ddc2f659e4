use thiserror::Error;

use wraith_serde::SerdeErr;

/// Errors raised by the replication layer on either end of a connection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicationError {
    /// The reader lost sync with the writer. The stream cannot be recovered
    /// and the connection must be reset.
    #[error("Codec mismatch while reading {context}: {source}")]
    CodecMismatch {
        context: &'static str,
        #[source]
        source: SerdeErr,
    },

    /// A delta update referenced a ghost index the receiver does not know.
    /// Only that record is dropped.
    #[error("Update for unknown ghost index {ghost} ({kind}) dropped")]
    UnknownGhostIndex { ghost: u16, kind: &'static str },

    /// Every ghost index for a viewer is bound or awaiting tombstone acknowledgement
    #[error("Ghost table full: all {max_ghosts} ghost indices are in use")]
    GhostTableFull { max_ghosts: u16 },

    /// The entity was never spawned or has already been despawned
    #[error("Entity {net_id} does not exist")]
    UnknownEntity { net_id: u32 },

    /// The viewer is not (or no longer) connected
    #[error("Viewer {viewer} is not connected")]
    UnknownViewer { viewer: u64 },

    /// A dirty group was raised against an entity of a different kind
    #[error("Group {group} belongs to {group_kind}, but entity {net_id} is a {entity_kind}")]
    GroupKindMismatch {
        net_id: u32,
        group: &'static str,
        group_kind: &'static str,
        entity_kind: &'static str,
    },

    /// Only ships accept moves and teleports
    #[error("Entity {net_id} is a {kind} and cannot be controlled")]
    NotControllable { net_id: u32, kind: &'static str },

    /// The client refuses packets after a codec mismatch until it is reset
    #[error("Connection must be reset after a codec mismatch")]
    ConnectionPoisoned,
}

impl ReplicationError {
    /// Whether the connection has to be torn down after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReplicationError::CodecMismatch { .. } | ReplicationError::ConnectionPoisoned
        )
    }
}
