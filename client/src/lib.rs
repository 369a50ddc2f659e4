//! # Wraith Client
//! The receiving side of the replication core. Reads ghost records into local
//! proxies, predicts the locally controlled ship with zero added input
//! latency, and smooths every other moving object toward its authoritative
//! state.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use wraith_shared::{
        BitReader, BitWriter, ConstBitLength, Serde, SerdeErr, MTU_SIZE_BITS,
    };
}

mod client;
mod client_config;
mod error;
mod ghost_events;
mod interpolation;
mod prediction;
mod world;

pub use client::{MoveInput, ReplicationClient};
pub use client_config::{ClientConfig, InterpolationConfig, PredictionConfig};
pub use error::ClientError;
pub use ghost_events::{
    CorrectedEvent, CreatedEvent, DestroyedEvent, GhostEvent, GhostEventKind, GhostEvents,
};
pub use interpolation::Interpolator;
pub use prediction::{Correction, PredictionEngine, PredictionPhase};
pub use world::ghost_reader::{GhostReader, GhostUpdate, ReceivedPacket};
