//! # Wraith Server
//! The authoritative side of the replication core: owns the world, decides
//! what every viewer should see, and packs the most important changes into
//! each viewer's per-tick bit budget.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use wraith_shared::{
        BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, MTU_SIZE_BITS,
    };
}

mod connection;
mod interest;
mod scheduler;
mod server;
mod server_config;
mod user;
mod world;

pub use connection::{
    connection::Connection,
    ghost_table::{GhostSlot, GhostStatus, GhostTable},
};
pub use interest::{InterestQuery, RadiusInterest, ScopeAll};
pub use scheduler::{Candidate, PriorityScheduler, RecordTarget, Tier};
pub use server::ReplicationServer;
pub use server_config::{SchedulerConfig, ServerConfig};
pub use user::ViewerKey;
pub use world::{EntityStore, ServerEntity};
