//! # Wraith Shared
//! Common functionality shared between wraith-server & wraith-client crates:
//! the object-kind registry, dirty-bit tracking, record codecs and the
//! deterministic ship simulation both ends run.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use wraith_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, MTU_SIZE_BITS,
    MTU_SIZE_BYTES,
};

mod error;
mod moves;
mod protocol;
mod simulation;
mod types;
mod world;
mod wrapping_number;

pub use error::ReplicationError;
pub use moves::{Move, MovePacket, TriggerFlags, MAX_MOVES_IN_PACKET, MAX_MOVE_DURATION_MS};
pub use protocol::Protocol;
pub use simulation::{coast, simulate_move, ShipDynamics};
pub use types::{GhostIndex, MoveSequence, NetId, PacketIndex, Tick};
pub use world::{
    control_state::{
        facing_to_step, snap_facing, snap_to_grid, snap_toward_zero, snap_vec, step_to_facing,
        ControlState, MotionState, FACING_STEPS, POSITION_GRID, VELOCITY_GRID,
    },
    host::{
        change_mask::ChangeMask,
        diff_mask::DiffMask,
        dirty_channel::{DirtyChannel, DirtyReceiver},
        global_diff_handler::GlobalDiffHandler,
    },
    kind::{GroupCodec, GroupName, ObjectKind, Schema},
    objects::{
        PickupGroup, PickupState, PickupType, ProjectileGroup, ProjectileState, ShipGroup,
        ShipState, Team, WallGroup, WallState, Weapon, ZoneMarkerGroup, ZoneMarkerState,
        MAX_WALL_THICKNESS, MAX_ZONE_RADIUS, PROJECTILE_VELOCITY, TELEPORT_EPOCH_BITS,
    },
    record::{
        read_groups, read_record_header, write_tombstone, write_update, PacketHeader,
        RecordHeader,
    },
    registry::{create_proxy, kind_entry, KindEntry, KIND_REGISTRY},
    replica::Replica,
};
pub use wrapping_number::{sequence_greater_than, sequence_less_than, wrapping_diff};
