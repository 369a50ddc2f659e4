pub mod control_state;
pub mod host;
pub mod kind;
pub mod objects;
pub mod record;
pub mod registry;
pub mod replica;
