pub mod local_link;
pub mod test_world;

pub use helpers::*;
pub use local_link::{Datagram, Delivery, LossyLink};
pub use test_world::{Arena, TestWorld};
