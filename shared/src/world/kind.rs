use wraith_serde::{BitReader, BitWrite, SerdeErr, WireEnum};

/// Closed set of replicated object kinds. The wire tag is the variant index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Ship,
    Pickup,
    Wall,
    ZoneMarker,
    Projectile,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Ship,
        ObjectKind::Pickup,
        ObjectKind::Wall,
        ObjectKind::ZoneMarker,
        ObjectKind::Projectile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Ship => "Ship",
            ObjectKind::Pickup => "Pickup",
            ObjectKind::Wall => "Wall",
            ObjectKind::ZoneMarker => "ZoneMarker",
            ObjectKind::Projectile => "Projectile",
        }
    }
}

impl WireEnum for ObjectKind {
    const TYPE_NAME: &'static str = "ObjectKind";
    const VARIANT_COUNT: u32 = 5;

    fn to_index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Serialization of one field group of an object kind's state.
pub struct GroupCodec<S> {
    pub name: &'static str,
    pub write: fn(&S, &mut dyn BitWrite),
    pub read: fn(&mut S, &mut BitReader) -> Result<(), SerdeErr>,
}

/// The state of one object kind, with its field groups in wire order.
pub trait Schema: Sized + 'static {
    const KIND: ObjectKind;
    const GROUPS: &'static [GroupCodec<Self>];
}

/// A field group name, used to raise dirty bits in a typed way.
pub trait GroupName: Copy {
    const KIND: ObjectKind;

    fn index(self) -> u8;
    fn name(self) -> &'static str;
}
