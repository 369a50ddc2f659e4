use crate::{read_ranged_int, write_ranged_int, BitReader, BitWrite, SerdeErr};

/// A closed set of variants that serializes as a ranged index.
pub trait WireEnum: Sized + Copy {
    const TYPE_NAME: &'static str;
    const VARIANT_COUNT: u32;

    fn to_index(self) -> u32;
    fn from_index(index: u32) -> Option<Self>;
}

pub fn write_enum<T: WireEnum>(writer: &mut dyn BitWrite, value: T) {
    write_ranged_int(
        writer,
        i64::from(value.to_index()),
        0,
        i64::from(T::VARIANT_COUNT) - 1,
    );
}

pub fn read_enum<T: WireEnum>(reader: &mut BitReader) -> Result<T, SerdeErr> {
    let index = read_ranged_int(reader, 0, i64::from(T::VARIANT_COUNT) - 1)? as u32;
    T::from_index(index).ok_or(SerdeErr::InvalidEnumIndex {
        type_name: T::TYPE_NAME,
        index,
    })
}
