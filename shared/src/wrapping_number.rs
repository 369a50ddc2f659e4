/// Returns whether wrapping sequence number `s1` comes after `s2`,
/// treating any forward distance below half the number space as "after".
///
/// ```
/// # use wraith_shared::sequence_greater_than;
/// assert!(sequence_greater_than(2, 1));
/// assert!(sequence_greater_than(0, u16::MAX));
/// assert!(!sequence_greater_than(7, 7));
/// ```
pub fn sequence_greater_than(s1: u16, s2: u16) -> bool {
    let distance = s1.wrapping_sub(s2);
    distance != 0 && distance < 0x8000
}

pub fn sequence_less_than(s1: u16, s2: u16) -> bool {
    sequence_greater_than(s2, s1)
}

/// Signed distance travelled from `a` to `b` on the wrapping number line.
///
/// ```
/// # use wraith_shared::wrapping_diff;
/// assert_eq!(wrapping_diff(10, 12), 2);
/// assert_eq!(wrapping_diff(u16::MAX, 1), 2);
/// assert_eq!(wrapping_diff(1, u16::MAX), -2);
/// ```
pub fn wrapping_diff(a: u16, b: u16) -> i16 {
    b.wrapping_sub(a) as i16
}
