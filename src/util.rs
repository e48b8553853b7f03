/// A simplified and const generic version of arrayref
#[inline]
fn take<const N: usize>(data: &[u8]) -> [u8; N] {
    debug_assert!(data.len() >= N);
    unsafe { *(data.as_ptr() as *const [u8; N]) }
}

#[inline]
pub(crate) fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    data.get(N..).map(|d| (take::<N>(data), d))
}

/// Little endian unsigned integer of up to 8 bytes
#[inline]
pub(crate) fn le_uint(data: &[u8]) -> u64 {
    debug_assert!(data.len() <= 8);
    let mut buf = [0u8; 8];
    buf[..data.len()].copy_from_slice(data);
    u64::from_le_bytes(buf)
}

/// Little endian two's complement integer of 1 to 8 bytes
#[inline]
pub(crate) fn le_int(data: &[u8]) -> i64 {
    debug_assert!((1..=8).contains(&data.len()));
    let shift = 64 - 8 * data.len() as u32;
    ((le_uint(data) << shift) as i64) >> shift
}
