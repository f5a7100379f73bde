//! Variable-length quantity encoding.
//!
//! Values are split into 7-bit groups written most significant first. Every
//! byte except the last has its top bit set. Signed values fold the sign into
//! the lowest bit: `n >= 0` encodes as `n << 1`, `n < 0` as `((-n - 1) << 1) | 1`.
//!
//! The reading side lives on [`StreamReader`](crate::StreamReader); these
//! writers exist to build archive images.

/// Upper bound on the bytes a single VLQ may occupy.
pub const MAX_VLQ_BYTES: usize = 10;

/// Append the unsigned VLQ encoding of `value` to `out`.
pub fn write_unsigned(mut value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_VLQ_BYTES];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }

    for i in (0..count).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

/// Append the signed VLQ encoding of `value` to `out`.
pub fn write_signed(value: i64, out: &mut Vec<u8>) {
    let folded = if value < 0 {
        (((-(value + 1)) as u64) << 1) | 1
    } else {
        (value as u64) << 1
    };
    write_unsigned(folded, out);
}

/// Append a VLQ length prefix followed by the UTF-8 bytes of `value`.
pub fn write_string(value: &str, out: &mut Vec<u8>) {
    write_unsigned(value.len() as u64, out);
    out.extend_from_slice(value.as_bytes());
}

/// Number of bytes the unsigned encoding of `value` occupies.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}
