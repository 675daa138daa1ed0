//! Content checksums carried in every descriptor.

use md5::{Digest, Md5};

/// Upper bound (exclusive) of the verify code.
const VERIFY_CODE_MODULUS: i128 = 100_000_000;

/// Weight applied to the complemented byte sum.
const VERIFY_CODE_FACTOR: i128 = 17;

/// Lowercase hex MD5 of exactly `data`.
pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Lightweight integrity code checked by the device bootloader.
///
/// `abs(!sum(data) * 17) % 100_000_000`, where `!` is the two's-complement
/// NOT of the byte sum (`-sum - 1`). Deployed devices recompute this exact
/// value, so the complement must stay even though it only shifts the sum by
/// one. An `i128` accumulator cannot overflow for any file that fits on disk.
pub fn verify_code(data: &[u8]) -> u32 {
    let total: i128 = data.iter().map(|&b| i128::from(b)).sum();
    let inverted = !total;
    let code = (inverted * VERIFY_CODE_FACTOR).abs() % VERIFY_CODE_MODULUS;
    u32::try_from(code).unwrap_or(u32::MAX)
}
