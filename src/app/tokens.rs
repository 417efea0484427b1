//! Random secrets: session ids, invite tokens, join codes.

use rand_core::{OsRng, RngCore};

/// 32 random bytes as 64 lowercase hex chars.
pub fn secret_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Short code residents type to ask to join a condominium (8 uppercase hex chars).
pub fn join_code() -> String {
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}
