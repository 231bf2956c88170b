// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 32-bit FNV-1a content hash.
//!
//! Classes and members are keyed by the hash of their name so lookups never
//! need to retain or compare the original string.

use crate::config::{FNV_OFFSET_BASIS, FNV_PRIME};

/// Hash raw bytes with FNV-1a.
///
/// Empty input hashes to `0` rather than to the offset basis. Registry keys
/// depend on this, so it must not be "fixed".
#[must_use]
pub fn hash32(data: &[u8]) -> u32 {
    if data.is_empty() {
        return 0;
    }

    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash a string's bytes (no terminator).
#[must_use]
pub fn hash_str(s: &str) -> u32 {
    hash32(s.as_bytes())
}
