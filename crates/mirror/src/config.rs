// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mirror configuration - constants and serializer limits.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (hash parameters, format bytes, defaults)
//! - **Level 2 (Dynamic)**: [`SerializerConfig`] for per-serializer limits
//!
//! # Example
//!
//! ```
//! use mirror::config::SerializerConfig;
//! use mirror::BinarySerializer;
//!
//! let config = SerializerConfig::default()
//!     .initial_capacity(4096)
//!     .max_depth(16);
//! let serializer = BinarySerializer::with_config(config);
//! assert_eq!(serializer.config().max_depth, 16);
//! ```

// =======================================================================
// Hashing (FNV-1a, 32-bit)
// http://isthe.com/chongo/tech/comp/fnv/
// =======================================================================

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

// =======================================================================
// Binary format
// =======================================================================

/// Byte appended after every encoded string.
///
/// Strings are delimited only by this byte, so it may not appear as data.
pub const STRING_TERMINATOR: u8 = 0;

/// Encoded size of a dynamic array element count (native-endian `u64`).
pub const ARRAY_LEN_SIZE: usize = 8;

// =======================================================================
// Serializer defaults
// =======================================================================

/// Bytes reserved by the first write session (0 = grow on demand).
pub const DEFAULT_WRITE_CAPACITY: usize = 256;

/// Maximum nesting of classes and dynamic arrays in one traversal.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum element count accepted when reading a dynamic array.
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 24;

/// Runtime limits for a [`BinarySerializer`](crate::BinarySerializer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Bytes reserved up front when the write buffer is first used.
    pub initial_capacity: usize,
    /// Maximum class/array nesting before `DepthExceeded`.
    pub max_depth: usize,
    /// Maximum element count for a dynamic array read from input.
    pub max_array_len: usize,
}

impl SerializerConfig {
    /// Set the initial write capacity.
    #[must_use]
    pub fn initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum accepted dynamic array length.
    #[must_use]
    pub fn max_array_len(mut self, len: usize) -> Self {
        self.max_array_len = len;
        self
    }
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_WRITE_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}
