// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over caller-owned bytes.

use crate::config::STRING_TERMINATOR;
use crate::error::SerializeError;

/// Generate native-endian read methods for primitive types.
///
/// Each generated method checks bounds (`TruncatedInput` on overflow), copies
/// N bytes, converts them with `from_ne_bytes()` and advances the offset.
macro_rules! impl_read_ne {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self) -> Result<$type, SerializeError> {
            Ok(<$type>::from_ne_bytes(self.read_array()?))
        }
    };
}

/// Immutable cursor for reading (bounds-checked, zero-copy).
#[derive(Debug)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Fail with `TruncatedInput` unless `len` more bytes are available.
    pub fn require(&self, len: usize) -> Result<(), SerializeError> {
        if len > self.remaining() {
            return Err(SerializeError::TruncatedInput {
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SerializeError> {
        self.require(len)?;
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerializeError> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.read_bytes(N)?);
        Ok(bytes)
    }

    impl_read_ne!(read_u8, u8);
    impl_read_ne!(read_u16, u16);
    impl_read_ne!(read_u32, u32);
    impl_read_ne!(read_u64, u64);
    impl_read_ne!(read_i8, i8);
    impl_read_ne!(read_i16, i16);
    impl_read_ne!(read_i32, i32);
    impl_read_ne!(read_i64, i64);
    impl_read_ne!(read_f32, f32);
    impl_read_ne!(read_f64, f64);

    /// Read a terminator-delimited run and skip past the terminator.
    ///
    /// The returned slice excludes the terminator.
    pub fn read_terminated(&mut self) -> Result<&'a [u8], SerializeError> {
        let rest = &self.buffer[self.offset.min(self.buffer.len())..];
        let Some(len) = rest.iter().position(|&b| b == STRING_TERMINATOR) else {
            return Err(SerializeError::TruncatedInput {
                offset: self.offset,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let run = &rest[..len];
        self.offset += len + 1;
        Ok(run)
    }
}
