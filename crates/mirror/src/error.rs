// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for registration and serialization.

use crate::reflect::TypeTag;
use crate::serializer::Mode;
use thiserror::Error;

/// Registration-time contract violations.
///
/// These indicate a static description bug (two members with the same name,
/// two classes for the same type) rather than a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// A member with this name already exists in the class.
    #[error("class `{class}` already has a member named `{member}`")]
    DuplicateMember { class: String, member: String },
    /// A class with the same name hash is already registered.
    #[error("a class named `{name}` is already registered")]
    DuplicateClassName { name: String },
    /// A different class name already occupies the same name hash.
    #[error("class name `{name}` collides with registered class `{existing}` (name hash {name_hash:#010x})")]
    ClassNameHashCollision {
        name: String,
        existing: String,
        name_hash: u32,
    },
    /// A class with the same type-identity hash is already registered.
    #[error("class `{name}`: type hash {type_hash:#018x} is already registered")]
    DuplicateTypeHash { name: String, type_hash: u64 },
    /// A declared parent type is not described by a class.
    #[error("class `{class}`: parent type `{parent}` is not a class")]
    ParentNotAClass { class: String, parent: String },
    /// The class is not present in the registry.
    #[error("class `{name}` is not registered")]
    ClassNotRegistered { name: String },
    /// Describing the class required its own descriptor before it existed.
    #[error("class `{name}` depends on itself while being described")]
    CyclicDescription { name: String },
}

/// Failures of a serializer session or traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// Session method called from the wrong mode.
    #[error("invalid serializer state: expected {expected:?}, found {actual:?}")]
    InvalidState { expected: Mode, actual: Mode },
    /// Value-level call made with neither a read nor a write session open.
    #[error("no serializer session is active")]
    NoSession,
    /// Input ended before the description was fully read.
    #[error("truncated input at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Member kind the binary format has no encoding for.
    #[error("member `{member}` has unsupported type {tag:?}")]
    UnsupportedType { member: String, tag: TypeTag },
    /// Root value handed to the serializer is not described by a class.
    #[error("expected a class descriptor, found {tag:?}")]
    NotAClass { tag: TypeTag },
    /// String contains the terminator byte and cannot be encoded.
    #[error("string contains a NUL byte at position {offset}")]
    InteriorNul { offset: usize },
    /// Encoded string is not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    /// Encoded bool is neither 0 nor 1.
    #[error("invalid bool byte {value:#04x} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },
    /// Encoded char is not a Unicode scalar value.
    #[error("invalid char {value:#x} at offset {offset}")]
    InvalidChar { offset: usize, value: u32 },
    /// Dynamic array length exceeds the configured maximum.
    #[error("dynamic array length {len} exceeds maximum {max}")]
    ArrayTooLong { len: u64, max: usize },
    /// Nesting deeper than the configured maximum.
    #[error("nesting depth exceeds maximum {max}")]
    DepthExceeded { max: usize },
    /// Bytes left over after a complete read.
    #[error("{remaining} trailing bytes after value")]
    TrailingBytes { remaining: usize },
}

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Reflect(#[from] ReflectError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Result alias defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
