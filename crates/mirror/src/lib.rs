// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Mirror - runtime reflection and binary serialization
//!
//! Describes Rust aggregates at runtime (members, offsets, types, metadata,
//! class relations) and uses those descriptions to serialize any registered
//! type without per-type serialization code.
//!
//! ## Quick Start
//!
//! ```rust
//! use mirror::{from_bytes, reflect_class, to_bytes, ClassRegistry, Result};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//! reflect_class!(Point { x, y });
//!
//! fn main() -> Result<()> {
//!     let bytes = to_bytes(&Point { x: 3, y: -7 })?;
//!     assert_eq!(bytes.len(), 8);
//!     assert_eq!(from_bytes::<Point>(&bytes)?, Point { x: 3, y: -7 });
//!
//!     let class = ClassRegistry::global()
//!         .find_class_by_name("Point")
//!         .expect("registered on first use");
//!     assert_eq!(class.members().len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  reflect_class! / describe_class   (lazy, once per type)      |
//! +---------------------------------------------------------------+
//! |  ClassRegistry   by name hash | by type-identity hash         |
//! +---------------------------------------------------------------+
//! |  TypeDesc   Simple | Class | Pointer | DynamicArray | Void    |
//! +---------------------------------------------------------------+
//! |  BinarySerializer   member walk over a Class                  |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`reflect`] - Type descriptors, classes, members and the registry
//! - [`serializer`] - Binary serializer sessions
//! - [`config`] - Constants and serializer limits
//! - [`hash`] - FNV-1a name hashing
//! - [`error`] - Error types

/// Configuration constants and serializer limits.
pub mod config;
/// Error types.
pub mod error;
/// FNV-1a hashing of names.
pub mod hash;
/// Runtime type reflection (descriptors, classes, registry).
pub mod reflect;
/// Descriptor-driven binary serializer.
pub mod serializer;

mod macros;

pub use config::SerializerConfig;
pub use error::{Error, ReflectError, Result, SerializeError};
pub use hash::{hash32, hash_str};
pub use reflect::{
    describe_class, try_describe_class, Class, ClassMember, ClassRegistry, MetaData, Reflect,
    TypeDesc, TypeRef, TypeTag,
};
pub use serializer::{from_bytes, to_bytes, BinarySerializer, Mode};
