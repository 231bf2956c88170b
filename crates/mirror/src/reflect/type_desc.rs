// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the shared, immutable shape of a stored value.

use super::class::Class;
use super::dynamic_array::DynamicArrayDesc;
use crate::config::ARRAY_LEN_SIZE;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Reference to a process-lifetime descriptor.
///
/// Each concrete type has exactly one descriptor, so [`std::ptr::eq`] on two
/// `TypeRef`s is an identity comparison (see [`same_type`]).
pub type TypeRef = &'static TypeDesc;

/// Scalar kinds with no substructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl SimpleKind {
    /// Encoded size in bytes (None for strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::Char | Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::String => None,
        }
    }

    /// Human-readable kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::String => "string",
        }
    }
}

/// Discriminant of a [`TypeDesc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    None,
    Void,
    Simple(SimpleKind),
    Class,
    Pointer,
    DynamicArray,
}

/// Description of what a stored value looks like.
pub enum TypeDesc {
    /// Absent type.
    None,
    /// `()`.
    Void,
    /// Terminal scalar or string.
    Simple(SimpleKind),
    /// User aggregate.
    Class(Arc<Class>),
    /// Pointer to another described type (the pointee instance is not owned).
    Pointer(PointerDesc),
    /// Resizable homogeneous sequence.
    DynamicArray(DynamicArrayDesc),
}

impl TypeDesc {
    /// Discriminant tag.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::None => TypeTag::None,
            Self::Void => TypeTag::Void,
            Self::Simple(kind) => TypeTag::Simple(*kind),
            Self::Class(_) => TypeTag::Class,
            Self::Pointer(_) => TypeTag::Pointer,
            Self::DynamicArray(_) => TypeTag::DynamicArray,
        }
    }

    /// Get the class if this describes one.
    pub fn as_class(&self) -> Option<&Arc<Class>> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Get the pointer descriptor if this describes one.
    pub fn as_pointer(&self) -> Option<&PointerDesc> {
        match self {
            Self::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }

    /// Get the dynamic array descriptor if this describes one.
    pub fn as_dynamic_array(&self) -> Option<&DynamicArrayDesc> {
        match self {
            Self::DynamicArray(array) => Some(array),
            _ => None,
        }
    }

    /// Minimum number of bytes one value of this type occupies when encoded.
    ///
    /// Strings count their terminator, dynamic arrays their element count.
    /// Kinds the binary format cannot encode count as zero.
    pub fn min_encoded_size(&self) -> usize {
        match self {
            Self::Simple(kind) => kind.size().unwrap_or(1),
            Self::Class(class) => class
                .members()
                .iter()
                .map(|m| m.type_desc().min_encoded_size())
                .sum(),
            Self::DynamicArray(_) => ARRAY_LEN_SIZE,
            Self::Pointer(_) | Self::Void | Self::None => 0,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Void => f.write_str("void"),
            Self::Simple(kind) => f.write_str(kind.name()),
            Self::Class(class) => f.write_str(class.name()),
            Self::Pointer(pointer) => write!(f, "*{}", pointer.sub_type()),
            Self::DynamicArray(array) => write!(f, "[{}]", array.element_type()),
        }
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDesc({})", self)
    }
}

/// Identity comparison of two descriptors.
pub fn same_type(a: &TypeDesc, b: &TypeDesc) -> bool {
    std::ptr::eq(a, b)
}

/// Sub-type resolved on first use.
///
/// Deferring resolution lets a type refer to itself through a pointer or a
/// dynamic array without recursing while its class is still being built.
pub(crate) struct LazyTypeRef {
    resolve: fn() -> TypeRef,
    resolved: OnceLock<TypeRef>,
}

impl LazyTypeRef {
    pub(crate) const fn new(resolve: fn() -> TypeRef) -> Self {
        Self {
            resolve,
            resolved: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> TypeRef {
        *self.resolved.get_or_init(self.resolve)
    }
}

/// Pointer type descriptor.
pub struct PointerDesc {
    pointee: LazyTypeRef,
}

impl PointerDesc {
    /// Create a pointer descriptor from the pointee's resolver.
    pub fn new(pointee: fn() -> TypeRef) -> Self {
        Self {
            pointee: LazyTypeRef::new(pointee),
        }
    }

    /// Descriptor of the pointed-to type.
    pub fn sub_type(&self) -> TypeRef {
        self.pointee.get()
    }
}
