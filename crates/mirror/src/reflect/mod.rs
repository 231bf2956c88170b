// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type reflection.
//!
//! # Features
//!
//! - **TypeDesc**: shared description of a value's shape (scalar, class, pointer, dynamic array)
//! - **Class / ClassMember**: offset-located fields of a user aggregate, with metadata
//! - **ClassRegistry**: catalog of classes indexed by name and type identity
//! - **Reflect**: static resolution of a Rust type to its one shared descriptor
//!
//! Descriptors live for the whole process, so a [`TypeRef`] is a plain
//! `&'static` reference and descriptor identity is pointer identity.

mod class;
mod dynamic_array;
mod member;
mod registry;
mod type_desc;

pub use class::Class;
pub use dynamic_array::{DynamicArrayDesc, DynamicArrayOps};
pub use member::{ClassMember, MetaData};
pub use registry::{describe_class, try_describe_class, type_identity_hash, ClassRegistry};
pub use type_desc::{same_type, PointerDesc, SimpleKind, TypeDesc, TypeRef, TypeTag};

use registry::shared_descriptor;
use std::sync::Arc;

/// Static resolution of a Rust type to its shared [`TypeDesc`].
///
/// Types without an implementation cannot be described, so an unsupported
/// member type is rejected at compile time.
///
/// # Safety
///
/// The serializer reads and writes values through the returned descriptor.
/// For a class, every member offset must be the real offset of a field of
/// `Self` whose type is exactly described by the member's descriptor
/// (`core::mem::offset_of!` and [`field_type_desc`] guarantee both).
pub unsafe trait Reflect: 'static {
    /// The one descriptor for `Self`.
    fn type_desc() -> TypeRef;
}

macro_rules! impl_reflect_simple {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            unsafe impl Reflect for $ty {
                fn type_desc() -> TypeRef {
                    static DESC: TypeDesc = TypeDesc::Simple(SimpleKind::$kind);
                    &DESC
                }
            }
        )*
    };
}

impl_reflect_simple! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

unsafe impl Reflect for () {
    fn type_desc() -> TypeRef {
        static DESC: TypeDesc = TypeDesc::Void;
        &DESC
    }
}

unsafe impl<T: Reflect + Default> Reflect for Vec<T> {
    fn type_desc() -> TypeRef {
        shared_descriptor::<Self>(|| TypeDesc::DynamicArray(DynamicArrayDesc::of_vec::<T>()))
    }
}

unsafe impl<T: Reflect> Reflect for Box<T> {
    fn type_desc() -> TypeRef {
        shared_descriptor::<Self>(|| TypeDesc::Pointer(PointerDesc::new(T::type_desc)))
    }
}

unsafe impl<T: Reflect> Reflect for *const T {
    fn type_desc() -> TypeRef {
        shared_descriptor::<Self>(|| TypeDesc::Pointer(PointerDesc::new(T::type_desc)))
    }
}

unsafe impl<T: Reflect> Reflect for *mut T {
    fn type_desc() -> TypeRef {
        shared_descriptor::<Self>(|| TypeDesc::Pointer(PointerDesc::new(T::type_desc)))
    }
}

/// Class describing `T`, if `T` is a class type.
pub fn class_of<T: Reflect>() -> Option<&'static Arc<Class>> {
    T::type_desc().as_class()
}

/// Descriptor of the field selected by `accessor`.
///
/// Lets registration code name a field once and have its type inferred:
/// `field_type_desc(|p: &Point| &p.x)`.
pub fn field_type_desc<S, F: Reflect>(_accessor: impl Fn(&S) -> &F) -> TypeRef {
    F::type_desc()
}

/// Signed integer descriptor matching the width of the enumeration `E`.
///
/// # Safety
///
/// Reading a value into a field described this way stores raw integer bits
/// into the enum. Every bit pattern of that width must be a valid `E`, or
/// the input must only ever come from a matching write pass.
///
/// # Panics
///
/// If `E` is not 1, 2, 4 or 8 bytes wide.
pub unsafe fn enum_type_desc<E: Copy + 'static>() -> TypeRef {
    match std::mem::size_of::<E>() {
        1 => i8::type_desc(),
        2 => i16::type_desc(),
        4 => i32::type_desc(),
        8 => i64::type_desc(),
        width => panic!(
            "unsupported enum width {} for `{}`",
            width,
            std::any::type_name::<E>()
        ),
    }
}
