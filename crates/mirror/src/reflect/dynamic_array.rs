// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic array descriptors.
//!
//! A [`DynamicArrayDesc`] is generated once per element type and carries a
//! [`DynamicArrayOps`] object that manipulates instances through raw pointers,
//! so callers can resize and index any array without naming its element type.

use super::type_desc::{LazyTypeRef, TypeRef};
use super::Reflect;
use std::marker::PhantomData;

/// Element-type-erased access to a dynamic array instance.
///
/// Every method takes a pointer to the array value itself (e.g. a `Vec<T>`),
/// not to its elements.
pub trait DynamicArrayOps: Send + Sync {
    /// Resize to `len` elements, default-constructing new ones.
    ///
    /// # Safety
    /// `instance` must point to a live, exclusively borrowed array of the
    /// described type.
    unsafe fn resize(&self, instance: *mut u8, len: usize);

    /// Number of elements.
    ///
    /// # Safety
    /// `instance` must point to a live array of the described type.
    unsafe fn len(&self, instance: *const u8) -> usize;

    /// Address of element `index` for reading.
    ///
    /// # Safety
    /// `instance` must point to a live array of the described type and
    /// `index` must be in bounds.
    unsafe fn element_ptr(&self, instance: *const u8, index: usize) -> *const u8;

    /// Address of element `index` for writing.
    ///
    /// # Safety
    /// `instance` must point to a live, exclusively borrowed array of the
    /// described type and `index` must be in bounds.
    unsafe fn element_ptr_mut(&self, instance: *mut u8, index: usize) -> *mut u8;
}

/// [`DynamicArrayOps`] for `Vec<T>`.
struct VecOps<T>(PhantomData<fn() -> T>);

impl<T: Default + 'static> DynamicArrayOps for VecOps<T> {
    unsafe fn resize(&self, instance: *mut u8, len: usize) {
        let vec = &mut *instance.cast::<Vec<T>>();
        vec.resize_with(len, T::default);
    }

    unsafe fn len(&self, instance: *const u8) -> usize {
        (*instance.cast::<Vec<T>>()).len()
    }

    unsafe fn element_ptr(&self, instance: *const u8, index: usize) -> *const u8 {
        let vec = &*instance.cast::<Vec<T>>();
        vec.as_ptr().add(index).cast()
    }

    unsafe fn element_ptr_mut(&self, instance: *mut u8, index: usize) -> *mut u8 {
        let vec = &mut *instance.cast::<Vec<T>>();
        vec.as_mut_ptr().add(index).cast()
    }
}

/// Dynamic array type descriptor.
pub struct DynamicArrayDesc {
    element: LazyTypeRef,
    ops: Box<dyn DynamicArrayOps>,
}

impl DynamicArrayDesc {
    /// Descriptor for `Vec<T>`.
    pub fn of_vec<T: Reflect + Default>() -> Self {
        Self::with_ops(T::type_desc, Box::new(VecOps::<T>(PhantomData)))
    }

    /// Descriptor for a custom container.
    ///
    /// `ops` must match the container layout and `element` its element type.
    pub fn with_ops(element: fn() -> TypeRef, ops: Box<dyn DynamicArrayOps>) -> Self {
        Self {
            element: LazyTypeRef::new(element),
            ops,
        }
    }

    /// Descriptor of the element type.
    pub fn element_type(&self) -> TypeRef {
        self.element.get()
    }

    /// Instance access.
    pub fn ops(&self) -> &dyn DynamicArrayOps {
        self.ops.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::same_type;

    fn vec_desc<T: Reflect + Default>() -> &'static DynamicArrayDesc {
        <Vec<T>>::type_desc()
            .as_dynamic_array()
            .expect("dynamic array descriptor")
    }

    #[test]
    fn test_element_type() {
        let desc = vec_desc::<i16>();
        assert!(same_type(desc.element_type(), i16::type_desc()));
    }

    #[test]
    fn test_instance_access() {
        let desc = vec_desc::<u32>();
        let mut values = vec![1u32, 2, 3];
        let instance: *mut u8 = (&mut values as *mut Vec<u32>).cast();

        unsafe {
            assert_eq!(desc.ops().len(instance), 3);
            let second = desc.ops().element_ptr(instance, 1).cast::<u32>();
            assert_eq!(second.read(), 2);

            desc.ops().resize(instance, 5);
            assert_eq!(desc.ops().len(instance), 5);
            desc.ops()
                .element_ptr_mut(instance, 4)
                .cast::<u32>()
                .write(9);
        }
        assert_eq!(values, vec![1, 2, 3, 0, 9]);
    }

    #[test]
    fn test_resize_shrinks() {
        let desc = vec_desc::<String>();
        let mut values = vec!["a".to_string(), "b".to_string()];
        unsafe { desc.ops().resize((&mut values as *mut Vec<String>).cast(), 1) };
        assert_eq!(values, vec!["a".to_string()]);
    }
}
