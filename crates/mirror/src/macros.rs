// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declarative class registration.

/// Implement [`Reflect`](crate::Reflect) for a struct by listing its
/// reflected fields in declaration order.
///
/// Offsets come from `core::mem::offset_of!` and member types are inferred
/// from the fields, so the generated description always matches the struct.
/// Parents are listed after a colon; each must itself be a reflected class.
/// A field may carry a metadata string after `=`.
///
/// The class is registered in the global registry the first time its
/// descriptor is requested, under the struct's name.
///
/// # Example
///
/// ```
/// use mirror::{reflect_class, to_bytes, from_bytes};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Entity {
///     id: u32,
/// }
/// reflect_class!(Entity { id });
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Player {
///     name: String,
///     health: i16,
/// }
/// reflect_class!(Player: Entity {
///     name = "display, max_len = 32",
///     health = "min = 0",
/// });
///
/// let player = Player { name: "ada".into(), health: 90 };
/// let bytes = to_bytes(&player)?;
/// assert_eq!(from_bytes::<Player>(&bytes)?, player);
///
/// let class = mirror::reflect::class_of::<Player>().expect("class");
/// let health = class.member("health").expect("member");
/// assert_eq!(health.metadata("min").and_then(|m| m.as_int()), Some(0));
/// assert!(class.is_child_of(mirror::reflect::class_of::<Entity>().expect("class")));
/// # Ok::<(), mirror::Error>(())
/// ```
#[macro_export]
macro_rules! reflect_class {
    ($ty:ident $(: $($parent:ty),+)? { $($field:ident $(= $meta:literal)?),* $(,)? }) => {
        unsafe impl $crate::Reflect for $ty {
            #[allow(unused_variables)]
            fn type_desc() -> $crate::TypeRef {
                $crate::describe_class::<$ty>(::core::stringify!($ty), |class| {
                    $($(class.add_parent_of::<$parent>()?;)+)?
                    $(
                        class.add_member($crate::ClassMember::new(
                            ::core::stringify!($field),
                            ::core::mem::offset_of!($ty, $field),
                            $crate::reflect::field_type_desc(|instance: &$ty| &instance.$field),
                            ::core::concat!("" $(, $meta)?),
                        ))?;
                    )*
                    ::core::result::Result::Ok(())
                })
            }
        }
    };
}
