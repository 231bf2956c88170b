// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class registry.
//!
//! Owning catalog of committed classes, indexed by name hash and by
//! type-identity hash.
//!
//! # Thread Safety
//!
//! - Lookups take a read lock and may run concurrently.
//! - `add_class` / `remove_class` take the write lock and update both
//!   indices atomically.
//!
//! # Example
//!
//! ```
//! use mirror::ClassRegistry;
//!
//! let registry = ClassRegistry::new();
//! let class = registry
//!     .register_class("Point", 0x1234, |class| {
//!         class.member_of::<i32>("x", 0, "")?.member_of::<i32>("y", 4, "")?;
//!         Ok(())
//!     })
//!     .expect("register Point");
//!
//! let found = registry.find_class_by_name("Point").expect("Point");
//! assert!(std::sync::Arc::ptr_eq(&class, &found));
//! assert!(registry.find_class_by_name("Missing").is_none());
//! ```

use super::class::Class;
use super::type_desc::{TypeDesc, TypeRef};
use crate::error::ReflectError;
use crate::hash::hash_str;
use parking_lot::RwLock;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

#[derive(Default)]
struct ClassIndex {
    by_name_hash: HashMap<u32, Arc<Class>>,
    by_type_hash: HashMap<u64, Arc<Class>>,
}

/// Catalog of registered classes.
///
/// Dropping the registry releases its reference to every class it holds.
#[derive(Default)]
pub struct ClassRegistry {
    index: RwLock<ClassIndex>,
}

impl ClassRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`describe_class`].
    pub fn global() -> &'static ClassRegistry {
        GLOBAL_REGISTRY.get_or_init(ClassRegistry::new)
    }

    /// Build a class with `build` and commit it.
    pub fn register_class(
        &self,
        name: &str,
        type_hash: u64,
        build: impl FnOnce(&mut Class) -> Result<(), ReflectError>,
    ) -> Result<Arc<Class>, ReflectError> {
        let mut class = Class::new(name, type_hash);
        build(&mut class)?;
        self.add_class(class)
    }

    /// Commit a class.
    ///
    /// # Errors
    /// `DuplicateClassName` / `DuplicateTypeHash` if either key is taken, or
    /// `ClassNameHashCollision` if a different name owns the name hash.
    pub fn add_class(&self, class: Class) -> Result<Arc<Class>, ReflectError> {
        let mut index = self.index.write();
        if let Some(existing) = index.by_name_hash.get(&class.name_hash()) {
            if existing.name() != class.name() {
                return Err(ReflectError::ClassNameHashCollision {
                    name: class.name().to_owned(),
                    existing: existing.name().to_owned(),
                    name_hash: class.name_hash(),
                });
            }
            return Err(ReflectError::DuplicateClassName {
                name: class.name().to_owned(),
            });
        }
        if index.by_type_hash.contains_key(&class.type_hash()) {
            return Err(ReflectError::DuplicateTypeHash {
                name: class.name().to_owned(),
                type_hash: class.type_hash(),
            });
        }

        let class = Arc::new(class);
        class.link_to_parents();
        index
            .by_name_hash
            .insert(class.name_hash(), Arc::clone(&class));
        index
            .by_type_hash
            .insert(class.type_hash(), Arc::clone(&class));
        log::debug!(
            "[mirror] registered class `{}` ({} members, type hash {:#018x})",
            class.name(),
            class.members().len(),
            class.type_hash()
        );
        Ok(class)
    }

    /// Remove a class from both indices.
    ///
    /// Descriptors that already reference the class stay valid.
    ///
    /// # Errors
    /// `ClassNotRegistered` if this exact class is not in the registry.
    pub fn remove_class(&self, class: &Class) -> Result<Arc<Class>, ReflectError> {
        let mut index = self.index.write();
        let registered = index
            .by_name_hash
            .get(&class.name_hash())
            .is_some_and(|c| std::ptr::eq(c.as_ref(), class));
        if !registered {
            return Err(ReflectError::ClassNotRegistered {
                name: class.name().to_owned(),
            });
        }

        index.by_type_hash.remove(&class.type_hash());
        let removed = index.by_name_hash.remove(&class.name_hash());
        log::debug!("[mirror] removed class `{}`", class.name());
        removed.ok_or_else(|| ReflectError::ClassNotRegistered {
            name: class.name().to_owned(),
        })
    }

    /// Find a class by name.
    pub fn find_class_by_name(&self, name: &str) -> Option<Arc<Class>> {
        self.index
            .read()
            .by_name_hash
            .get(&hash_str(name))
            .filter(|c| c.name() == name)
            .cloned()
    }

    /// Find a class by type-identity hash.
    pub fn find_class_by_type_hash(&self, type_hash: u64) -> Option<Arc<Class>> {
        self.index.read().by_type_hash.get(&type_hash).cloned()
    }

    /// Snapshot of all classes, sorted by name.
    pub fn classes(&self) -> Vec<Arc<Class>> {
        let mut classes: Vec<_> = self.index.read().by_name_hash.values().cloned().collect();
        classes.sort_by(|a, b| a.name().cmp(b.name()));
        classes
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.index.read().by_name_hash.len()
    }

    /// Returns `true` if no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.index.read().by_name_hash.is_empty()
    }
}

/// Stable identity hash of a Rust type for the lifetime of the process.
pub fn type_identity_hash<T: ?Sized + 'static>() -> u64 {
    let mut hasher = DefaultHasher::new();
    TypeId::of::<T>().hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Descriptor cache: one leaked descriptor per concrete Rust type
// ---------------------------------------------------------------------------

static DESCRIPTORS: OnceLock<RwLock<HashMap<TypeId, TypeRef>>> = OnceLock::new();

fn descriptors() -> &'static RwLock<HashMap<TypeId, TypeRef>> {
    DESCRIPTORS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn cached_descriptor<T: ?Sized + 'static>() -> Option<TypeRef> {
    descriptors().read().get(&TypeId::of::<T>()).copied()
}

/// Return the descriptor for `T`, creating it with `create` on first use.
///
/// `create` runs under the cache lock, so it must not resolve other types.
fn insert_descriptor<T: ?Sized + 'static, E>(
    create: impl FnOnce() -> Result<TypeDesc, E>,
) -> Result<TypeRef, E> {
    let mut table = descriptors().write();
    if let Some(existing) = table.get(&TypeId::of::<T>()) {
        return Ok(*existing);
    }
    let desc: TypeRef = Box::leak(Box::new(create()?));
    table.insert(TypeId::of::<T>(), desc);
    Ok(desc)
}

/// Shared descriptor for a generic type such as `Vec<T>` or `Box<T>`.
pub(crate) fn shared_descriptor<T: ?Sized + 'static>(create: impl FnOnce() -> TypeDesc) -> TypeRef {
    if let Some(desc) = cached_descriptor::<T>() {
        return desc;
    }
    let result: Result<TypeRef, std::convert::Infallible> = insert_descriptor::<T, _>(|| Ok(create()));
    match result {
        Ok(desc) => desc,
        Err(never) => match never {},
    }
}

thread_local! {
    /// Types whose class this thread is currently building.
    static IN_PROGRESS: RefCell<HashSet<TypeId>> = RefCell::new(HashSet::new());
}

/// Marks a type as under construction on this thread until dropped.
struct BuildGuard(TypeId);

impl BuildGuard {
    fn enter<T: 'static>(name: &str) -> Result<Self, ReflectError> {
        let id = TypeId::of::<T>();
        if !IN_PROGRESS.with(|set| set.borrow_mut().insert(id)) {
            return Err(ReflectError::CyclicDescription {
                name: name.to_owned(),
            });
        }
        Ok(Self(id))
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with(|set| {
            set.borrow_mut().remove(&self.0);
        });
    }
}

/// Describe `T` as a class in the global registry, once.
///
/// The first caller runs `build` and registers the class; later callers get
/// the same descriptor. `build` runs outside any lock so it may resolve
/// nested class types. If two threads race, both build but only one class is
/// registered.
///
/// Eagerly resolved member and parent types must not lead back to `T`;
/// such a cycle fails with `CyclicDescription` instead of recursing.
/// Dynamic arrays and pointers resolve their element type lazily, so
/// `Vec<T>` and `Box<T>` members of `T` are fine.
///
/// # Errors
/// Any error from `build`, a description cycle, or a duplicate name/type
/// hash in the registry.
pub fn try_describe_class<T: 'static>(
    name: &str,
    build: impl FnOnce(&mut Class) -> Result<(), ReflectError>,
) -> Result<TypeRef, ReflectError> {
    if let Some(desc) = cached_descriptor::<T>() {
        return Ok(desc);
    }

    let guard = BuildGuard::enter::<T>(name)?;
    let mut class = Class::new(name, type_identity_hash::<T>());
    build(&mut class)?;
    drop(guard);

    let mut committed = false;
    let desc = insert_descriptor::<T, _>(|| {
        committed = true;
        ClassRegistry::global()
            .add_class(class)
            .map(TypeDesc::Class)
    })?;
    if !committed {
        log::warn!("[mirror] class `{}` was described concurrently, discarding duplicate", name);
    }
    Ok(desc)
}

/// Panicking form of [`try_describe_class`] for `Reflect::type_desc`.
///
/// A failure here is a static description bug, so it aborts the caller with
/// the registration diagnostic.
pub fn describe_class<T: 'static>(
    name: &str,
    build: impl FnOnce(&mut Class) -> Result<(), ReflectError>,
) -> TypeRef {
    match try_describe_class::<T>(name, build) {
        Ok(desc) => desc,
        Err(err) => panic!("failed to register class `{}`: {}", name, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_class(name: &str, type_hash: u64) -> Class {
        let mut class = Class::new(name, type_hash);
        class
            .member_of::<i32>("x", 0, "")
            .and_then(|c| c.member_of::<i32>("y", 4, ""))
            .expect("add members");
        class
    }

    #[test]
    fn test_lookup_by_name_and_type_hash() {
        let registry = ClassRegistry::new();
        let class = registry.add_class(point_class("Point", 10)).expect("add");

        let by_name = registry.find_class_by_name("Point").expect("by name");
        let by_hash = registry.find_class_by_type_hash(10).expect("by hash");
        assert!(Arc::ptr_eq(&class, &by_name));
        assert!(Arc::ptr_eq(&by_name, &by_hash));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_miss() {
        let registry = ClassRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find_class_by_name("Nope").is_none());
        assert!(registry.find_class_by_type_hash(99).is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = ClassRegistry::new();
        registry.add_class(point_class("Point", 1)).expect("first");
        let err = registry
            .add_class(point_class("Point", 2))
            .expect_err("same name");
        assert_eq!(err, ReflectError::DuplicateClassName { name: "Point".into() });
        assert!(registry.find_class_by_type_hash(2).is_none());
    }

    #[test]
    fn test_name_hash_collision_names_both_classes() {
        // Distinct names with equal FNV-1a hashes.
        assert_eq!(hash_str("costarring"), hash_str("liquid"));

        let registry = ClassRegistry::new();
        registry.add_class(point_class("costarring", 1)).expect("first");
        let err = registry
            .add_class(point_class("liquid", 2))
            .expect_err("hash taken");
        assert_eq!(
            err,
            ReflectError::ClassNameHashCollision {
                name: "liquid".into(),
                existing: "costarring".into(),
                name_hash: hash_str("liquid"),
            }
        );
        assert!(registry.find_class_by_name("liquid").is_none());
        assert!(registry.find_class_by_name("costarring").is_some());
    }

    #[test]
    fn test_self_dependent_build_is_rejected() {
        #[allow(dead_code)]
        struct Looped;
        let err = try_describe_class::<Looped>("Looped", |_| {
            try_describe_class::<Looped>("Looped", |_| Ok(())).map(|_| ())
        })
        .expect_err("cycle");
        assert_eq!(err, ReflectError::CyclicDescription { name: "Looped".into() });

        // The guard is released, so a later sound description still works.
        let desc = try_describe_class::<Looped>("Looped", |_| Ok(())).expect("describe");
        assert!(desc.as_class().is_some());
    }

    #[test]
    fn test_duplicate_type_hash_rejected() {
        let registry = ClassRegistry::new();
        registry.add_class(point_class("A", 7)).expect("first");
        let err = registry.add_class(point_class("B", 7)).expect_err("same hash");
        assert_eq!(
            err,
            ReflectError::DuplicateTypeHash {
                name: "B".into(),
                type_hash: 7,
            }
        );
        assert!(registry.find_class_by_name("B").is_none());
    }

    #[test]
    fn test_remove_class() {
        let registry = ClassRegistry::new();
        let class = registry.add_class(point_class("Point", 3)).expect("add");

        let removed = registry.remove_class(&class).expect("remove");
        assert!(Arc::ptr_eq(&removed, &class));
        assert!(registry.find_class_by_name("Point").is_none());
        assert!(registry.find_class_by_type_hash(3).is_none());

        let err = registry.remove_class(&class).expect_err("already removed");
        assert_eq!(err, ReflectError::ClassNotRegistered { name: "Point".into() });
    }

    #[test]
    fn test_remove_rejects_lookalike() {
        let registry = ClassRegistry::new();
        registry.add_class(point_class("Point", 4)).expect("add");
        let other = point_class("Point", 4);
        assert!(registry.remove_class(&other).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_releases_classes_on_drop() {
        let registry = ClassRegistry::new();
        let class = registry.add_class(point_class("Point", 5)).expect("add");
        assert_eq!(Arc::strong_count(&class), 3);
        drop(registry);
        assert_eq!(Arc::strong_count(&class), 1);
    }

    #[test]
    fn test_classes_sorted_snapshot() {
        let registry = ClassRegistry::new();
        registry.add_class(point_class("Zeta", 1)).expect("add");
        registry.add_class(point_class("Alpha", 2)).expect("add");
        let names: Vec<_> = registry.classes().iter().map(|c| c.name().to_owned()).collect();
        assert_eq!(names, ["Alpha", "Zeta"]);
    }

    #[test]
    fn test_register_class_links_parent() {
        let registry = ClassRegistry::new();
        let base = registry.add_class(Class::new("Entity", 20)).expect("base");
        let player = registry
            .register_class("Player", 21, |class| {
                class.add_parent(Arc::clone(&base));
                class.member_of::<u32>("score", 0, "")?;
                Ok(())
            })
            .expect("player");

        assert!(player.is_child_of(&base));
        let children = base.children();
        assert_eq!(children.len(), 1);
        assert!(Arc::ptr_eq(&children[0], &player));
    }

    #[test]
    fn test_register_class_propagates_build_error() {
        let registry = ClassRegistry::new();
        let err = registry
            .register_class("Bad", 30, |class| {
                class.member_of::<u8>("a", 0, "")?.member_of::<u8>("a", 1, "")?;
                Ok(())
            })
            .expect_err("duplicate member");
        assert!(matches!(err, ReflectError::DuplicateMember { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_type_identity_hash_is_stable_and_distinct() {
        assert_eq!(type_identity_hash::<u32>(), type_identity_hash::<u32>());
        assert_ne!(type_identity_hash::<u32>(), type_identity_hash::<i32>());
    }
}
