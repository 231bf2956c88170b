// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class descriptors for user aggregates.

use super::member::ClassMember;
use super::type_desc::TypeRef;
use super::Reflect;
use crate::error::ReflectError;
use crate::hash::hash_str;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// Description of a user aggregate: its members in declaration order and its
/// relations to other classes.
///
/// A class is built mutably, then frozen behind an [`Arc`] when committed to a
/// [`ClassRegistry`](super::ClassRegistry). Only the child list changes after
/// that, as subclasses are committed.
pub struct Class {
    name: String,
    name_hash: u32,
    type_hash: u64,
    members: Vec<ClassMember>,
    parents: Vec<Arc<Class>>,
    children: RwLock<Vec<Weak<Class>>>,
}

impl Class {
    /// Start describing a class.
    pub fn new(name: impl Into<String>, type_hash: u64) -> Self {
        let name = name.into();
        Self {
            name_hash: hash_str(&name),
            name,
            type_hash,
            members: Vec::new(),
            parents: Vec::new(),
            children: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// FNV-1a hash of the name (registry key).
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    /// Type-identity hash (secondary registry key).
    pub fn type_hash(&self) -> u64 {
        self.type_hash
    }

    /// Members in declaration order, which is also serialization order.
    pub fn members(&self) -> &[ClassMember] {
        &self.members
    }

    /// Find a member by name.
    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        let hash = hash_str(name);
        self.members
            .iter()
            .find(|m| m.name_hash() == hash && m.name() == name)
    }

    /// Find a member by name hash.
    pub fn member_by_hash(&self, name_hash: u32) -> Option<&ClassMember> {
        self.members.iter().find(|m| m.name_hash() == name_hash)
    }

    /// Append a member.
    ///
    /// # Errors
    /// `DuplicateMember` if a member with the same name already exists.
    pub fn add_member(&mut self, member: ClassMember) -> Result<&mut Self, ReflectError> {
        if self.member(member.name()).is_some() {
            return Err(ReflectError::DuplicateMember {
                class: self.name.clone(),
                member: member.name().to_owned(),
            });
        }
        self.members.push(member);
        Ok(self)
    }

    /// Append a member whose type is resolved from `F`.
    pub fn member_of<F: Reflect>(
        &mut self,
        name: &str,
        offset: usize,
        metadata: &str,
    ) -> Result<&mut Self, ReflectError> {
        self.add_member(ClassMember::new(name, offset, F::type_desc(), metadata))
    }

    /// Record `parent` as a parent class.
    ///
    /// Inherited members are NOT merged into this class. The reverse child
    /// link is recorded when this class is committed to a registry.
    pub fn add_parent(&mut self, parent: Arc<Class>) -> &mut Self {
        if !self.parents.iter().any(|p| Arc::ptr_eq(p, &parent)) {
            self.parents.push(parent);
        }
        self
    }

    /// Record the class describing `P` as a parent.
    ///
    /// # Errors
    /// `ParentNotAClass` if `P` is not described by a class.
    pub fn add_parent_of<P: Reflect>(&mut self) -> Result<&mut Self, ReflectError> {
        let desc = P::type_desc();
        match desc.as_class() {
            Some(parent) => Ok(self.add_parent(Arc::clone(parent))),
            None => Err(ReflectError::ParentNotAClass {
                class: self.name.clone(),
                parent: desc.to_string(),
            }),
        }
    }

    pub fn parents(&self) -> &[Arc<Class>] {
        &self.parents
    }

    /// Live child classes.
    pub fn children(&self) -> Vec<Arc<Class>> {
        self.children
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// `true` if `other` is a direct or indirect parent of this class.
    pub fn is_child_of(&self, other: &Class) -> bool {
        self.parents
            .iter()
            .any(|p| std::ptr::eq(p.as_ref(), other) || p.is_child_of(other))
    }

    /// Called once when the class is committed.
    pub(crate) fn link_to_parents(self: &Arc<Self>) {
        for parent in &self.parents {
            parent.children.write().push(Arc::downgrade(self));
        }
    }

    /// `true` if `S` is described by this exact class.
    fn describes<S: Reflect>(&self) -> bool {
        S::type_desc()
            .as_class()
            .is_some_and(|class| std::ptr::eq(class.as_ref(), self))
    }

    /// Member `name` if it is typed `F` and this class describes `S`.
    fn typed_member<S: Reflect, F: Reflect>(&self, name: &str) -> Option<&ClassMember> {
        if !self.describes::<S>() {
            return None;
        }
        let expected: TypeRef = F::type_desc();
        self.member(name)
            .filter(|m| std::ptr::eq(m.type_desc(), expected))
    }

    /// Borrow field `name` of `instance` by reflection.
    ///
    /// Returns `None` if this class does not describe `S`, the member does
    /// not exist, or its type is not `F`.
    pub fn field<'a, S: Reflect, F: Reflect>(&self, instance: &'a S, name: &str) -> Option<&'a F> {
        let member = self.typed_member::<S, F>(name)?;
        let field = member.instance_member_ptr((instance as *const S).cast());
        // SAFETY: `S: Reflect` guarantees the member offset and type describe
        // a real `F` field inside `S`; both were checked above.
        Some(unsafe { &*field.cast::<F>() })
    }

    /// Mutably borrow field `name` of `instance` by reflection.
    pub fn field_mut<'a, S: Reflect, F: Reflect>(
        &self,
        instance: &'a mut S,
        name: &str,
    ) -> Option<&'a mut F> {
        let member = self.typed_member::<S, F>(name)?;
        let field = member.instance_member_ptr_mut((instance as *mut S).cast());
        // SAFETY: see `field`.
        Some(unsafe { &mut *field.cast::<F>() })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("type_hash", &format_args!("{:#018x}", self.type_hash))
            .field("members", &self.members)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
