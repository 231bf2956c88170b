// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class members and their metadata.

use super::type_desc::TypeRef;
use crate::hash::hash_str;
use std::collections::HashMap;
use std::fmt;

/// One named, offset-located field of a class.
pub struct ClassMember {
    name: String,
    name_hash: u32,
    offset: usize,
    type_desc: TypeRef,
    metadata: HashMap<u32, MetaData>,
}

impl ClassMember {
    /// Create a member.
    ///
    /// `offset` is the byte offset of the field inside its owning instance
    /// (use [`core::mem::offset_of!`]). `metadata` is a comma-separated list
    /// of `key` or `key = value` entries, e.g. `min = 0, max = 10, hidden`.
    pub fn new(name: impl Into<String>, offset: usize, type_desc: TypeRef, metadata: &str) -> Self {
        let name = name.into();
        Self {
            name_hash: hash_str(&name),
            name,
            offset,
            type_desc,
            metadata: parse_metadata(metadata),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn type_desc(&self) -> TypeRef {
        self.type_desc
    }

    /// Look up a metadata entry by key.
    pub fn metadata(&self, key: &str) -> Option<&MetaData> {
        self.metadata
            .get(&hash_str(key))
            .filter(|entry| entry.name == key)
    }

    /// All metadata entries (unordered).
    pub fn metadata_entries(&self) -> impl Iterator<Item = &MetaData> {
        self.metadata.values()
    }

    /// Address of this member inside `instance`.
    ///
    /// Pure address arithmetic; dereferencing the result is only sound when
    /// `instance` points to a live value of the owning class.
    pub fn instance_member_ptr(&self, instance: *const u8) -> *const u8 {
        instance.wrapping_add(self.offset)
    }

    /// Mutable counterpart of [`instance_member_ptr`](Self::instance_member_ptr).
    pub fn instance_member_ptr_mut(&self, instance: *mut u8) -> *mut u8 {
        instance.wrapping_add(self.offset)
    }
}

impl fmt::Debug for ClassMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMember")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("type", &self.type_desc.tag())
            .field("metadata", &self.metadata.len())
            .finish()
    }
}

/// One `key = value` metadata entry attached to a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaData {
    name: String,
    data: String,
}

impl MetaData {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Entry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` for `true`/`1` (and bare keys), `false` for everything else.
    pub fn as_bool(&self) -> bool {
        matches!(self.data.as_str(), "true" | "1")
    }

    pub fn as_int(&self) -> Option<i64> {
        self.data.parse().ok()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.data.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }
}

/// Parse `key, key = value, key = "quoted, value"` into entries keyed by hash.
fn parse_metadata(source: &str) -> HashMap<u32, MetaData> {
    let mut entries = HashMap::new();
    for item in split_entries(source) {
        let (key, value) = match item.split_once('=') {
            Some((key, value)) => (key.trim(), unquote(value.trim())),
            None => (item.trim(), "true"),
        };
        if key.is_empty() {
            continue;
        }
        entries.insert(hash_str(key), MetaData::new(key, value));
    }
    entries
}

/// Split on commas that are not inside double quotes.
fn split_entries(source: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (index, c) in source.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                items.push(&source[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    items.push(&source[start..]);
    items
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;

    #[test]
    fn test_member_accessors() {
        let member = ClassMember::new("health", 8, i32::type_desc(), "");
        assert_eq!(member.name(), "health");
        assert_eq!(member.name_hash(), hash_str("health"));
        assert_eq!(member.offset(), 8);
        assert!(std::ptr::eq(member.type_desc(), i32::type_desc()));
        assert_eq!(member.metadata_entries().count(), 0);
    }

    #[test]
    fn test_instance_member_ptr() {
        let buffer = [0u8; 16];
        let member = ClassMember::new("y", 4, i32::type_desc(), "");
        let base = buffer.as_ptr();
        assert_eq!(member.instance_member_ptr(base) as usize, base as usize + 4);
    }

    #[test]
    fn test_metadata_parsing() {
        let member = ClassMember::new(
            "speed",
            0,
            f32::type_desc(),
            r#"min = -1, max=10.5, hidden, label = "Top, speed""#,
        );

        assert_eq!(member.metadata("min").and_then(MetaData::as_int), Some(-1));
        assert_eq!(member.metadata("max").and_then(MetaData::as_float), Some(10.5));
        assert!(member.metadata("hidden").is_some_and(MetaData::as_bool));
        assert_eq!(member.metadata("label").map(MetaData::as_str), Some("Top, speed"));
        assert!(member.metadata("missing").is_none());
    }

    #[test]
    fn test_metadata_ignores_empty_entries() {
        let entries = parse_metadata(" , ,flag,");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get(&hash_str("flag")).map(MetaData::as_str), Some("true"));
    }

    #[test]
    fn test_metadata_conversions() {
        let data = MetaData::new("count", "abc");
        assert_eq!(data.as_int(), None);
        assert_eq!(data.as_float(), None);
        assert!(!data.as_bool());
        assert_eq!(data.name(), "count");
    }
}
