// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven binary serializer.
//!
//! Walks a [`Class`] member by member, in declaration order, and copies each
//! field to or from a tag-free byte stream:
//!
//! - scalars: raw native-endian bytes (`char` as its 4-byte scalar value)
//! - strings: UTF-8 bytes followed by one terminator byte
//! - nested classes: their members, with no framing
//! - dynamic arrays: a `u64` element count followed by each element
//!
//! Pointer, void and absent members have no encoding and fail with
//! [`SerializeError::UnsupportedType`]. Parent classes are not walked.
//!
//! # Session
//!
//! ```text
//! Idle --begin_write--> Writing --end_write--> Idle
//! Idle --begin_read---> Reading --end_read---> Idle
//! ```
//!
//! The write buffer is retained across sessions and stays readable through
//! [`BinarySerializer::write_data`] until the next `begin_write`.

mod cursor;

pub use cursor::Cursor;

use crate::config::{SerializerConfig, STRING_TERMINATOR};
use crate::error::SerializeError;
use crate::reflect::{Class, DynamicArrayDesc, Reflect, SimpleKind, TypeDesc};

/// Serializer session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Writing,
    Reading,
}

/// Stateful reader/writer over a growable buffer or a borrowed byte span.
///
/// One session at a time; not meant to be shared between threads.
#[derive(Debug)]
pub struct BinarySerializer<'a> {
    config: SerializerConfig,
    mode: Mode,
    write_data: Vec<u8>,
    reader: Option<Cursor<'a>>,
    depth: usize,
}

impl Default for BinarySerializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BinarySerializer<'a> {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            config,
            mode: Mode::Idle,
            write_data: Vec::new(),
            reader: None,
            depth: 0,
        }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn expect_mode(&self, expected: Mode) -> Result<(), SerializeError> {
        if self.mode != expected {
            return Err(SerializeError::InvalidState {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Session control
    // -----------------------------------------------------------------------

    /// Start a write session, discarding previously written bytes.
    ///
    /// Buffer capacity is kept from earlier sessions.
    pub fn begin_write(&mut self) -> Result<(), SerializeError> {
        self.expect_mode(Mode::Idle)?;
        if self.write_data.capacity() == 0 {
            self.write_data.reserve_exact(self.config.initial_capacity);
        }
        self.write_data.clear();
        self.mode = Mode::Writing;
        log::debug!(
            "[mirror] begin write (capacity {} bytes)",
            self.write_data.capacity()
        );
        Ok(())
    }

    /// End the write session. Written bytes stay available.
    pub fn end_write(&mut self) -> Result<(), SerializeError> {
        self.expect_mode(Mode::Writing)?;
        self.mode = Mode::Idle;
        log::debug!("[mirror] end write ({} bytes)", self.write_data.len());
        Ok(())
    }

    /// Bytes produced by the last write session.
    pub fn write_data(&self) -> &[u8] {
        &self.write_data
    }

    /// Take ownership of the written bytes.
    pub fn into_write_data(self) -> Vec<u8> {
        self.write_data
    }

    /// Start a read session over `data`.
    pub fn begin_read(&mut self, data: &'a [u8]) -> Result<(), SerializeError> {
        self.expect_mode(Mode::Idle)?;
        self.reader = Some(Cursor::new(data));
        self.mode = Mode::Reading;
        log::debug!("[mirror] begin read ({} bytes)", data.len());
        Ok(())
    }

    /// End the read session and release the input view.
    pub fn end_read(&mut self) -> Result<(), SerializeError> {
        self.expect_mode(Mode::Reading)?;
        let consumed = self.read_position();
        self.reader = None;
        self.mode = Mode::Idle;
        log::debug!("[mirror] end read ({} bytes consumed)", consumed);
        Ok(())
    }

    /// Bytes consumed so far in the read session.
    pub fn read_position(&self) -> usize {
        self.reader.as_ref().map_or(0, Cursor::offset)
    }

    /// Bytes left unread in the read session.
    pub fn remaining(&self) -> usize {
        self.reader.as_ref().map_or(0, Cursor::remaining)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Write or read `value` depending on the session mode.
    ///
    /// # Errors
    /// `NoSession` when called while idle.
    pub fn serialize<T: Reflect>(&mut self, value: &mut T) -> Result<(), SerializeError> {
        match self.mode {
            Mode::Writing => self.write(value),
            Mode::Reading => self.read(value),
            Mode::Idle => Err(SerializeError::NoSession),
        }
    }

    /// Append the encoding of `value` to the write buffer.
    ///
    /// On error the buffer is left as it was before the call.
    pub fn write<T: Reflect>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.expect_mode(Mode::Writing)?;
        let class = root_class::<T>()?;
        // SAFETY: `T: Reflect` ties every member offset and type to a real
        // field of `T`, and `value` is a live shared borrow.
        unsafe { self.write_root((value as *const T).cast(), class) }
    }

    /// Decode the next value from the input into `value`.
    ///
    /// On error `value` may be partially updated, but every field holds a
    /// valid value of its type.
    pub fn read<T: Reflect>(&mut self, value: &mut T) -> Result<(), SerializeError> {
        self.expect_mode(Mode::Reading)?;
        let class = root_class::<T>()?;
        self.depth = 0;
        // SAFETY: as in `write`, with an exclusive borrow.
        unsafe { self.read_class((value as *mut T).cast(), class) }
    }

    /// Offset-based core of [`serialize`](Self::serialize).
    ///
    /// # Safety
    ///
    /// `instance` must point to a live, exclusively borrowed value whose
    /// layout is described by `class` (member offsets and member types).
    pub unsafe fn serialize_raw(
        &mut self,
        instance: *mut u8,
        class: &Class,
    ) -> Result<(), SerializeError> {
        match self.mode {
            Mode::Writing => self.write_root(instance.cast_const(), class),
            Mode::Reading => {
                self.depth = 0;
                self.read_class(instance, class)
            }
            Mode::Idle => Err(SerializeError::NoSession),
        }
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    fn enter(&mut self) -> Result<(), SerializeError> {
        if self.depth >= self.config.max_depth {
            return Err(SerializeError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Encode one top-level value, rolling the buffer back on failure.
    unsafe fn write_root(&mut self, instance: *const u8, class: &Class) -> Result<(), SerializeError> {
        let start = self.write_data.len();
        self.depth = 0;
        let result = self.write_class(instance, class);
        if result.is_err() {
            self.write_data.truncate(start);
        }
        result
    }

    unsafe fn write_class(&mut self, instance: *const u8, class: &Class) -> Result<(), SerializeError> {
        self.enter()?;
        for member in class.members() {
            let field = member.instance_member_ptr(instance);
            self.write_value(field, member.type_desc(), member.name())?;
        }
        self.leave();
        Ok(())
    }

    unsafe fn read_class(&mut self, instance: *mut u8, class: &Class) -> Result<(), SerializeError> {
        self.enter()?;
        for member in class.members() {
            let field = member.instance_member_ptr_mut(instance);
            self.read_value(field, member.type_desc(), member.name())?;
        }
        self.leave();
        Ok(())
    }

    unsafe fn write_value(
        &mut self,
        field: *const u8,
        desc: &TypeDesc,
        member: &str,
    ) -> Result<(), SerializeError> {
        match desc {
            TypeDesc::Simple(kind) => self.write_simple(field, *kind),
            TypeDesc::Class(class) => self.write_class(field, class),
            TypeDesc::DynamicArray(array) => self.write_array(field, array, member),
            TypeDesc::Pointer(_) | TypeDesc::Void | TypeDesc::None => {
                Err(SerializeError::UnsupportedType {
                    member: member.to_owned(),
                    tag: desc.tag(),
                })
            }
        }
    }

    unsafe fn read_value(
        &mut self,
        field: *mut u8,
        desc: &TypeDesc,
        member: &str,
    ) -> Result<(), SerializeError> {
        match desc {
            TypeDesc::Simple(kind) => self.read_simple(field, *kind),
            TypeDesc::Class(class) => self.read_class(field, class),
            TypeDesc::DynamicArray(array) => self.read_array(field, array, member),
            TypeDesc::Pointer(_) | TypeDesc::Void | TypeDesc::None => {
                Err(SerializeError::UnsupportedType {
                    member: member.to_owned(),
                    tag: desc.tag(),
                })
            }
        }
    }

    unsafe fn write_array(
        &mut self,
        field: *const u8,
        array: &DynamicArrayDesc,
        member: &str,
    ) -> Result<(), SerializeError> {
        self.enter()?;
        let ops = array.ops();
        let element = array.element_type();
        let len = ops.len(field);
        self.put(&(len as u64).to_ne_bytes());
        for index in 0..len {
            self.write_value(ops.element_ptr(field, index), element, member)?;
        }
        self.leave();
        Ok(())
    }

    unsafe fn read_array(
        &mut self,
        field: *mut u8,
        array: &DynamicArrayDesc,
        member: &str,
    ) -> Result<(), SerializeError> {
        self.enter()?;
        let max = self.config.max_array_len;
        let cursor = self.cursor()?;
        let encoded_len = cursor.read_u64()?;
        let len = usize::try_from(encoded_len)
            .ok()
            .filter(|&len| len <= max)
            .ok_or(SerializeError::ArrayTooLong {
                len: encoded_len,
                max,
            })?;

        let element = array.element_type();
        if let TypeDesc::Pointer(_) | TypeDesc::Void | TypeDesc::None = element {
            return Err(SerializeError::UnsupportedType {
                member: member.to_owned(),
                tag: element.tag(),
            });
        }

        // Refuse counts the remaining input cannot possibly hold before
        // allocating for them. Elements that encode to nothing still count
        // as one byte each.
        cursor.require(len.saturating_mul(element.min_encoded_size().max(1)))?;

        let ops = array.ops();
        ops.resize(field, len);
        for index in 0..len {
            self.read_value(ops.element_ptr_mut(field, index), element, member)?;
        }
        self.leave();
        Ok(())
    }

    unsafe fn write_simple(&mut self, field: *const u8, kind: SimpleKind) -> Result<(), SerializeError> {
        match kind {
            SimpleKind::Bool => self.put(&[u8::from(load::<bool>(field))]),
            SimpleKind::Char => self.put(&u32::from(load::<char>(field)).to_ne_bytes()),
            SimpleKind::I8 => self.put(&load::<i8>(field).to_ne_bytes()),
            SimpleKind::I16 => self.put(&load::<i16>(field).to_ne_bytes()),
            SimpleKind::I32 => self.put(&load::<i32>(field).to_ne_bytes()),
            SimpleKind::I64 => self.put(&load::<i64>(field).to_ne_bytes()),
            SimpleKind::U8 => self.put(&[load::<u8>(field)]),
            SimpleKind::U16 => self.put(&load::<u16>(field).to_ne_bytes()),
            SimpleKind::U32 => self.put(&load::<u32>(field).to_ne_bytes()),
            SimpleKind::U64 => self.put(&load::<u64>(field).to_ne_bytes()),
            SimpleKind::F32 => self.put(&load::<f32>(field).to_ne_bytes()),
            SimpleKind::F64 => self.put(&load::<f64>(field).to_ne_bytes()),
            SimpleKind::String => {
                let text = &*field.cast::<String>();
                if let Some(offset) = text.bytes().position(|b| b == STRING_TERMINATOR) {
                    return Err(SerializeError::InteriorNul { offset });
                }
                self.reserve(text.len() + 1);
                self.write_data.extend_from_slice(text.as_bytes());
                self.write_data.push(STRING_TERMINATOR);
            }
        }
        Ok(())
    }

    unsafe fn read_simple(&mut self, field: *mut u8, kind: SimpleKind) -> Result<(), SerializeError> {
        let cursor = self.cursor()?;
        let offset = cursor.offset();
        match kind {
            SimpleKind::Bool => {
                let value = match cursor.read_u8()? {
                    0 => false,
                    1 => true,
                    value => return Err(SerializeError::InvalidBool { offset, value }),
                };
                store(field, value);
            }
            SimpleKind::Char => {
                let value = cursor.read_u32()?;
                let ch = char::from_u32(value)
                    .ok_or(SerializeError::InvalidChar { offset, value })?;
                store(field, ch);
            }
            SimpleKind::I8 => store(field, cursor.read_i8()?),
            SimpleKind::I16 => store(field, cursor.read_i16()?),
            SimpleKind::I32 => store(field, cursor.read_i32()?),
            SimpleKind::I64 => store(field, cursor.read_i64()?),
            SimpleKind::U8 => store(field, cursor.read_u8()?),
            SimpleKind::U16 => store(field, cursor.read_u16()?),
            SimpleKind::U32 => store(field, cursor.read_u32()?),
            SimpleKind::U64 => store(field, cursor.read_u64()?),
            SimpleKind::F32 => store(field, cursor.read_f32()?),
            SimpleKind::F64 => store(field, cursor.read_f64()?),
            SimpleKind::String => {
                let bytes = cursor.read_terminated()?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| SerializeError::InvalidUtf8 { offset })?;
                let dest = &mut *field.cast::<String>();
                dest.clear();
                dest.push_str(text);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Buffers
    // -----------------------------------------------------------------------

    fn cursor(&mut self) -> Result<&mut Cursor<'a>, SerializeError> {
        let actual = self.mode;
        self.reader.as_mut().ok_or(SerializeError::InvalidState {
            expected: Mode::Reading,
            actual,
        })
    }

    /// Grow the write buffer to `len + 2 * extra` when `extra` more bytes do
    /// not fit.
    fn reserve(&mut self, extra: usize) {
        let len = self.write_data.len();
        let capacity = self.write_data.capacity();
        if len + extra > capacity {
            self.write_data.reserve_exact(extra * 2);
            log::trace!(
                "[mirror] write buffer grown {} -> {} bytes",
                capacity,
                self.write_data.capacity()
            );
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.write_data.extend_from_slice(bytes);
    }
}

fn root_class<T: Reflect>() -> Result<&'static Class, SerializeError> {
    let desc = T::type_desc();
    desc.as_class()
        .map(|class| class.as_ref())
        .ok_or(SerializeError::NotAClass { tag: desc.tag() })
}

/// # Safety
/// `field` must point to a live, aligned `T`.
unsafe fn load<T: Copy>(field: *const u8) -> T {
    field.cast::<T>().read()
}

/// # Safety
/// `field` must point to a live, aligned, exclusively borrowed `T`.
unsafe fn store<T>(field: *mut u8, value: T) {
    *field.cast::<T>() = value;
}

/// Encode `value` in a fresh write session.
pub fn to_bytes<T: Reflect>(value: &T) -> Result<Vec<u8>, SerializeError> {
    let mut serializer = BinarySerializer::new();
    serializer.begin_write()?;
    serializer.write(value)?;
    serializer.end_write()?;
    Ok(serializer.into_write_data())
}

/// Decode a `T` that must span all of `bytes`.
pub fn from_bytes<T: Reflect + Default>(bytes: &[u8]) -> Result<T, SerializeError> {
    let mut value = T::default();
    let mut serializer = BinarySerializer::new();
    serializer.begin_read(bytes)?;
    serializer.read(&mut value)?;
    let remaining = serializer.remaining();
    serializer.end_read()?;
    if remaining > 0 {
        return Err(SerializeError::TrailingBytes { remaining });
    }
    Ok(value)
}
