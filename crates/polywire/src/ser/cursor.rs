// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors over polywire byte streams.
//!
//! All multi-byte primitives are big-endian. Variable-length data (byte
//! arrays, strings) carries a `u32` big-endian length prefix.

use super::{SerError, SerResult};
use crate::context::PendingIntern;

/// Generate big-endian write methods for primitive types
///
/// Each generated method checks the output limit (returns `SerError::WriteFailed`
/// on overflow) and appends `to_be_bytes()`.
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) -> SerResult<()> {
            self.write_bytes(&value.to_be_bytes())
        }
    };
}

/// Generate big-endian read methods for primitive types
///
/// Each generated method checks remaining input (returns `SerError::ReadFailed`
/// on truncation), consumes N bytes and converts via `from_be_bytes()`.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> SerResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Generate nesting bookkeeping shared by `Cursor` and `CursorMut`
///
/// Nested polymorphic values (a payload that itself contains a polymorphic
/// field) bump the depth on the stream they are being read from / written to.
macro_rules! impl_nesting {
    () => {
        /// Current polymorphic nesting depth on this stream.
        pub fn depth(&self) -> u16 {
            self.depth
        }

        pub(crate) fn try_enter(&mut self, limit: u16) -> bool {
            if self.depth >= limit {
                return false;
            }
            self.depth += 1;
            true
        }

        pub(crate) fn leave(&mut self) {
            self.depth = self.depth.saturating_sub(1);
        }
    };
}

/// Growable output stream with an optional byte limit.
///
/// The limit models a transport that can only accept a bounded frame: writes
/// that would cross it fail without appending anything.
///
/// Intern definitions written inside a polymorphic value are held here until
/// the outermost value has been written completely.
#[derive(Debug, Default, Clone)]
pub struct CursorMut {
    buffer: Vec<u8>,
    limit: Option<usize>,
    depth: u16,
    pending_interns: Vec<PendingIntern>,
}

impl CursorMut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            limit: None,
            depth: 0,
            pending_interns: Vec::new(),
        }
    }

    /// Output stream that refuses to grow past `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit: Some(limit),
            depth: 0,
            pending_interns: Vec::new(),
        }
    }

    impl_write_be!(write_u16_be, u16);
    impl_write_be!(write_u32_be, u32);
    impl_write_be!(write_u64_be, u64);
    impl_write_be!(write_i16_be, i16);
    impl_write_be!(write_i32_be, i32);
    impl_write_be!(write_i64_be, i64);
    impl_write_be!(write_f32_be, f32);
    impl_write_be!(write_f64_be, f64);

    pub fn write_u8(&mut self, value: u8) -> SerResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> SerResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> SerResult<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_char(&mut self, value: char) -> SerResult<()> {
        self.write_u32_be(u32::from(value))
    }

    /// Write the low `width` bytes of `value`, big-endian.
    pub fn write_uint_be(&mut self, value: u64, width: usize) -> SerResult<()> {
        debug_assert!((1..=8).contains(&width));
        let bytes = value.to_be_bytes();
        self.write_bytes(&bytes[8 - width..])
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> SerResult<()> {
        if let Some(limit) = self.limit {
            if self.buffer.len() + data.len() > limit {
                return Err(SerError::WriteFailed {
                    offset: self.buffer.len(),
                    reason: "stream limit reached".into(),
                });
            }
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// `u32` length prefix followed by the raw bytes.
    pub fn write_byte_array(&mut self, data: &[u8]) -> SerResult<()> {
        let len = u32::try_from(data.len()).map_err(|_| SerError::WriteFailed {
            offset: self.buffer.len(),
            reason: "byte array longer than u32::MAX".into(),
        })?;
        self.write_u32_be(len)?;
        self.write_bytes(data)
    }

    pub fn write_string(&mut self, value: &str) -> SerResult<()> {
        self.write_byte_array(value.as_bytes())
    }

    /// Write a `u32` placeholder and return its offset for [`Self::patch_u32_be`].
    pub fn reserve_u32(&mut self) -> SerResult<usize> {
        let at = self.buffer.len();
        self.write_u32_be(0)?;
        Ok(at)
    }

    /// Overwrite four already-written bytes at `at`.
    pub fn patch_u32_be(&mut self, at: usize, value: u32) -> SerResult<()> {
        match self.buffer.get_mut(at..at + 4) {
            Some(slot) => {
                slot.copy_from_slice(&value.to_be_bytes());
                Ok(())
            }
            None => Err(SerError::WriteFailed {
                offset: at,
                reason: "patch outside written range".into(),
            }),
        }
    }

    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes that can still be written before the limit (unbounded streams report `usize::MAX`).
    pub fn remaining(&self) -> usize {
        match self.limit {
            Some(limit) => limit.saturating_sub(self.buffer.len()),
            None => usize::MAX,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Drop all written bytes, keeping the limit.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.depth = 0;
        self.pending_interns.clear();
    }

    pub(crate) fn pending_interns(&self) -> &[PendingIntern] {
        &self.pending_interns
    }

    pub(crate) fn defer_intern(&mut self, pending: PendingIntern) {
        self.pending_interns.push(pending);
    }

    pub(crate) fn take_pending_interns(&mut self) -> Vec<PendingIntern> {
        std::mem::take(&mut self.pending_interns)
    }

    impl_nesting!();
}

/// Input stream over a borrowed byte slice (bounds-checked, zero-copy).
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
    depth: u16,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            depth: 0,
        }
    }

    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_u64_be, u64, 8);
    impl_read_be!(read_i16_be, i16, 2);
    impl_read_be!(read_i32_be, i32, 4);
    impl_read_be!(read_i64_be, i64, 8);
    impl_read_be!(read_f32_be, f32, 4);
    impl_read_be!(read_f64_be, f64, 8);

    pub fn read_u8(&mut self) -> SerResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> SerResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> SerResult<bool> {
        let at = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerError::InvalidData {
                offset: at,
                reason: format!("boolean byte must be 0 or 1, got {:#04x}", other),
            }),
        }
    }

    pub fn read_char(&mut self) -> SerResult<char> {
        let at = self.offset;
        let scalar = self.read_u32_be()?;
        char::from_u32(scalar).ok_or_else(|| SerError::InvalidData {
            offset: at,
            reason: format!("{:#x} is not a unicode scalar value", scalar),
        })
    }

    /// Read `width` bytes as a big-endian unsigned integer.
    pub fn read_uint_be(&mut self, width: usize) -> SerResult<u64> {
        debug_assert!((1..=8).contains(&width));
        let mut bytes = [0u8; 8];
        bytes[8 - width..].copy_from_slice(self.read_bytes(width)?);
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(SerError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of stream".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_byte_array(&mut self) -> SerResult<Vec<u8>> {
        let len = self.read_u32_be()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> SerResult<String> {
        let len = self.read_u32_be()? as usize;
        let at = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerError::InvalidData {
            offset: at,
            reason: "string is not UTF-8".into(),
        })
    }

    /// Consume `len` bytes without interpreting them.
    pub fn skip(&mut self, len: usize) -> SerResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Fail unless at least `len` bytes are left.
    pub fn check_available(&self, len: usize) -> SerResult<()> {
        if len > self.remaining() {
            return Err(SerError::ReadFailed {
                offset: self.offset,
                reason: format!("{} bytes announced, {} available", len, self.remaining()),
            });
        }
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    impl_nesting!();
}
