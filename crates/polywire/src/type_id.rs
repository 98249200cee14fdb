// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire type identifiers.
//!
//! A [`TypeIdentifier`] names a registered type on the wire. It is written
//! big-endian at a fixed [`IdWidth`] chosen once per registry; the value `0`
//! is the [`TypeIdentifier::NULL`] sentinel and stands for "no value".
//!
//! ```text
//! value        ::= sentinel_id | (type_id payload)
//! sentinel_id  ::= 0 (width bytes)
//! type_id      ::= non-zero (width bytes)
//! ```

use crate::ser::{Cursor, CursorMut, SerResult};
use std::fmt;

/// Number of bytes a [`TypeIdentifier`] occupies on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdWidth {
    U8,
    U16,
    U32,
    /// Eight bytes, the width used by peers that derive ids from type-name hashes.
    #[default]
    U64,
}

impl IdWidth {
    pub const fn bytes(self) -> usize {
        match self {
            IdWidth::U8 => 1,
            IdWidth::U16 => 2,
            IdWidth::U32 => 4,
            IdWidth::U64 => 8,
        }
    }

    /// Largest identifier representable at this width.
    pub const fn max_value(self) -> u64 {
        match self {
            IdWidth::U8 => u8::MAX as u64,
            IdWidth::U16 => u16::MAX as u64,
            IdWidth::U32 => u32::MAX as u64,
            IdWidth::U64 => u64::MAX,
        }
    }

    /// Parse a byte count (`"1"`, `"2"`, `"4"`, `"8"`) or a type name (`"u8"` ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "u8" => Some(IdWidth::U8),
            "2" | "u16" => Some(IdWidth::U16),
            "4" | "u32" => Some(IdWidth::U32),
            "8" | "u64" => Some(IdWidth::U64),
            _ => None,
        }
    }
}

impl fmt::Display for IdWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} byte(s)", self.bytes())
    }
}

/// Identifier of a registered type, or the null sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentifier(u64);

impl TypeIdentifier {
    /// Reserved "absent value" identifier. Never bound to a codec.
    pub const NULL: TypeIdentifier = TypeIdentifier(0);

    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    pub const fn fits(self, width: IdWidth) -> bool {
        self.0 <= width.max_value()
    }

    /// Derive an identifier from a fully qualified type name.
    ///
    /// MD5 of the UTF-8 name, first `width` bytes read big-endian. A digest
    /// that truncates to the sentinel maps to the all-ones value instead, so
    /// the result is never [`TypeIdentifier::NULL`].
    pub fn from_type_name(type_name: &str, width: IdWidth) -> Self {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(type_name.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        let n = width.bytes();
        bytes[8 - n..].copy_from_slice(&digest[..n]);
        match u64::from_be_bytes(bytes) {
            0 => Self(width.max_value()),
            value => Self(value),
        }
    }

    /// Write at `width`. Callers guarantee `self.fits(width)`.
    pub fn write(self, out: &mut CursorMut, width: IdWidth) -> SerResult<()> {
        debug_assert!(self.fits(width));
        out.write_uint_be(self.0, width.bytes())
    }

    pub fn read(input: &mut Cursor<'_>, width: IdWidth) -> SerResult<Self> {
        input.read_uint_be(width.bytes()).map(Self)
    }
}

impl fmt::Debug for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "TypeIdentifier(NULL)")
        } else {
            write!(f, "TypeIdentifier({:#x})", self.0)
        }
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for TypeIdentifier {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
