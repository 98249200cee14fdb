// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level stream access used by every encode/decode function.
//!
//! The dispatcher never touches raw slices directly: identifiers, length
//! prefixes and payloads all go through [`Cursor`] / [`CursorMut`], so a
//! truncated or over-long stream surfaces as a [`SerError`] at the exact
//! offset where it happened.

pub mod cursor;
pub mod helpers;

pub use cursor::{Cursor, CursorMut};
pub use helpers::{read_list, read_nullable, write_list, write_nullable};

use std::fmt;

/// Low-level stream failure (truncated input, exhausted output, malformed bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { offset: usize, reason: String },
}

impl SerError {
    /// Offset in the stream at which the failure was detected.
    pub fn offset(&self) -> usize {
        match self {
            SerError::WriteFailed { offset, .. }
            | SerError::ReadFailed { offset, .. }
            | SerError::InvalidData { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            SerError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            SerError::InvalidData { offset, reason } => {
                write!(f, "invalid data at offset {}: {}", offset, reason)
            }
        }
    }
}

impl std::error::Error for SerError {}

pub type SerResult<T> = core::result::Result<T, SerError>;
