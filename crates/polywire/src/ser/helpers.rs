// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composite field helpers for hand-written and generated codecs.

use super::{Cursor, CursorMut, SerError};
use crate::Result;

/// Write a `u32` element count followed by each element.
pub fn write_list<T, F>(out: &mut CursorMut, items: &[T], mut write_item: F) -> Result<()>
where
    F: FnMut(&mut CursorMut, &T) -> Result<()>,
{
    let len = u32::try_from(items.len()).map_err(|_| SerError::WriteFailed {
        offset: out.offset(),
        reason: "list longer than u32::MAX".into(),
    })?;
    out.write_u32_be(len)?;
    for item in items {
        write_item(out, item)?;
    }
    Ok(())
}

/// Read a list written by [`write_list`].
pub fn read_list<'a, T, F>(input: &mut Cursor<'a>, mut read_item: F) -> Result<Vec<T>>
where
    F: FnMut(&mut Cursor<'a>) -> Result<T>,
{
    let len = input.read_u32_be()? as usize;
    // Every element takes at least one byte; a larger count is a lie.
    let mut items = Vec::with_capacity(len.min(input.remaining()));
    for _ in 0..len {
        items.push(read_item(input)?);
    }
    Ok(items)
}

/// Presence flag (`bool`) followed by the value when present.
pub fn write_nullable<T, F>(out: &mut CursorMut, value: Option<&T>, write_value: F) -> Result<()>
where
    F: FnOnce(&mut CursorMut, &T) -> Result<()>,
{
    match value {
        None => Ok(out.write_bool(false)?),
        Some(value) => {
            out.write_bool(true)?;
            write_value(out, value)
        }
    }
}

pub fn read_nullable<'a, T, F>(input: &mut Cursor<'a>, read_value: F) -> Result<Option<T>>
where
    F: FnOnce(&mut Cursor<'a>) -> Result<T>,
{
    if !input.read_bool()? {
        return Ok(None);
    }
    read_value(input).map(Some)
}
