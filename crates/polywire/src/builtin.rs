// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Framework marshallers with predefined identifiers.
//!
//! | id | type | id | type |
//! |----|------|----|------|
//! | 1 | `i8` | 14 | `TypeIdentifier` |
//! | 2 | `i16` | 31 | `Vec<u8>` |
//! | 3 | `i32` | 32 | `Vec<i16>` |
//! | 4 | `i64` | 33 | `Vec<i32>` |
//! | 5 | `f32` | 34 | `Vec<i64>` |
//! | 6 | `f64` | 35 | `Vec<f32>` |
//! | 7 | `char` | 36 | `Vec<f64>` |
//! | 8 | `bool` | 38 | `Vec<bool>` |
//! | 9 | `()` | 41..=44 | `u8`, `u16`, `u32`, `u64` |
//! | 10 | `String` | | |
//!
//! These ids are small enough for every [`IdWidth`](crate::IdWidth), so the
//! table registers the same way whatever the configured width.

use crate::registry::RegistryBuilder;
use crate::ser::{read_list, write_list};
use crate::type_id::TypeIdentifier;
use crate::Result;

pub const I8: TypeIdentifier = TypeIdentifier::from_raw(1);
pub const I16: TypeIdentifier = TypeIdentifier::from_raw(2);
pub const I32: TypeIdentifier = TypeIdentifier::from_raw(3);
pub const I64: TypeIdentifier = TypeIdentifier::from_raw(4);
pub const F32: TypeIdentifier = TypeIdentifier::from_raw(5);
pub const F64: TypeIdentifier = TypeIdentifier::from_raw(6);
pub const CHAR: TypeIdentifier = TypeIdentifier::from_raw(7);
pub const BOOL: TypeIdentifier = TypeIdentifier::from_raw(8);
pub const VOID: TypeIdentifier = TypeIdentifier::from_raw(9);
pub const STRING: TypeIdentifier = TypeIdentifier::from_raw(10);
pub const TYPE_IDENTIFIER: TypeIdentifier = TypeIdentifier::from_raw(14);
pub const BYTE_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(31);
pub const SHORT_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(32);
pub const INT_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(33);
pub const LONG_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(34);
pub const FLOAT_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(35);
pub const DOUBLE_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(36);
pub const BOOL_ARRAY: TypeIdentifier = TypeIdentifier::from_raw(38);
pub const U8: TypeIdentifier = TypeIdentifier::from_raw(41);
pub const U16: TypeIdentifier = TypeIdentifier::from_raw(42);
pub const U32: TypeIdentifier = TypeIdentifier::from_raw(43);
pub const U64: TypeIdentifier = TypeIdentifier::from_raw(44);

/// Register a scalar read/written by one cursor method pair.
macro_rules! register_scalar {
    ($builder:expr, $type:ty, $id:expr, $read:ident, $write:ident) => {
        $builder.register::<$type, _, _>(
            $id,
            |_, input| Ok(input.$read()?),
            |_, out, value| Ok(out.$write(*value)?),
        )?
    };
}

/// Register `Vec<$type>` as a `u32` count followed by the elements.
macro_rules! register_array {
    ($builder:expr, $type:ty, $id:expr, $read:ident, $write:ident) => {
        $builder.register::<Vec<$type>, _, _>(
            $id,
            |_, input| read_list(input, |input| Ok(input.$read()?)),
            |_, out, value| {
                write_list(out, value.as_slice(), |out, item| Ok(out.$write(*item)?))
            },
        )?
    };
}

pub(crate) fn register_builtins(builder: &mut RegistryBuilder) -> Result<()> {
    register_scalar!(builder, i8, I8, read_i8, write_i8);
    register_scalar!(builder, i16, I16, read_i16_be, write_i16_be);
    register_scalar!(builder, i32, I32, read_i32_be, write_i32_be);
    register_scalar!(builder, i64, I64, read_i64_be, write_i64_be);
    register_scalar!(builder, f32, F32, read_f32_be, write_f32_be);
    register_scalar!(builder, f64, F64, read_f64_be, write_f64_be);
    register_scalar!(builder, char, CHAR, read_char, write_char);
    register_scalar!(builder, bool, BOOL, read_bool, write_bool);
    builder.register::<(), _, _>(VOID, |_, _| Ok(()), |_, _, _| Ok(()))?;
    builder.register::<String, _, _>(
        STRING,
        |_, input| Ok(input.read_string()?),
        |_, out, value| Ok(out.write_string(value)?),
    )?;
    builder.register::<TypeIdentifier, _, _>(
        TYPE_IDENTIFIER,
        |_, input| Ok(TypeIdentifier::from_raw(input.read_u64_be()?)),
        |_, out, value| Ok(out.write_u64_be(value.value())?),
    )?;

    builder.register::<Vec<u8>, _, _>(
        BYTE_ARRAY,
        |_, input| Ok(input.read_byte_array()?),
        |_, out, value| Ok(out.write_byte_array(value)?),
    )?;
    register_array!(builder, i16, SHORT_ARRAY, read_i16_be, write_i16_be);
    register_array!(builder, i32, INT_ARRAY, read_i32_be, write_i32_be);
    register_array!(builder, i64, LONG_ARRAY, read_i64_be, write_i64_be);
    register_array!(builder, f32, FLOAT_ARRAY, read_f32_be, write_f32_be);
    register_array!(builder, f64, DOUBLE_ARRAY, read_f64_be, write_f64_be);
    register_array!(builder, bool, BOOL_ARRAY, read_bool, write_bool);

    register_scalar!(builder, u8, U8, read_u8, write_u8);
    register_scalar!(builder, u16, U16, read_u16_be, write_u16_be);
    register_scalar!(builder, u32, U32, read_u32_be, write_u32_be);
    register_scalar!(builder, u64, U64, read_u64_be, write_u64_be);

    log::debug!("[builtin] registered {} framework marshallers", builder.len());
    Ok(())
}
