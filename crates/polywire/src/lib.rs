// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # polywire - polymorphic binary serialization dispatch
//!
//! Values whose concrete type is only known at runtime are written as a type
//! identifier followed by the type's payload. A frozen registry maps each
//! identifier to a decoder and each concrete type to its identifier and
//! encoder; the null sentinel encodes an absent value.
//!
//! ## Quick Start
//!
//! ```rust
//! use polywire::{Cursor, CursorMut, Polymorphic, RegistryBuilder, CodecConfig,
//!                SerializationContext, TypeIdentifier};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let mut builder = RegistryBuilder::new(CodecConfig::default());
//! builder.with_builtins()?;
//! builder.register::<Point, _, _>(
//!     TypeIdentifier::from_type_name("demo.Point", CodecConfig::default().id_width),
//!     |_, input| Ok(Point { x: input.read_i32_be()?, y: input.read_i32_be()? }),
//!     |_, out, p| { out.write_i32_be(p.x)?; Ok(out.write_i32_be(p.y)?) },
//! )?;
//! let ctx = SerializationContext::new(builder.build()?.into_shared());
//!
//! let mut out = CursorMut::new();
//! Polymorphic::write(&ctx, &mut out, Some(&Point { x: 1, y: 2 }))?;
//! Polymorphic::write(&ctx, &mut out, Some(&"label".to_string()))?;
//! Polymorphic::write::<Point>(&ctx, &mut out, None)?;
//!
//! let bytes = out.into_inner();
//! let mut input = Cursor::new(&bytes);
//! let first = Polymorphic::read_required(&ctx, &mut input)?;
//! assert_eq!(first.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
//! let second = Polymorphic::read_as::<String>(&ctx, &mut input)?;
//! assert_eq!(second.as_deref(), Some("label"));
//! assert!(Polymorphic::read(&ctx, &mut input)?.is_none());
//! # Ok::<(), polywire::Error>(())
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! value    ::= NULL_ID                       absent value
//!            | type_id [payload_len] payload
//! type_id  ::= unsigned big-endian, IdWidth bytes (default 8)
//! payload_len ::= u32be                      Framing::LengthPrefixed only
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RegistryBuilder`] | Startup-time registration, checks the id/type bijection |
//! | [`CodecRegistry`] | Frozen, lock-free lookup tables shared via `Arc` |
//! | [`SerializationContext`] | Per-session handle: registry plus intern roots |
//! | [`Polymorphic`] | `write` / `read` / `read_as` entry points |
//! | [`PolymorphicValue`] | Decoded value tagged with its concrete type |
//! | [`CodecConfig`] | Identifier width, framing and limits (`POLYWIRE_*` env overrides) |

pub mod builtin;
pub mod config;
pub mod context;
pub mod error;
pub mod marshaller;
pub mod polymorphic;
pub mod registry;
pub mod ser;
pub mod type_id;

pub use config::{CodecConfig, Framing};
pub use context::{InternRoot, Internable, SerializationContext};
pub use error::{Error, RegistrationConflict, Result};
pub use marshaller::{Marshaller, SerializersOwner};
pub use polymorphic::{Polymorphic, PolymorphicValue, UnknownInstance};
pub use registry::{
    global, install_global, CodecEntry, CodecRegistry, RegistryBuilder, TypeDiscriminant,
};
pub use ser::{Cursor, CursorMut, SerError};
pub use type_id::{IdWidth, TypeIdentifier};
