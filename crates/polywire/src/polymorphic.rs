// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic read/write dispatch.
//!
//! ```text
//! write(None)        -> NULL id
//! write(Some(v))     -> encoder_for(type of v) -> id [len] payload
//! read               -> id == NULL ? None : decoder_for(id) -> payload
//! ```
//!
//! `[len]` is present only with [`Framing::LengthPrefixed`]. Encoders and
//! decoders may call back into [`Polymorphic`] for nested polymorphic fields;
//! the nesting depth is tracked on the cursor.

use crate::config::Framing;
use crate::context::SerializationContext;
use crate::registry::{CodecEntry, TypeDiscriminant};
use crate::ser::{Cursor, CursorMut};
use crate::type_id::TypeIdentifier;
use crate::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt;

/// A decoded value whose concrete type is known only at runtime.
///
/// Narrow it with [`PolymorphicValue::downcast`] / [`PolymorphicValue::downcast_ref`].
pub struct PolymorphicValue {
    discriminant: TypeDiscriminant,
    value: Box<dyn Any + Send + Sync>,
}

impl PolymorphicValue {
    /// Wrap `value`. Wrapping a `PolymorphicValue` returns it unchanged.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<PolymorphicValue>() {
            Ok(inner) => *inner,
            Err(boxed) => Self {
                discriminant: TypeDiscriminant::of::<T>(),
                value: boxed,
            },
        }
    }

    pub fn discriminant(&self) -> TypeDiscriminant {
        self.discriminant
    }

    pub fn type_name(&self) -> &'static str {
        self.discriminant.name()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the value out as `T`, or get `self` back on mismatch.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Self> {
        let discriminant = self.discriminant;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| Self {
                discriminant,
                value,
            })
    }

    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }
}

impl fmt::Debug for PolymorphicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(unknown) = self.downcast_ref::<UnknownInstance>() {
            return write!(f, "PolymorphicValue({:?})", unknown);
        }
        write!(f, "PolymorphicValue({})", self.discriminant.name())
    }
}

/// Payload of a type this side has no decoder for, kept verbatim.
///
/// Only produced by [`Polymorphic::read_or_unknown`] under length-prefixed
/// framing. Writing it re-emits the original identifier and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInstance {
    id: TypeIdentifier,
    payload: Vec<u8>,
}

impl UnknownInstance {
    pub fn new(id: TypeIdentifier, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> TypeIdentifier {
        self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum UnknownPolicy {
    Fail,
    Capture,
}

/// Polymorphic codec entry points.
///
/// # Example
///
/// ```rust
/// use polywire::{CodecConfig, Cursor, CursorMut, IdWidth, Polymorphic, RegistryBuilder,
///                SerializationContext, TypeIdentifier};
/// use std::sync::Arc;
///
/// #[derive(Debug, PartialEq)]
/// struct A(i32);
///
/// let mut builder = RegistryBuilder::new(CodecConfig::new().with_id_width(IdWidth::U8));
/// builder.register::<A, _, _>(
///     TypeIdentifier::from_raw(0x01),
///     |_, input| Ok(A(input.read_i32_be()?)),
///     |_, out, value| Ok(out.write_i32_be(value.0)?),
/// )?;
/// let ctx = SerializationContext::new(Arc::new(builder.build()?));
///
/// let mut out = CursorMut::new();
/// Polymorphic::write(&ctx, &mut out, Some(&A(42)))?;
/// assert_eq!(out.as_slice(), &[0x01, 0x00, 0x00, 0x00, 0x2A]);
///
/// let bytes = out.into_inner();
/// let value = Polymorphic::read_as::<A>(&ctx, &mut Cursor::new(&bytes))?;
/// assert_eq!(value, Some(A(42)));
/// # Ok::<(), polywire::Error>(())
/// ```
pub struct Polymorphic;

impl Polymorphic {
    /// Write `value` (or the null sentinel for `None`).
    ///
    /// The encoder is chosen by the concrete type of `value`; a
    /// [`PolymorphicValue`] dispatches on the value it wraps. Nothing is
    /// written if the type is unregistered.
    ///
    /// # Errors
    ///
    /// - [`Error::UnregisteredType`] if the concrete type has no registration
    /// - [`Error::NestingTooDeep`] past the configured nesting limit
    /// - [`Error::Stream`] if the output refuses the bytes
    pub fn write<T: Any + Send + Sync>(
        ctx: &SerializationContext,
        out: &mut CursorMut,
        value: Option<&T>,
    ) -> Result<()> {
        let Some(value) = value else {
            return Self::write_null(ctx, out);
        };
        let value: &dyn Any = value;
        match value.downcast_ref::<PolymorphicValue>() {
            Some(wrapped) => {
                let inner: &dyn Any = wrapped.as_any();
                Self::write_dyn(ctx, out, inner, wrapped.discriminant())
            }
            None => Self::write_dyn(ctx, out, value, TypeDiscriminant::of::<T>()),
        }
    }

    /// Write a value that must be present.
    pub fn write_required<T: Any + Send + Sync>(
        ctx: &SerializationContext,
        out: &mut CursorMut,
        value: &T,
    ) -> Result<()> {
        Self::write(ctx, out, Some(value))
    }

    /// Write the null sentinel.
    pub fn write_null(ctx: &SerializationContext, out: &mut CursorMut) -> Result<()> {
        TypeIdentifier::NULL.write(out, ctx.config().id_width)?;
        Ok(())
    }

    /// Read one value. `None` means the null sentinel was read.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownTypeId`] if the identifier has no decoder. Only the
    /// identifier has been consumed at that point, but the payload length is
    /// unknown: the stream cannot be resynchronised.
    pub fn read(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
    ) -> Result<Option<PolymorphicValue>> {
        Self::read_with(ctx, input, UnknownPolicy::Fail)
    }

    /// Like [`Self::read`], but under length-prefixed framing an unknown
    /// identifier yields an [`UnknownInstance`] instead of failing.
    pub fn read_or_unknown(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
    ) -> Result<Option<PolymorphicValue>> {
        Self::read_with(ctx, input, UnknownPolicy::Capture)
    }

    /// Read a value that must be present.
    pub fn read_required(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
    ) -> Result<PolymorphicValue> {
        Self::read(ctx, input)?.ok_or(Error::NullValue)
    }

    /// Read a value the caller expects to be a `T`.
    ///
    /// The identifier's registered type is checked against `T` before the
    /// decoder runs.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if the identifier belongs to another type.
    pub fn read_as<T: Any + Send + Sync>(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
    ) -> Result<Option<T>> {
        let id = TypeIdentifier::read(input, ctx.config().id_width)?;
        if id.is_null() {
            return Ok(None);
        }
        let entry = Self::lookup(ctx, input, id)?;
        if entry.discriminant().type_id() != TypeId::of::<T>() {
            return Err(Error::TypeMismatch {
                id,
                expected: std::any::type_name::<T>(),
                actual: entry.type_name(),
            });
        }
        let value = Self::decode_entry(ctx, input, entry)?;
        value
            .downcast::<T>()
            .map(|value| Some(*value))
            .map_err(|_| Error::TypeMismatch {
                id,
                expected: std::any::type_name::<T>(),
                actual: entry.type_name(),
            })
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes<T: Any + Send + Sync>(
        ctx: &SerializationContext,
        value: Option<&T>,
    ) -> Result<Vec<u8>> {
        let mut out = CursorMut::new();
        Self::write(ctx, &mut out, value)?;
        Ok(out.into_inner())
    }

    fn read_with(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
        policy: UnknownPolicy,
    ) -> Result<Option<PolymorphicValue>> {
        let id = TypeIdentifier::read(input, ctx.config().id_width)?;
        if id.is_null() {
            return Ok(None);
        }

        let capture = policy == UnknownPolicy::Capture
            && ctx.config().framing == Framing::LengthPrefixed;
        if capture && !ctx.registry().contains(id) {
            let len = Self::read_payload_len(ctx, input, id)?;
            let payload = input.read_bytes(len as usize)?.to_vec();
            log::debug!(
                "[polymorphic] kept {} bytes of unknown type id {}",
                payload.len(),
                id
            );
            return Ok(Some(PolymorphicValue::new(UnknownInstance::new(id, payload))));
        }

        let entry = Self::lookup(ctx, input, id)?;
        let value = Self::decode_entry(ctx, input, entry)?;
        Ok(Some(PolymorphicValue {
            discriminant: entry.discriminant(),
            value,
        }))
    }

    fn lookup<'r>(
        ctx: &'r SerializationContext,
        input: &Cursor<'_>,
        id: TypeIdentifier,
    ) -> Result<&'r CodecEntry> {
        ctx.registry().decoder_for(id).map_err(|err| {
            log::debug!(
                "[polymorphic] no decoder for id {} (offset {})",
                id,
                input.offset()
            );
            err
        })
    }

    fn decode_entry(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
        entry: &CodecEntry,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        let limit = ctx.config().max_nesting_depth;
        if !input.try_enter(limit) {
            return Err(Error::NestingTooDeep { limit });
        }
        let result = Self::decode_payload(ctx, input, entry);
        input.leave();
        result
    }

    fn decode_payload(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
        entry: &CodecEntry,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        match ctx.config().framing {
            Framing::Bare => entry.decode(ctx, input),
            Framing::LengthPrefixed => {
                let declared = Self::read_payload_len(ctx, input, entry.id())?;
                let start = input.offset();
                let value = entry.decode(ctx, input)?;
                let consumed = input.offset() - start;
                if consumed != declared as usize {
                    return Err(Error::PayloadLengthMismatch {
                        id: entry.id(),
                        declared,
                        consumed,
                    });
                }
                Ok(value)
            }
        }
    }

    fn read_payload_len(
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
        id: TypeIdentifier,
    ) -> Result<u32> {
        let limit = ctx.config().max_payload_len;
        let len = input.read_u32_be()?;
        if len > limit {
            return Err(Error::PayloadTooLarge {
                id,
                len: len as usize,
                limit,
            });
        }
        input.check_available(len as usize)?;
        Ok(len)
    }

    fn write_dyn(
        ctx: &SerializationContext,
        out: &mut CursorMut,
        value: &dyn Any,
        discriminant: TypeDiscriminant,
    ) -> Result<()> {
        if let Some(unknown) = value.downcast_ref::<UnknownInstance>() {
            return Self::write_unknown(ctx, out, unknown);
        }

        let entry = ctx.registry().encoder_for(discriminant).map_err(|err| {
            log::warn!(
                "[polymorphic] can't find writer for {}: missing registration",
                discriminant.name()
            );
            err
        })?;

        let limit = ctx.config().max_nesting_depth;
        let outermost = out.depth() == 0;
        if !out.try_enter(limit) {
            return Err(Error::NestingTooDeep { limit });
        }
        let result = Self::write_entry(ctx, out, entry, value);
        out.leave();
        if outermost {
            Self::settle_interns(out, result.is_ok());
        }
        result
    }

    /// Commit the intern definitions of a completed top-level value, or drop
    /// them if the value failed (its bytes never reach the peer).
    fn settle_interns(out: &mut CursorMut, committed: bool) {
        let pending = out.take_pending_interns();
        if committed {
            for intern in &pending {
                intern.apply();
            }
        } else if !pending.is_empty() {
            log::debug!(
                "[intern] dropped {} definition(s) of a failed write",
                pending.len()
            );
        }
    }

    fn write_entry(
        ctx: &SerializationContext,
        out: &mut CursorMut,
        entry: &CodecEntry,
        value: &dyn Any,
    ) -> Result<()> {
        let config = ctx.config();
        entry.id().write(out, config.id_width)?;
        match config.framing {
            Framing::Bare => entry.encode(ctx, out, value),
            Framing::LengthPrefixed => {
                let at = out.reserve_u32()?;
                let start = out.offset();
                entry.encode(ctx, out, value)?;
                let len = out.offset() - start;
                let declared = Self::checked_payload_len(ctx, entry.id(), len)?;
                out.patch_u32_be(at, declared)?;
                Ok(())
            }
        }
    }

    fn write_unknown(
        ctx: &SerializationContext,
        out: &mut CursorMut,
        unknown: &UnknownInstance,
    ) -> Result<()> {
        let config = ctx.config();
        if !unknown.id.fits(config.id_width) || unknown.id.is_null() {
            return Err(Error::IdOutOfRange {
                id: unknown.id,
                width: config.id_width,
                type_name: std::any::type_name::<UnknownInstance>(),
            });
        }
        unknown.id.write(out, config.id_width)?;
        if config.framing == Framing::LengthPrefixed {
            let declared = Self::checked_payload_len(ctx, unknown.id, unknown.payload.len())?;
            out.write_u32_be(declared)?;
        }
        out.write_bytes(&unknown.payload)?;
        Ok(())
    }

    fn checked_payload_len(
        ctx: &SerializationContext,
        id: TypeIdentifier,
        len: usize,
    ) -> Result<u32> {
        let limit = ctx.config().max_payload_len;
        u32::try_from(len)
            .ok()
            .filter(|&len| len <= limit)
            .ok_or(Error::PayloadTooLarge { id, len, limit })
    }
}
