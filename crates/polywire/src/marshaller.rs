// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Traits implemented by generated model code.
//!
//! A generator emits one [`Marshaller`] impl per polymorphic model type and
//! one [`SerializersOwner`] per generated root that registers them all.

use crate::context::SerializationContext;
use crate::registry::RegistryBuilder;
use crate::ser::{Cursor, CursorMut};
use crate::type_id::{IdWidth, TypeIdentifier};
use crate::Result;

/// A type that knows its wire name and how to read/write its payload.
pub trait Marshaller: Sized + Send + Sync + 'static {
    /// Fully qualified name shared by every peer (input to the id derivation).
    const TYPE_NAME: &'static str;

    /// Identifier at `width`. Override to pin a predefined id.
    fn type_identifier(width: IdWidth) -> TypeIdentifier {
        TypeIdentifier::from_type_name(Self::TYPE_NAME, width)
    }

    fn read(ctx: &SerializationContext, input: &mut Cursor<'_>) -> Result<Self>;

    fn write(&self, ctx: &SerializationContext, out: &mut CursorMut) -> Result<()>;
}

/// A group of registrations, applied at most once per builder.
pub trait SerializersOwner: 'static {
    fn register_serializers(builder: &mut RegistryBuilder) -> Result<()>;
}
