// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry: identifier -> decoder, concrete type -> (identifier, encoder).
//!
//! # Lifecycle
//!
//! ```text
//! RegistryBuilder::new(config)          startup, single thread
//!   .register::<T>(id, decode, encode)  generated registration calls
//!   .build()                            -> CodecRegistry (immutable)
//! Arc<CodecRegistry>                    shared by every session, no locks
//! ```
//!
//! Both mappings index the same entry list, so every identifier has exactly
//! one owning type and every registered type is readable back (the mapping is
//! a bijection over registered types by construction).
//!
//! # Thread Safety
//!
//! `CodecRegistry` is `Send + Sync` and never mutated after `build()`. Moving
//! it into an `Arc` (or installing it with [`install_global`]) publishes the
//! fully built tables to every thread that later obtains the handle.

mod builder;


pub use builder::RegistryBuilder;

use crate::config::CodecConfig;
use crate::context::SerializationContext;
use crate::ser::{Cursor, CursorMut};
use crate::type_id::TypeIdentifier;
use crate::{Error, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub(crate) type BoxedValue = Box<dyn Any + Send + Sync>;

pub(crate) type DecodeFn =
    dyn Fn(&SerializationContext, &mut Cursor<'_>) -> Result<BoxedValue> + Send + Sync;

pub(crate) type EncodeFn =
    dyn Fn(&SerializationContext, &mut CursorMut, &dyn Any) -> Result<()> + Send + Sync;

/// Concrete type of a value: `std::any::TypeId` plus its name for diagnostics.
///
/// Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct TypeDiscriminant {
    type_id: TypeId,
    name: &'static str,
}

impl TypeDiscriminant {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeDiscriminant {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeDiscriminant {}

impl std::hash::Hash for TypeDiscriminant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeDiscriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDiscriminant({})", self.name)
    }
}

/// One registered type: its identifier, its discriminant and both codec functions.
pub struct CodecEntry {
    id: TypeIdentifier,
    discriminant: TypeDiscriminant,
    decode: Box<DecodeFn>,
    encode: Box<EncodeFn>,
}

impl CodecEntry {
    pub fn id(&self) -> TypeIdentifier {
        self.id
    }

    pub fn discriminant(&self) -> TypeDiscriminant {
        self.discriminant
    }

    pub fn type_name(&self) -> &'static str {
        self.discriminant.name
    }

    /// Run the decoder on the payload that follows the identifier.
    pub fn decode(
        &self,
        ctx: &SerializationContext,
        input: &mut Cursor<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        (self.decode)(ctx, input)
    }

    /// Run the encoder; `value` must be of this entry's type.
    pub fn encode(
        &self,
        ctx: &SerializationContext,
        out: &mut CursorMut,
        value: &dyn Any,
    ) -> Result<()> {
        (self.encode)(ctx, out, value)
    }
}

impl fmt::Debug for CodecEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecEntry")
            .field("id", &self.id)
            .field("type", &self.discriminant.name)
            .finish()
    }
}

/// Frozen registry produced by [`RegistryBuilder::build`].
pub struct CodecRegistry {
    config: CodecConfig,
    entries: Vec<CodecEntry>,
    by_id: HashMap<TypeIdentifier, usize>,
    by_type: HashMap<TypeId, usize>,
}

impl CodecRegistry {
    /// Builder with [`CodecConfig::default`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new(CodecConfig::default())
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decoder bound to `id`, or [`Error::UnknownTypeId`].
    pub fn decoder_for(&self, id: TypeIdentifier) -> Result<&CodecEntry> {
        self.by_id
            .get(&id)
            .map(|&index| &self.entries[index])
            .ok_or(Error::UnknownTypeId { id })
    }

    /// Identifier and encoder bound to a concrete type, or [`Error::UnregisteredType`].
    pub fn encoder_for(&self, discriminant: TypeDiscriminant) -> Result<&CodecEntry> {
        self.entry_by_type_id(discriminant.type_id)
            .ok_or(Error::UnregisteredType {
                type_name: discriminant.name,
            })
    }

    pub fn entry_for<T: ?Sized + 'static>(&self) -> Result<&CodecEntry> {
        self.encoder_for(TypeDiscriminant::of::<T>())
    }

    pub(crate) fn entry_by_type_id(&self, type_id: TypeId) -> Option<&CodecEntry> {
        self.by_type.get(&type_id).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, id: TypeIdentifier) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = TypeIdentifier> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CodecEntry> + '_ {
        self.entries.iter()
    }

    /// Convenience: wrap in an `Arc` for sharing across sessions.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("config", &self.config)
            .field("entries", &self.entries)
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<CodecRegistry>> = OnceLock::new();

/// Publish `registry` as the process-wide registry. Succeeds once per process.
pub fn install_global(registry: Arc<CodecRegistry>) -> Result<()> {
    let count = registry.len();
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| Error::RegistryAlreadyInstalled)?;
    log::debug!("[registry] global registry installed ({} types)", count);
    Ok(())
}

/// The registry installed by [`install_global`].
pub fn global() -> Result<Arc<CodecRegistry>> {
    GLOBAL_REGISTRY
        .get()
        .cloned()
        .ok_or(Error::RegistryNotInstalled)
}
