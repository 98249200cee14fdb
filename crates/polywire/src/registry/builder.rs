// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Startup-time registration.

use super::{CodecEntry, CodecRegistry, DecodeFn, EncodeFn, TypeDiscriminant};
use crate::config::CodecConfig;
use crate::context::SerializationContext;
use crate::error::RegistrationConflict;
use crate::marshaller::{Marshaller, SerializersOwner};
use crate::ser::{Cursor, CursorMut};
use crate::type_id::TypeIdentifier;
use crate::{Error, Result};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

/// Mutable registration table. Consumed by [`RegistryBuilder::build`].
///
/// # Example
///
/// ```rust
/// use polywire::{CodecConfig, IdWidth, RegistryBuilder, TypeIdentifier};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(i32);
///
/// let mut builder = RegistryBuilder::new(CodecConfig::new().with_id_width(IdWidth::U8));
/// builder.register::<Celsius, _, _>(
///     TypeIdentifier::from_raw(0x01),
///     |_, input| Ok(Celsius(input.read_i32_be()?)),
///     |_, out, value| Ok(out.write_i32_be(value.0)?),
/// )?;
/// let registry = builder.build()?;
/// assert!(registry.contains(TypeIdentifier::from_raw(0x01)));
/// # Ok::<(), polywire::Error>(())
/// ```
pub struct RegistryBuilder {
    config: CodecConfig,
    entries: Vec<CodecEntry>,
    by_id: HashMap<TypeIdentifier, usize>,
    by_type: HashMap<TypeId, usize>,
    owners: HashSet<TypeId>,
}

impl RegistryBuilder {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            by_id: HashMap::new(),
            by_type: HashMap::new(),
            owners: HashSet::new(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind `id` to `T` with its decode and encode functions.
    ///
    /// Registering the same `(id, T)` pair again is a no-op; the first
    /// functions stay in place.
    ///
    /// # Errors
    ///
    /// - [`Error::ReservedIdentifier`] if `id` is the null sentinel
    /// - [`Error::IdOutOfRange`] if `id` does not fit the configured width
    /// - [`Error::DuplicateRegistration`] if `id` belongs to another type or
    ///   `T` is already bound to another identifier
    pub fn register<T, D, E>(
        &mut self,
        id: TypeIdentifier,
        decode: D,
        encode: E,
    ) -> Result<&mut Self>
    where
        T: Any + Send + Sync,
        D: Fn(&SerializationContext, &mut Cursor<'_>) -> Result<T> + Send + Sync + 'static,
        E: Fn(&SerializationContext, &mut CursorMut, &T) -> Result<()> + Send + Sync + 'static,
    {
        let discriminant = TypeDiscriminant::of::<T>();
        if !self.check_binding(id, discriminant)? {
            log::debug!(
                "[registry] {} already registered with id {}, skipping",
                discriminant.name(),
                id
            );
            return Ok(self);
        }

        log::trace!("[registry] registering type {}, id = {}", discriminant.name(), id);

        let decode: Box<DecodeFn> =
            Box::new(move |ctx: &SerializationContext, input: &mut Cursor<'_>| {
                decode(ctx, input).map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
            });
        let encode: Box<EncodeFn> = Box::new(
            move |ctx: &SerializationContext, out: &mut CursorMut, value: &dyn Any| match value
                .downcast_ref::<T>()
            {
                Some(value) => encode(ctx, out, value),
                None => Err(Error::TypeMismatch {
                    id,
                    expected: std::any::type_name::<T>(),
                    actual: "<value of another type>",
                }),
            },
        );

        let index = self.entries.len();
        self.entries.push(CodecEntry {
            id,
            discriminant,
            decode,
            encode,
        });
        self.by_id.insert(id, index);
        self.by_type.insert(discriminant.type_id(), index);
        Ok(self)
    }

    /// Register a [`Marshaller`] under [`Marshaller::type_identifier`] at the configured width.
    pub fn register_marshaller<M: Marshaller>(&mut self) -> Result<&mut Self> {
        let id = M::type_identifier(self.config.id_width);
        self.register::<M, _, _>(id, M::read, |ctx, out, value| value.write(ctx, out))
    }

    /// Run `O::register_serializers` unless this owner was already registered.
    pub fn register_owner<O: SerializersOwner>(&mut self) -> Result<&mut Self> {
        if self.owners.insert(TypeId::of::<O>()) {
            log::trace!(
                "[registry] REGISTER serializers for {}",
                std::any::type_name::<O>()
            );
            O::register_serializers(self)?;
        }
        Ok(self)
    }

    /// Register the framework marshallers (primitives, strings, arrays).
    pub fn with_builtins(&mut self) -> Result<&mut Self> {
        crate::builtin::register_builtins(self)?;
        Ok(self)
    }

    /// Freeze the table.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn build(self) -> Result<CodecRegistry> {
        self.config.validate()?;
        log::debug!(
            "[registry] built with {} types (ids {}, {:?} framing)",
            self.entries.len(),
            self.config.id_width,
            self.config.framing
        );
        Ok(CodecRegistry {
            config: self.config,
            entries: self.entries,
            by_id: self.by_id,
            by_type: self.by_type,
        })
    }

    /// `Ok(true)` for a new binding, `Ok(false)` for an identical re-registration.
    fn check_binding(&self, id: TypeIdentifier, discriminant: TypeDiscriminant) -> Result<bool> {
        if id.is_null() {
            return Err(Error::ReservedIdentifier {
                type_name: discriminant.name(),
            });
        }
        if !id.fits(self.config.id_width) {
            return Err(Error::IdOutOfRange {
                id,
                width: self.config.id_width,
                type_name: discriminant.name(),
            });
        }
        let by_id = self.by_id.get(&id).copied();
        let by_type = self.by_type.get(&discriminant.type_id()).copied();
        match (by_id, by_type) {
            (Some(a), Some(b)) if a == b => Ok(false),
            (Some(a), _) => Err(Error::DuplicateRegistration {
                id,
                type_name: discriminant.name(),
                conflict: RegistrationConflict::IdTaken {
                    owner: self.entries[a].type_name(),
                },
            }),
            (None, Some(b)) => Err(Error::DuplicateRegistration {
                id,
                type_name: discriminant.name(),
                conflict: RegistrationConflict::TypeBound {
                    existing: self.entries[b].id(),
                },
            }),
            (None, None) => Ok(true),
        }
    }
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("config", &self.config)
            .field("entries", &self.entries)
            .field("owners", &self.owners.len())
            .finish()
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}
