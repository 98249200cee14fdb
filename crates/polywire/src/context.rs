// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session-scoped serialization context.
//!
//! A [`SerializationContext`] is created by the session that owns a stream
//! and handed by reference to every encode/decode call. It carries the shared
//! registry and optional intern roots (per-session tables that replace
//! repeated values with small integer ids).
//!
//! # Interning wire format
//!
//! ```text
//! interned  ::= ref_tag | (def_tag value)
//! ref_tag   ::= i32be >= 0          value previously defined by the writer
//! def_tag   ::= i32be < 0           defines id !def_tag, value follows
//! ```
//!
//! Ids are assigned by the writing side and sent explicitly, so concurrent
//! writers sharing one root never disagree with the reader about numbering.
//!
//! A definition written inside a polymorphic value stays pending on the
//! output cursor (visible to later references in the same value) and is
//! committed only when the outermost [`Polymorphic::write`] succeeds. A
//! failed write leaves the root as it was.
//!
//! [`Polymorphic::write`]: crate::Polymorphic::write

use crate::config::CodecConfig;
use crate::registry::{self, CodecRegistry};
use crate::ser::{Cursor, CursorMut};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Values that can live in an [`InternRoot`].
pub trait Internable: Eq + Hash + Clone + Send + Sync + 'static {}

impl<T: Eq + Hash + Clone + Send + Sync + 'static> Internable for T {}

/// Intern definition written to a cursor but not yet committed to its root.
#[derive(Clone)]
pub(crate) struct PendingIntern {
    root: Arc<dyn Any + Send + Sync>,
    value: Arc<dyn Any + Send + Sync>,
    id: i32,
    apply: fn(&PendingIntern),
}

impl PendingIntern {
    fn new<T: Internable>(root: Arc<dyn Any + Send + Sync>, value: T, id: i32) -> Self {
        Self {
            root,
            value: Arc::new(value),
            id,
            apply: Self::commit_typed::<T>,
        }
    }

    fn commit_typed<T: Internable>(&self) {
        let root = (*self.root).downcast_ref::<InternRoot<T>>();
        let value = (*self.value).downcast_ref::<T>();
        if let (Some(root), Some(value)) = (root, value) {
            root.commit(value.clone(), self.id);
        }
    }

    /// Commit to the root.
    pub(crate) fn apply(&self) {
        (self.apply)(self);
    }

    fn matches<T: Internable>(&self, root: &Arc<dyn Any + Send + Sync>, value: &T) -> bool {
        Arc::ptr_eq(&self.root, root) && (*self.value).downcast_ref::<T>() == Some(value)
    }
}

impl std::fmt::Debug for PendingIntern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingIntern").field("id", &self.id).finish()
    }
}

struct OutgoingTable<T> {
    ids: HashMap<T, i32>,
    next: i32,
}

/// Interning table for one key of a session.
///
/// Outgoing ids (values this side wrote) and incoming ids (values the peer
/// defined) are kept apart: one context may both write and read.
pub struct InternRoot<T> {
    name: String,
    outgoing: Mutex<OutgoingTable<T>>,
    incoming: RwLock<HashMap<i32, T>>,
}

impl<T: Internable> InternRoot<T> {
    fn new(name: String) -> Self {
        Self {
            name,
            outgoing: Mutex::new(OutgoingTable {
                ids: HashMap::new(),
                next: 0,
            }),
            incoming: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id under which this side already sent `value`.
    pub fn try_get_interned(&self, value: &T) -> Option<i32> {
        self.outgoing.lock().ids.get(value).copied()
    }

    /// Value the peer defined under `id`.
    pub fn un_intern(&self, id: i32) -> Option<T> {
        self.incoming.read().get(&id).cloned()
    }

    pub fn outgoing_len(&self) -> usize {
        self.outgoing.lock().ids.len()
    }

    pub fn incoming_len(&self) -> usize {
        self.incoming.read().len()
    }

    /// Forget every interned value (session reset).
    pub fn clear(&self) {
        let mut outgoing = self.outgoing.lock();
        outgoing.ids.clear();
        outgoing.next = 0;
        self.incoming.write().clear();
    }

    fn reserve_id(&self) -> Result<i32> {
        let mut outgoing = self.outgoing.lock();
        let id = outgoing.next;
        outgoing.next = id.checked_add(1).ok_or_else(|| Error::InternTableFull {
            root: self.name.clone(),
        })?;
        Ok(id)
    }

    fn commit(&self, value: T, id: i32) {
        self.outgoing.lock().ids.entry(value).or_insert(id);
    }

    fn accept(&self, id: i32, value: T) {
        self.incoming.write().insert(id, value);
    }
}

/// Session-scoped state passed to every codec call.
#[derive(Clone)]
pub struct SerializationContext {
    registry: Arc<CodecRegistry>,
    intern_roots: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl SerializationContext {
    pub fn new(registry: Arc<CodecRegistry>) -> Self {
        Self {
            registry,
            intern_roots: HashMap::new(),
        }
    }

    /// Context over the registry published with [`registry::install_global`].
    pub fn from_global() -> Result<Self> {
        registry::global().map(Self::new)
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        self.registry.config()
    }

    /// Add an intern root for values of `T` under `key`. Replaces an existing root.
    pub fn with_intern_root<T: Internable>(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        let root: Arc<dyn Any + Send + Sync> = Arc::new(InternRoot::<T>::new(key.clone()));
        self.intern_roots.insert(key, root);
        self
    }

    /// The root registered under `key`, if any.
    ///
    /// # Errors
    ///
    /// [`Error::InternRootMismatch`] if the root holds values of another type.
    pub fn intern_root<T: Internable>(&self, key: &str) -> Result<Option<&InternRoot<T>>> {
        match self.intern_roots.get(key) {
            None => Ok(None),
            Some(root) => Self::downcast_root(key, root).map(Some),
        }
    }

    fn downcast_root<'r, T: Internable>(
        key: &str,
        root: &'r Arc<dyn Any + Send + Sync>,
    ) -> Result<&'r InternRoot<T>> {
        (**root)
            .downcast_ref::<InternRoot<T>>()
            .ok_or_else(|| Error::InternRootMismatch {
                root: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Write `value` through the intern root `key`, or directly if there is none.
    pub fn write_interned<T, F>(
        &self,
        out: &mut CursorMut,
        key: &str,
        value: &T,
        write_value: F,
    ) -> Result<()>
    where
        T: Internable,
        F: FnOnce(&SerializationContext, &mut CursorMut, &T) -> Result<()>,
    {
        let Some(shared) = self.intern_roots.get(key) else {
            return write_value(self, out, value);
        };
        let root = Self::downcast_root::<T>(key, shared)?;
        let known = root.try_get_interned(value).or_else(|| {
            out.pending_interns()
                .iter()
                .find(|pending| pending.matches(shared, value))
                .map(|pending| pending.id)
        });
        if let Some(id) = known {
            out.write_i32_be(id)?;
            return Ok(());
        }

        let id = root.reserve_id()?;
        out.write_i32_be(!id)?;
        write_value(self, out, value)?;
        if out.depth() == 0 {
            root.commit(value.clone(), id);
        } else {
            out.defer_intern(PendingIntern::new(Arc::clone(shared), value.clone(), id));
        }
        log::trace!("[intern] root '{}' defined id {}", key, id);
        Ok(())
    }

    /// Read a value written by [`Self::write_interned`].
    pub fn read_interned<'a, T, F>(
        &self,
        input: &mut Cursor<'a>,
        key: &str,
        read_value: F,
    ) -> Result<T>
    where
        T: Internable,
        F: FnOnce(&SerializationContext, &mut Cursor<'a>) -> Result<T>,
    {
        let Some(root) = self.intern_root::<T>(key)? else {
            return read_value(self, input);
        };
        let tag = input.read_i32_be()?;
        if tag >= 0 {
            return root.un_intern(tag).ok_or_else(|| Error::UnknownInternId {
                root: key.to_string(),
                id: tag,
            });
        }

        let id = !tag;
        let value = read_value(self, input)?;
        root.accept(id, value.clone());
        Ok(value)
    }
}

impl std::fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut roots: Vec<&str> = self.intern_roots.keys().map(String::as_str).collect();
        roots.sort_unstable();
        f.debug_struct("SerializationContext")
            .field("types", &self.registry.len())
            .field("intern_roots", &roots)
            .finish()
    }
}
