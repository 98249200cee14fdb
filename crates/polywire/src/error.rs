// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors returned by polywire operations.
//!
//! Nothing in this crate retries or swallows an error. Decode-side failures
//! (`UnknownTypeId`, `TypeMismatch`, stream errors in the middle of a
//! payload) leave the input at an indeterminate offset: the session that owns
//! the stream must be reset rather than resynchronised.

use crate::ser::SerError;
use crate::type_id::{IdWidth, TypeIdentifier};

/// Which side of the identifier/type bijection a registration collided with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationConflict {
    /// The identifier already belongs to another type.
    IdTaken { owner: &'static str },
    /// The type is already registered under another identifier.
    TypeBound { existing: TypeIdentifier },
}

/// Errors returned by polywire.
///
/// # Example
///
/// ```rust
/// use polywire::{CodecRegistry, Cursor, Error, Polymorphic, SerializationContext};
/// use std::sync::Arc;
///
/// let ctx = SerializationContext::new(Arc::new(CodecRegistry::builder().build()?));
/// let bytes = [0, 0, 0, 0, 0, 0, 0, 0x2A];
/// match Polymorphic::read(&ctx, &mut Cursor::new(&bytes)) {
///     Err(Error::UnknownTypeId { id }) => assert_eq!(id.value(), 0x2A),
///     other => panic!("expected UnknownTypeId, got {:?}", other),
/// }
/// # Ok::<(), polywire::Error>(())
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Stream Errors
    // ========================================================================
    /// Underlying stream failed while reading/writing an identifier or payload.
    Stream(SerError),

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// Identifier read from the stream has no registered decoder.
    UnknownTypeId { id: TypeIdentifier },
    /// Value's concrete type was never registered (missing registration).
    UnregisteredType { type_name: &'static str },
    /// Identifier is registered for a different type than the caller expects.
    TypeMismatch {
        id: TypeIdentifier,
        expected: &'static str,
        actual: &'static str,
    },
    /// A non-null value was required but the sentinel was found (or `None` was passed).
    NullValue,
    /// Polymorphic values nested deeper than the configured limit.
    NestingTooDeep { limit: u16 },
    /// Decoder consumed a different number of bytes than the length prefix announced.
    PayloadLengthMismatch {
        id: TypeIdentifier,
        declared: u32,
        consumed: usize,
    },
    /// Length prefix exceeds the configured payload limit.
    PayloadTooLarge {
        id: TypeIdentifier,
        len: usize,
        limit: u32,
    },

    // ========================================================================
    // Registration Errors
    // ========================================================================
    /// Identifier or type registered twice with different partners.
    DuplicateRegistration {
        id: TypeIdentifier,
        type_name: &'static str,
        conflict: RegistrationConflict,
    },
    /// Attempt to bind the null sentinel to a type.
    ReservedIdentifier { type_name: &'static str },
    /// Identifier does not fit the configured wire width.
    IdOutOfRange {
        id: TypeIdentifier,
        width: IdWidth,
        type_name: &'static str,
    },
    /// The process-wide registry was already installed.
    RegistryAlreadyInstalled,
    /// The process-wide registry has not been installed yet.
    RegistryNotInstalled,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    InvalidConfig(String),

    // ========================================================================
    // Interning Errors
    // ========================================================================
    /// Stream references an interned id the peer never defined.
    UnknownInternId { root: String, id: i32 },
    /// Intern root exists but holds values of another type.
    InternRootMismatch {
        root: String,
        expected: &'static str,
    },
    /// Intern root ran out of ids.
    InternTableFull { root: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Stream(e) => write!(f, "Stream failure: {}", e),
            Error::UnknownTypeId { id } => write!(
                f,
                "Unknown type id {}: no decoder registered \
                 (was the peer's registration generated for this build?)",
                id
            ),
            Error::UnregisteredType { type_name } => write!(
                f,
                "Type {} is not registered: missing registration call",
                type_name
            ),
            Error::TypeMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "Type mismatch for id {}: expected {}, registered as {}",
                id, expected, actual
            ),
            Error::NullValue => write!(f, "Non-null value expected"),
            Error::NestingTooDeep { limit } => {
                write!(f, "Polymorphic nesting deeper than {} levels", limit)
            }
            Error::PayloadLengthMismatch {
                id,
                declared,
                consumed,
            } => write!(
                f,
                "Payload of id {} declared {} bytes, decoder consumed {}",
                id, declared, consumed
            ),
            Error::PayloadTooLarge { id, len, limit } => write!(
                f,
                "Payload of id {} is {} bytes, limit is {}",
                id, len, limit
            ),
            Error::DuplicateRegistration {
                id,
                type_name,
                conflict,
            } => match conflict {
                RegistrationConflict::IdTaken { owner } => write!(
                    f,
                    "Can't register {} with id {}: already registered for {}",
                    type_name, id, owner
                ),
                RegistrationConflict::TypeBound { existing } => write!(
                    f,
                    "Can't register {} with id {}: already registered with id {}",
                    type_name, id, existing
                ),
            },
            Error::ReservedIdentifier { type_name } => write!(
                f,
                "Can't register {} with the null sentinel id",
                type_name
            ),
            Error::IdOutOfRange {
                id,
                width,
                type_name,
            } => write!(
                f,
                "Id {} of {} does not fit in {}",
                id, type_name, width
            ),
            Error::RegistryAlreadyInstalled => write!(f, "Global codec registry already installed"),
            Error::RegistryNotInstalled => write!(f, "Global codec registry not installed"),
            Error::InvalidConfig(msg) => write!(f, "Invalid codec config: {}", msg),
            Error::UnknownInternId { root, id } => {
                write!(f, "Intern root '{}' has no value for id {}", root, id)
            }
            Error::InternRootMismatch { root, expected } => write!(
                f,
                "Intern root '{}' does not hold values of type {}",
                root, expected
            ),
            Error::InternTableFull { root } => write!(f, "Intern root '{}' is full", root),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Stream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SerError> for Error {
    fn from(e: SerError) -> Self {
        Error::Stream(e)
    }
}

/// Convenient alias for results using the crate [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
