// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! A [`CodecConfig`] is fixed when a registry is built: both peers of a
//! session must agree on the identifier width and the framing mode, otherwise
//! every value after the first is misread.
//!
//! # Environment
//!
//! [`CodecConfig::from_env`] reads:
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `POLYWIRE_ID_WIDTH` | `1`, `2`, `4`, `8` | `8` |
//! | `POLYWIRE_FRAMING` | `bare`, `length-prefixed` | `bare` |
//! | `POLYWIRE_MAX_PAYLOAD` | bytes | 16 MiB |
//! | `POLYWIRE_MAX_DEPTH` | nesting levels | 64 |
//!
//! Absent or unparsable values fall back to the default.

use crate::type_id::IdWidth;
use crate::{Error, Result};

/// Default upper bound for a length-prefixed payload.
pub const DEFAULT_MAX_PAYLOAD_LEN: u32 = 16 * 1024 * 1024;

/// Default limit for polymorphic values nested inside payloads.
pub const DEFAULT_MAX_NESTING_DEPTH: u16 = 64;

/// How a polymorphic payload is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// `type_id payload`. The payload length is known only to its decoder.
    #[default]
    Bare,
    /// `type_id payload_len:u32 payload`. Lets readers carry unknown types through.
    LengthPrefixed,
}

impl Framing {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bare" => Some(Framing::Bare),
            "length-prefixed" | "length_prefixed" | "framed" => Some(Framing::LengthPrefixed),
            _ => None,
        }
    }
}

fn env_parse<T>(key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    std::env::var(key).ok().and_then(|s| parse(&s))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub id_width: IdWidth,
    pub framing: Framing,
    pub max_payload_len: u32,
    pub max_nesting_depth: u16,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            id_width: IdWidth::default(),
            framing: Framing::default(),
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `POLYWIRE_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            id_width: env_parse("POLYWIRE_ID_WIDTH", IdWidth::parse).unwrap_or(defaults.id_width),
            framing: env_parse("POLYWIRE_FRAMING", Framing::parse).unwrap_or(defaults.framing),
            max_payload_len: env_parse("POLYWIRE_MAX_PAYLOAD", |s| s.trim().parse::<u32>().ok())
                .unwrap_or(defaults.max_payload_len),
            max_nesting_depth: env_parse("POLYWIRE_MAX_DEPTH", |s| s.trim().parse::<u16>().ok())
                .unwrap_or(defaults.max_nesting_depth),
        }
    }

    pub fn with_id_width(mut self, width: IdWidth) -> Self {
        self.id_width = width;
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_max_payload_len(mut self, len: u32) -> Self {
        self.max_payload_len = len;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: u16) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_nesting_depth must be at least 1".into(),
            ));
        }
        if self.framing == Framing::LengthPrefixed && self.max_payload_len == 0 {
            return Err(Error::InvalidConfig(
                "max_payload_len must be non-zero with length-prefixed framing".into(),
            ));
        }
        Ok(())
    }
}
