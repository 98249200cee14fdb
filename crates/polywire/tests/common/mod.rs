// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared model types for integration tests.

#![allow(dead_code)]

use polywire::ser::{read_list, write_list};
use polywire::{
    CodecConfig, CodecRegistry, Cursor, CursorMut, IdWidth, Marshaller, Polymorphic,
    PolymorphicValue, RegistryBuilder, Result, SerializationContext, SerializersOwner,
    TypeIdentifier,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct A(pub i32);

#[derive(Debug, Clone, PartialEq)]
pub struct B(pub String);

pub fn register_ab(builder: &mut RegistryBuilder) -> Result<()> {
    builder.register::<A, _, _>(
        TypeIdentifier::from_raw(0x01),
        |_, input| Ok(A(input.read_i32_be()?)),
        |_, out, value| Ok(out.write_i32_be(value.0)?),
    )?;
    builder.register::<B, _, _>(
        TypeIdentifier::from_raw(0x02),
        |_, input| Ok(B(input.read_string()?)),
        |_, out, value| Ok(out.write_string(&value.0)?),
    )?;
    Ok(())
}

/// Registry with `A = 0x01` and `B = 0x02` over one-byte identifiers.
pub fn ab_registry(config: CodecConfig) -> Arc<CodecRegistry> {
    let mut builder = RegistryBuilder::new(config.with_id_width(IdWidth::U8));
    register_ab(&mut builder).expect("A and B register");
    builder.build().expect("valid config").into_shared()
}

/// A node of a document tree: children are polymorphic.
#[derive(Debug)]
pub struct Node {
    pub tag: String,
    pub children: Vec<Option<PolymorphicValue>>,
}

impl Marshaller for Node {
    const TYPE_NAME: &'static str = "demo.document.Node";

    fn read(ctx: &SerializationContext, input: &mut Cursor<'_>) -> Result<Self> {
        let tag = ctx.read_interned(input, "tags", |_, input| Ok(input.read_string()?))?;
        let children = read_list(input, |input| Polymorphic::read(ctx, input))?;
        Ok(Node { tag, children })
    }

    fn write(&self, ctx: &SerializationContext, out: &mut CursorMut) -> Result<()> {
        ctx.write_interned(out, "tags", &self.tag, |_, out, tag| {
            Ok(out.write_string(tag)?)
        })?;
        write_list(out, self.children.as_slice(), |out, child| {
            Polymorphic::write(ctx, out, child.as_ref())
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text(pub String);

impl Marshaller for Text {
    const TYPE_NAME: &'static str = "demo.document.Text";

    fn read(_: &SerializationContext, input: &mut Cursor<'_>) -> Result<Self> {
        Ok(Text(input.read_string()?))
    }

    fn write(&self, _: &SerializationContext, out: &mut CursorMut) -> Result<()> {
        Ok(out.write_string(&self.0)?)
    }
}

pub struct DocumentModel;

impl SerializersOwner for DocumentModel {
    fn register_serializers(builder: &mut RegistryBuilder) -> Result<()> {
        builder.register_marshaller::<Node>()?;
        builder.register_marshaller::<Text>()?;
        Ok(())
    }
}

pub fn document_registry(config: CodecConfig) -> Arc<CodecRegistry> {
    let mut builder = RegistryBuilder::new(config);
    builder
        .with_builtins()
        .expect("builtins register")
        .register_owner::<DocumentModel>()
        .expect("document model registers");
    builder.build().expect("valid config").into_shared()
}

pub fn leaf(text: &str) -> Option<PolymorphicValue> {
    Some(PolymorphicValue::new(Text(text.to_string())))
}

pub fn node(tag: &str, children: Vec<Option<PolymorphicValue>>) -> Node {
    Node {
        tag: tag.to_string(),
        children,
    }
}
