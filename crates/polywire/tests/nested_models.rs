// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Generated-model style usage: a document tree whose children are
// polymorphic, tags interned per session, and relays forwarding types
// they were never given.

mod common;

use common::{document_registry, leaf, node, Node, Text};
use polywire::{
    CodecConfig, Cursor, CursorMut, Error, Framing, Polymorphic, PolymorphicValue, RegistryBuilder,
    SerializationContext, UnknownInstance,
};

fn session(config: CodecConfig) -> SerializationContext {
    SerializationContext::new(document_registry(config)).with_intern_root::<String>("tags")
}

fn sample_tree() -> Node {
    node(
        "section",
        vec![
            leaf("intro"),
            None,
            Some(PolymorphicValue::new(node(
                "section",
                vec![leaf("nested"), Some(PolymorphicValue::new(7i32))],
            ))),
            Some(PolymorphicValue::new(vec![1.5f64, -0.5])),
        ],
    )
}

fn assert_sample_tree(tree: &Node) {
    assert_eq!(tree.tag, "section");
    assert_eq!(tree.children.len(), 4);
    assert_eq!(
        tree.children[0].as_ref().and_then(|c| c.downcast_ref::<Text>()),
        Some(&Text("intro".into()))
    );
    assert!(tree.children[1].is_none());

    let inner = tree.children[2]
        .as_ref()
        .and_then(|c| c.downcast_ref::<Node>())
        .expect("third child is a Node");
    assert_eq!(inner.tag, "section");
    assert_eq!(
        inner.children[1].as_ref().and_then(|c| c.downcast_ref::<i32>()),
        Some(&7)
    );
    assert_eq!(
        tree.children[3]
            .as_ref()
            .and_then(|c| c.downcast_ref::<Vec<f64>>()),
        Some(&vec![1.5, -0.5])
    );
}

#[test]
fn document_tree_roundtrip() {
    for framing in [Framing::Bare, Framing::LengthPrefixed] {
        let writer = session(CodecConfig::new().with_framing(framing));
        let reader = session(CodecConfig::new().with_framing(framing));

        let mut out = CursorMut::new();
        Polymorphic::write(&writer, &mut out, Some(&sample_tree())).expect("write tree");
        let bytes = out.into_inner();

        let mut input = Cursor::new(&bytes);
        let tree = Polymorphic::read_as::<Node>(&reader, &mut input)
            .expect("read tree")
            .expect("tree present");
        assert!(input.is_eof());
        assert_sample_tree(&tree);
    }
}

#[test]
fn repeated_tags_are_interned() {
    let writer = session(CodecConfig::new());
    let reader = session(CodecConfig::new());

    let mut out = CursorMut::new();
    Polymorphic::write(&writer, &mut out, Some(&sample_tree())).expect("first write");
    let first_len = out.len();
    Polymorphic::write(&writer, &mut out, Some(&sample_tree())).expect("second write");
    // The first copy defined "section" once (tag, length, 7 bytes); the
    // second copy only references it.
    assert_eq!(out.len() - first_len, first_len - (4 + 7));

    let tags = writer
        .intern_root::<String>("tags")
        .expect("root type matches")
        .expect("root exists");
    assert_eq!(tags.outgoing_len(), 1);

    let bytes = out.into_inner();
    let mut input = Cursor::new(&bytes);
    for _ in 0..2 {
        let tree = Polymorphic::read_as::<Node>(&reader, &mut input)
            .expect("read tree")
            .expect("tree present");
        assert_sample_tree(&tree);
    }
}

#[test]
fn deep_tree_hits_nesting_limit() {
    let config = CodecConfig::new().with_max_nesting_depth(8);
    let ctx = session(config.clone());

    let mut tree = node("leaf", vec![]);
    for _ in 0..7 {
        tree = node("wrap", vec![Some(PolymorphicValue::new(tree))]);
    }
    let bytes = Polymorphic::to_bytes(&ctx, Some(&tree)).expect("depth 8 fits");
    let back = Polymorphic::read_required(&session(config.clone()), &mut Cursor::new(&bytes))
        .expect("depth 8 reads");
    assert!(back.is::<Node>());

    let deeper = node("wrap", vec![Some(PolymorphicValue::new(tree))]);
    let mut out = CursorMut::new();
    assert!(matches!(
        Polymorphic::write(&ctx, &mut out, Some(&deeper)),
        Err(Error::NestingTooDeep { limit: 8 })
    ));
    assert_eq!(out.depth(), 0);
}

#[test]
fn relay_forwards_unknown_types() {
    let config = CodecConfig::new().with_framing(Framing::LengthPrefixed);
    let origin = session(config.clone());

    // The relay knows the builtins only; the document model is foreign to it.
    let mut relay_builder = RegistryBuilder::new(config.clone());
    relay_builder.with_builtins().expect("builtins register");
    let relay =
        SerializationContext::new(relay_builder.build().expect("valid config").into_shared());

    let mut out = CursorMut::new();
    Polymorphic::write(&origin, &mut out, Some(&Text("hello".into()))).expect("write text");
    Polymorphic::write(&origin, &mut out, Some(&42u16)).expect("write u16");
    let upstream = out.into_inner();

    let mut input = Cursor::new(&upstream);
    let first = Polymorphic::read_or_unknown(&relay, &mut input)
        .expect("relay read")
        .expect("value present");
    let second = Polymorphic::read_or_unknown(&relay, &mut input)
        .expect("relay read")
        .expect("value present");
    assert!(first.is::<UnknownInstance>());
    assert_eq!(second.downcast_ref::<u16>(), Some(&42));

    let mut forwarded = CursorMut::new();
    Polymorphic::write(&relay, &mut forwarded, Some(&first)).expect("forward unknown");
    Polymorphic::write(&relay, &mut forwarded, Some(&second)).expect("forward u16");
    assert_eq!(forwarded.as_slice(), upstream.as_slice());

    let downstream = session(config);
    let bytes = forwarded.into_inner();
    let text = Polymorphic::read_as::<Text>(&downstream, &mut Cursor::new(&bytes))
        .expect("downstream read")
        .expect("value present");
    assert_eq!(text, Text("hello".into()));
}

#[test]
fn failed_write_leaves_tags_uncommitted() {
    struct NotRegistered;

    let writer = session(CodecConfig::new());
    let reader = session(CodecConfig::new());
    let tags = writer
        .intern_root::<String>("tags")
        .expect("root type matches")
        .expect("root exists");

    // The tag definition is written before the unregistered child fails;
    // the whole message is discarded.
    let broken = node("section", vec![Some(PolymorphicValue::new(NotRegistered))]);
    let mut discarded = CursorMut::new();
    assert!(matches!(
        Polymorphic::write(&writer, &mut discarded, Some(&broken)),
        Err(Error::UnregisteredType { .. })
    ));
    assert_eq!(tags.outgoing_len(), 0);

    // Same for a message that runs out of space after its tag (8 + 15
    // bytes) and child count are written.
    let mut full = CursorMut::with_limit(30);
    assert!(matches!(
        Polymorphic::write(&writer, &mut full, Some(&sample_tree())),
        Err(Error::Stream(_))
    ));
    assert_eq!(tags.outgoing_len(), 0);

    // The next message must define the tag again, not reference it.
    let mut out = CursorMut::new();
    Polymorphic::write(&writer, &mut out, Some(&node("section", vec![])))
        .expect("write should succeed");
    assert_eq!(tags.outgoing_len(), 1);

    let bytes = out.into_inner();
    let tree = Polymorphic::read_as::<Node>(&reader, &mut Cursor::new(&bytes))
        .expect("reader knows every tag it is sent")
        .expect("tree present");
    assert_eq!(tree.tag, "section");
    assert!(tree.children.is_empty());
}
