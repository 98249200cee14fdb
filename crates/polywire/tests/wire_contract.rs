// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Byte-exact wire contract of polymorphic dispatch over one-byte identifiers:
// A = 0x01 (i32 payload), B = 0x02 (string payload), NULL = 0x00.

mod common;

use common::{ab_registry, A, B};
use polywire::{
    CodecConfig, Cursor, CursorMut, Error, Framing, IdWidth, Polymorphic, SerializationContext,
    TypeIdentifier,
};

fn bare() -> SerializationContext {
    SerializationContext::new(ab_registry(CodecConfig::new()))
}

#[test]
fn write_a_42() {
    let ctx = bare();
    let mut out = CursorMut::new();
    Polymorphic::write(&ctx, &mut out, Some(&A(42))).expect("write should succeed");
    assert_eq!(out.as_slice(), &[0x01, 0x00, 0x00, 0x00, 0x2A]);
}

#[test]
fn read_a_42() {
    let ctx = bare();
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x2A];
    let mut input = Cursor::new(&bytes);
    let value = Polymorphic::read(&ctx, &mut input)
        .expect("read should succeed")
        .expect("value present");
    assert_eq!(value.downcast::<A>().expect("decoded an A"), A(42));
    assert!(input.is_eof());
}

#[test]
fn null_roundtrip() {
    let ctx = bare();
    let mut out = CursorMut::new();
    Polymorphic::write::<A>(&ctx, &mut out, None).expect("write should succeed");
    assert_eq!(out.as_slice(), &[0x00]);

    let bytes = out.into_inner();
    let mut input = Cursor::new(&bytes);
    assert!(Polymorphic::read(&ctx, &mut input)
        .expect("read should succeed")
        .is_none());
    assert_eq!(input.offset(), 1);
}

#[test]
fn unknown_id_consumes_exactly_the_identifier() {
    let ctx = bare();
    let bytes = [0x7F, 0x01, 0x02, 0x03];
    let mut input = Cursor::new(&bytes);
    match Polymorphic::read(&ctx, &mut input) {
        Err(Error::UnknownTypeId { id }) => assert_eq!(id, TypeIdentifier::from_raw(0x7F)),
        other => panic!("expected UnknownTypeId, got {:?}", other),
    }
    assert_eq!(input.offset(), 1);
}

#[test]
fn unregistered_type_writes_nothing() {
    struct C;
    let ctx = bare();
    let mut out = CursorMut::new();
    match Polymorphic::write(&ctx, &mut out, Some(&C)) {
        Err(Error::UnregisteredType { type_name }) => assert!(type_name.ends_with("C")),
        other => panic!("expected UnregisteredType, got {:?}", other),
    }
    assert!(out.is_empty());
}

#[test]
fn sequence_of_mixed_values() {
    let ctx = bare();
    let mut out = CursorMut::new();
    Polymorphic::write(&ctx, &mut out, Some(&B("hi".into()))).expect("write B");
    Polymorphic::write::<A>(&ctx, &mut out, None).expect("write null");
    Polymorphic::write(&ctx, &mut out, Some(&A(-2))).expect("write A");
    assert_eq!(
        out.as_slice(),
        &[0x02, 0, 0, 0, 2, b'h', b'i', 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFE]
    );

    let bytes = out.into_inner();
    let mut input = Cursor::new(&bytes);
    assert_eq!(
        Polymorphic::read_as::<B>(&ctx, &mut input).expect("read B"),
        Some(B("hi".into()))
    );
    assert_eq!(Polymorphic::read_as::<A>(&ctx, &mut input).expect("read null"), None);
    assert_eq!(
        Polymorphic::read_as::<A>(&ctx, &mut input).expect("read A"),
        Some(A(-2))
    );
    assert!(input.is_eof());
}

#[test]
fn truncated_identifier_is_stream_failure() {
    let ctx = SerializationContext::new(ab_registry(CodecConfig::new()));
    let wide = SerializationContext::new({
        let mut builder =
            polywire::RegistryBuilder::new(CodecConfig::new().with_id_width(IdWidth::U32));
        common::register_ab(&mut builder).expect("A and B register");
        builder.build().expect("valid config").into_shared()
    });

    let empty: [u8; 0] = [];
    assert!(matches!(
        Polymorphic::read(&ctx, &mut Cursor::new(&empty)),
        Err(Error::Stream(_))
    ));
    let short = [0x00, 0x00];
    assert!(matches!(
        Polymorphic::read(&wide, &mut Cursor::new(&short)),
        Err(Error::Stream(_))
    ));
}

#[test]
fn truncated_payload_is_stream_failure() {
    let ctx = bare();
    let bytes = [0x01, 0x00, 0x00];
    match Polymorphic::read(&ctx, &mut Cursor::new(&bytes)) {
        Err(err @ Error::Stream(_)) => assert!(err.to_string().contains("offset")),
        other => panic!("expected stream failure, got {:?}", other),
    }
}

#[test]
fn wider_identifier_layout() {
    let wide = SerializationContext::new({
        let mut builder =
            polywire::RegistryBuilder::new(CodecConfig::new().with_id_width(IdWidth::U32));
        common::register_ab(&mut builder).expect("A and B register");
        builder.build().expect("valid config").into_shared()
    });
    let bytes = Polymorphic::to_bytes(&wide, Some(&A(1))).expect("write should succeed");
    assert_eq!(bytes, vec![0, 0, 0, 0x01, 0, 0, 0, 1]);
    let null = Polymorphic::to_bytes::<A>(&wide, None).expect("write should succeed");
    assert_eq!(null, vec![0, 0, 0, 0]);
}

#[test]
fn length_prefixed_layout() {
    let ctx = SerializationContext::new(ab_registry(
        CodecConfig::new().with_framing(Framing::LengthPrefixed),
    ));
    let bytes = Polymorphic::to_bytes(&ctx, Some(&B("ok".into()))).expect("write should succeed");
    assert_eq!(bytes, vec![0x02, 0, 0, 0, 6, 0, 0, 0, 2, b'o', b'k']);
    let value = Polymorphic::read_as::<B>(&ctx, &mut Cursor::new(&bytes)).expect("read B");
    assert_eq!(value, Some(B("ok".into())));
}
