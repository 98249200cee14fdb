// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic dispatch benchmarks
//!
//! Measures:
//! - write/read of small values through the registry (lookup cost dominates)
//! - bare vs length-prefixed framing on the same payloads

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polywire::{
    CodecConfig, Cursor, CursorMut, Framing, Polymorphic, RegistryBuilder, SerializationContext,
    TypeIdentifier,
};

#[derive(Debug, Clone, PartialEq)]
struct Sample {
    sensor_id: u32,
    value: f64,
}

fn context(framing: Framing) -> SerializationContext {
    let config = CodecConfig::new().with_framing(framing);
    let mut builder = RegistryBuilder::new(config.clone());
    builder.with_builtins().unwrap();
    builder
        .register::<Sample, _, _>(
            TypeIdentifier::from_type_name("bench.Sample", config.id_width),
            |_, input| {
                Ok(Sample {
                    sensor_id: input.read_u32_be()?,
                    value: input.read_f64_be()?,
                })
            },
            |_, out, s| {
                out.write_u32_be(s.sensor_id)?;
                Ok(out.write_f64_be(s.value)?)
            },
        )
        .unwrap();
    SerializationContext::new(builder.build().unwrap().into_shared())
}

const BATCH: usize = 1000;

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("polymorphic_write");
    group.throughput(Throughput::Elements(BATCH as u64));

    for framing in [Framing::Bare, Framing::LengthPrefixed] {
        let ctx = context(framing);
        let sample = Sample {
            sensor_id: 7,
            value: 21.5,
        };
        group.bench_with_input(
            BenchmarkId::new("sample_x1000", format!("{:?}", framing)),
            &sample,
            |b, sample| {
                let mut out = CursorMut::with_capacity(BATCH * 24);
                b.iter(|| {
                    out.clear();
                    for _ in 0..BATCH {
                        Polymorphic::write(&ctx, &mut out, Some(black_box(sample))).unwrap();
                    }
                    black_box(out.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("polymorphic_read");
    group.throughput(Throughput::Elements(BATCH as u64));

    for framing in [Framing::Bare, Framing::LengthPrefixed] {
        let ctx = context(framing);
        let mut out = CursorMut::new();
        for i in 0..BATCH {
            if i % 2 == 0 {
                Polymorphic::write(
                    &ctx,
                    &mut out,
                    Some(&Sample {
                        sensor_id: i as u32,
                        value: i as f64,
                    }),
                )
                .unwrap();
            } else {
                Polymorphic::write(&ctx, &mut out, Some(&(i as i64))).unwrap();
            }
        }
        let bytes = out.into_inner();

        group.bench_with_input(
            BenchmarkId::new("mixed_x1000", format!("{:?}", framing)),
            &bytes,
            |b, bytes| {
                b.iter(|| {
                    let mut input = Cursor::new(black_box(bytes.as_slice()));
                    for _ in 0..BATCH {
                        black_box(Polymorphic::read(&ctx, &mut input).unwrap());
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(dispatch_benches, bench_write, bench_read);
criterion_main!(dispatch_benches);
