use criterion::{Criterion, criterion_group, criterion_main};
use spooky_proto::{Compacted, FieldKey, FieldType, List, Proto, ProtoBuilder, Record, SpookyValue, UniqueMap};
use std::hint::black_box;
use std::sync::Arc;

// ─── Test Data ──────────────────────────────────────────────────────────────

/// [id:Int, name:String, age:Int, score:Float64, active:Bool, created:Time]
fn make_proto() -> Arc<Proto> {
    Arc::new(
        ProtoBuilder::new("bench.User")
            .int_field("id")
            .string_field("name")
            .int_field("age")
            .field("score", FieldType::Float64)
            .field("active", FieldType::Bool)
            .field("created", FieldType::Time)
            .build()
            .unwrap(),
    )
}

fn make_record(proto: &Arc<Proto>, id: i64) -> Record {
    let mut record = proto.new_record();
    record.set("id", id).unwrap();
    record.set("name", "Alice").unwrap();
    record.set("age", 28i32).unwrap();
    record.set("score", 99.5f64).unwrap();
    record.set("active", true).unwrap();
    record
}

fn make_list(proto: &Arc<Proto>, n: i64) -> List {
    let mut list = List::new(proto.clone());
    for id in 0..n {
        list.append(make_record(proto, id)).unwrap();
    }
    list
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 1: Reading Values
// ═══════════════════════════════════════════════════════════════════════════

fn bench_reading_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading_values");
    group.sample_size(500);

    let proto = make_proto();
    let record = make_record(&proto, 1);
    let age = proto.accessor("age").unwrap();
    let name = proto.accessor("name").unwrap();

    // ── Accessors (position resolved up front) ──

    group.bench_function("Accessor::int", |b| {
        b.iter(|| black_box(age.int(black_box(&record))))
    });

    group.bench_function("Accessor::str", |b| {
        b.iter(|| black_box(name.str(black_box(&record))))
    });

    // ── By name ──

    group.bench_function("Record::get_int", |b| {
        b.iter(|| black_box(record.get_int(black_box("age"))))
    });

    group.bench_function("Record::get_str", |b| {
        b.iter(|| black_box(record.get_str(black_box("name"))))
    });

    group.bench_function("Record::get", |b| {
        b.iter(|| black_box(record.get(black_box("score"))))
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 2: Writing Values
// ═══════════════════════════════════════════════════════════════════════════

fn bench_writing_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("writing_values");

    let proto = make_proto();
    let mut record = make_record(&proto, 1);
    let age = *proto.mutator("age").unwrap();
    let score = *proto.mutator("score").unwrap();

    group.bench_function("Mutator::int", |b| {
        b.iter(|| age.int(&mut record, black_box(42)).unwrap())
    });

    group.bench_function("Mutator::float64", |b| {
        b.iter(|| score.float64(&mut record, black_box(1.5)).unwrap())
    });

    group.bench_function("Record::set (coerced)", |b| {
        b.iter(|| record.set(black_box("age"), black_box(42.9f64)).unwrap())
    });

    group.bench_function("Record::set_values", |b| {
        b.iter(|| {
            record
                .set_values(black_box(vec![
                    SpookyValue::from(7i64),
                    "Bob".into(),
                    30i32.into(),
                    1.0f64.into(),
                    false.into(),
                    SpookyValue::Null,
                ]))
                .unwrap()
        })
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 3: Collections
// ═══════════════════════════════════════════════════════════════════════════

fn bench_collections(c: &mut Criterion) {
    let mut group = c.benchmark_group("collections");

    let proto = make_proto();
    let list = make_list(&proto, 1_000);

    group.bench_function("UniqueMap::add (1k)", |b| {
        b.iter(|| {
            let mut map = UniqueMap::new(proto.clone(), FieldKey::new("id"));
            for record in &list {
                map.add(record.clone()).unwrap();
            }
            map
        })
    });

    let mut map = UniqueMap::new(proto.clone(), FieldKey::new("id"));
    for record in &list {
        map.add(record.clone()).unwrap();
    }
    group.bench_function("UniqueMap::get", |b| {
        b.iter(|| black_box(map.get(black_box(500i64))))
    });

    group.bench_function("Compacted::from_collection (1k)", |b| {
        b.iter(|| Compacted::from_collection(black_box(&list)))
    });

    let json = Compacted::from_collection(&list).to_json().unwrap();
    group.bench_function("Compacted::from_json + into_list (1k)", |b| {
        b.iter(|| {
            Compacted::from_json(black_box(&json))
                .unwrap()
                .into_list("bench.User")
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_reading_values, bench_writing_values, bench_collections);
criterion_main!(benches);
