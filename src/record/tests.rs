// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════
mod record_tests {
    use crate::case::Case;
    use crate::error::RecordError;
    use crate::proto::{FieldDescriptor, Proto, ProtoBuilder};
    use crate::record::Record;
    use crate::spooky_obj;
    use crate::spooky_value::{SpookyNumber, SpookyValue};
    use crate::types::FieldType;
    use chrono::{DateTime, TimeZone, Utc};
    use smol_str::SmolStr;
    use std::sync::Arc;

    /// [id:Int, name:String, price:Float64]
    fn product_proto() -> Arc<Proto> {
        Arc::new(
            ProtoBuilder::new("Product")
                .int_field("id")
                .string_field("name")
                .field("price", FieldType::Float64)
                .build()
                .unwrap(),
        )
    }

    fn all_types_proto() -> Arc<Proto> {
        Arc::new(
            ProtoBuilder::new("AllTypes")
                .int_field("int")
                .field("int64", FieldType::Int64)
                .field("float32", FieldType::Float32)
                .field("float64", FieldType::Float64)
                .field("bool", FieldType::Bool)
                .string_field("string")
                .field("time", FieldType::Time)
                .field("bytes", FieldType::Bytes)
                .array_field("array", FieldType::Int)
                .field("object", FieldType::Object)
                .build()
                .unwrap(),
        )
    }

    fn entry(name: &str, value: impl Into<SpookyValue>) -> (SmolStr, SpookyValue) {
        (SmolStr::from(name), value.into())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Set-mask semantics
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_new_record_is_nil() {
        let proto = all_types_proto();
        let record = proto.new_record();
        assert!(record.is_nil());
        assert_eq!(record.size(), 10);
        for i in 0..record.size() {
            assert!(!record.is_set(i));
            assert!(record.get_at(i).is_none());
        }
        assert!(record.as_map().is_empty());
    }

    #[test]
    fn test_explicit_zero_is_set() {
        let proto = all_types_proto();
        let zeros: [(&str, SpookyValue); 8] = [
            ("int", 0i32.into()),
            ("int64", 0i64.into()),
            ("float32", 0.0f32.into()),
            ("float64", 0.0f64.into()),
            ("bool", false.into()),
            ("string", "".into()),
            ("time", DateTime::<Utc>::default().into()),
            ("bytes", Vec::<u8>::new().into()),
        ];
        let mut record = proto.new_record();
        for (name, value) in zeros {
            record.set(name, value.clone()).unwrap();
            let position = proto.index_of(name).unwrap();
            assert!(record.is_set(position), "{name} should be set");
            assert_eq!(record.get(name).unwrap(), Some(&value), "{name}");
        }
        assert!(!record.is_nil());
        assert_eq!(record.set_count(), 8);
    }

    #[test]
    fn test_unset_reads_absent_not_zero() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("id", 1i32).unwrap();
        record.set("name", "Foo").unwrap();

        let price = proto.index_of("price").unwrap();
        assert!(!record.is_set(price));
        assert_eq!(record.get_at(price), None);
        assert_eq!(record.get("price").unwrap(), None);
        assert_eq!(record.get_float64("price").unwrap(), (0.0, false));
        assert_eq!(
            record.as_map(),
            vec![entry("id", 1i32), entry("name", "Foo")]
        );
    }

    #[test]
    fn test_null_is_present() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("name", SpookyValue::Null).unwrap();
        assert!(record.is_set(1));
        assert_eq!(record.get("name").unwrap(), Some(&SpookyValue::Null));
        assert_eq!(record.to_json().unwrap(), r#"{"name":null}"#);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Coercion
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_float_truncates_into_int() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("id", 41.9f64).unwrap();
        assert_eq!(record.get_int("id").unwrap(), (41, true));
        record.set("id", -41.9f64).unwrap();
        assert_eq!(record.get_int("id").unwrap(), (-41, true));
    }

    #[test]
    fn test_int_widens_into_float() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("price", 3i32).unwrap();
        assert_eq!(
            record.get("price").unwrap(),
            Some(&SpookyValue::Number(SpookyNumber::F64(3.0)))
        );
    }

    #[test]
    fn test_type_mismatch_leaves_record_untouched() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("id", 5i32).unwrap();
        let err = record.set("id", "five").unwrap_err();
        assert_eq!(
            err,
            RecordError::TypeMismatch {
                field: "id".into(),
                expected: FieldType::Int,
                actual: "string",
            }
        );
        assert_eq!(record.get_int("id").unwrap(), (5, true));

        assert!(record.set("id", f64::NAN).is_err());
        assert!(record.set("id", u64::MAX).is_err());
        assert!(record.set("name", 3i32).is_err());
    }

    #[test]
    fn test_unknown_field_and_position() {
        let proto = product_proto();
        let mut record = proto.new_record();
        assert_eq!(
            record.set("nope", 1i32).unwrap_err(),
            RecordError::UnknownField("nope".into())
        );
        assert_eq!(
            record.set_at(9, 1i32).unwrap_err(),
            RecordError::PositionOutOfRange {
                position: 9,
                size: 3
            }
        );
        assert!(record.is_nil());
    }

    #[test]
    fn test_time_from_string_uses_layout() {
        let proto = Arc::new(
            ProtoBuilder::new("Event")
                .time_field("day", "%Y-%m-%d")
                .field("at", FieldType::Time)
                .build()
                .unwrap(),
        );
        let mut record = proto.new_record();
        record.set("day", "2024-05-01").unwrap();
        record.set("at", "2024-05-01T10:00:00Z").unwrap();
        let (day, present) = record.get_time("day").unwrap();
        assert!(present);
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"day":"2024-05-01","at":"2024-05-01T10:00:00Z"}"#
        );
        assert!(record.set("day", "May 1st").is_err());
    }

    #[test]
    fn test_bytes_accept_strings() {
        let proto = all_types_proto();
        let mut record = proto.new_record();
        record.set("bytes", "abc").unwrap();
        assert_eq!(record.get_bytes("bytes").unwrap(), (&b"abc"[..], true));
    }

    #[test]
    fn test_bytes_accept_small_int_arrays() {
        let proto = all_types_proto();
        let mut record = proto.new_record();
        record
            .set("bytes", SpookyValue::Array(vec![1i64.into(), 255i32.into()]))
            .unwrap();
        assert_eq!(record.get_bytes("bytes").unwrap(), (&[1u8, 255][..], true));

        let err = record
            .set("bytes", SpookyValue::Array(vec![256i32.into()]))
            .unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { .. }));
        assert!(
            record
                .set("bytes", SpookyValue::Array(vec![1.0f64.into()]))
                .is_err()
        );
        assert_eq!(record.get_bytes("bytes").unwrap(), (&[1u8, 255][..], true));
    }

    #[test]
    fn test_float32_overflow_rejected() {
        let proto = all_types_proto();
        let mut record = proto.new_record();
        let err = record.set("float32", 1e300f64).unwrap_err();
        assert_eq!(
            err,
            RecordError::TypeMismatch {
                field: "float32".into(),
                expected: FieldType::Float32,
                actual: "float64",
            }
        );
        assert!(!record.is_set(2));

        record.set("float32", f32::MAX as f64).unwrap();
        assert_eq!(record.get_float32("float32").unwrap(), (f32::MAX, true));
    }

    #[test]
    fn test_array_elements_coerced_to_component() {
        let proto = all_types_proto();
        let mut record = proto.new_record();
        record
            .set("array", SpookyValue::Array(vec![1.9f64.into(), 2i64.into()]))
            .unwrap();
        assert_eq!(
            record.get("array").unwrap(),
            Some(&SpookyValue::Array(vec![1i32.into(), 2i32.into()]))
        );
        assert!(
            record
                .set("array", SpookyValue::Array(vec!["x".into()]))
                .is_err()
        );
    }

    #[test]
    fn test_map_into_nested_object_field() {
        let address = Arc::new(
            ProtoBuilder::new("Address")
                .string_field("city")
                .build()
                .unwrap(),
        );
        let proto = Arc::new(
            ProtoBuilder::new("Customer")
                .string_field("name")
                .nested_field("address", address.clone())
                .list_field("previous", address.clone())
                .build()
                .unwrap(),
        );
        let mut record = proto.new_record();
        record
            .set("address", spooky_obj!({ "city" => "Oslo" }))
            .unwrap();
        record
            .set(
                "previous",
                SpookyValue::Array(vec![
                    spooky_obj!({ "city" => "Bergen" }),
                    spooky_obj!({ "city" => "Tromsø" }),
                ]),
            )
            .unwrap();

        let nested = record.get_record("address").unwrap().unwrap();
        assert!(Arc::ptr_eq(nested.proto(), &address));
        assert_eq!(nested.get_str("city").unwrap(), ("Oslo", true));
        let previous = record.get_list("previous").unwrap().unwrap();
        assert_eq!(previous.size(), 2);
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"address":{"city":"Oslo"},"previous":[{"city":"Bergen"},{"city":"Tromsø"}]}"#
        );
    }

    #[test]
    fn test_nested_record_must_match_declared_proto() {
        let address = Arc::new(
            ProtoBuilder::new("Address")
                .string_field("city")
                .build()
                .unwrap(),
        );
        let other = Arc::new(
            ProtoBuilder::new("Address")
                .string_field("city")
                .build()
                .unwrap(),
        );
        let proto = Arc::new(
            ProtoBuilder::new("Customer")
                .nested_field("address", address.clone())
                .field("extra", FieldType::Object)
                .build()
                .unwrap(),
        );
        let mut record = proto.new_record();

        let mut foreign = other.new_record();
        foreign.set("city", "Oslo").unwrap();
        let err = record.set("address", foreign.clone()).unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { .. }));
        assert!(!record.is_set(0));

        // Without a declared proto any record is accepted.
        record.set("extra", foreign).unwrap();

        let mut own = address.new_record();
        own.set("city", "Bergen").unwrap();
        record.set("address", own).unwrap();
        let nested = record.get_record("address").unwrap().unwrap();
        assert_eq!(nested.get_str("city").unwrap(), ("Bergen", true));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Typed access
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_typed_accessors_and_mutators() {
        let proto = all_types_proto();
        let mut record = proto.new_record();
        let at = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();

        proto.mutator("int").unwrap().int(&mut record, 7).unwrap();
        proto.mutator("int64").unwrap().int64(&mut record, 1 << 40).unwrap();
        proto.mutator("float32").unwrap().float32(&mut record, 1.5).unwrap();
        proto.mutator("float64").unwrap().float64(&mut record, 2.25).unwrap();
        proto.mutator("bool").unwrap().bool(&mut record, true).unwrap();
        proto.mutator("string").unwrap().str(&mut record, "hi").unwrap();
        proto.mutator("time").unwrap().time(&mut record, at).unwrap();
        proto.mutator("bytes").unwrap().bytes(&mut record, vec![1, 2]).unwrap();

        assert_eq!(proto.accessor("int").unwrap().int(&record), (7, true));
        assert_eq!(proto.accessor("int64").unwrap().int64(&record), (1 << 40, true));
        assert_eq!(proto.accessor("float32").unwrap().float32(&record), (1.5, true));
        assert_eq!(proto.accessor("float64").unwrap().float64(&record), (2.25, true));
        assert_eq!(proto.accessor("bool").unwrap().bool(&record), (true, true));
        assert_eq!(proto.accessor("string").unwrap().str(&record), ("hi", true));
        assert_eq!(proto.accessor("time").unwrap().time(&record), (at, true));
        assert_eq!(proto.accessor("bytes").unwrap().bytes(&record), (&[1u8, 2][..], true));
    }

    #[test]
    fn test_typed_read_of_other_type() {
        let proto = all_types_proto();
        let mut record = proto.new_record();
        record.set("int", 3i32).unwrap();
        record.set("string", "x").unwrap();

        // Integers widen.
        assert_eq!(record.get_float64("int").unwrap(), (3.0, true));
        assert_eq!(record.get_uint64("int").unwrap(), (3, true));
        // Nothing else converts.
        assert_eq!(record.get_str("int").unwrap(), ("", false));
        assert_eq!(record.get_int("string").unwrap(), (0, false));
        assert_eq!(record.get_bool("string").unwrap(), (false, false));
    }

    #[test]
    fn test_positional_typed_reads() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set_at(0, 9i32).unwrap();
        record.set_at(1, "Nine").unwrap();
        assert_eq!(record.int_at(0), (9, true));
        assert_eq!(record.str_at(1), ("Nine", true));
        assert_eq!(record.float64_at(2), (0.0, false));
        assert_eq!(record.bool_at(42), (false, false));
    }

    #[test]
    fn test_typed_mutator_coerces_across_types() {
        let proto = product_proto();
        let mut record = proto.new_record();
        proto.mutator("price").unwrap().int(&mut record, 4).unwrap();
        assert_eq!(record.get_float64("price").unwrap(), (4.0, true));
        assert!(proto.mutator("id").unwrap().str(&mut record, "4").is_err());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Bulk writes
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_set_map_is_atomic() {
        let proto = product_proto();
        let mut record = proto.new_record();
        let bad = spooky_obj!({ "id" => 1i32, "name" => 2i32 });
        assert!(record.set_map(bad.as_object().unwrap()).is_err());
        assert!(record.is_nil());

        let good = spooky_obj!({ "id" => 1i32, "name" => "ok" });
        record.set_map(good.as_object().unwrap()).unwrap();
        assert_eq!(record.set_count(), 2);
    }

    #[test]
    fn test_set_values_and_set_row() {
        let proto = product_proto();

        let mut record = proto.new_record();
        record
            .set_values(vec![1i32.into(), SpookyValue::Null])
            .unwrap();
        assert!(record.is_set(1));

        let mut row = proto.new_record();
        row.set_row(vec![1i32.into(), SpookyValue::Null]).unwrap();
        assert!(!row.is_set(1));

        let err = row
            .set_row(vec![1i32.into(), "a".into(), 2.0f64.into(), 3i32.into()])
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::RowArityMismatch {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_set_from_record_copies_by_name() {
        let source_proto = product_proto();
        let mut source = source_proto.new_record();
        source.set("id", 3i32).unwrap();
        source.set("name", "copied").unwrap();

        let target_proto = Arc::new(
            ProtoBuilder::new("Label")
                .string_field("name")
                .int_field("id")
                .build()
                .unwrap(),
        );
        let mut target = target_proto.new_record();
        target.set_from(&SpookyValue::from(source)).unwrap();
        assert_eq!(target.get_str("name").unwrap(), ("copied", true));
        assert_eq!(target.get_int("id").unwrap(), (3, true));
        assert!(matches!(
            target.set_from(&SpookyValue::from(1i32)),
            Err(RecordError::UnsupportedSource("int"))
        ));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Projection
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_as_map_hidden_and_omit_empty() {
        let proto = Arc::new(
            Proto::build(
                "P",
                [
                    FieldDescriptor::new("a", FieldType::Int),
                    FieldDescriptor::new("b", FieldType::String)
                        .omit_empty(true)
                        .hidden(),
                ],
            )
            .unwrap(),
        );
        let mut record = proto.new_record();
        record.set("a", 1i32).unwrap();
        record.set("b", "").unwrap();
        assert_eq!(record.as_map(), vec![entry("a", 1i32)]);

        // Hidden fields stay readable.
        assert_eq!(record.get_str("b").unwrap(), ("", true));
    }

    #[test]
    fn test_omit_empty_uses_actual_value() {
        let proto = Arc::new(
            ProtoBuilder::new("P")
                .omit_empty(true)
                .int_field("count")
                .array_field("tags", FieldType::String)
                .string_field("kept")
                .build()
                .unwrap(),
        );
        let mut record = proto.new_record();
        record.set("count", 0i32).unwrap();
        record.set("tags", SpookyValue::Array(vec![])).unwrap();
        record.set("kept", "x").unwrap();
        assert_eq!(record.as_map(), vec![entry("kept", "x")]);

        record.set("count", 2i32).unwrap();
        assert_eq!(record.as_map().len(), 2);
    }

    #[test]
    fn test_as_map_uses_output_names() {
        let mut proto = ProtoBuilder::new("P")
            .int_field("UserId")
            .string_field("FirstName")
            .build()
            .unwrap();
        proto
            .apply_case_convention(Case::UpperCamel, Case::LowerSnake)
            .unwrap();
        let proto = Arc::new(proto);
        let mut record = proto.new_record();
        record.set("user_id", 1i32).unwrap();
        record.set("FirstName", "Ann").unwrap();
        assert_eq!(
            record.as_map(),
            vec![entry("user_id", 1i32), entry("first_name", "Ann")]
        );
        assert_eq!(record.to_json().unwrap(), r#"{"user_id":1,"first_name":"Ann"}"#);
    }

    #[test]
    fn test_hide_after_records_exist() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("id", 1i32).unwrap();
        record.set("name", "Foo").unwrap();
        proto.hide("name").unwrap();
        assert_eq!(record.as_map(), vec![entry("id", 1i32)]);
        proto.show("name").unwrap();
        assert_eq!(record.as_map().len(), 2);
    }

    #[test]
    fn test_to_value() {
        let proto = product_proto();
        let mut record = proto.new_record();
        record.set("id", 1i32).unwrap();
        assert_eq!(record.to_value(), spooky_obj!({ "id" => 1i32 }));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Identity
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_record_equality() {
        let proto = product_proto();
        let mut a = proto.new_record();
        let mut b = proto.new_record();
        a.set("id", 1i32).unwrap();
        assert_ne!(a, b);
        b.set("id", 1.0f64).unwrap();
        assert_eq!(a, b);

        let other = product_proto();
        let mut c: Record = other.new_record();
        c.set("id", 1i32).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_wide_proto_spills_mask() {
        let proto = Arc::new(
            Proto::build(
                "Wide",
                (0..100).map(|i| FieldDescriptor::new(format!("f{i}"), FieldType::Int)),
            )
            .unwrap(),
        );
        let mut record = proto.new_record();
        record.set("f99", 99i32).unwrap();
        record.set("f0", 0i32).unwrap();
        assert!(record.is_set(99) && record.is_set(0));
        assert!(!record.is_set(64));
        assert_eq!(record.set_count(), 2);
    }
}
