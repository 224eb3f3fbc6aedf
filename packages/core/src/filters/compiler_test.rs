//! Tests for the filter compiler

#[cfg(test)]
mod tests {
    use crate::config::CoreConfig;
    use crate::filters::{CompiledFilter, FilterCompiler, FilterError, Predicate};
    use crate::models::{FieldDescriptor, FilterValue, Item, ListSchema, StoredValue};
    use fieldspace_oembed::{OEmbedAdapter, OEmbedMetadata};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::str::FromStr;
    use std::sync::Arc;

    struct EchoAdapter;

    #[async_trait::async_trait]
    impl OEmbedAdapter for EchoAdapter {
        fn name(&self) -> &str {
            "Echo Adapter"
        }

        async fn fetch(&self, url: &str) -> fieldspace_oembed::Result<OEmbedMetadata> {
            Ok(OEmbedMetadata::link(url))
        }
    }

    fn schema() -> ListSchema {
        ListSchema::new(
            "Test",
            vec![
                FieldDescriptor::text("name"),
                FieldDescriptor::wysiwyg("content"),
                FieldDescriptor::decimal("price", 18, 2),
                FieldDescriptor::auto_increment("orderNumber"),
                FieldDescriptor::oembed("portfolio", Arc::new(EchoAdapter)),
            ],
        )
        .unwrap()
    }

    fn compile(where_: serde_json::Value) -> Result<CompiledFilter, FilterError> {
        let schema = schema();
        FilterCompiler::new(&schema, &CoreConfig::default()).compile_where(Some(&where_))
    }

    fn single(filter: CompiledFilter) -> Predicate {
        match filter {
            CompiledFilter::And(mut children) if children.len() == 1 => match children.remove(0) {
                CompiledFilter::Field(field) => field.predicate,
                other => panic!("Expected field predicate, got {:?}", other),
            },
            other => panic!("Expected single condition, got {:?}", other),
        }
    }

    fn item(values: Vec<(&str, StoredValue)>) -> Item {
        let values: BTreeMap<String, StoredValue> =
            values.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Item::new("Test", values)
    }

    #[test]
    fn test_eq_null_is_null_check() {
        assert_eq!(single(compile(json!({ "price": null })).unwrap()), Predicate::IsNull);
        assert_eq!(
            single(compile(json!({ "portfolio_not": null })).unwrap()),
            Predicate::IsNull.negate()
        );
    }

    #[test]
    fn test_decimal_operand_keeps_every_digit() {
        let predicate = single(compile(json!({ "price_gt": "49.995" })).unwrap());
        match predicate {
            Predicate::Compare(_, FilterValue::Decimal(d)) => {
                assert_eq!(d.to_string(), "49.995");
            }
            other => panic!("Expected decimal comparison, got {:?}", other),
        }

        // Equal in value to the stored 2000.00 regardless of written scale
        let predicate = single(compile(json!({ "price_lte": 2000 })).unwrap());
        let stored = StoredValue::Decimal(Decimal::new(200000, 2));
        assert!(predicate.evaluate(Some(&stored)));
    }

    #[test]
    fn test_auto_increment_accepts_numbers_and_strings() {
        assert_eq!(
            single(compile(json!({ "orderNumber": 1 })).unwrap()),
            Predicate::Equals(FilterValue::Integer(1))
        );
        assert_eq!(
            single(compile(json!({ "orderNumber_gt": "2" })).unwrap()),
            Predicate::Compare(
                crate::filters::Comparison::GreaterThan,
                FilterValue::Integer(2)
            )
        );
    }

    #[test]
    fn test_null_ordering_operand_is_rejected() {
        let err = compile(json!({ "price_lt": null })).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperand { .. }));
    }

    #[test]
    fn test_illegal_operators_are_schema_errors() {
        for where_ in [
            json!({ "name_lt": "a" }),
            json!({ "price_contains": "1" }),
            json!({ "portfolio_contains": "github" }),
            json!({ "portfolio_i": "https://github.com" }),
            json!({ "orderNumber_not_i": 1 }),
        ] {
            let err = compile(where_.clone()).unwrap_err();
            assert!(
                matches!(err, FilterError::UnsupportedOperator { .. }),
                "{} should be unsupported, got {:?}",
                where_,
                err
            );
            assert!(err.is_schema_error());
        }
    }

    #[test]
    fn test_in_list_with_null() {
        assert_eq!(
            single(compile(json!({ "content_in": [null, "<p>a</p>"] })).unwrap()),
            Predicate::In {
                values: vec![FilterValue::Text("<p>a</p>".to_string())],
                includes_null: true,
            }
        );
    }

    #[test]
    fn test_in_list_length_limit() {
        let schema = schema();
        let config = CoreConfig {
            max_in_list_len: 2,
            ..Default::default()
        };
        let err = FilterCompiler::new(&schema, &config)
            .compile_where(Some(&json!({ "orderNumber_in": [1, 2, 3] })))
            .unwrap_err();
        assert!(err.to_string().contains("at most 2"));
    }

    #[test]
    fn test_case_insensitive_needle_is_folded() {
        assert_eq!(
            single(compile(json!({ "content_i": "<P>BOLD</P>" })).unwrap()),
            Predicate::EqualsIgnoreCase("<p>bold</p>".to_string())
        );
    }

    #[test]
    fn test_operand_type_mismatch() {
        let err = compile(json!({ "name": 5 })).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperand { .. }));

        let err = compile(json!({ "price": "abc" })).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_matches_and_or() {
        let filter = compile(json!({
            "OR": [{ "price_lt": "1.00" }, { "name_starts_with": "b" }],
            "content_not": null
        }))
        .unwrap();

        let cheap = item(vec![
            ("price", StoredValue::Decimal(Decimal::from_str("0.01").unwrap())),
            ("content", StoredValue::Text("x".to_string())),
        ]);
        let named_b = item(vec![
            ("name", StoredValue::Text("bee".to_string())),
            ("content", StoredValue::Text("y".to_string())),
        ]);
        let no_content = item(vec![("name", StoredValue::Text("bee".to_string()))]);

        assert!(filter.matches(&cheap));
        assert!(filter.matches(&named_b));
        assert!(!filter.matches(&no_content));
    }

    #[test]
    fn test_empty_where_matches_all() {
        let filter = compile(json!({})).unwrap();
        assert!(filter.is_match_all());
        assert!(filter.matches(&item(vec![])));

        let filter = compile(json!({ "OR": [] })).unwrap();
        assert!(filter.is_match_all());
        assert!(filter.matches(&item(vec![])));
    }

    #[test]
    fn test_oembed_equality_uses_original_url() {
        let filter = compile(json!({ "portfolio": "https://github.com" })).unwrap();
        let stored = item(vec![(
            "portfolio",
            StoredValue::OEmbed(Box::new(OEmbedMetadata::link("https://github.com"))),
        )]);
        assert!(filter.matches(&stored));
    }

    #[test]
    fn test_field_names_are_deduplicated() {
        let filter = compile(json!({
            "OR": [{ "price_lt": "1.00" }, { "name": "a" }],
            "price_gt": "0.10"
        }))
        .unwrap();

        let mut names = filter.field_names();
        names.sort_unstable();
        assert_eq!(names, vec!["name", "price"]);
    }
}
