//! Tests for ListSchema validation

#[cfg(test)]
mod tests {
    use crate::access::{AccessConfig, AccessRule};
    use crate::config::CoreConfig;
    use crate::models::{
        FieldDescriptor, FieldKind, ListDefinition, ListSchema, ValidationError,
    };
    use fieldspace_oembed::{OEmbedAdapter, OEmbedMetadata};
    use std::sync::Arc;

    struct NullAdapter;

    #[async_trait::async_trait]
    impl OEmbedAdapter for NullAdapter {
        fn name(&self) -> &str {
            "Null Adapter"
        }

        async fn fetch(&self, url: &str) -> fieldspace_oembed::Result<OEmbedMetadata> {
            Ok(OEmbedMetadata::link(url))
        }
    }

    fn assert_invalid(result: Result<ListSchema, ValidationError>, needle: &str) {
        match result {
            Err(ValidationError::InvalidSchema(msg)) => {
                assert!(msg.contains(needle), "'{}' should mention '{}'", msg, needle)
            }
            other => panic!("Expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_schema() {
        let schema = ListSchema::new(
            "Test",
            vec![
                FieldDescriptor::text("name"),
                FieldDescriptor::auto_increment("orderNumber"),
                FieldDescriptor::decimal("price", 18, 2),
            ],
        )
        .unwrap();

        assert_eq!(schema.key(), "Test");
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.create_input_type(), "TestCreateInput");
        assert_eq!(schema.update_input_type(), "TestUpdateInput");
        assert_eq!(schema.where_input_type(), "TestWhereInput");
        assert_eq!(schema.auto_increment_fields().count(), 1);
        assert!(schema.field("price").is_some());
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        assert_invalid(ListSchema::new("1Test", vec![]), "list key");
        assert_invalid(
            ListSchema::new("Test", vec![FieldDescriptor::text("first name")]),
            "identifier",
        );
        assert_invalid(
            ListSchema::new("Test", vec![FieldDescriptor::text("a__folded")]),
            "identifier",
        );
    }

    #[test]
    fn test_rejects_reserved_and_duplicate_names() {
        assert_invalid(
            ListSchema::new("Test", vec![FieldDescriptor::text("id")]),
            "reserved",
        );
        assert_invalid(
            ListSchema::new(
                "Test",
                vec![FieldDescriptor::text("name"), FieldDescriptor::wysiwyg("name")],
            ),
            "more than once",
        );
    }

    #[test]
    fn test_rejects_operator_suffix_collision() {
        assert_invalid(
            ListSchema::new(
                "Test",
                vec![
                    FieldDescriptor::text("name"),
                    FieldDescriptor::text("name_contains_i"),
                ],
            ),
            "name_contains_i",
        );
    }

    #[test]
    fn test_rejects_bad_decimal_options() {
        assert_invalid(
            ListSchema::new("Test", vec![FieldDescriptor::decimal("price", 19, 2)]),
            "precision",
        );
        assert_invalid(
            ListSchema::new("Test", vec![FieldDescriptor::decimal("price", 0, 0)]),
            "precision",
        );
        assert_invalid(
            ListSchema::new("Test", vec![FieldDescriptor::decimal("price", 4, 5)]),
            "scale",
        );
    }

    #[test]
    fn test_oembed_requires_adapter() {
        let mut field = FieldDescriptor::oembed("portfolio", Arc::new(NullAdapter));
        field.adapter = None;
        assert_invalid(ListSchema::new("Test", vec![field]), "adapter");
    }

    #[test]
    fn test_from_definition_applies_defaults() {
        let definition: ListDefinition = serde_json::from_str(
            r#"{
                "key": "Test",
                "fields": [
                    { "name": "name", "type": "Text", "required": true },
                    { "name": "orderNumber", "type": "AutoIncrement" },
                    { "name": "price", "type": "Decimal", "scale": 2 },
                    { "name": "total", "type": "Decimal" },
                    { "name": "portfolio", "type": "OEmbed", "access": { "update": false } }
                ]
            }"#,
        )
        .unwrap();

        let schema = ListSchema::from_definition(
            &definition,
            &CoreConfig::default(),
            Some(Arc::new(NullAdapter)),
        )
        .unwrap();

        assert!(schema.field("name").unwrap().required);
        assert_eq!(
            schema.field("price").unwrap().kind,
            FieldKind::Decimal {
                precision: 18,
                scale: 2
            }
        );
        assert_eq!(
            schema.field("total").unwrap().kind,
            FieldKind::Decimal {
                precision: 18,
                scale: 4
            }
        );

        let order = schema.field("orderNumber").unwrap();
        assert!(order.access.create.is_statically_denied());
        assert!(order.access.update.is_statically_denied());

        let portfolio = schema.field("portfolio").unwrap();
        assert!(portfolio.adapter.is_some());
        assert!(portfolio.access.update.is_statically_denied());
        assert!(matches!(portfolio.access.create, AccessRule::Static(true)));
    }

    #[test]
    fn test_from_definition_can_open_auto_increment() {
        let definition = ListDefinition {
            key: "Test".to_string(),
            fields: vec![serde_json::from_value(serde_json::json!({
                "name": "orderNumber",
                "type": "AutoIncrement",
                "access": AccessConfig { create: Some(true), read: None, update: Some(true) }
            }))
            .unwrap()],
        };

        let schema =
            ListSchema::from_definition(&definition, &CoreConfig::default(), None).unwrap();
        let order = schema.field("orderNumber").unwrap();
        assert!(!order.access.create.is_statically_denied());
    }

    #[test]
    fn test_from_definition_oembed_without_adapter_fails() {
        let definition: ListDefinition = serde_json::from_str(
            r#"{ "key": "Test", "fields": [{ "name": "portfolio", "type": "OEmbed" }] }"#,
        )
        .unwrap();

        assert_invalid(
            ListSchema::from_definition(&definition, &CoreConfig::default(), None),
            "adapter",
        );
    }
}
