//! Tests for the value codec

#[cfg(test)]
mod tests {
    use crate::behaviors::{FieldBehavior, Normalized, ValueCodec};
    use crate::config::CoreConfig;
    use crate::filters::{BaseOperator, FilterOperator};
    use crate::models::{
        FieldDescriptor, FieldKind, FilterValue, StorageShape, StoredValue, ValidationError,
        OEMBED_SUB_FIELDS,
    };
    use async_trait::async_trait;
    use fieldspace_oembed::{OEmbedAdapter, OEmbedMetadata, OEmbedProvider};
    use serde_json::json;
    use std::cmp::Ordering;
    use std::sync::Arc;

    struct GithubAdapter;

    #[async_trait]
    impl OEmbedAdapter for GithubAdapter {
        fn name(&self) -> &str {
            "IFramely OEmbed Adapter"
        }

        async fn fetch(&self, url: &str) -> fieldspace_oembed::Result<OEmbedMetadata> {
            let mut metadata = OEmbedMetadata::link(url);
            metadata.provider = Some(OEmbedProvider {
                name: Some("GitHub".to_string()),
                url: Some("https://github.com".to_string()),
            });
            Ok(metadata)
        }
    }

    fn codec() -> ValueCodec {
        ValueCodec::new(&CoreConfig::default())
    }

    const DECIMAL: FieldKind = FieldKind::Decimal {
        precision: 18,
        scale: 2,
    };

    #[test]
    fn test_text_round_trip_is_identity() {
        for input in ["foo", "  spaced  ", "<p><strong>This is BOLD</strong></p>", ""] {
            let value = json!(input);
            for kind in [FieldKind::Text, FieldKind::Wysiwyg] {
                let Normalized::Ready(stored) = kind.normalize("content", &value).unwrap() else {
                    panic!("text should not need resolution");
                };
                assert_eq!(kind.denormalize(&stored), value);
            }
        }
    }

    #[test]
    fn test_decimal_round_trip() {
        for input in ["50.00", "0.01", "2000.00", "40000.00", "-6.28"] {
            let value = json!(input);
            let Normalized::Ready(stored) = DECIMAL.normalize("price", &value).unwrap() else {
                panic!("decimal should not need resolution");
            };
            assert_eq!(DECIMAL.denormalize(&stored), value);
        }
    }

    #[test]
    fn test_text_rejects_non_string() {
        let err = FieldKind::Text.normalize("name", &json!(5)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn test_auto_increment_operand_and_denormalize() {
        assert_eq!(
            FieldKind::AutoIncrement
                .normalize_operand("orderNumber", &json!(3))
                .unwrap(),
            FilterValue::Integer(3)
        );
        assert!(FieldKind::AutoIncrement
            .normalize_operand("orderNumber", &json!(1.5))
            .is_err());
        assert_eq!(
            FieldKind::AutoIncrement.denormalize(&StoredValue::Integer(5)),
            json!(5)
        );
    }

    #[test]
    fn test_compare_orders_values() {
        assert_eq!(
            FieldKind::AutoIncrement.compare(&StoredValue::Integer(1), &StoredValue::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            FieldKind::Text.compare(
                &StoredValue::Text("b".to_string()),
                &StoredValue::Text("a".to_string())
            ),
            Ordering::Greater
        );
    }

    #[tokio::test]
    async fn test_null_normalizes_to_none() {
        let codec = codec();
        let field = FieldDescriptor::oembed("portfolio", Arc::new(GithubAdapter));
        assert_eq!(codec.normalize(&field, &json!(null)).await.unwrap(), None);

        let field = FieldDescriptor::decimal("price", 18, 2);
        assert_eq!(codec.normalize(&field, &json!(null)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_auto_increment_always_rejects_input() {
        let codec = codec();
        let field = FieldDescriptor::auto_increment("orderNumber");

        for input in [json!(6), json!(null), json!("1")] {
            let err = codec.normalize(&field, &input).await.unwrap_err();
            assert!(matches!(err, ValidationError::ServerAssigned { .. }));
        }
    }

    #[tokio::test]
    async fn test_oembed_resolves_through_adapter() {
        let codec = codec();
        let field = FieldDescriptor::oembed("portfolio", Arc::new(GithubAdapter));

        let stored = codec
            .normalize(&field, &json!("https://github.com"))
            .await
            .unwrap()
            .unwrap();
        let external = ValueCodec::denormalize(&field, Some(&stored));

        assert_eq!(external["originalUrl"], "https://github.com");
        assert_eq!(external["type"], "link");
        assert_eq!(external["provider"]["name"], "GitHub");
    }

    #[tokio::test]
    async fn test_oembed_rejects_missing_scheme() {
        let codec = codec();
        let field = FieldDescriptor::oembed("portfolio", Arc::new(GithubAdapter));

        let err = codec.normalize(&field, &json!("medium.com")).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("url passed to IFramely OEmbed Adapter must start with either http:// or https://"));
    }

    #[test]
    fn test_denormalize_null() {
        let field = FieldDescriptor::text("name");
        assert_eq!(ValueCodec::denormalize(&field, None), json!(null));
    }

    #[test]
    fn test_supported_operators_per_kind() {
        let lt = FilterOperator::new(BaseOperator::LessThan, false, false);
        let contains_i = FilterOperator::new(BaseOperator::Contains, false, true);
        let not_in = FilterOperator::new(BaseOperator::In, true, false);

        assert!(DECIMAL.supports(&lt));
        assert!(FieldKind::AutoIncrement.supports(&lt));
        assert!(!FieldKind::Text.supports(&lt));
        assert!(FieldKind::Wysiwyg.supports(&contains_i));
        assert!(!FieldKind::OEmbed.supports(&contains_i));
        assert!(!DECIMAL.supports(&contains_i));
        assert!(FieldKind::OEmbed.supports(&not_in));
    }

    #[test]
    fn test_storage_shape() {
        assert_eq!(FieldKind::Text.storage_shape(), StorageShape::ScalarText);
        assert_eq!(FieldKind::Wysiwyg.storage_shape(), StorageShape::ScalarText);
        assert_eq!(FieldKind::AutoIncrement.storage_shape(), StorageShape::ScalarNumber);
        assert_eq!(DECIMAL.storage_shape(), StorageShape::ScalarDecimal { scale: 2 });
        assert_eq!(
            FieldKind::OEmbed.storage_shape(),
            StorageShape::Composite {
                sub_fields: OEMBED_SUB_FIELDS
            }
        );
    }
}
