//! Wysiwyg field: rich-text HTML stored and filtered as a string

mod common;

use common::{anon, assert_names, open_service, query, seed, Backend, BACKENDS};
use fieldspace_core::models::{FieldDescriptor, ListSchema};
use fieldspace_core::services::{ErrorKind, ItemService};
use serde_json::{json, Value};

const CONTENT_A: &str = "<p><strong>This is bold</strong></p>";
const CONTENT_B: &str = "<p>This is <a href=\"www.test.com\">link</a> and <em>italics, </em><span style=\"text-decoration: underline;\">an underline </span>with <span style=\"text-decoration: line-through;\">Strikethrough</span><em>.&nbsp;</em></p>";
const CONTENT_C: &str = "<p><span style=\"text-decoration: line-through;\">Strikethrough</span></p>";
const CONTENT_D: &str = "<p><strong>This is BOLD</strong></p>";

const ALL: &[&str] = &["a", "b", "c", "d", "e", "f"];

async fn setup(backend: Backend) -> ItemService {
    let service = open_service(backend).await;
    let schema = ListSchema::new(
        "Test",
        vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::wysiwyg("content"),
        ],
    )
    .unwrap();
    service.register_list(schema).await.unwrap();

    seed(
        &service,
        "Test",
        &[
            json!({ "name": "a", "content": CONTENT_A }),
            json!({ "name": "b", "content": CONTENT_B }),
            json!({ "name": "c", "content": CONTENT_C }),
            json!({ "name": "d", "content": CONTENT_D }),
            json!({ "name": "e", "content": null }),
            json!({ "name": "f" }),
        ],
    )
    .await;
    service
}

#[tokio::test]
async fn test_no_filter_returns_content_and_nulls() {
    for backend in BACKENDS {
        let service = setup(backend).await;
        let items = query(&service, "Test", None).await.unwrap();
        let contents: Vec<&Value> = items.iter().map(|item| &item["content"]).collect();
        assert_eq!(
            contents,
            vec![
                &json!(CONTENT_A),
                &json!(CONTENT_B),
                &json!(CONTENT_C),
                &json!(CONTENT_D),
                &Value::Null,
                &Value::Null,
            ]
        );

        assert_names(backend, &service, "Test", json!({}), ALL).await;
    }
}

#[tokio::test]
async fn test_equality_filters() {
    for backend in BACKENDS {
        let service = setup(backend).await;
        let cases = [
            (json!({ "content": CONTENT_A }), vec!["a"]),
            (json!({ "content_i": CONTENT_A }), vec!["a", "d"]),
            (json!({ "content_not": CONTENT_A }), vec!["b", "c", "d", "e", "f"]),
            (json!({ "content_not_i": CONTENT_A }), vec!["b", "c", "e", "f"]),
            (json!({ "content_not": null }), vec!["a", "b", "c", "d"]),
            (json!({ "content": null }), vec!["e", "f"]),
        ];
        for (filter, expected) in cases {
            assert_names(backend, &service, "Test", filter, &expected).await;
        }
    }
}

#[tokio::test]
async fn test_list_filters() {
    for backend in BACKENDS {
        let service = setup(backend).await;
        let cases = [
            (json!({ "content_in": [] }), vec![]),
            (json!({ "content_not_in": [] }), ALL.to_vec()),
            (json!({ "content_in": [CONTENT_A, CONTENT_B] }), vec!["a", "b"]),
            (
                json!({ "content_not_in": [null, CONTENT_A, CONTENT_B] }),
                vec!["c", "d"],
            ),
            (json!({ "content_in": [null] }), vec!["e", "f"]),
            (json!({ "content_not_in": [null] }), vec!["a", "b", "c", "d"]),
        ];
        for (filter, expected) in cases {
            assert_names(backend, &service, "Test", filter, &expected).await;
        }
    }
}

#[tokio::test]
async fn test_string_match_filters() {
    for backend in BACKENDS {
        let service = setup(backend).await;
        let cases = [
            (json!({ "content_contains": "bold" }), vec!["a"]),
            (json!({ "content_contains_i": "bold" }), vec!["a", "d"]),
            (json!({ "content_not_contains": "bold" }), vec!["b", "c", "d", "e", "f"]),
            (json!({ "content_not_contains_i": "bold" }), vec!["b", "c", "e", "f"]),
            (
                json!({ "content_starts_with": "<p><strong>This is bold" }),
                vec!["a"],
            ),
            (
                json!({ "content_starts_with_i": "<p><strong>This is bold" }),
                vec!["a", "d"],
            ),
            (
                json!({ "content_not_starts_with": "<p><strong>This is bold" }),
                vec!["b", "c", "d", "e", "f"],
            ),
            (
                json!({ "content_not_starts_with_i": "<p><strong>This is bold" }),
                vec!["b", "c", "e", "f"],
            ),
            (json!({ "content_ends_with": "bold</strong></p>" }), vec!["a"]),
            (
                json!({ "content_ends_with_i": "bold</strong></p>" }),
                vec!["a", "d"],
            ),
            (
                json!({ "content_not_ends_with": "bold</strong></p>" }),
                vec!["b", "c", "d", "e", "f"],
            ),
            (
                json!({ "content_not_ends_with_i": "bold</strong></p>" }),
                vec!["b", "c", "e", "f"],
            ),
        ];
        for (filter, expected) in cases {
            assert_names(backend, &service, "Test", filter, &expected).await;
        }
    }
}

#[tokio::test]
async fn test_null_string_match_operand_is_rejected() {
    for backend in BACKENDS {
        let service = setup(backend).await;
        let err = query(&service, "Test", Some(json!({ "content_contains": null })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", backend);
    }
}

#[tokio::test]
async fn test_ordering_operators_are_not_supported() {
    for backend in BACKENDS {
        let service = setup(backend).await;
        let err = query(&service, "Test", Some(json!({ "content_lt": "x" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema, "{:?}", backend);
        assert_eq!(err.field(), Some("content"));
    }
}

#[tokio::test]
async fn test_create_and_update_round_trip() {
    for backend in BACKENDS {
        let service = setup(backend).await;

        let created = service
            .create_item("Test", &json!({ "name": "g", "content": CONTENT_D }), &anon())
            .await
            .unwrap();
        assert_eq!(created["content"], CONTENT_D);

        let id = created["id"].as_str().unwrap();
        let updated = service
            .update_item("Test", id, &json!({ "content": "foo" }), &anon())
            .await
            .unwrap();
        assert_eq!(updated["content"], "foo");
        assert_eq!(updated["name"], "g");

        let err = service
            .update_item("Test", id, &json!({ "content": 42 }), &anon())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
