/// Integration tests for the oEmbed adapter crate
///
/// These never reach the network: they cover validation, credential handling
/// and response mapping.
mod integration_tests {
    use fieldspace_oembed::{
        AdapterError, EmbedType, IframelyAdapter, IframelyConfig, OEmbedAdapter,
        IFRAMELY_ADAPTER_NAME,
    };

    #[tokio::test]
    async fn test_fetch_rejects_bad_scheme_before_lookup() {
        let adapter = IframelyAdapter::new(IframelyConfig::default().with_api_key("k")).unwrap();

        let err = adapter.fetch("medium.com").await.unwrap_err();
        assert!(matches!(err, AdapterError::InvalidScheme { .. }));
        assert_eq!(
            err.to_string(),
            "url passed to IFramely OEmbed Adapter must start with either http:// or https://"
        );
    }

    #[tokio::test]
    async fn test_fetch_without_api_key_is_missing_credential() {
        let adapter = IframelyAdapter::new(IframelyConfig::default()).unwrap();

        let err = adapter.fetch("https://github.com").await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredential { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_with_empty_api_key_is_missing_credential() {
        let adapter = IframelyAdapter::new(IframelyConfig::default().with_api_key("")).unwrap();

        let err = adapter.fetch("https://github.com").await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredential { .. }));
    }

    #[test]
    fn test_map_response_full_payload() {
        let body = r#"{
            "type": "rich",
            "version": "1.0",
            "title": "GitHub: Let's build from here",
            "description": "GitHub is where over 100 million developers shape the future of software.",
            "url": "https://github.com/",
            "html": "<div class=\"iframely-embed\"></div>",
            "provider_name": "GitHub",
            "provider_url": "https://github.com",
            "thumbnail_url": "https://github.githubassets.com/images/og.png",
            "thumbnail_width": 1200,
            "thumbnail_height": 630
        }"#;

        let metadata = IframelyAdapter::map_response("https://github.com", body).unwrap();

        assert_eq!(metadata.original_url, "https://github.com");
        assert_eq!(metadata.embed_type, EmbedType::Rich);
        assert_eq!(metadata.url.as_deref(), Some("https://github.com/"));
        let provider = metadata.provider.unwrap();
        assert_eq!(provider.name.as_deref(), Some("GitHub"));
        let thumbnail = metadata.thumbnail.unwrap();
        assert_eq!(thumbnail.width, Some(1200));
        assert!(metadata.author.is_none());
    }

    #[test]
    fn test_map_response_keeps_submitted_url() {
        // Providers often report a canonicalized URL; originalUrl stays as submitted
        let body = r#"{"type": "link", "url": "https://reactjs.org/"}"#;
        let metadata = IframelyAdapter::map_response("https://REACTJS.ORG", body).unwrap();

        assert_eq!(metadata.original_url, "https://REACTJS.ORG");
        assert_eq!(metadata.url.as_deref(), Some("https://reactjs.org/"));
    }

    #[test]
    fn test_map_response_in_band_error() {
        let body = r#"{"status": 404, "error": "Page not found"}"#;
        let err = IframelyAdapter::map_response("https://example.com/missing", body).unwrap_err();

        match err {
            AdapterError::Service {
                adapter,
                status,
                message,
            } => {
                assert_eq!(adapter, IFRAMELY_ADAPTER_NAME);
                assert_eq!(status, 404);
                assert_eq!(message, "Page not found");
            }
            other => panic!("Expected Service error, got {:?}", other),
        }
    }

    #[test]
    fn test_map_response_invalid_json() {
        let err = IframelyAdapter::map_response("https://example.com", "<html>").unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse { .. }));
    }

    #[test]
    fn test_map_response_unknown_type() {
        let err =
            IframelyAdapter::map_response("https://example.com", r#"{"type": "hologram"}"#)
                .unwrap_err();
        assert!(err.to_string().contains("hologram"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(AdapterError::timeout(IFRAMELY_ADAPTER_NAME, 10).is_transient());
        assert!(AdapterError::service(IFRAMELY_ADAPTER_NAME, 503, "down").is_transient());
        assert!(AdapterError::service(IFRAMELY_ADAPTER_NAME, 429, "slow down").is_transient());
        assert!(!AdapterError::service(IFRAMELY_ADAPTER_NAME, 404, "gone").is_transient());
        assert!(!AdapterError::invalid_scheme(IFRAMELY_ADAPTER_NAME).is_transient());
    }
}
