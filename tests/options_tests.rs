use std::time::Duration;
use nebius::options::{NebiusOptions, TransportOptions};

#[test]
fn test_transport_options_builder() {
    let options = TransportOptions::new()
        .with_timeout(Duration::from_secs(30))
        .with_proxy("http://proxy.example.com".to_string())
        .with_header("X-Custom-Header".to_string(), "Value".to_string());

    match options {
        TransportOptions::Http {
            timeout,
            proxy,
            headers,
        } => {
            assert_eq!(timeout, Some(Duration::from_secs(30)));
            assert_eq!(proxy, Some("http://proxy.example.com".to_string()));

            let headers = headers.unwrap();
            assert_eq!(headers.get("X-Custom-Header"), Some(&"Value".to_string()));
        }
    }
}

#[test]
fn test_nebius_options_builder() {
    let options = NebiusOptions::new()
        .with_api_key("secret")
        .with_model("Qwen/QwQ-32B")
        .with_base_url("http://localhost:8080/v1");

    assert_eq!(options.api_key.as_deref(), Some("secret"));
    assert_eq!(options.api_model_id.as_deref(), Some("Qwen/QwQ-32B"));
    assert_eq!(options.base_url.as_deref(), Some("http://localhost:8080/v1"));
}

#[test]
fn test_nebius_options_debug_redacts_key() {
    let options = NebiusOptions::new().with_api_key("super-secret");
    let debug = format!("{:?}", options);

    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("<redacted>"));
}
