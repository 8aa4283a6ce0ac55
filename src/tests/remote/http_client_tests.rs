use super::*;

#[test]
fn error_message_reads_flat_error_field() {
    assert_eq!(
        error_message(r#"{"error":"Service not found"}"#).as_deref(),
        Some("Service not found")
    );
}

#[test]
fn error_message_reads_nested_provider_error() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    assert_eq!(
        error_message(body).as_deref(),
        Some("Incorrect API key provided")
    );
}

#[test]
fn error_message_ignores_other_shapes() {
    assert_eq!(error_message(r#"{"message":"ok"}"#), None);
    assert_eq!(error_message("Bad Gateway"), None);
    assert_eq!(error_message(r#"{"error":42}"#), None);
}
