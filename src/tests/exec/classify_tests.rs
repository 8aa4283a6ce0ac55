use super::*;

fn reply(status: u16, body: serde_json::Value) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status,
        body: body.to_string(),
    })
}

#[test]
fn success_is_verbatim_even_with_timeout_shaped_error() {
    let out = classify_reply(reply(
        200,
        serde_json::json!({ "output": "FLAG{abc}\n", "error": "Timeout: took too long" }),
    ));
    assert_eq!(out.status, ExecStatus::Succeeded);
    assert_eq!(out.output, "FLAG{abc}\n");
    assert_eq!(out.error.as_deref(), Some("Timeout: took too long"));
    assert_eq!(out.failure, None);
}

#[test]
fn success_without_error_field() {
    let out = classify_reply(reply(200, serde_json::json!({ "output": "ok" })));
    assert_eq!(out.status, ExecStatus::Succeeded);
    assert_eq!(out.error, None);
}

#[test]
fn backend_timeout_status_suppresses_output() {
    let out = classify_reply(reply(
        TIMEOUT_STATUS,
        serde_json::json!({ "output": "partial", "error": "Timeout: Script execution took longer than 5 seconds" }),
    ));
    assert_eq!(out.status, ExecStatus::Failed);
    assert_eq!(out.output, "");
    assert_eq!(
        out.failure,
        Some(DeskError::Timeout(
            "Timeout: Script execution took longer than 5 seconds".to_string()
        ))
    );
}

#[test]
fn backend_timeout_status_with_garbage_body_is_still_timeout() {
    let out = classify_reply(Ok(HttpReply {
        status: TIMEOUT_STATUS,
        body: "<html>".to_string(),
    }));
    assert!(out.failure.as_ref().is_some_and(DeskError::is_timeout));
    assert_eq!(out.output, "");
}

#[test]
fn structured_error_is_backend_failure() {
    let out = classify_reply(reply(
        500,
        serde_json::json!({ "output": "Traceback", "error": "Script execution failed: exit status 1" }),
    ));
    assert_eq!(out.status, ExecStatus::Failed);
    assert_eq!(
        out.failure,
        Some(DeskError::Backend(
            "Script execution failed: exit status 1".to_string()
        ))
    );
    assert_eq!(out.output, "Traceback");
}

#[test]
fn unreadable_bodies_are_network_failures() {
    let ok_garbage = classify_reply(Ok(HttpReply {
        status: 200,
        body: "not json".to_string(),
    }));
    assert!(matches!(ok_garbage.failure, Some(DeskError::Network(_))));

    let err_garbage = classify_reply(Ok(HttpReply {
        status: 502,
        body: "Bad Gateway".to_string(),
    }));
    assert!(matches!(err_garbage.failure, Some(DeskError::Network(_))));
}

#[test]
fn transport_failures_split_on_timeout() {
    let timed_out = classify_reply(Err(TransportError {
        timed_out: true,
        message: "operation timed out".to_string(),
    }));
    assert!(matches!(timed_out.failure, Some(DeskError::Timeout(_))));

    let refused = classify_reply(Err(TransportError {
        timed_out: false,
        message: "connection refused".to_string(),
    }));
    assert_eq!(
        refused.failure,
        Some(DeskError::Network("connection refused".to_string()))
    );
}
