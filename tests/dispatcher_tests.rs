//! Rotation, classification and retry behavior of the dispatcher, driven
//! against a scripted transport.

mod common;

use common::{connect_fault, error_body, ok_body, rate_limited_body, ScriptedTransport};
use hoyostats::core::dispatcher::{ApiDispatcher, ApiRequest};
use hoyostats::core::kernel::transport::TransportError;
use hoyostats::core::pool::CredentialPool;
use hoyostats::{ApiFamily, ClientConfig, Credential, Region, ServiceError};
use serde_json::json;
use std::sync::Arc;

fn credential(id: &str) -> Credential {
    Credential::from_login_tokens(id, format!("token-{}", id))
}

fn dispatcher(
    responses: Vec<Result<serde_json::Value, TransportError>>,
    credentials: Vec<Credential>,
) -> ApiDispatcher<ScriptedTransport> {
    let pool = Arc::new(CredentialPool::new());
    pool.reset(credentials);
    ApiDispatcher::with_transport(ScriptedTransport::new(responses), pool, ClientConfig::new())
}

fn record_request() -> ApiRequest {
    ApiRequest::get(ApiFamily::GameRecord, Region::Overseas, "genshin/api/index")
        .query("server", "os_euro")
        .query("role_id", 710785423u64)
}

fn cookie_names_of(request: &hoyostats::HttpRequest) -> Vec<String> {
    request
        .cookies
        .iter()
        .map(|(name, _)| name.clone())
        .collect()
}

fn cookie_value(request: &hoyostats::HttpRequest, name: &str) -> String {
    request
        .cookies
        .iter()
        .find(|(cookie, _)| cookie == name)
        .map(|(_, value)| value.clone())
        .expect("cookie present")
}

#[tokio::test]
async fn rate_limited_credential_is_rotated_and_next_one_succeeds() {
    common::init_tracing();
    let dispatcher = dispatcher(
        vec![rate_limited_body(), ok_body(json!({"role": "data"}))],
        vec![credential("a"), credential("b")],
    );

    let data = dispatcher.dispatch(&record_request()).await.unwrap();
    assert_eq!(data, json!({"role": "data"}));

    // First attempt used A, second used B after A was moved to the back.
    let requests = dispatcher.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(cookie_value(&requests[0], "ltuid"), "a");
    assert_eq!(cookie_value(&requests[1], "ltuid"), "b");

    assert_eq!(
        dispatcher.pool().snapshot(),
        vec![credential("b"), credential("a")]
    );
}

#[tokio::test]
async fn exhausted_pool_reports_multi_account_message_and_net_order_is_unchanged() {
    let dispatcher = dispatcher(
        vec![rate_limited_body(), rate_limited_body()],
        vec![credential("a"), credential("b")],
    );

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    match &err {
        ServiceError::AllCredentialsRateLimited { accounts } => assert_eq!(*accounts, 2),
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert!(err.to_string().contains("all 2 credentials"));

    // Each entry attempted exactly once; a 2-element pool rotated twice is
    // back in its original order.
    assert_eq!(dispatcher.transport().request_count(), 2);
    assert_eq!(
        dispatcher.pool().snapshot(),
        vec![credential("a"), credential("b")]
    );
}

#[tokio::test]
async fn single_credential_exhaustion_uses_the_single_account_message() {
    let dispatcher = dispatcher(vec![rate_limited_body()], vec![credential("a")]);

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    assert!(matches!(
        &err,
        ServiceError::AllCredentialsRateLimited { accounts: 1 }
    ));
    assert!(err.to_string().contains("single credential"));
    assert_eq!(dispatcher.transport().request_count(), 1);
}

#[tokio::test]
async fn auth_failure_is_terminal_and_does_not_rotate() {
    let dispatcher = dispatcher(
        vec![error_body(10001, "Please login")],
        vec![credential("a"), credential("b"), credential("c")],
    );

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    assert!(matches!(err, ServiceError::AuthInvalid(_)));

    // Exactly one attempt regardless of pool size, pool untouched.
    assert_eq!(dispatcher.transport().request_count(), 1);
    assert_eq!(
        dispatcher.pool().snapshot(),
        vec![credential("a"), credential("b"), credential("c")]
    );
}

#[tokio::test]
async fn generic_service_error_is_terminal_on_first_attempt() {
    let dispatcher = dispatcher(
        vec![error_body(-502, "internal error")],
        vec![credential("a"), credential("b")],
    );

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    match err {
        ServiceError::Api { code, message } => {
            assert_eq!(code, -502);
            assert_eq!(message, "internal error");
        }
        other => panic!("expected service error, got {:?}", other),
    }
    assert_eq!(dispatcher.transport().request_count(), 1);
}

#[tokio::test]
async fn empty_pool_fails_without_sending_anything() {
    let dispatcher = dispatcher(Vec::new(), Vec::new());

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotAuthenticated));
    assert_eq!(dispatcher.transport().request_count(), 0);
}

#[tokio::test]
async fn explicit_credential_never_touches_the_pool() {
    let dispatcher = dispatcher(vec![rate_limited_body()], vec![credential("a")]);
    let explicit = credential("explicit");

    let err = dispatcher
        .dispatch_with(&record_request(), &explicit)
        .await
        .unwrap_err();

    // One attempt with the explicit cookies; the rate limit is terminal here
    // and the pooled credential was neither used nor rotated.
    assert!(matches!(err, ServiceError::RateLimited(_)));
    let requests = dispatcher.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(cookie_value(&requests[0], "ltuid"), "explicit");
    assert_eq!(dispatcher.pool().snapshot(), vec![credential("a")]);
}

#[tokio::test]
async fn each_attempt_gets_a_fresh_signature() {
    let dispatcher = dispatcher(
        vec![rate_limited_body(), ok_body(json!({}))],
        vec![credential("a"), credential("b")],
    );

    dispatcher.dispatch(&record_request()).await.unwrap();

    let requests = dispatcher.transport().requests();
    let ds_of = |request: &hoyostats::HttpRequest| {
        request
            .headers
            .iter()
            .find(|(name, _)| name == "ds")
            .map(|(_, value)| value.clone())
            .expect("ds header present")
    };
    // A fresh nonce is drawn per attempt, so the signatures differ.
    assert_ne!(ds_of(&requests[0]), ds_of(&requests[1]));
}

#[tokio::test]
async fn transient_faults_are_absorbed_within_one_attempt() {
    let dispatcher = dispatcher(
        vec![connect_fault(), ok_body(json!({"fine": true}))],
        vec![credential("a")],
    );

    let data = dispatcher.dispatch(&record_request()).await.unwrap();
    assert_eq!(data, json!({"fine": true}));

    // Two transport calls, but both with credential A: the retry happened
    // below the rotation loop.
    let requests = dispatcher.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(cookie_value(&requests[0], "ltuid"), "a");
    assert_eq!(cookie_value(&requests[1], "ltuid"), "a");
    assert_eq!(dispatcher.pool().snapshot(), vec![credential("a")]);
}

#[tokio::test]
async fn persistent_transient_faults_exhaust_the_retrier() {
    let dispatcher = dispatcher(
        vec![connect_fault(), connect_fault(), connect_fault()],
        vec![credential("a"), credential("b")],
    );

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    match err {
        ServiceError::Transport(TransportError::RetriesExhausted { attempts, .. }) => {
            assert_eq!(attempts, 3);
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
    // Transport faults are not business errors; no rotation happened.
    assert_eq!(dispatcher.transport().request_count(), 3);
    assert_eq!(
        dispatcher.pool().snapshot(),
        vec![credential("a"), credential("b")]
    );
}

#[tokio::test]
async fn malformed_envelope_is_terminal_and_never_retried() {
    let dispatcher = dispatcher(
        vec![Ok(json!(["not", "an", "envelope"]))],
        vec![credential("a"), credential("b")],
    );

    let err = dispatcher.dispatch(&record_request()).await.unwrap_err();
    assert!(matches!(err, ServiceError::MalformedResponse(_)));
    assert_eq!(dispatcher.transport().request_count(), 1);
}

#[tokio::test]
async fn gacha_requests_take_the_single_attempt_path() {
    let dispatcher = dispatcher(
        vec![error_body(-101, "authkey timeout")],
        vec![credential("a")],
    );
    let request = ApiRequest::get(ApiFamily::GachaLog, Region::Overseas, "getGachaLog")
        .query("authkey", "key");

    let err = dispatcher.dispatch(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::AuthExpired));

    // No cookies, no ds signature, and the pooled credential stayed put.
    let requests = dispatcher.transport().requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].cookies.is_empty());
    assert!(!requests[0].headers.iter().any(|(name, _)| name == "ds"));
    assert_eq!(dispatcher.pool().snapshot(), vec![credential("a")]);
}

#[tokio::test]
async fn record_requests_carry_signature_and_region_headers() {
    let dispatcher = dispatcher(vec![ok_body(json!({}))], vec![credential("a")]);

    dispatcher.dispatch(&record_request()).await.unwrap();

    let requests = dispatcher.transport().requests();
    let headers = &requests[0].headers;
    let get = |name: &str| {
        headers
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    };
    assert!(get("ds").is_some());
    assert_eq!(get("x-rpc-app_version"), Some("1.5.0"));
    assert_eq!(get("x-rpc-client_type"), Some("4"));
    assert_eq!(get("x-rpc-language"), Some("en-us"));
    assert_eq!(cookie_names_of(&requests[0]), vec!["ltuid", "ltoken"]);
}
