use appstore_api::schema::{Environment, SubscriptionStatus};
use appstore_api::transport::{BackoffConfig, CallContext, Dispatcher};
use appstore_api::{AppStoreClient, ClientConfig, StaticBearer};
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header::AUTHORIZATION},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jwt_simple::prelude::ES256KeyPair;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// One recorded request: path with query, plus the Authorization header.
#[derive(Debug, Clone)]
struct Seen {
    uri: String,
    authorization: Option<String>,
}

#[derive(Clone, Default)]
struct MockStore {
    seen: Arc<Mutex<Vec<Seen>>>,
    flaky_hits: Arc<AtomicUsize>,
}

impl MockStore {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().expect("lock").clone()
    }

    fn last(&self) -> Seen {
        self.seen().last().cloned().expect("at least one request")
    }
}

fn sign(payload: &serde_json::Value) -> String {
    let header = json!({"alg": "ES256", "x5c": ["leaf", "intermediate", "root"]});
    format!(
        "{}.{}.c2ln",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string()),
    )
}

fn transaction_payload(id: &str) -> serde_json::Value {
    json!({
        "transactionId": id,
        "originalTransactionId": "1000",
        "bundleId": "com.example.app",
        "productId": "premium.monthly",
        "purchaseDate": 1_700_000_000_000_i64,
        "expiresDate": 1_702_592_000_000_i64,
        "type": "Auto-Renewable Subscription",
        "environment": "Sandbox"
    })
}

fn json_reply(status: StatusCode, body: serde_json::Value) -> (StatusCode, String) {
    (status, body.to_string())
}

async fn mock_app_store(
    State(store): State<MockStore>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    store.seen.lock().expect("lock").push(Seen {
        uri: uri.to_string(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });

    match uri.path() {
        "/inApps/v1/transactions/1000" => json_reply(
            StatusCode::OK,
            json!({"signedTransactionInfo": sign(&transaction_payload("1000"))}),
        ),
        "/inApps/v1/transactions/flaky" => {
            if store.flaky_hits.fetch_add(1, Ordering::SeqCst) == 0 {
                json_reply(
                    StatusCode::NOT_FOUND,
                    json!({"errorCode": 4_040_004, "errorMessage": "App not found. Retry later."}),
                )
            } else {
                json_reply(
                    StatusCode::OK,
                    json!({"signedTransactionInfo": sign(&transaction_payload("flaky"))}),
                )
            }
        }
        "/inApps/v1/transactions/down" => json_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"errorMessage": "maintenance"}),
        ),
        "/inApps/v1/transactions/missing" => json_reply(
            StatusCode::NOT_FOUND,
            json!({"errorCode": 4_040_010, "errorMessage": "Transaction id not found."}),
        ),
        "/inApps/v1/subscriptions/1000" => json_reply(
            StatusCode::OK,
            json!({
                "bundleId": "com.example.app",
                "environment": "Sandbox",
                "data": [{
                    "subscriptionGroupIdentifier": "group-1",
                    "lastTransactions": [{
                        "originalTransactionId": "1000",
                        "status": 1,
                        "signedTransactionInfo": sign(&transaction_payload("1000"))
                    }]
                }]
            }),
        ),
        "/inApps/v1/history/1000" => json_reply(
            StatusCode::OK,
            json!({
                "revision": "rev-2",
                "hasMore": true,
                "signedTransactions": [sign(&transaction_payload("1001"))]
            }),
        ),
        "/inApps/v1/lookup/MQKV1234" => json_reply(
            StatusCode::OK,
            json!({"status": 1, "signedTransactions": []}),
        ),
        "/inApps/v2/refund/lookup/1000" => json_reply(
            StatusCode::OK,
            json!({"hasMore": false, "signedTransactions": ["a.b.c"]}),
        ),
        _ => json_reply(StatusCode::NOT_FOUND, json!({"errorCode": 4_040_000})),
    }
}

async fn spawn_mock(store: &MockStore) -> Url {
    let app = Router::new()
        .fallback(mock_app_store)
        .with_state(store.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    Url::parse(&format!("http://{addr}/inApps/")).expect("valid base url")
}

fn client(base_url: Url) -> AppStoreClient {
    let backoff = BackoffConfig::new(Duration::from_millis(1), Duration::from_millis(5))
        .expect("valid backoff");
    AppStoreClient::new(
        Dispatcher::new(reqwest::Client::new(), backoff),
        base_url,
        Arc::new(StaticBearer("static-token".to_owned())),
    )
}

#[tokio::test]
async fn transaction_info_decodes_signed_payload() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await);

    let tx = client
        .transaction_info(&CallContext::new(), "1000")
        .await
        .expect("transaction info");

    assert_eq!(tx.header.alg, "ES256");
    assert_eq!(tx.header.x5c.len(), 3);
    assert_eq!(tx.payload.transaction_id.as_deref(), Some("1000"));
    assert_eq!(tx.payload.environment, Some(Environment::Sandbox));
    assert!(tx.payload.expires_time().is_some());

    let seen = store.last();
    assert_eq!(seen.uri, "/inApps/v1/transactions/1000");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer static-token"));
}

#[tokio::test]
async fn subscription_statuses_send_repeated_status_filter() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await);

    let resp = client
        .all_subscription_statuses(
            &CallContext::new(),
            "1000",
            &[SubscriptionStatus::Active, SubscriptionStatus::Expired],
        )
        .await
        .expect("statuses");

    assert_eq!(store.last().uri, "/inApps/v1/subscriptions/1000?status=1&status=2");
    let item = &resp.data[0].last_transactions[0];
    assert_eq!(item.status, Some(SubscriptionStatus::Active));

    client
        .all_subscription_statuses(&CallContext::new(), "1000", &[])
        .await
        .expect("unfiltered statuses");
    assert_eq!(store.last().uri, "/inApps/v1/subscriptions/1000");
}

#[tokio::test]
async fn history_passes_revision_through() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await);

    let page = client
        .transaction_history(&CallContext::new(), "1000", Some("rev-1"))
        .await
        .expect("history");

    assert_eq!(store.last().uri, "/inApps/v1/history/1000?revision=rev-1");
    assert!(page.has_more);
    assert_eq!(page.revision.as_deref(), Some("rev-2"));
    assert_eq!(page.signed_transactions.len(), 1);
}

#[tokio::test]
async fn order_lookup_and_refund_history_hit_their_paths() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await);
    let ctx = CallContext::new();

    let order = client
        .look_up_order(&ctx, "MQKV1234")
        .await
        .expect("order lookup");
    assert!(!order.is_valid());

    let refunds = client
        .refund_history(&ctx, "1000", None)
        .await
        .expect("refund history");
    assert!(!refunds.has_more);

    let uris: Vec<_> = store.seen().into_iter().map(|s| s.uri).collect();
    assert_eq!(
        uris,
        ["/inApps/v1/lookup/MQKV1234", "/inApps/v2/refund/lookup/1000"]
    );
}

#[tokio::test]
async fn transient_error_code_is_retried_transparently() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await);

    let tx = client
        .transaction_info(&CallContext::new(), "flaky")
        .await
        .expect("second attempt succeeds");

    assert_eq!(tx.payload.transaction_id.as_deref(), Some("flaky"));
    assert_eq!(store.flaky_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn permanent_error_surfaces_remote_code() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await);

    let err = client
        .transaction_info(&CallContext::new(), "missing")
        .await
        .expect_err("404 is permanent");

    let dispatch = err.as_dispatch().expect("dispatch error");
    assert_eq!(dispatch.status(), Some(StatusCode::NOT_FOUND));
    assert!(dispatch.has_error_code(4_040_010));
    assert_eq!(store.seen().len(), 1);
}

#[tokio::test]
async fn disabled_retry_sends_a_single_attempt() {
    let store = MockStore::default();
    let client = client(spawn_mock(&store).await).with_retry(false);

    let err = client
        .transaction_info(&CallContext::new(), "down")
        .await
        .expect_err("503 is surfaced");

    let dispatch = err.as_dispatch().expect("dispatch error");
    assert_eq!(dispatch.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(
        dispatch.remote().map(|e| e.error_message.as_str()),
        Some("maintenance")
    );
    assert_eq!(store.seen().len(), 1);
}

#[tokio::test]
async fn client_from_config_signs_its_own_bearer() {
    let store = MockStore::default();
    let base_url = spawn_mock(&store).await;
    let pem = ES256KeyPair::generate().to_pem().expect("pem");

    let mut cfg = ClientConfig {
        base_url: Some(base_url),
        ..Default::default()
    };
    cfg.retry.initial_backoff_ms = 1;
    cfg.retry.max_backoff_ms = Some(5);
    cfg.token.issuer_id = "57246542-96fe-1a63-e053-0824d011072a".to_owned();
    cfg.token.key_id = "2X9R4HXF34".to_owned();
    cfg.token.bundle_id = "com.example.app".to_owned();
    cfg.token.private_key = Some(pem);

    let client = AppStoreClient::from_config(&cfg).expect("client");
    client
        .transaction_info(&CallContext::new(), "1000")
        .await
        .expect("transaction info");

    let auth = store.last().authorization.expect("authorization header");
    let token = auth.strip_prefix("Bearer ").expect("bearer scheme");
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn client_from_config_requires_key_material() {
    let cfg = ClientConfig::default();
    let err = AppStoreClient::from_config(&cfg).expect_err("no token settings");
    assert!(err.as_dispatch().is_none());
}

#[tokio::test]
async fn cancellation_interrupts_slow_success_body() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut chunk = [0u8; 4096];
        let _ = socket.read(&mut chunk).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"signedTrans")
            .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let base_url = Url::parse(&format!("http://{addr}/inApps/")).expect("valid base url");
    let client = client(base_url);
    let ctx = CallContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = client
        .transaction_info(&ctx, "1000")
        .await
        .expect_err("cancelled while reading the body");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(err.as_dispatch().is_some_and(|e| e.is_cancelled()));
}
