use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use roster_client::{Account, AccountStatus, Client, Error, PollOutcome};
use serde_json::json;
use tracing_test::traced_test;

async fn spawn_app(app: Router) -> SocketAddr {
    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        server.await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> Client {
    Client::builder()
        .base_url(format!("http://{addr}"))
        .unwrap()
        .build()
        .unwrap()
}

#[traced_test]
#[tokio::test]
async fn get_decodes_body_and_metadata() {
    let app = Router::new().route(
        "/v1/accounts/a-1",
        get(|| {
            async {
                (
                    StatusCode::OK,
                    [("x-roster-request-id", "01HTESTREQ")],
                    Json(json!({
                        "kind": "Account",
                        "id": "a-1",
                        "username": "ada",
                        "status": "active",
                    })),
                )
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let response = client.accounts().get("a-1").send().await.unwrap();
    assert_eq!(StatusCode::OK, response.status_code());
    assert_eq!(Some("01HTESTREQ"), response.request_id());
    let account = response.into_body().unwrap();
    assert_eq!(Some("ada"), account.username.as_deref());
    assert_eq!(Some(AccountStatus::Active), account.status);
}

#[tokio::test]
async fn list_appends_parameters_and_decodes_page_meta() {
    let seen_query: Arc<Mutex<Option<String>>> = Arc::default();
    let app = Router::new().route(
        "/v1/accounts",
        get({
            let seen_query = seen_query.clone();
            move |RawQuery(query): RawQuery| {
                let seen_query = seen_query.clone();
                async move {
                    *seen_query.lock().unwrap() = query;
                    Json(json!({
                        "page": 2,
                        "size": 1,
                        "total": 7,
                        "items": [ { "kind": "Account", "id": "a-2" } ],
                    }))
                }
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let response = client
        .accounts()
        .list()
        .page(2)
        .size(1)
        .search("username like 'a%'")
        .parameter("label", "tier=gold")
        .parameter("label", "region=eu")
        .send()
        .await
        .unwrap();

    let query = seen_query.lock().unwrap().clone().unwrap();
    // Repeated parameters are appended, never overwritten.
    assert!(query.contains("label=tier%3Dgold&label=region%3Deu"), "{query}");
    assert!(query.contains("page=2"), "{query}");
    assert!(query.contains("size=1"), "{query}");

    let page = response.into_body().unwrap();
    assert_eq!(Some(2), page.get_page());
    assert_eq!(Some(7), page.get_total());
    assert_eq!(1, page.len());
    assert_eq!(Some("a-2"), page.items()[0].id.as_deref());
}

#[tokio::test]
async fn repeated_headers_are_all_sent() {
    let seen: Arc<Mutex<usize>> = Arc::default();
    let app = Router::new().route(
        "/v1/accounts/a-1",
        get({
            let seen = seen.clone();
            move |headers: HeaderMap| {
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() =
                        headers.get_all("x-trace-tag").iter().count();
                    Json(json!({ "kind": "Account", "id": "a-1" }))
                }
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    client
        .accounts()
        .get("a-1")
        .header("x-trace-tag", "one")
        .header("x-trace-tag", "two")
        .send()
        .await
        .unwrap();
    assert_eq!(2, *seen.lock().unwrap());
}

#[tokio::test]
async fn create_posts_the_body_once() {
    let app = Router::new().route(
        "/v1/accounts",
        post(|Json(mut account): Json<Account>| {
            async move {
                account.id = Some("a-900".to_owned());
                (StatusCode::CREATED, Json(account))
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let draft = Account {
        username: Some("grace".to_owned()),
        ..Default::default()
    };
    let response = client.accounts().create(draft).send().await.unwrap();
    assert_eq!(StatusCode::CREATED, response.status_code());
    let created = response.into_body().unwrap();
    assert_eq!(Some("a-900"), created.id.as_deref());
    assert_eq!(Some("grace"), created.username.as_deref());
}

#[tokio::test]
async fn delete_with_no_body_is_success() {
    let app = Router::new().route(
        "/v1/accounts/a-1",
        delete(|| async { StatusCode::NO_CONTENT }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let response = client.accounts().delete("a-1").send().await.unwrap();
    assert_eq!(StatusCode::NO_CONTENT, response.status_code());
    assert!(response.body().is_none());
}

#[tokio::test]
async fn server_error_envelope_travels_as_error() {
    let app = Router::new().route(
        "/v1/accounts/gone",
        get(|| {
            async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "code": "ROSTER-404",
                        "reason": "Account 'gone' does not exist",
                    })),
                )
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let err = client.accounts().get("gone").send().await.unwrap_err();
    match err {
        | Error::Api(api) => {
            assert_eq!(StatusCode::NOT_FOUND, api.status_code());
            assert_eq!(Some("ROSTER-404"), api.code());
        }
        | other => panic!("expected an api error, got {other:?}"),
    }
}

#[traced_test]
#[tokio::test]
async fn poller_keeps_going_until_accepted_status() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/v1/accounts/a-1",
        get({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "code": "ROSTER-500",
                                "reason": "still warming up",
                            })),
                        )
                    } else {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "kind": "Account",
                                "id": "a-1",
                                "status": "active",
                            })),
                        )
                    }
                }
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let outcome = client
        .accounts()
        .get("a-1")
        .poll()
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
        .start()
        .await
        .unwrap();

    assert_eq!(3, hits.load(Ordering::SeqCst));
    let response = outcome.into_response().unwrap();
    let account = response.into_body().unwrap();
    assert_eq!(Some(AccountStatus::Active), account.status);
}

#[tokio::test]
async fn poller_can_wait_for_an_error_status() {
    let app = Router::new().route(
        "/v1/accounts/a-1",
        get(|| {
            async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "code": "ROSTER-404",
                        "reason": "Account 'a-1' does not exist",
                    })),
                )
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let outcome = client
        .accounts()
        .get("a-1")
        .poll()
        .status(StatusCode::NOT_FOUND)
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
        .start()
        .await
        .unwrap();

    assert_eq!(StatusCode::NOT_FOUND, outcome.status_code());
    match outcome {
        | PollOutcome::Api(api) => {
            assert_eq!(Some("ROSTER-404"), api.code())
        }
        | other => panic!("expected an api outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn poller_deadline_cuts_off_unsatisfied_predicates() {
    let app = Router::new().route(
        "/v1/accounts/a-1",
        get(|| async { Json(json!({ "kind": "Account", "id": "a-1" })) }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let started = Instant::now();
    let err = client
        .accounts()
        .get("a-1")
        .poll()
        .predicate(|_| false)
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_millis(200))
        .start()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PollDeadlineExceeded(_)));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "deadline was not prompt: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn poller_without_timeout_is_a_usage_error() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/v1/accounts/a-1",
        get({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "kind": "Account", "id": "a-1" }))
                }
            }
        }),
    );
    let addr = spawn_app(app).await;
    let client = client_for(addr);

    let err = client
        .accounts()
        .get("a-1")
        .poll()
        .interval(Duration::from_millis(10))
        .start()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PollTimeoutRequired));
    // Fail fast means not a single request went out.
    assert_eq!(0, hits.load(Ordering::SeqCst));
}
