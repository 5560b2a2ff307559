//! End-to-end tests of the query builder over the reqwest transport.
//!
//! A wiremock server stands in for PostgREST, so each test pins down the exact
//! request that goes on the wire and how the reply is normalized.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postgrest_client_core::{CancellationToken, PostgrestClient, PostgrestConfig, PostgrestError};
use postgrest_client_query::{
    CountOption, Filterable, InsertOptions, IsValue, Modifiable, OrderOptions,
    PostgrestClientQueryExt, RpcOptions, SelectOptions,
};

fn create_client(server: &MockServer) -> PostgrestClient {
    let config = PostgrestConfig::new(server.uri()).header("apikey", "anon-key");
    PostgrestClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn select_with_filters_and_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .and(query_param("select", "id,name"))
        .and(query_param("country_id", "eq.1"))
        .and(query_param("name", "in.(\"Auckland, NZ\",Wellington)"))
        .and(query_param("order", "name.asc"))
        .and(query_param("limit", "2"))
        .and(header("apikey", "anon-key"))
        .and(header("Prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "0-1/7")
                .set_body_json(json!([{"id": 1, "name": "Auckland, NZ"}, {"id": 2, "name": "Wellington"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .from("cities")
        .select_with(
            "id, name",
            SelectOptions {
                head: false,
                count: Some(CountOption::Exact),
            },
        )
        .eq("country_id", 1)
        .in_("name", ["Auckland, NZ", "Wellington"])
        .order("name", OrderOptions::asc())
        .limit(2)
        .await
        .unwrap();

    assert!(resp.error.is_none());
    assert_eq!(resp.status, 200);
    assert_eq!(resp.status_text, "OK");
    assert_eq!(resp.count, Some(7));
    assert_eq!(resp.data.unwrap().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn head_request_returns_only_count() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/cities"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "*/42"))
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .from("cities")
        .select_with(
            "*",
            SelectOptions {
                head: true,
                count: Some(CountOption::Estimated),
            },
        )
        .await
        .unwrap();

    assert_eq!(resp.data, None);
    assert_eq!(resp.count, Some(42));
    assert_eq!(resp.status, 200);
}

#[tokio::test]
async fn insert_sends_json_body_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/countries"))
        .and(query_param("select", "id"))
        .and(header("Content-Type", "application/json"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({"name": "Japan", "code": "JP"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"id": 3}])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .from("countries")
        .insert(&json!({"name": "Japan", "code": "JP"}), InsertOptions::default())
        .unwrap()
        .select_columns("id")
        .await
        .unwrap();

    assert_eq!(resp.status, 201);
    assert_eq!(resp.status_text, "OK");
    assert_eq!(resp.data, Some(json!([{"id": 3}])));
}

#[tokio::test]
async fn delete_with_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/cities"))
        .and(query_param("deleted_at", "not.is.null"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .from("cities")
        .delete(None)
        .not("deleted_at", "is", IsValue::Null.as_str())
        .await
        .unwrap();

    assert!(resp.is_ok());
    assert_eq!(resp.data, None);
    assert_eq!(resp.status, 204);
    assert_eq!(resp.status_text, "No Content");
}

#[tokio::test]
async fn schema_sets_profile_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(header("Accept-Profile", "private"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notes"))
        .and(header("Content-Profile", "private"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server).schema("private");
    let read = client.from("notes").select("*").await.unwrap();
    assert_eq!(read.status, 200);

    let write = client
        .from("notes")
        .update(&json!({"body": "x"}), None)
        .unwrap()
        .eq("id", 1)
        .await
        .unwrap();
    assert_eq!(write.status, 204);
}

#[tokio::test]
async fn not_found_with_array_body_becomes_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/find_nothing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .rpc("find_nothing", json!({}), RpcOptions::default())
        .unwrap()
        .await
        .unwrap();

    assert!(resp.error.is_none());
    assert_eq!(resp.data, Some(json!([])));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.status_text, "OK");
}

#[tokio::test]
async fn not_found_with_empty_body_becomes_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp = create_client(&server).from("cities").select("*").await.unwrap();

    assert!(resp.error.is_none());
    assert_eq!(resp.data, None);
    assert_eq!(resp.status, 204);
    assert_eq!(resp.status_text, "No Content");
}

#[tokio::test]
async fn api_error_is_returned_in_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "22P02",
            "details": null,
            "hint": null,
            "message": "invalid input syntax for type integer: \"abc\""
        })))
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .from("cities")
        .select("*")
        .eq("id", "abc")
        .await
        .unwrap();

    assert_eq!(resp.status, 400);
    assert_eq!(resp.status_text, "Bad Request");
    assert_eq!(resp.data, None);
    let err = resp.error.unwrap();
    assert_eq!(err.code(), Some("22P02"));
    assert!(err.message().unwrap().contains("invalid input syntax"));
}

#[tokio::test]
async fn throw_on_error_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad", "code": "42703"})))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .from("cities")
        .select("nope")
        .throw_on_error()
        .await
        .unwrap_err();

    assert!(matches!(err, PostgrestError::Api(_)));
    assert_eq!(err.code(), Some("42703"));
}

#[tokio::test]
async fn maybe_single_with_zero_rows_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .and(header("Accept", "application/vnd.pgrst.object+json"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "Results contain 0 rows, application/vnd.pgrst.object+json requires 1 row",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let resp = client
        .from("cities")
        .select("*")
        .eq("id", 999)
        .maybe_single()
        .await
        .unwrap();
    assert!(resp.error.is_none());
    assert_eq!(resp.data, None);
    assert_eq!(resp.status, 200);

    let resp = client
        .from("cities")
        .select("*")
        .eq("id", 999)
        .single()
        .await
        .unwrap();
    assert_eq!(resp.status, 406);
    assert_eq!(resp.error.unwrap().code(), Some("PGRST116"));
}

#[tokio::test]
async fn csv_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .and(header("Accept", "text/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("id,name\n1,Auckland"))
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .from("cities")
        .select("id,name")
        .csv()
        .await
        .unwrap();

    assert_eq!(resp.data, Some(json!("id,name\n1,Auckland")));
}

#[tokio::test]
async fn rpc_get_encodes_arguments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rpc/echo"))
        .and(query_param("tags", "{a,b}"))
        .and(query_param("n", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(3)))
        .expect(1)
        .mount(&server)
        .await;

    let resp = create_client(&server)
        .rpc("echo", json!({"n": 3, "tags": ["a", "b"]}), RpcOptions::get())
        .unwrap()
        .await
        .unwrap();

    assert_eq!(resp.data, Some(json!(3)));
}

#[tokio::test]
async fn aborted_request_resolves_with_status_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let resp = create_client(&server)
        .from("slow")
        .select("*")
        .abort_signal(token)
        .await
        .unwrap();

    assert_eq!(resp.status, 0);
    assert_eq!(resp.status_text, "");
    assert_eq!(resp.data, None);
    let err = resp.error.unwrap();
    assert!(err.message().unwrap().starts_with("AbortError: "));
    assert_eq!(err.hint(), Some(""));
    assert_eq!(err.code(), Some("ABORT_ERR"));
}

#[tokio::test]
async fn aborted_request_rejects_under_throw_on_error() {
    let server = MockServer::start().await;
    let token = CancellationToken::new();
    token.cancel();

    let err = create_client(&server)
        .from("cities")
        .select("*")
        .abort_signal(token)
        .throw_on_error()
        .await
        .unwrap_err();

    assert!(matches!(err, PostgrestError::Transport(_)));
}

#[tokio::test]
async fn connection_failure_resolves_with_status_zero() {
    // Nothing listens on port 9 on the loopback interface.
    let client = PostgrestClient::new(PostgrestConfig::new("http://127.0.0.1:9")).unwrap();

    let resp = client.from("cities").select("*").await.unwrap();

    assert_eq!(resp.status, 0);
    assert_eq!(resp.status_text, "");
    assert!(resp.error.unwrap().message().unwrap().starts_with("FetchError: "));
}
