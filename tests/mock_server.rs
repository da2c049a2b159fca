//! End-to-end behaviour of the mock server over a real listener.

use reqwest::StatusCode;
use serde_json::{json, Value};

use mockpath::lifecycle::StartupError;
use mockpath::spec::SpecLoadError;

mod common;

use common::SpecTree;

#[tokio::test]
async fn test_default_response_from_convention_file() {
    let tree = SpecTree::new();
    tree.write("users.get.yaml", "status: 200\n")
        .write("users.get.resp.json", r#"{"users": []}"#);
    let server = common::start(&tree, false).await;

    let res = common::client().get(server.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"users": []}));

    server.stop().await;
}

#[tokio::test]
async fn test_query_rule_and_fallback() {
    let tree = SpecTree::new();
    tree.write(
        "order.post.yaml",
        r#"
matches:
  - params: {fast: "true"}
    status: 202
    response: {"queued": true}
"#,
    );
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client.post(server.url("/order?fast=true")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"queued": true}));

    let res = client.post(server.url("/order")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.bytes().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_first_declared_rule_wins() {
    let tree = SpecTree::new();
    tree.write(
        "search.get.yaml",
        r#"
matches:
  - params: {q: rust}
    response: {"rule": "A"}
  - params: {q: rust, page: "2"}
    response: {"rule": "B"}
"#,
    );
    let server = common::start(&tree, false).await;

    let res = common::client()
        .get(server.url("/search?page=2&q=rust"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"rule": "A"}));

    server.stop().await;
}

#[tokio::test]
async fn test_repeated_query_param_uses_first_value() {
    let tree = SpecTree::new();
    tree.write(
        "tags.get.yaml",
        r#"
matches:
  - params: {q: b}
    response: {"tag": "b"}
  - params: {q: a}
    response: {"tag": "a"}
"#,
    );
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client.get(server.url("/tags?q=a&q=b")).send().await.unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"tag": "a"}));

    let res = client.get(server.url("/tags?q=b&q=a")).send().await.unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"tag": "b"}));

    server.stop().await;
}

#[tokio::test]
async fn test_top_level_response_file() {
    let tree = SpecTree::new();
    tree.write(
        "shop/items.get.yaml",
        "status: 200\nresponse_file: payloads/items.json\n",
    )
    .write("shop/payloads/items.json", r#"{"items": ["a", "b"]}"#)
    .write("shop/items.get.resp.json", r#"{"items": []}"#);
    let server = common::start(&tree, false).await;

    let res = common::client().get(server.url("/shop/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"items": ["a", "b"]}));

    server.stop().await;
}

#[tokio::test]
async fn test_directory_index_specs() {
    let tree = SpecTree::new();
    tree.write(".get.yaml", "response: {\"index\": \"root\"}\n")
        .write("docs/.get.yaml", "status: 200\n")
        .write("docs/.get.resp.json", r#"{"index": "docs"}"#);
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"index": "root"}));

    let res = client.get(server.url("/docs/")).send().await.unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"index": "docs"}));

    server.stop().await;
}

#[tokio::test]
async fn test_request_file_body_equality_is_type_sensitive() {
    let tree = SpecTree::new();
    tree.write(
        "items.post.yaml",
        r#"
status: 400
matches:
  - request_file: payload.json
    status: 201
    response: {"created": true}
"#,
    )
    .write("payload.json", r#"{"id": 1}"#);
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client
        .post(server.url("/items"))
        .json(&json!({"id": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"created": true}));

    for body in [r#"{"id": "1"}"#, r#"{"id": 1, "extra": true}"#, "not json", ""] {
        let res = client
            .post(server.url("/items"))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_convention_request_and_response_files() {
    let tree = SpecTree::new();
    tree.write("login.post.yaml", "status: 401\nmatches:\n  - status: 200\n")
        .write("login.post.req.1.json", r#"{"user": "admin", "password": "secret"}"#)
        .write("login.post.resp.1.json", r#"{"token": "abc"}"#)
        .write("login.post.resp.json", r#"{"error": "bad credentials"}"#);
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client
        .post(server.url("/login"))
        .json(&json!({"password": "secret", "user": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"token": "abc"}));

    let res = client
        .post(server.url("/login"))
        .json(&json!({"user": "admin", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "bad credentials"}));

    server.stop().await;
}

#[tokio::test]
async fn test_not_found_and_method_not_allowed() {
    let tree = SpecTree::new();
    tree.write("users.get.yaml", "");
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client.post(server.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Method Not Allowed"}));

    let res = client.get(server.url("/orders")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Not Found"}));

    server.stop().await;
}

#[tokio::test]
async fn test_nested_directories_and_trailing_slash() {
    let tree = SpecTree::new();
    tree.write("api/v1/users.delete.yaml", "status: 204\n")
        .write("api/v1/users.get.yaml", "response: [1, 2, 3]\n");
    let server = common::start(&tree, false).await;
    let client = common::client();

    let res = client.get(server.url("/api/v1/users/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!([1, 2, 3]));

    let res = client.delete(server.url("/api/v1/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(server.url("/api/v1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_spec_fails_startup() {
    let tree = SpecTree::new();
    tree.write("users.get.yaml", "matches: [\n");

    let err = common::try_start(common::config_for(&tree, false))
        .await
        .err()
        .expect("startup should fail");
    assert!(matches!(err, StartupError::Specs(SpecLoadError::Yaml { .. })), "{err}");
}

#[tokio::test]
async fn test_concurrent_requests() {
    let tree = SpecTree::new();
    tree.write("ping.get.yaml", "response: {\"pong\": true}\n");
    let server = common::start(&tree, false).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let client = client.clone();
        let url = server.url("/ping");
        tasks.push(tokio::spawn(async move {
            client.get(url).send().await.unwrap().json::<Value>().await.unwrap()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), json!({"pong": true}));
    }

    server.stop().await;
}
