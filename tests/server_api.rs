//! HTTP surface checks: routing, parameter handling, and error mapping.

mod common;

use common::Harness;
use papershelf::server;

async fn spawn_server(h: &Harness) -> String {
    let app = server::router(&h.config, h.service.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_reports_version() {
    let h = Harness::new(3600).await;
    let base = spawn_server(&h).await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn search_returns_grouped_results_and_clamps_per_page() {
    let h = Harness::new(3600).await;
    h.put_document("a.pdf", &["invoice 100"]);
    h.put_document("b.pdf", &["invoice 200", "invoice 100"]);
    let base = spawn_server(&h).await;

    // The request itself triggers the first sync pass.
    let response = reqwest::get(format!("{}/search?q=invoice&per_page=500", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["per_page"], 100);
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["results"][0]["id"], "b.pdf");
    assert_eq!(body["results"][0]["hit_count"], 2);
    assert_eq!(body["results"][1]["id"], "a.pdf");
}

#[tokio::test]
async fn search_rejects_bad_pagination_and_empty_query() {
    let h = Harness::new(3600).await;
    let base = spawn_server(&h).await;

    let response = reqwest::get(format!("{}/search?q=x&page=0", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let response = reqwest::get(format!("{}/search?q=x&per_page=0", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = reqwest::get(format!("{}/search?q=%20%20", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn document_search_returns_snippets_and_title_fallback() {
    let h = Harness::new(3600).await;
    h.put_document("b.pdf", &["invoice 200", "invoice 100"]);
    let base = spawn_server(&h).await;

    let body: serde_json::Value =
        reqwest::get(format!("{}/search/document?q=invoice&id=b.pdf", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["title"], "b.pdf");
    let snippet = body["results"][0]["snippet"].as_str().unwrap();
    assert!(snippet.contains("[invoice]"), "snippet: {}", snippet);

    // Zero hits: the title falls back to the raw document id.
    let body: serde_json::Value =
        reqwest::get(format!("{}/search/document?q=nothing&id=ghost.pdf", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(body["total"], 0);
    assert_eq!(body["title"], "ghost.pdf");
    assert_eq!(body["total_pages"], 0);
}

#[tokio::test]
async fn document_listing_and_fetch() {
    let h = Harness::new(3600).await;
    h.put_document("a.pdf", &["alpha"]);
    h.put_document("b.pdf", &["beta", "gamma"]);
    let base = spawn_server(&h).await;

    let body: serde_json::Value = reqwest::get(format!("{}/documents", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listing = body.as_array().unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0]["id"], "a.pdf");
    assert_eq!(listing[1]["id"], "b.pdf");
    assert_eq!(listing[1]["page_count"], 2);

    let response = reqwest::get(format!("{}/documents/a.pdf", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[..], b"a.pdf");
}

#[tokio::test]
async fn document_fetch_rejects_unknown_and_traversal_ids() {
    let h = Harness::new(3600).await;
    h.put_document("a.pdf", &["alpha"]);
    let base = spawn_server(&h).await;

    let response = reqwest::get(format!("{}/documents/ghost.pdf", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    // Encoded separator: decodes to an id containing a slash.
    let response = reqwest::get(format!("{}/documents/..%2Fsecret.pdf", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = reqwest::get(format!("{}/documents/a.txt", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
