//! Route tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use rstest::{fixture, rstest};
use tower::ServiceExt;
use wikilinks_core::{ArticleMap, test_support::MemoryLinkGraph};
use wikilinks_explorer::{AppState, EDGE_LIMIT, router};

#[fixture]
fn app() -> Router {
    let mut map = ArticleMap::default();
    let rust = map.insert_article("Rust");
    let ocaml = map.insert_article("OCaml");
    let cpp = map.insert_article("C++");
    let tag = map.insert_article("<blink>");
    map.insert_link(rust, ocaml);
    map.insert_link(rust, cpp);
    map.insert_link(rust, tag);
    map.insert_link(ocaml, rust);
    map.insert_link(cpp, rust);
    router(AppState::new(Arc::new(MemoryLinkGraph::from_map(&map))))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("build request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
}

#[rstest]
#[tokio::test]
async fn health_reports_ok(app: Router) {
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[rstest]
#[tokio::test]
async fn index_lists_most_linked(app: Router) {
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("4 articles, 5 links"), "{body}");
    assert!(body.contains(r#"<a href="/article?name=Rust">Rust</a>"#), "{body}");
}

#[rstest]
#[tokio::test]
async fn article_page_lists_both_directions(app: Router) {
    let (status, body) = get(app, "/article?name=Rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Outbound links (3)"), "{body}");
    assert!(body.contains("Inbound links (2)"), "{body}");
    assert!(body.contains(r#"<a href="/article?name=C%2B%2B">C++</a>"#), "{body}");
    assert!(body.contains(r#"<a href="/article?name=OCaml">OCaml</a>"#), "{body}");
}

#[rstest]
#[tokio::test]
async fn article_names_are_escaped(app: Router) {
    let (status, body) = get(app, "/article?name=Rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("<blink>"), "{body}");
    assert!(body.contains("&lt;blink&gt;"), "{body}");
}

#[rstest]
#[tokio::test]
async fn lowercase_names_resolve_through_normalisation(app: Router) {
    let (status, body) = get(app, "/article?name=oCaml").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>OCaml</h1>"), "{body}");
}

#[rstest]
#[case("/article?name=Missing", StatusCode::NOT_FOUND)]
#[case("/article", StatusCode::BAD_REQUEST)]
#[case("/article?name=%20%20", StatusCode::BAD_REQUEST)]
#[tokio::test]
async fn reports_client_errors(app: Router, #[case] uri: &str, #[case] expected: StatusCode) {
    let (status, _) = get(app, uri).await;
    assert_eq!(status, expected);
}

#[rstest]
#[tokio::test]
async fn truncates_long_link_lists() {
    let mut map = ArticleMap::default();
    let hub = map.insert_article("Hub");
    for index in 0..=EDGE_LIMIT {
        let spoke = map.insert_article(&format!("Spoke {index:04}"));
        map.insert_link(hub, spoke);
    }
    let app = router(AppState::new(Arc::new(MemoryLinkGraph::from_map(&map))));
    let (status, body) = get(app, "/article?name=Hub").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("Outbound links ({})", EDGE_LIMIT + 1)));
    assert!(body.contains(&format!("Showing the first {EDGE_LIMIT}.")));
    assert!(!body.contains(&format!("Spoke {EDGE_LIMIT:04}")));
}
