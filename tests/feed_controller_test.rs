//! Integration tests for the feed controller against a mock Post API.

use std::sync::Arc;
use std::time::Duration;

use blogfeed::api::HttpPostApi;
use blogfeed::config::Config;
use blogfeed::constants::messages;
use blogfeed::feed::{FeedController, FeedError, LoadOutcome};
use blogfeed::models::{Category, CategoryFilter, DraftField, DraftPost};
use blogfeed::notification::Severity;
use blogfeed::session::{MemorySessionStore, Session, SessionStore};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_json(id: &str, category: &str) -> Value {
    json!({
        "_id": id,
        "title": format!("Post {id}"),
        "category": category,
        "content": "Lorem ipsum",
        "media": [format!("https://img.example.com/{id}.png")],
        "likes": ["u1"],
        "comments": [],
        "created_at": "2024-05-01T12:00:00.000Z"
    })
}

/// Eight posts, three of which are Design.
fn full_page() -> Value {
    let categories = [
        "Design",
        "Innovation",
        "Design",
        "Business",
        "Tutorial",
        "Design",
        "Development",
        "Business",
    ];
    let posts: Vec<Value> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| post_json(&format!("p{i}"), c))
        .collect();
    json!({ "posts": posts, "totalPages": 3 })
}

fn page_with(ids: &[&str], total_pages: u32) -> Value {
    let posts: Vec<Value> = ids.iter().map(|id| post_json(id, "Business")).collect();
    json!({ "posts": posts, "totalPages": total_pages })
}

fn feed_for(server: &MockServer, session: Arc<dyn SessionStore>) -> FeedController {
    let config = Config {
        api_base_url: Url::parse(&server.uri()).unwrap(),
        ..Config::for_testing()
    };
    let api = HttpPostApi::new(&config).unwrap();
    FeedController::new(Arc::new(api), session)
}

fn signed_in() -> Arc<dyn SessionStore> {
    Arc::new(MemorySessionStore::with_session(Session::new("secret-token")))
}

async fn mount_page(server: &MockServer, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", page))
        .and(query_param("limit", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_activate_loads_first_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", full_page()).await;

    let feed = feed_for(&server, signed_in());
    assert_eq!(feed.activate().await.unwrap(), LoadOutcome::Applied);

    let state = feed.state();
    assert_eq!(state.page, 1);
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.posts.len(), 8);
    assert_eq!(state.posts[0].id, "p0");
}

#[tokio::test]
async fn test_load_page_records_requested_page() {
    let server = MockServer::start().await;
    mount_page(&server, "2", page_with(&["a", "b"], 2)).await;

    let feed = feed_for(&server, signed_in());
    feed.load_page(2).await.unwrap();

    let state = feed.state();
    assert_eq!(state.page, 2);
    assert_eq!(state.total_pages, 2);
    assert!(state.posts.len() <= 8);
}

#[tokio::test]
async fn test_category_filter_is_local() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_page()))
        .expect(1)
        .mount(&server)
        .await;

    let feed = feed_for(&server, signed_in());
    feed.activate().await.unwrap();

    feed.set_category_filter(CategoryFilter::Only(Category::Design));
    assert_eq!(feed.visible_posts().len(), 3);
    feed.set_category_filter(CategoryFilter::Only(Category::Design));
    assert_eq!(feed.visible_posts().len(), 3);

    let state = feed.state();
    assert_eq!((state.page, state.total_pages), (1, 3));

    feed.set_category_filter(CategoryFilter::Only(Category::Innovation));
    assert_eq!(feed.visible_posts().len(), 1);

    feed.set_category_filter(CategoryFilter::All);
    assert_eq!(feed.visible_posts().len(), 8);
    // Mock expectation of a single GET is verified when the server drops.
}

#[tokio::test]
async fn test_post_without_timestamp_does_not_drop_the_page() {
    let server = MockServer::start().await;
    let mut undated = post_json("undated", "Design");
    undated.as_object_mut().unwrap().remove("created_at");
    let mut null_dated = post_json("null-dated", "Design");
    null_dated["created_at"] = Value::Null;
    mount_page(
        &server,
        "1",
        json!({ "posts": [post_json("dated", "Design"), undated, null_dated], "totalPages": 1 }),
    )
    .await;

    let feed = feed_for(&server, signed_in());
    assert_eq!(feed.activate().await.unwrap(), LoadOutcome::Applied);

    let posts = feed.state().posts;
    assert_eq!(posts.len(), 3);
    assert!(posts[0].created_at.is_some());
    assert_eq!(posts[1].id, "undated");
    assert_eq!(posts[1].created_at, None);
    assert_eq!(posts[2].created_at, None);
    assert!(feed.notification().is_none());
}

#[tokio::test]
async fn test_load_failure_surfaces_notification() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page_with(&["keep"], 2)).await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let feed = feed_for(&server, signed_in());
    feed.activate().await.unwrap();

    assert!(matches!(feed.load_page(2).await, Err(FeedError::Api(_))));
    let state = feed.state();
    assert_eq!(state.posts[0].id, "keep");
    assert_eq!(state.total_pages, 2);

    let shown = feed.notification().unwrap();
    assert_eq!(shown.severity, Severity::Error);
    assert_eq!(shown.message, messages::LOAD_FAILED);
}

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_with(&["old"], 5))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "2", page_with(&["new"], 5)).await;

    let feed = feed_for(&server, signed_in());
    let (first, second) = tokio::join!(feed.load_page(1), feed.load_page(2));

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);

    let state = feed.state();
    assert_eq!(state.page, 2);
    assert_eq!(state.posts.len(), 1);
    assert_eq!(state.posts[0].id, "new");
}

#[tokio::test]
async fn test_stale_failure_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    mount_page(&server, "2", page_with(&["fresh"], 2)).await;

    let feed = feed_for(&server, signed_in());
    let (first, second) = tokio::join!(feed.load_page(1), feed.load_page(2));

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
    assert!(feed.notification().is_none());
    assert_eq!(feed.state().posts[0].id, "fresh");
}

#[tokio::test]
async fn test_submit_prepends_created_post() {
    let server = MockServer::start().await;
    mount_page(&server, "1", full_page()).await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_json(json!({
            "title": "A",
            "category": "Tutorial",
            "content": "B",
            "media": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "x1",
            "title": "A",
            "category": "Tutorial",
            "content": "B",
            "media": [""],
            "likes": [],
            "comments": [],
            "created_at": "2024-06-01T09:30:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let feed = feed_for(&server, signed_in());
    feed.activate().await.unwrap();

    feed.open_dialog();
    feed.update_draft(DraftField::Title, "A").unwrap();
    feed.update_draft(DraftField::Category, "Tutorial").unwrap();
    feed.update_draft(DraftField::Content, "B").unwrap();

    let created = feed.submit_dialog().await.unwrap();
    assert_eq!(created.id, "x1");

    let view = feed.view();
    assert_eq!(view.feed.posts[0].id, "x1");
    assert_eq!(view.feed.posts.len(), 9);
    assert!(view.dialog.is_none());
    let shown = view.notification.unwrap();
    assert_eq!(shown.severity, Severity::Success);
    assert_eq!(shown.message, messages::POST_ADDED);
}

#[tokio::test]
async fn test_submit_failure_leaves_feed_unchanged() {
    let server = MockServer::start().await;
    mount_page(&server, "1", full_page()).await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad"})))
        .mount(&server)
        .await;

    let feed = feed_for(&server, signed_in());
    feed.activate().await.unwrap();
    let before = feed.state().posts;

    feed.open_dialog();
    feed.update_draft(DraftField::Title, "Draft title").unwrap();
    assert!(matches!(feed.submit_dialog().await, Err(FeedError::Api(_))));

    let view = feed.view();
    assert_eq!(view.feed.posts, before);
    assert_eq!(view.dialog.unwrap().title, "Draft title");
    let shown = view.notification.unwrap();
    assert_eq!(shown.severity, Severity::Error);
    assert_eq!(shown.message, messages::POST_FAILED);
}

#[tokio::test]
async fn test_submit_without_session_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let feed = feed_for(&server, Arc::new(MemorySessionStore::new()));
    let result = feed.submit_new_post(&DraftPost::default()).await;

    assert!(matches!(result, Err(FeedError::Unauthenticated)));
    assert_eq!(feed.notification().unwrap().message, messages::POST_FAILED);
}

#[tokio::test]
async fn test_unreachable_api_is_a_load_failure() {
    let config = Config {
        // Nothing listens on the discard port
        api_base_url: Url::parse("http://127.0.0.1:9").unwrap(),
        ..Config::for_testing()
    };
    let api = HttpPostApi::new(&config).unwrap();
    let feed = FeedController::new(Arc::new(api), signed_in());

    assert!(matches!(feed.activate().await, Err(FeedError::Api(_))));
    assert!(feed.state().posts.is_empty());
    assert_eq!(feed.notification().unwrap().severity, Severity::Error);
}
