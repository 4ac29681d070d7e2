use axum::http::StatusCode;

mod common;
use common::{TestSetup, body_string, get, get_as, location, post_json};

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn unknown_group_slug_is_not_found() {
    let setup = TestSetup::new().await;

    let response = setup.send(get("/group/no-such-group/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("not_found"));

    // Characters a slug can never contain take the same path.
    let response = setup.send(get("/group/No%20Such/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn unknown_route_echoes_the_path() {
    let setup = TestSetup::new().await;

    let response = setup.send(get("/no/such/route")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("/no/such/route"));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn anonymous_comment_redirects_without_storing() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    let post_id = setup.post(&anna, None, "post").await;

    let response = setup
        .send(post_json(
            &format!("/posts/{post_id}/comment/"),
            None,
            r#"{"text":"hi"}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/auth/login/"));
    assert!(setup.db.list_post_comments(post_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn empty_comment_redirects_without_storing() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    let post_id = setup.post(&anna, None, "post").await;

    let response = setup
        .send(post_json(
            &format!("/posts/{post_id}/comment/"),
            Some("boris"),
            r#"{"text":"   "}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some(format!("/posts/{post_id}/").as_str())
    );
    assert!(setup.db.list_post_comments(post_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn valid_comment_is_attached_to_the_post() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    let post_id = setup.post(&anna, None, "post").await;

    let response = setup
        .send(post_json(
            &format!("/posts/{post_id}/comment/"),
            Some("boris"),
            r#"{"text":"hi"}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let comments = setup.db.list_post_comments(post_id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].body.get(), "hi");
    assert_eq!(comments[0].author.username.get(), "boris");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn non_author_edit_is_soft_rejected() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    let post_id = setup.post(&anna, None, "original").await;

    let response = setup
        .send(post_json(
            &format!("/posts/{post_id}/edit/"),
            Some("boris"),
            r#"{"text":"hijacked"}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some(format!("/posts/{post_id}/").as_str())
    );

    let post = setup.db.fetch_post(post_id).await.unwrap().unwrap();
    assert_eq!(post.body.get(), "original");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn author_edit_applies_and_redirects() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    let post_id = setup.post(&anna, None, "original").await;

    let response = setup
        .send(post_json(
            &format!("/posts/{post_id}/edit/"),
            Some("anna"),
            r#"{"text":"reworked"}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let post = setup.db.fetch_post(post_id).await.unwrap().unwrap();
    assert_eq!(post.body.get(), "reworked");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn landing_feed_stays_stale_until_cleared() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    setup.post(&anna, None, "first post").await;

    let first = body_string(setup.send(get("/")).await).await;
    assert!(first.contains("first post"));

    setup.post(&anna, None, "second post").await;

    // Within the interval the cached body is replayed as-is.
    let cached = body_string(setup.send(get("/")).await).await;
    assert_eq!(cached, first);

    let response = setup.send(post_json("/internal/cache/clear", None, "")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let fresh = body_string(setup.send(get("/")).await).await;
    assert!(fresh.contains("second post"));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn follow_feed_tracks_follow_and_unfollow() {
    let setup = TestSetup::new().await;
    let boris = setup.user("boris").await;

    let response = setup.send(get_as("/profile/boris/follow/", "anna")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/follow/"));

    setup.post(&boris, None, "from boris").await;

    let feed = body_string(setup.send(get_as("/follow/", "anna")).await).await;
    assert!(feed.contains("from boris"));

    let profile = body_string(setup.send(get_as("/profile/boris/", "anna")).await).await;
    assert!(profile.contains("\"following\":true"));

    let response = setup.send(get_as("/profile/boris/unfollow/", "anna")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let feed = body_string(setup.send(get_as("/follow/", "anna")).await).await;
    assert!(!feed.contains("from boris"));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn anonymous_profile_reports_not_following() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    setup.post(&anna, None, "by anna").await;

    let profile = body_string(setup.send(get("/profile/anna/")).await).await;
    assert!(profile.contains("\"following\":false"));
    assert!(profile.contains("by anna"));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn unknown_profile_is_not_found() {
    let setup = TestSetup::new().await;

    let response = setup.send(get("/profile/nobody/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn create_post_redirects_to_the_author_profile() {
    let setup = TestSetup::new().await;

    let response = setup
        .send(post_json("/create/", Some("anna"), r#"{"text":"hello"}"#))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/profile/anna/"));

    let anna = setup.user("anna").await;
    let posts = setup.db.list_author_posts(anna.id).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body.get(), "hello");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn create_post_rejects_an_empty_body() {
    let setup = TestSetup::new().await;

    let response = setup
        .send(post_json("/create/", Some("anna"), r#"{"text":"  "}"#))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn create_post_requires_the_anti_forgery_pair() {
    let setup = TestSetup::new().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/create/")
        .header("content-type", "application/json")
        .header("x-identity-user", "anna")
        .body(axum::body::Body::from(r#"{"text":"hello"}"#))
        .unwrap();

    let response = setup.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn group_feed_lists_only_group_posts() {
    let setup = TestSetup::new().await;
    let anna = setup.user("anna").await;
    let cats = setup.group("cats").await;

    setup.post(&anna, Some(&cats), "a cat").await;
    setup.post(&anna, None, "no group").await;

    let feed = body_string(setup.send(get("/group/cats/")).await).await;
    assert!(feed.contains("a cat"));
    assert!(!feed.contains("no group"));
}
