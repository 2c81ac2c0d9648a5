use crate::server::{
    Result, ServerError, ServerRouter,
    json::{Created, Json},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use postboard_common::model::{
    Id,
    post::{CreatePost, Post, PostMarker},
};
use postboard_db::{
    adapter::{IncomingPost, normalize_incoming},
    client::DbClient,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts", rejection(ServerError))]
struct PostsPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct DeleteResponse {
    success: bool,
}

async fn list_posts(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<Post>>> {
    let posts = db.fetch_posts().await.map_err(ServerError::StoreRead)?;

    Ok(Json(posts))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
    Json(body): Json<IncomingPost>,
) -> Result<Created<Post>> {
    let post = CreatePost::try_from(normalize_incoming(body))?;
    let post = db
        .create_post(post)
        .await
        .map_err(ServerError::store_write)?;

    Ok(Created(post))
}

async fn get_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Post>> {
    let post = db
        .fetch_post(id)
        .await
        .map_err(ServerError::StoreRead)?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn update_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    Json(body): Json<IncomingPost>,
) -> Result<Json<Post>> {
    let post = db
        .update_post(id, normalize_incoming(body))
        .await
        .map_err(ServerError::store_write)?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<DeleteResponse>> {
    let deleted = db
        .delete_post(id)
        .await
        .map_err(ServerError::store_write)?;
    if !deleted {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use crate::server::{ServerState, routes};
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use postboard_common::model::post::Post;
    use postboard_db::{
        client::DbClient,
        collection::{DocumentCollection, InMemoryCollection},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;

    const LEGACY_ID: &str = "6553f10001020304050a0b0c";
    const UNKNOWN_ID: &str = "0123456789abcdef01234567";

    fn app_with(db_client: DbClient) -> Router {
        routes().with_state(ServerState {
            db_client: Arc::new(db_client),
        })
    }

    fn app() -> Router {
        app_with(DbClient::in_memory())
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, json)
    }

    #[tokio::test]
    async fn post_lifecycle() {
        let app = app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/posts",
            Some(json!({ "title": "A", "author": "B", "body": "C" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Post = serde_json::from_value(created).unwrap();
        assert!((OffsetDateTime::now_utc() - created.date).abs() < Duration::minutes(1));
        assert!(!created.hidden);
        let uri = format!("/api/posts/{}", created.id);

        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let fetched: Post = serde_json::from_value(fetched).unwrap();
        assert_eq!(fetched, created);

        let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "body": "D" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "A");
        assert_eq!(updated["author"], "B");
        assert_eq!(updated["body"], "D");

        let (status, deleted) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "success": true }));

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_reports_missing_fields() {
        let app = app();

        let (status, error) = send(
            &app,
            Method::POST,
            "/api/posts",
            Some(json!({ "title": "A", "body": "C" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["status"], 400);
        assert_eq!(error["fields"], json!(["author"]));

        let (_, posts) = send(&app, Method::GET, "/api/posts", None).await;
        assert_eq!(posts, json!([]));
    }

    #[tokio::test]
    async fn create_and_update_accept_legacy_title() {
        let app = app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/posts",
            Some(json!({ "tittle": "Old name", "author": "B", "body": "C", "hidden": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Old name");
        assert_eq!(created["hidden"], true);
        assert!(created.get("tittle").is_none());

        let uri = format!("/api/posts/{}", created["id"].as_str().unwrap());
        let (status, updated) =
            send(&app, Method::PUT, &uri, Some(json!({ "tittle": "Renamed" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Renamed");
        assert!(updated.get("tittle").is_none());

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "title": "Canonical", "tittle": "Ignored" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Canonical");
    }

    #[tokio::test]
    async fn legacy_documents_are_normalized() {
        let collection = InMemoryCollection::new();
        collection
            .insert_one(
                LEGACY_ID.parse().unwrap(),
                json!({
                    "tittle": "Written before the rename",
                    "author": "B",
                    "body": "C",
                    "date": "2023-11-14T22:13:20Z",
                    "hidden": false,
                }),
            )
            .await
            .unwrap();
        let app = app_with(DbClient::new(collection));

        let (status, posts) = send(&app, Method::GET, "/api/posts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(posts[0]["title"], "Written before the rename");
        assert!(posts[0].get("tittle").is_none());

        let uri = format!("/api/posts/{LEGACY_ID}");
        let (status, post) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["id"], LEGACY_ID);
        assert_eq!(post["title"], "Written before the rename");
        assert!(post.get("tittle").is_none());
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first() {
        let app = app();

        for (title, date) in [
            ("old", "2024-01-01T00:00:00Z"),
            ("new", "2025-01-01T00:00:00Z"),
            ("middle", "2024-06-01T00:00:00Z"),
        ] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/posts",
                Some(json!({ "title": title, "author": "B", "body": "C", "date": date })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, posts) = send(&app, Method::GET, "/api/posts", None).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> = posts
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["new", "middle", "old"]);
    }

    #[tokio::test]
    async fn update_keeps_creation_date() {
        let app = app();
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/posts",
            Some(json!({ "title": "A", "author": "B", "body": "C" })),
        )
        .await;
        let uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "date": "2000-01-01T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["date"], created["date"]);

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched["date"], created["date"]);
    }

    #[tokio::test]
    async fn hidden_posts_are_listed() {
        let app = app();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/posts",
            Some(json!({ "title": "Secret", "author": "B", "body": "C", "hidden": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, posts) = send(&app, Method::GET, "/api/posts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(posts.as_array().unwrap().len(), 1);
        assert_eq!(posts[0]["title"], "Secret");
        assert_eq!(posts[0]["hidden"], true);
    }

    #[tokio::test]
    async fn update_rejects_empty_title() {
        let app = app();
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/posts",
            Some(json!({ "title": "A", "author": "B", "body": "C" })),
        )
        .await;
        let uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

        let (status, error) = send(&app, Method::PUT, &uri, Some(json!({ "title": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["fields"], json!(["title"]));

        let (_, post) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(post["title"], "A");
    }

    #[tokio::test]
    async fn unknown_and_invalid_ids() {
        let app = app();

        let (status, _) = send(&app, Method::GET, "/api/posts/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = format!("/api/posts/{UNKNOWN_ID}");
        let (status, error) = send(&app, Method::GET, &unknown, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["status"], 404);
        assert!(error.get("fields").is_none());

        let (status, _) = send(&app, Method::PUT, &unknown, Some(json!({ "body": "D" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &unknown, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/posts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn hello_and_fallback() {
        let app = app();

        let (status, greeting) = send(&app, Method::GET, "/hello", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(greeting, "Hello from postboard!");

        let (status, error) = send(&app, Method::GET, "/api/nothing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["status"], 404);
    }
}
