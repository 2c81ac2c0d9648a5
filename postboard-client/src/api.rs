use async_trait::async_trait;
use postboard_common::model::{
    Id,
    post::{PartialPost, Post, PostMarker},
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Server answered {status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// The posts API as the board uses it.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn create_post(&self, post: &PartialPost) -> Result<Post>;

    async fn update_post(&self, id: Id<PostMarker>, update: &PartialPost) -> Result<Post>;

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<()>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone, Debug)]
pub struct HttpPostsApi {
    client: Client,
    base_url: Url,
}

impl HttpPostsApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Without the trailing slash `join` would replace the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn posts_url(&self) -> Result<Url> {
        Ok(self.base_url.join("api/posts")?)
    }

    fn post_url(&self, id: Id<PostMarker>) -> Result<Url> {
        Ok(self.base_url.join(&format!("api/posts/{id}"))?)
    }
}

/// Turns every non-success status into [`ClientError::Status`], keeping the server's message.
async fn success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned(),
    };
    Err(ClientError::Status { status, message })
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let response = self.client.get(self.posts_url()?).send().await?;

        Ok(success(response).await?.json().await?)
    }

    async fn create_post(&self, post: &PartialPost) -> Result<Post> {
        let response = self
            .client
            .post(self.posts_url()?)
            .json(post)
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    async fn update_post(&self, id: Id<PostMarker>, update: &PartialPost) -> Result<Post> {
        let response = self
            .client
            .put(self.post_url(id)?)
            .json(update)
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<()> {
        let response = self.client.delete(self.post_url(id)?).send().await?;
        success(response).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{ClientError, HttpPostsApi, PostsApi};
    use postboard_common::model::post::PartialPost;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    const ID: &str = "6553f10001020304050a0b0c";

    fn post_json(title: &str) -> serde_json::Value {
        json!({
            "id": ID,
            "title": title,
            "author": "B",
            "body": "C",
            "date": "2025-10-24T10:00:00Z",
            "hidden": false,
        })
    }

    #[tokio::test]
    async fn list_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json("A")])))
            .mount(&server)
            .await;

        let api = HttpPostsApi::new(&server.uri()).unwrap();
        let posts = api.list_posts().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "A");
        assert_eq!(posts[0].id.to_string(), ID);
    }

    #[tokio::test]
    async fn update_sends_only_given_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/api/posts/{ID}")))
            .and(body_json(json!({ "body": "D" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json("A")))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpPostsApi::new(&server.uri()).unwrap();
        let update = PartialPost {
            body: Some("D".to_owned()),
            ..PartialPost::default()
        };
        api.update_post(ID.parse().unwrap(), &update).await.unwrap();
    }

    #[tokio::test]
    async fn errors_keep_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/posts/{ID}")))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "status": 404, "error": "Post not found" })),
            )
            .mount(&server)
            .await;

        let api = HttpPostsApi::new(&server.uri()).unwrap();
        let error = api.delete_post(ID.parse().unwrap()).await.unwrap_err();

        assert!(matches!(
            error,
            ClientError::Status { status, ref message }
                if status == StatusCode::NOT_FOUND && message == "Post not found"
        ));
    }

    #[tokio::test]
    async fn base_url_with_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/board/api/posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(post_json("A")))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpPostsApi::new(&format!("{}/board", server.uri())).unwrap();
        let post = PartialPost {
            title: Some("A".to_owned()),
            author: Some("B".to_owned()),
            body: Some("C".to_owned()),
            ..PartialPost::default()
        };

        assert_eq!(api.create_post(&post).await.unwrap().title, "A");
    }
}
