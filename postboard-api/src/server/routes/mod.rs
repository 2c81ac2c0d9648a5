use crate::server::ServerRouter;
use axum::routing::get;

mod posts;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .route("/hello", get(hello))
        .merge(posts::routes())
}

async fn hello() -> &'static str {
    "Hello from postboard!"
}
