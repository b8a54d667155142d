//! The axum application and its middleware stack.
//!
//! # Examples
//!
//! Create and fetch an item.
//!
//! ```no_run
//! # use catalog_api::api::item::item_repository::{Item, NewItem};
//! # async fn example(db: catalog_api::infra::database::DbPool) -> color_eyre::Result<()> {
//! let url = catalog_api::app::spawn_app_with_db(db).await?;
//! let client = reqwest::Client::new();
//! let new_item = NewItem { name: "pen".to_string(), description: "blue pen".to_string(), price: 10 };
//! let response = client.post(format!("{url}/items")).json(&new_item).send().await?;
//! assert_eq!(200, response.status());
//! let item = response.json::<Item>().await?;
//! let fetched = reqwest::get(format!("{url}/items/{}", item.id)).await?.json::<Item>().await?;
//! assert_eq!(item, fetched);
//! # Ok(())
//! # }
//! ```

use crate::infra::database::DbPool;
use crate::infra::error::{InternalError, PanicHandler};
use crate::infra::middleware::MakeRequestIdSpan;
use crate::infra::openapi::ApiDoc;
use crate::infra::shutdown::shutdown_signal;
use crate::infra::{config::Config, state::AppState};
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use http::header::AUTHORIZATION;
use std::iter;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

const SWAGGER_UI_PATH: &str = "/api/swagger-ui";

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    let server = &state.config().server;

    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e| async move {
            InternalError::Other(format!("Tower middleware failed: {e}")).into_response()
        }))
        .concurrency_limit(server.concurrency_limit);
    let request_timeout = server.request_timeout;

    Router::new()
        .route("/", get(|| async { Redirect::permanent(SWAGGER_UI_PATH) }))
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url("/api/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/api/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api/openapi.json").path("/api/rapidoc"))
        .nest("/api", crate::api::api(state))
        // Layers
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::middleware::from_fn(
            crate::infra::middleware::log_request_response,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new(iter::once(
            AUTHORIZATION,
        )))
        .layer(tower_middleware)
        .layer(CatchPanicLayer::custom(PanicHandler))
}

/// Starts the axum server, running until ctrl-c is pressed.
pub async fn run_app(listener: TcpListener, db: DbPool, config: Config) -> std::io::Result<()> {
    let state = AppState::new(db, config);
    let app = app(state).into_make_service();

    tracing::info!("Starting axum on {}", listener.local_addr()?);
    let exit_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match &exit_result {
        Ok(_) => tracing::info!("Successfully shut down"),
        Err(e) => tracing::error!("Shutdown failed: {}", e),
    }

    exit_result
}

/// Spawn a server on a random port with a custom database.
/// Returns the base url of the REST API.
pub async fn spawn_app_with_db(db: DbPool) -> color_eyre::Result<String> {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await?;
    let port = listener.local_addr()?.port();
    let config = crate::infra::config::load_config()?;
    tokio::spawn(run_app(listener, db, config));
    Ok(format!("http://{address}:{port}/api"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{
            info::info_api::AppInfo,
            item::item_repository::{Item, NewItem},
        },
        infra::error::ErrorBody,
    };
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn test_app(db: DbPool) -> Router {
        let config = crate::infra::config::load_config().unwrap();
        let state = AppState::new(db, config);
        app(state)
    }

    async fn json_body<T: DeserializeOwned>(res: axum::response::Response) -> T {
        let body = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_item(name: &str, description: &str, price: i32) -> Request<Body> {
        let new_item = NewItem {
            name: name.to_string(),
            description: description.to_string(),
            price,
        };
        Request::post("/api/items")
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&new_item).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[sqlx::test]
    async fn create_get_and_list_pen(db: DbPool) {
        let app = test_app(db);

        let res = app.clone().oneshot(post_item("pen", "blue pen", 10)).await.unwrap();
        assert_eq!(StatusCode::OK, res.status());
        let created: Item = json_body(res).await;
        let expected = Item {
            id: 1,
            name: "pen".to_string(),
            description: "blue pen".to_string(),
            price: 10,
        };
        assert_eq!(expected, created);

        let res = app.clone().oneshot(get("/api/items/1")).await.unwrap();
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(expected, json_body::<Item>(res).await);

        let res = app.oneshot(get("/api/items?skip=0&limit=10")).await.unwrap();
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(vec![expected], json_body::<Vec<Item>>(res).await);
    }

    #[sqlx::test]
    async fn missing_item_is_404(db: DbPool) {
        let app = test_app(db);
        let res = app.oneshot(get("/api/items/99")).await.unwrap();
        assert_eq!(StatusCode::NOT_FOUND, res.status());
        assert_eq!("item not found", json_body::<ErrorBody>(res).await.message());
    }

    #[sqlx::test]
    async fn list_pages_through_fifteen_items(db: DbPool) {
        let app = test_app(db);
        for i in 0..15 {
            let res = app
                .clone()
                .oneshot(post_item(&format!("item {i}"), "", i))
                .await
                .unwrap();
            assert_eq!(StatusCode::OK, res.status());
        }

        let res = app.clone().oneshot(get("/api/items")).await.unwrap();
        let first: Vec<Item> = json_body(res).await;
        let res = app.clone().oneshot(get("/api/items?skip=10&limit=10")).await.unwrap();
        let rest: Vec<Item> = json_body(res).await;
        let res = app.oneshot(get("/api/items")).await.unwrap();
        let again: Vec<Item> = json_body(res).await;

        assert_eq!(10, first.len());
        assert_eq!(5, rest.len());
        assert_eq!(first, again);
    }

    #[sqlx::test]
    async fn negative_pagination_is_rejected(db: DbPool) {
        let app = test_app(db);
        for uri in ["/api/items?skip=-1", "/api/items?limit=-5"] {
            let res = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, res.status());
            let body: ErrorBody = json_body(res).await;
            assert!(body.message().starts_with("invalid field(s)"));
        }
    }

    #[sqlx::test]
    async fn non_numeric_id_is_rejected(db: DbPool) {
        let app = test_app(db);
        let res = app.oneshot(get("/api/items/pen")).await.unwrap();
        assert_eq!(StatusCode::BAD_REQUEST, res.status());
    }

    #[sqlx::test]
    async fn missing_fields_are_rejected(db: DbPool) {
        let app = test_app(db);
        let req = Request::post("/api/items")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"name": "pen"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, res.status());
    }

    #[sqlx::test]
    async fn responses_carry_a_request_id(db: DbPool) {
        let app = test_app(db);
        let req = Request::get("/api/info")
            .header("x-request-id", "abc")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!("abc", res.headers()["x-request-id"]);
    }

    #[sqlx::test]
    async fn root_redirects_to_docs(db: DbPool) {
        let app = test_app(db);
        let res = app.oneshot(get("/")).await.unwrap();
        assert_eq!(StatusCode::PERMANENT_REDIRECT, res.status());
        assert_eq!(SWAGGER_UI_PATH, res.headers()["location"]);
    }

    #[sqlx::test]
    async fn swagger_ui_oneshot(db: DbPool) {
        let app = test_app(db);
        let result = app.oneshot(get("/api/swagger-ui/index.html")).await.unwrap();
        assert_eq!(StatusCode::OK, result.status())
    }

    #[sqlx::test]
    async fn redoc_oneshot(db: DbPool) {
        let app = test_app(db);
        let result = app.oneshot(get("/api/redoc")).await.unwrap();
        assert_eq!(StatusCode::OK, result.status())
    }

    #[sqlx::test]
    async fn rapidoc_oneshot(db: DbPool) {
        let app = test_app(db);
        let result = app.oneshot(get("/api/rapidoc")).await.unwrap();
        assert_eq!(StatusCode::OK, result.status())
    }

    #[sqlx::test]
    async fn spawned_server_round_trips_items(db: DbPool) {
        let url = spawn_app_with_db(db).await.unwrap();
        let client = reqwest::Client::new();

        let new_item = NewItem {
            name: "free sample".to_string(),
            description: String::new(),
            price: 0,
        };
        let response = client
            .post(format!("{url}/items"))
            .json(&new_item)
            .send()
            .await
            .unwrap();
        assert_eq!(200, response.status());
        let created: Item = response.json().await.unwrap();
        assert_eq!(new_item.name, created.name);
        assert_eq!("", created.description);
        assert_eq!(0, created.price);

        let fetched: Item = client
            .get(format!("{url}/items/{}", created.id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created, fetched);

        let info: AppInfo = client
            .get(format!("{url}/info"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(env!("CARGO_PKG_NAME"), info.name);
    }
}
