//! HTTP/JSON gateway in front of the gRPC potato service.
//!
//! The gateway holds a lazily connected [`PotatoServiceClient`] and forwards
//! every `/v1` request to the configured gRPC endpoint. Query parameters and
//! responses use the camelCase JSON names of the protobuf messages (the
//! snake_case spellings are accepted too); unknown parameters are ignored.
//!
//! ## Routes
//!
//! - `GET /z/health` - liveness of the gateway itself.
//! - `GET /v1/potatoes` - `GetPotatoes`.
//! - `GET /v1/potatoes/{potato_id}` - `GetPotato`.

pub mod error;
pub mod logging;
mod routes;

use axum::{Router, middleware, routing::get};
use spud_tonic_core::proto::potato_service_client::PotatoServiceClient;
use tonic::transport::{Channel, Uri};
use tower_http::catch_panic::CatchPanicLayer;

pub const HEALTHCHECK_PATH: &str = "/z/health";

pub type PotatoClient = PotatoServiceClient<Channel>;

/// Creates a client for `endpoint` that connects on first use.
pub fn connect_lazy(endpoint: Uri) -> PotatoClient {
    PotatoServiceClient::new(Channel::builder(endpoint).connect_lazy())
}

pub fn router(client: PotatoClient) -> Router {
    let v1 = Router::new()
        .route("/potatoes", get(routes::list_potatoes))
        .route("/potatoes/{potato_id}", get(routes::get_potato));

    with_middleware(
        Router::new()
            .route(HEALTHCHECK_PATH, get(routes::health))
            .nest("/v1", v1)
            .with_state(client),
    )
}

/// Request logging around panic recovery, so a panicking handler is answered
/// with a 500 and still produces a request log line.
fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn(logging::log_requests))
}
