//! HTTP surface: index page, one asset route, plain-text failures.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::audit::{self, Outcome};
use crate::error::{ServerError, ServerResult};
use crate::registry::{AssetRegistry, Resolution};

/// Build the router. The registry is the only shared state.
pub fn router(registry: Arc<AssetRegistry>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/{namespace}/{*path}", get(serve_asset))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(registry: Arc<AssetRegistry>, addr: SocketAddr) -> ServerResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(addr = %listener.local_addr()?, "asset server listening");

    axum::serve(
        listener,
        router(registry).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("asset server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn client_of(request: &Request) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    audit::client_identity(request.headers(), peer)
}

async fn index(State(registry): State<Arc<AssetRegistry>>, request: Request) -> Html<String> {
    let client = client_of(&request);
    info!(target: "audit", client = %client, "index page accessed");

    let mut items = String::new();
    for namespace in registry.namespaces() {
        let _ = writeln!(
            items,
            "    <li><code>/{namespace}/&lt;path&gt;</code> - serves files from the {namespace} directory</li>"
        );
    }
    Html(format!(
        "<h1>OTA Asset Server</h1>\n<p>Available endpoints:</p>\n<ul>\n{items}</ul>\n"
    ))
}

async fn serve_asset(
    State(registry): State<Arc<AssetRegistry>>,
    params: Result<Path<(String, String)>, PathRejection>,
    request: Request,
) -> Response {
    let client = client_of(&request);
    let raw_path = request.uri().path();

    let Ok(Path((namespace, relative))) = params else {
        audit::record(&client, "-", raw_path, Outcome::NotFound);
        return not_found();
    };

    match registry.resolve(&namespace, &relative).await {
        Resolution::Forbidden => {
            audit::record(&client, &namespace, raw_path, Outcome::Forbidden);
            forbidden()
        }
        Resolution::NotFound => {
            audit::record(&client, &namespace, raw_path, Outcome::NotFound);
            not_found()
        }
        Resolution::Found(file_path) => match file_response(&file_path).await {
            Ok(response) => {
                audit::record(&client, &namespace, raw_path, Outcome::Served);
                response
            }
            Err(e) => {
                // removed or unreadable between resolve and open
                warn!(error = %e, path = %file_path.display(), "open asset failed");
                audit::record(&client, &namespace, raw_path, Outcome::NotFound);
                not_found()
            }
        },
    }
}

async fn fallback(request: Request) -> Response {
    let client = client_of(&request);
    audit::record(&client, "-", request.uri().path(), Outcome::NotFound);
    not_found()
}

async fn file_response(path: &FsPath) -> std::io::Result<Response> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type(path)),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Access forbidden").into_response()
}

/// Content type from the file extension.
fn content_type(path: &FsPath) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("html" | "htm") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}
