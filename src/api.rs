//! All the web-facing API stuff goes here

use std::{any::Any, backtrace::Backtrace, collections::HashMap, fmt::Debug, sync::Arc};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use image::io::Limits;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    codec::{self, CodecError},
    domain::{Dimensions, ThumbnailRequest},
    fetch::Fetch,
    primitive::{anyhow::Context, tracing::instrument, *},
    thumb,
};

/// Application State. Immutable, shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Where source images come from
    pub fetch: Arc<dyn Fetch>,
    /// JPEG quality, 1 to 100
    pub jpeg_quality: u8,
    /// Largest canvas we agree to allocate
    pub max_canvas_pixels: u64,
    /// Largest source we agree to decode
    pub decode_limits: Limits,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_canvas_pixels", &self.max_canvas_pixels)
            .field("decode_limits", &self.decode_limits)
            .finish_non_exhaustive()
    }
}

/// Build the app: the thumbnail route, request tracing, and a panic
/// catcher that still answers with JSON.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/thumbnail", get(serve_thumbnail))
        .route("/thumbnail/", get(serve_thumbnail))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Last line of defense. The hook installed by [`install_panic_hook`]
/// has already logged where and why; this only answers the client.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    tracing::error!(
        "Panic while making thumbnail: {}",
        panic_message(&*err)
    );
    error_body(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
}

/// The text of a panic payload, if it has one.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("(no message)")
}

/// One log entry per panic: kind, message, location and stack trace.
fn panic_report(message: &str, location: Option<String>, backtrace: &Backtrace) -> String {
    let location = location.as_deref().unwrap_or("<unknown>");
    format!("panic: {message}\n  at {location}\nstack backtrace:\n{backtrace}")
}

/// Route every panic through `tracing` with a captured stack trace. The
/// payload is caught later (by [`CatchPanicLayer`] or a join handle), but
/// the stack only exists while the hook runs.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string);
        let backtrace = Backtrace::force_capture();
        tracing::error!(
            "{}",
            panic_report(panic_message(info.payload()), location, &backtrace)
        );
    }));
}

/// Serve a letterboxed JPEG thumbnail of `url`, exactly `width` x `height`.
///
/// A query string that can't even be parsed counts as missing parameters.
#[instrument(skip(state))]
pub async fn serve_thumbnail(
    State(state): State<AppState>,
    params: std::result::Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<axum::response::Response> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let jpeg = make_thumbnail(&state, &params).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CONTENT_DISPOSITION, "inline"),
        ],
        jpeg,
    )
        .into_response())
}

/// Validate, fetch, decode, letterbox, encode.
///
/// Validation failures return before any I/O. Fetch and decode failures
/// are told apart here; everything else is an internal error.
pub async fn make_thumbnail(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<Vec<u8>> {
    let request = ThumbnailRequest::from_params(params).map_err(|e| {
        tracing::debug!("Rejected: {e}");
        e
    })?;

    let bytes = state.fetch.fetch(&request.url).await.map_err(|e| {
        tracing::info!("Fetch failed: {e:#}");
        ApiError::Unprocessable(MSG_INACCESSIBLE)
    })?;

    // Decoding and resampling are CPU-bound; keep them off the reactor.
    let (quality, max_pixels) = (state.jpeg_quality, state.max_canvas_pixels);
    let (target, limits) = (request.target, state.decode_limits.clone());
    tokio::task::spawn_blocking(move || render(&bytes, limits, target, quality, max_pixels))
        .await
        .context("make_thumbnail: thread join fail")?
}

/// Bytes in, JPEG out. Sync.
fn render(
    bytes: &[u8],
    limits: Limits,
    target: Dimensions,
    quality: u8,
    max_pixels: u64,
) -> Result<Vec<u8>> {
    let source = codec::decode(bytes, limits).map_err(|e| match e {
        CodecError::Undecodable(cause) => {
            tracing::info!("Decode failed: {cause}");
            ApiError::Unprocessable(MSG_UNDECODABLE)
        }
        e => ApiError::Internal(anyhow::Error::new(e).context("render: decode")),
    })?;
    let thumbnail =
        thumb::generate(&source, target, max_pixels).context("render: generate")?;
    let jpeg = codec::encode_jpeg(thumbnail, quality).context("render: encode")?;
    Ok(jpeg)
}
