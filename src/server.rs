//! HTTP surface: warp filters wiring each route to a handler in
//! [`crate::commands`].
//!
//! Every domain error becomes `{"error": message}` with status 400. Handler
//! work (parsing, transforms, serialization) runs on the blocking pool so a
//! large upload cannot stall the async workers.

use crate::commands::cleaning::{self, DedupeRequest, FillRequest};
use crate::commands::data::{self, UpdateRequest};
use crate::commands::transfer::{self, Download, UploadedFile};
use crate::commands::decode_payload;
use crate::config::ServerConfig;
use crate::error::{Result, ScourError};
use crate::store::DatasetStore;
use bytes::Buf as _;
use futures::TryStreamExt as _;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::{StatusCode, header};
use warp::multipart::FormData;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Name of the multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

const FALLBACK_INDEX: &str = "<!doctype html>
<html>
<head><title>scour</title></head>
<body>
<h1>scour</h1>
<p>POST a CSV or XLSX file to <code>/upload</code> (multipart field <code>file</code>),
then use <code>/get-data</code>, <code>/get-stats</code>, <code>/remove-duplicates</code>,
<code>/fill-missing</code>, <code>/update-data</code> and <code>/download</code>.</p>
</body>
</html>
";

/// Shared state handed to every route.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: DatasetStore,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: DatasetStore::new(),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadQuery {
    format: Option<String>,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All routes, with rejections already recovered into JSON errors.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let static_dir = state.config.static_dir.clone();
    let max_upload = state.config.max_upload_bytes;

    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(index_page);

    let static_files = warp::path("static").and(warp::fs::dir(static_dir));

    let upload = warp::path("upload")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::multipart::form().max_length(max_upload))
        .and_then(upload_file);

    let get_data = warp::path("get-data")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|state: AppState| async move {
            Ok::<_, Rejection>(json_reply(run_blocking(move || data::get_data(&state.store)).await))
        });

    let get_stats = warp::path("get-stats")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|state: AppState| async move {
            Ok::<_, Rejection>(json_reply(run_blocking(move || data::get_stats(&state.store)).await))
        });

    let update_data = warp::path("update-data")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::body::bytes())
        .and_then(|state: AppState, body: bytes::Bytes| async move {
            let result = run_blocking(move || {
                let request: UpdateRequest = decode_payload(&body)?;
                data::update_data(&state.store, request)
            })
            .await;
            Ok::<_, Rejection>(json_reply(result))
        });

    let remove_duplicates = warp::path("remove-duplicates")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::body::bytes())
        .and_then(|state: AppState, body: bytes::Bytes| async move {
            let result = run_blocking(move || {
                let request: DedupeRequest = decode_payload(&body)?;
                cleaning::remove_duplicates(&state.store, request)
            })
            .await;
            Ok::<_, Rejection>(json_reply(result))
        });

    let fill_missing = warp::path("fill-missing")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::body::bytes())
        .and_then(|state: AppState, body: bytes::Bytes| async move {
            let result = run_blocking(move || {
                let request: FillRequest = decode_payload(&body)?;
                cleaning::fill_missing(&state.store, request)
            })
            .await;
            Ok::<_, Rejection>(json_reply(result))
        });

    let download = warp::path("download")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and(warp::query::<DownloadQuery>())
        .and_then(|state: AppState, query: DownloadQuery| async move {
            let result = run_blocking(move || {
                transfer::download(&state.store, query.format.as_deref())
            })
            .await;
            Ok::<_, Rejection>(attachment_reply(result))
        });

    index
        .or(static_files)
        .or(upload)
        .or(get_data)
        .or(get_stats)
        .or(update_data)
        .or(remove_duplicates)
        .or(fill_missing)
        .or(download)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// Binds the configured address and serves until the process exits.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let state = AppState::new(config);
    tracing::info!(
        "Serving on http://{addr} (uploads kept in {})",
        state.config.upload_dir.display()
    );
    warp::serve(routes(state)).run(addr).await;
    Ok(())
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScourError::Other(format!("Worker task failed: {e}")))?
}

async fn index_page(state: AppState) -> std::result::Result<Response, Rejection> {
    let path = state.config.static_dir.join("index.html");
    let page = match tokio::fs::read_to_string(&path).await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!("No index page at {} ({e}), using built-in page", path.display());
            FALLBACK_INDEX.to_owned()
        }
    };
    Ok(warp::reply::html(page).into_response())
}

async fn upload_file(state: AppState, form: FormData) -> std::result::Result<Response, Rejection> {
    let result = match read_upload(form).await {
        Ok(file) => {
            run_blocking(move || transfer::upload(&state.store, &state.config.upload_dir, file))
                .await
        }
        Err(e) => Err(e),
    };
    Ok(json_reply(result))
}

/// Pulls the `file` part out of a multipart form, ignoring other fields.
async fn read_upload(form: FormData) -> Result<Option<UploadedFile>> {
    let parts: Vec<warp::multipart::Part> = form
        .try_collect()
        .await
        .map_err(|e| ScourError::InvalidPayload(format!("Invalid multipart body: {e}")))?;

    for part in parts {
        if part.name() != UPLOAD_FIELD {
            continue;
        }
        let filename = part.filename().unwrap_or_default().to_owned();
        let bytes = part
            .stream()
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(chunk.chunk());
                Ok(acc)
            })
            .await
            .map_err(|e| ScourError::InvalidPayload(format!("Failed to read upload: {e}")))?;
        return Ok(Some(UploadedFile { filename, bytes }));
    }

    Ok(None)
}

fn json_reply<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(err) => error_reply(&err),
    }
}

fn attachment_reply(result: Result<Download>) -> Response {
    match result {
        Ok(download) => {
            let disposition = format!("attachment; filename=\"{}\"", download.file_name);
            let reply = warp::reply::with_header(download.bytes, header::CONTENT_TYPE, download.content_type);
            warp::reply::with_header(reply, header::CONTENT_DISPOSITION, disposition).into_response()
        }
        Err(err) => error_reply(&err),
    }
}

fn error_reply(err: &ScourError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_REQUEST);
    if status.is_server_error() {
        tracing::error!("Request failed: {err}");
    } else {
        tracing::warn!("Request rejected: {err}");
    }
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: err.to_string(),
        }),
        status,
    )
    .into_response()
}

async fn handle_rejection(rejection: Rejection) -> std::result::Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_owned())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Upload too large".to_owned())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_owned())
    } else if rejection.find::<warp::reject::InvalidHeader>().is_some()
        || rejection.find::<warp::reject::MissingHeader>().is_some()
        || rejection.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        (StatusCode::BAD_REQUEST, ScourError::NoFileUploaded.to_string())
    } else {
        (StatusCode::BAD_REQUEST, format!("Bad request: {rejection:?}"))
    };

    tracing::warn!("Rejected request ({status}): {message}");
    Ok(warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
        .into_response())
}
