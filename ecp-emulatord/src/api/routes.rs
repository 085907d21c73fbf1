use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, MethodRouter},
    Router,
};
use futures::FutureExt;
use shared::types::{Command, KeyEvent, KeyEventKind};
use crate::device::render::{ACTIVE_APP_DOCUMENT, APP_PLACEHOLDER_ICON};
use crate::device::Device;
use crate::handler::{self, CommandHandler};
use super::guard::{self, RequestGuard};

const XML_CONTENT_TYPE: &str = "text/xml";

#[derive(Clone)]
pub struct AppState {
    pub device: Arc<Device>,
    pub handler: Arc<dyn CommandHandler>,
}

/// Fixed ECP route table. Unknown paths and wrong verbs on known paths both
/// answer 404 without reaching the handler.
pub fn router(state: AppState, guard: RequestGuard) -> Router {
    Router::new()
        .route("/", only(get(root_description)))
        .route("/query/device-info", only(get(device_info)))
        .route("/query/apps", only(get(apps)))
        .route("/query/active-app", only(get(active_app)))
        .route("/query/icon/:id", only(get(app_icon)))
        .route("/keypress/:key", only(post(keypress)))
        .route("/keydown/:key", only(post(keydown)))
        .route("/keyup/:key", only(post(keyup)))
        .route("/launch/:id", only(post(launch)))
        .route("/input", only(post(accept)))
        .route("/search", only(post(accept)))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            Arc::new(guard),
            guard::check_remote_and_host,
        ))
}

fn only(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(not_found)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn xml(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body)
}

async fn root_description(State(state): State<AppState>) -> impl IntoResponse {
    xml(state.device.render_root_description())
}

async fn device_info(State(state): State<AppState>) -> impl IntoResponse {
    xml(state.device.render_device_info())
}

async fn apps(State(state): State<AppState>) -> impl IntoResponse {
    xml(state.device.render_app_list())
}

async fn active_app() -> impl IntoResponse {
    xml(ACTIVE_APP_DOCUMENT.to_string())
}

async fn app_icon(Path(_id): Path<String>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], APP_PLACEHOLDER_ICON)
}

/// `/input` and `/search` are acknowledged but carry no behavior
async fn accept() -> StatusCode {
    StatusCode::OK
}

async fn keypress(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    run_key(&state, KeyEventKind::Press, key).await
}

async fn keydown(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    run_key(&state, KeyEventKind::Down, key).await
}

async fn keyup(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    run_key(&state, KeyEventKind::Up, key).await
}

async fn launch(State(state): State<AppState>, Path(app_id): Path<String>) -> StatusCode {
    let command = Command::Launch {
        usn: state.device.usn().to_string(),
        app_id,
    };
    run_command(&state, command).await
}

async fn run_key(state: &AppState, kind: KeyEventKind, key: String) -> StatusCode {
    let command = Command::Key(KeyEvent {
        kind,
        key,
        usn: state.device.usn().to_string(),
    });
    run_command(state, command).await
}

/// Call the handler once. Errors and panics are contained to this request
/// and reported as 500.
async fn run_command(state: &AppState, command: Command) -> StatusCode {
    tracing::debug!("Dispatching {:?}", command);

    let result = AssertUnwindSafe(handler::dispatch(state.handler.as_ref(), &command))
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(e)) => {
            tracing::error!("Command handler failed for {:?}: {:#}", command, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Err(_) => {
            tracing::error!("Command handler panicked for {:?}", command);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
