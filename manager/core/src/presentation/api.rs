// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! REST surface served on each router.
//!
//! Every handler error is recovered into a status code; nothing in this
//! layer can take the serving process down.
//!
//! | Method | Path               | Effect          |
//! |--------|--------------------|-----------------|
//! | GET    | /interfaces        | list instances  |
//! | GET    | /interfaces/{id}   | get one         |
//! | POST   | /interfaces/{id}   | create + start  |
//! | PUT    | /interfaces/{id}   | update + reload |
//! | DELETE | /interfaces/{id}   | delete one      |
//! | DELETE | /interfaces        | delete all      |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, info};

use crate::application::lifecycle::LifecycleError;
use crate::application::store::{InstanceStore, StoreError};
use crate::domain::instance::Instance;

pub struct AppState {
    pub store: Arc<InstanceStore>,
}

pub fn router(store: Arc<InstanceStore>) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/interfaces", get(list_interfaces).delete(delete_all))
        .route(
            "/interfaces/{id}",
            get(get_interface)
                .post(create_interface)
                .put(update_interface)
                .delete(delete_interface),
        )
        .with_state(state)
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::IdMismatch { .. } | StoreError::HostInstance => StatusCode::BAD_REQUEST,
            StoreError::Lifecycle(
                LifecycleError::Render { .. }
                | LifecycleError::InvalidConfig { .. }
                | LifecycleError::Spawn { .. }
                | LifecycleError::StartFailed { .. }
                | LifecycleError::ProcessNotFound { .. }
                | LifecycleError::SignalFailed { .. }
                | LifecycleError::Io { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(%self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn list_interfaces(State(state): State<Arc<AppState>>) -> Json<Vec<Instance>> {
    Json(state.store.list().await)
}

async fn get_interface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Instance>, StoreError> {
    state.store.get(id).await.map(Json)
}

async fn create_interface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(spec): Json<Instance>,
) -> Result<StatusCode, StoreError> {
    state.store.create(id, spec).await?;
    info!(id, "instance created");
    Ok(StatusCode::CREATED)
}

async fn update_interface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(spec): Json<Instance>,
) -> Result<StatusCode, StoreError> {
    state.store.update(id, spec).await?;
    info!(id, "instance updated");
    Ok(StatusCode::CREATED)
}

async fn delete_interface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, StoreError> {
    state.store.delete(id).await?;
    info!(id, "instance deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all(State(state): State<Arc<AppState>>) -> Result<StatusCode, StoreError> {
    state.store.delete_all().await?;
    info!("all managed instances deleted");
    Ok(StatusCode::NO_CONTENT)
}
