//! HTTP routes.
//!
//! | route                           | handler                          |
//! |---------------------------------|----------------------------------|
//! | `GET /`                         | rooms or dashboards (`?view=`)   |
//! | `GET /dashboard/{path}`         | one dashboard page (`?width=`)   |
//! | `GET /toggle/{path}/{entity}`   | toggle, then back to the page    |
//! | `GET /health`                   | liveness JSON                    |
//! | `/static/*`                     | icons and other static files     |

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::routing::get;
use inkdash_client::{area_nav_entries, lovelace_nav_entries, view_structure};
use inkdash_core::lovelace::EnrichedView;
use inkdash_core::{DashboardPath, EntityState, EntityView, GridConstraints, StateIndex, filter_entities};
use inkdash_render::html::dashboard_url;
use inkdash_render::{DashboardPage, HomeView, RenderContext, render_dashboard, render_home};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::PageError;
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.static_dir());
    Router::new()
        .route("/", get(home))
        .route("/dashboard/{path}", get(dashboard))
        .route("/toggle/{path}/{entity_id}", get(toggle))
        .route("/health", get(health))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `?view=rooms|dashboards`
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Tab to show.
    pub view: Option<String>,
}

/// `?width=<px>`
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Viewport width overriding the configured screen.
    pub width: Option<u32>,
}

/// Body of `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Service name.
    pub name: String,
    /// Crate version.
    pub version: String,
}

async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Html<String> {
    let view = HomeView::from_query(query.view.as_deref());
    let entries = match view {
        HomeView::Rooms => area_nav_entries(state.ha.as_ref(), state.resolver()).await,
        HomeView::Dashboards => lovelace_nav_entries(state.ha.as_ref()).await,
    };
    tracing::debug!(?view, entries = entries.len(), "Rendering home page");
    Html(render_home(&entries, view, state.page(), state.icons()))
}

/// Entities or view for one dashboard path.
enum PageContent {
    Entities(Vec<EntityView>),
    View(EnrichedView),
}

async fn load_content(
    state: &AppState,
    path: &DashboardPath,
    states: Vec<EntityState>,
) -> Result<PageContent, PageError> {
    let content = match path {
        DashboardPath::All => {
            PageContent::Entities(filter_entities(&states, None, true, state.resolver()))
        }
        DashboardPath::Area(area_id) => {
            let ids = state
                .ha
                .area_entities(area_id)
                .await
                .map_err(|e| PageError::upstream(&e, state.page()))?;
            if ids.is_empty() {
                PageContent::Entities(Vec::new())
            } else {
                PageContent::Entities(filter_entities(&states, Some(&ids), true, state.resolver()))
            }
        }
        DashboardPath::Lovelace { .. } => match view_structure(state.ha.as_ref(), path).await {
            Some(structure) => PageContent::View(structure.enrich(&StateIndex::new(states))),
            None => {
                tracing::warn!(%path, "No Lovelace view found");
                PageContent::Entities(Vec::new())
            }
        },
        DashboardPath::Unknown(raw) => {
            tracing::warn!(path = %raw, "Unknown dashboard path");
            PageContent::Entities(Vec::new())
        }
    };
    Ok(content)
}

async fn dashboard(
    State(state): State<AppState>,
    Path(raw_path): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, PageError> {
    let path = DashboardPath::parse(&raw_path);
    let states = state
        .ha
        .states()
        .await
        .map_err(|e| PageError::upstream(&e, state.page()))?;
    let content = load_content(&state, &path, states).await?;

    let width = query.width.unwrap_or(state.screen().width);
    let (view, entities, constraints) = match &content {
        PageContent::View(view) => (Some(view), &[][..], view.grid_constraints()),
        PageContent::Entities(entities) => (None, entities.as_slice(), GridConstraints::default()),
    };
    let layout = state.selector().select(width, constraints);
    let title = match view {
        Some(view) if !view.title.is_empty() => view.title.clone(),
        _ => path.title(),
    };
    let last_update = chrono::Local::now().format("%H:%M:%S").to_string();
    tracing::debug!(path = %raw_path, width, mode = %layout.mode, "Rendering dashboard");

    let page = DashboardPage {
        title: &title,
        entities,
        view,
        layout,
        last_update: Some(&last_update),
    };
    let ctx = RenderContext::new(state.resolver(), state.icons(), &raw_path);
    Ok(Html(render_dashboard(&page, state.page(), &ctx)))
}

async fn toggle(
    State(state): State<AppState>,
    Path((path, entity_id)): Path<(String, String)>,
) -> Redirect {
    match state.ha.toggle(&entity_id).await {
        Ok(()) => tracing::info!(%entity_id, "Toggled"),
        Err(e) => tracing::warn!(%entity_id, error = %e, "Toggle failed"),
    }
    Redirect::to(&dashboard_url(&path))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
