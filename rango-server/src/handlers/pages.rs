use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use rango_core::{Counter, PageId};
use tracing::{debug, info, warn};

use crate::{error::AppError, metrics::COUNTER_INCREMENTS_TOTAL, models::*, state::AppState};

/// Count a click-through and redirect to the page's URL
///
/// GET /goto/?page_id=ID
///
/// Missing, malformed or unknown ids redirect to the index, as does a stored
/// URL that cannot be sent as a `Location` header.
pub async fn goto(State(state): State<AppState>, Query(params): Query<GotoParams>) -> Response {
    let id = match params.page_id.as_deref().map(str::trim).map(str::parse::<u64>) {
        Some(Ok(id)) => PageId(id),
        _ => return Redirect::to("/").into_response(),
    };

    match state.directory.view_page(id) {
        Ok(page) => {
            COUNTER_INCREMENTS_TOTAL
                .with_label_values(&[Counter::PageViews(id).kind()])
                .inc();
            info!("Redirecting page {} to {:?} (view #{})", id, page.url, page.views);
            redirect_to(&page.url)
        }
        Err(e) => {
            debug!("goto for page {} failed: {}", id, e);
            Redirect::to("/").into_response()
        }
    }
}

/// 303 to `url`, or to the index when `url` is not a valid header value
fn redirect_to(url: &str) -> Response {
    match HeaderValue::try_from(url) {
        Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            warn!("Cannot redirect to {:?}: {}", url, e);
            Redirect::to("/").into_response()
        }
    }
}

/// Add a page to a category
///
/// POST /category/:slug/add_page/
/// Body: AddPageRequest
pub async fn add_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<AddPageRequest>,
) -> Result<(StatusCode, Json<PageResponse>), AppError> {
    state.rate_limiter.check("/category/:slug/add_page/")?;

    let category = state.directory.find_category_by_slug(&slug)?;
    let page = state
        .directory
        .add_page(category.id, &request.title, &request.url)?;

    Ok((StatusCode::CREATED, Json(PageResponse::from(&page))))
}
