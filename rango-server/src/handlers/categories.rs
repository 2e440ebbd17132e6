use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use rango_core::{slug::legacy, CategoryId, Counter, Error, Slug};
use tracing::{debug, info};

use crate::{error::AppError, metrics::COUNTER_INCREMENTS_TOTAL, models::*, render, state::AppState};

/// Show a category and its pages, counting the view
///
/// GET /category/:slug/
///
/// An unknown slug is not an error: the response says the category does not
/// exist.
pub async fn show_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryPageResponse>, AppError> {
    let category = match state.directory.find_category_by_slug(&slug) {
        Ok(category) => category,
        Err(Error::NotFound(_)) => {
            let category_name = Slug::parse(&slug)
                .map(|slug| slug.to_name())
                .unwrap_or_else(|_| legacy::decode(&slug));
            debug!("Category {:?} does not exist", category_name);

            return Ok(Json(CategoryPageResponse {
                exists: false,
                message: Some(format!("The category {:?} does not exist.", category_name)),
                category_name,
                category: None,
                pages: Vec::new(),
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let counter = Counter::CategoryViews(category.id);
    state.directory.increment(counter)?;
    COUNTER_INCREMENTS_TOTAL.with_label_values(&[counter.kind()]).inc();

    let category = state.directory.get_category(category.id)?;
    let pages = state.directory.pages_for(category.id)?;

    Ok(Json(CategoryPageResponse {
        exists: true,
        category_name: category.name.clone(),
        category: Some(CategoryResponse::from(&category)),
        pages: pages.iter().map(PageResponse::from).collect(),
        message: None,
    }))
}

/// Like a category and return the new like count as plain text
///
/// GET /like_category/?category_id=ID
///
/// A missing or unparsable id answers `0`.
pub async fn like_category(
    State(state): State<AppState>,
    Query(params): Query<LikeParams>,
) -> Result<Response, AppError> {
    let id = match params.category_id.as_deref().map(str::trim).map(str::parse::<u64>) {
        Some(Ok(id)) => CategoryId(id),
        _ => return Ok("0".into_response()),
    };

    state.rate_limiter.check("/like_category/")?;

    match state.directory.like_category(id) {
        Ok(likes) => {
            COUNTER_INCREMENTS_TOTAL
                .with_label_values(&[Counter::CategoryLikes(id).kind()])
                .inc();
            info!("Category {} liked ({} likes)", id, likes);
            Ok(likes.to_string().into_response())
        }
        Err(Error::NotFound(_)) => {
            Ok((StatusCode::NOT_FOUND, "Category not found").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Category suggestions for a name prefix, as an HTML fragment
///
/// GET /suggest_category/?suggestion=PREFIX
pub async fn suggest_category(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Html<String> {
    suggestions(&state, params)
}

/// POST /suggest_category/ with a form body
pub async fn suggest_category_form(
    State(state): State<AppState>,
    Form(params): Form<SuggestParams>,
) -> Html<String> {
    suggestions(&state, params)
}

fn suggestions(state: &AppState, params: SuggestParams) -> Html<String> {
    let prefix = params.suggestion.unwrap_or_default();
    let matches = state
        .directory
        .suggest(&prefix, state.directory.config().max_suggestions);
    debug!("{} suggestions for {:?}", matches.len(), prefix);
    Html(render::render_suggestions(&matches))
}

/// Create a category
///
/// POST /add_category/
/// Body: AddCategoryRequest
pub async fn add_category(
    State(state): State<AppState>,
    Json(request): Json<AddCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    state.rate_limiter.check("/add_category/")?;

    let category = state.directory.add_category(&request.name)?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))))
}
