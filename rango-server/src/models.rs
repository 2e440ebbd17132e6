use chrono::{DateTime, Utc};
use rango_core::{Category, Page};
use serde::{Deserialize, Serialize};

/// Request to create a category
#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
}

/// Request to add a page to a category
#[derive(Debug, Deserialize)]
pub struct AddPageRequest {
    pub title: String,
    pub url: String,
}

/// `?category_id=` query; kept as text so malformed ids fall back to defaults
#[derive(Debug, Deserialize)]
pub struct LikeParams {
    pub category_id: Option<String>,
}

/// `?page_id=` query
#[derive(Debug, Deserialize)]
pub struct GotoParams {
    pub page_id: Option<String>,
}

/// `suggestion` field, from the query string or a form body
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub suggestion: Option<String>,
}

/// Category as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub views: u64,
    pub likes: u64,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.0,
            name: category.name.clone(),
            slug: category.slug().to_string(),
            views: category.views,
            likes: category.likes,
        }
    }
}

/// Page as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub id: u64,
    pub category_id: u64,
    pub title: String,
    pub url: String,
    pub views: u64,
}

impl From<&Page> for PageResponse {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.0,
            category_id: page.category.0,
            title: page.title.clone(),
            url: page.url.clone(),
            views: page.views,
        }
    }
}

/// Category page. `exists` is false when the slug matched nothing
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryPageResponse {
    pub exists: bool,
    pub category_name: String,
    pub category: Option<CategoryResponse>,
    pub pages: Vec<PageResponse>,
    pub message: Option<String>,
}

/// Index listing
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub categories: Vec<CategoryResponse>,
    pub pages: Vec<PageResponse>,
    pub visits: u64,
}

/// About page
#[derive(Debug, Serialize, Deserialize)]
pub struct AboutResponse {
    pub visits: u64,
    pub last_visit: Option<DateTime<Utc>>,
}
