use crate::slug::Slug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Store-assigned page identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group of pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub views: u64,
    pub likes: u64,
}

impl Category {
    /// URL slug for this category
    pub fn slug(&self) -> Slug {
        Slug::from_name(&self.name)
    }
}

/// A link filed under exactly one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub category: CategoryId,
    pub title: String,
    pub url: String,
    pub views: u64,
}

/// Aggregate counts over the whole directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    pub total_categories: usize,
    pub total_pages: usize,
    pub total_category_views: u64,
    pub total_category_likes: u64,
    pub total_page_views: u64,
}
