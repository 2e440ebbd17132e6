//! Rango core: the directory model behind the Rango web directory
//!
//! - [`slug`]: category name <-> URL slug codecs
//! - [`directory`]: category/page store, counters and lookups
//! - [`visitor`] and [`session`]: per-visitor visit counting

pub mod config;
pub mod directory;
pub mod error;
pub mod populate;
pub mod session;
pub mod slug;
pub mod types;
pub mod visitor;

pub use config::DirectoryConfig;
pub use directory::{normalize_url, Counter, Directory};
pub use error::{Error, Result};
pub use populate::PopulateReport;
pub use session::SessionStore;
pub use slug::Slug;
pub use types::*;
pub use visitor::VisitorState;
