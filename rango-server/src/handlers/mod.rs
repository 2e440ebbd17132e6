pub mod categories;
pub mod pages;
pub mod site;

pub use categories::*;
pub use pages::*;
pub use site::*;
