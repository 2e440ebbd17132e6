/// Table formatting for categories and pages using comfy-table

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use rango_core::{Category, Page};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn number(n: u64) -> Cell {
    Cell::new(n).set_alignment(CellAlignment::Right)
}

/// Format categories with their slugs and counters
pub fn format_categories_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found".to_string();
    }

    let mut table = new_table();
    table.set_header(vec!["id", "name", "slug", "views", "likes"]);

    for category in categories {
        table.add_row(vec![
            number(category.id.0),
            Cell::new(&category.name),
            Cell::new(category.slug()),
            number(category.views),
            number(category.likes),
        ]);
    }

    table.to_string()
}

/// Format pages; the category column shows the parent's name when known
pub fn format_pages_table(pages: &[Page], category_name: impl Fn(&Page) -> String) -> String {
    if pages.is_empty() {
        return "No pages found".to_string();
    }

    let mut table = new_table();
    table.set_header(vec!["id", "category", "title", "url", "views"]);

    for page in pages {
        table.add_row(vec![
            number(page.id.0),
            Cell::new(category_name(page)),
            Cell::new(&page.title),
            Cell::new(&page.url),
            number(page.views),
        ]);
    }

    table.to_string()
}
