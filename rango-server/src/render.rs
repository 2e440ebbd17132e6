/// HTML fragments returned to the page's inline scripts.
///
/// All category names are escaped.
use html_escape::{encode_double_quoted_attribute, encode_text};
use rango_core::Category;

/// Renders the category suggestion list.
///
/// Each entry links to the category page; an empty match renders an empty list.
pub fn render_suggestions(categories: &[Category]) -> String {
    let mut html = String::from("<ul class=\"nav nav-list\">");

    for category in categories {
        let href = format!("/category/{}/", category.slug());
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            encode_double_quoted_attribute(&href),
            encode_text(&category.name)
        ));
    }

    html.push_str("</ul>");
    html
}
