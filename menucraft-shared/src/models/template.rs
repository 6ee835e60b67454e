/// Built-in menu templates
///
/// Templates are fixed style descriptors the builder renders a menu with.
/// They are not user mutable; a menu only stores the template id.

use serde::Serialize;

/// Style descriptor for one template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub layout: Layout,
    pub primary_color: &'static str,
    pub background_color: &'static str,
    pub text_color: &'static str,
    pub heading_font: &'static str,
    pub body_font: &'static str,
}

/// How items are arranged on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    List,
    Grid,
    Columns,
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "classic",
        name: "Classic",
        layout: Layout::List,
        primary_color: "#7c2d12",
        background_color: "#fffbeb",
        text_color: "#1c1917",
        heading_font: "Playfair Display",
        body_font: "Lora",
    },
    Template {
        id: "modern",
        name: "Modern",
        layout: Layout::Grid,
        primary_color: "#0f172a",
        background_color: "#ffffff",
        text_color: "#334155",
        heading_font: "Inter",
        body_font: "Inter",
    },
    Template {
        id: "bistro",
        name: "Bistro",
        layout: Layout::Columns,
        primary_color: "#166534",
        background_color: "#f7fee7",
        text_color: "#14532d",
        heading_font: "Cormorant Garamond",
        body_font: "Source Sans 3",
    },
    Template {
        id: "street",
        name: "Street Food",
        layout: Layout::Grid,
        primary_color: "#ea580c",
        background_color: "#18181b",
        text_color: "#fafafa",
        heading_font: "Bebas Neue",
        body_font: "Roboto",
    },
];

/// All built-in templates in display order
pub fn all() -> &'static [Template] {
    TEMPLATES
}

/// Looks up a template by id
pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}
