/// Template catalog endpoint
///
/// `GET {base}/templates` returns the built-in templates. Public and
/// cacheable for an hour.

use axum::{http::header, response::IntoResponse, Json};
use menucraft_shared::models::{template, Template};
use serde::Serialize;

/// Template list response
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: &'static [Template],
}

/// List the built-in templates
pub async fn list_templates() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=3600")],
        Json(TemplateListResponse {
            templates: template::all(),
        }),
    )
}
