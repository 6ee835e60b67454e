/// Menu endpoints
///
/// # Endpoints
///
/// - `POST /menu` - Save (create or overwrite) a menu
/// - `GET /menu` - The caller's most recently saved menu
/// - `GET /menus` - All of the caller's menus, newest first
/// - `GET /menu/:menuId` - One of the caller's menus
/// - `GET /menu/public/:slug` - Any menu by slug, no authentication, no owner id
/// - `DELETE /menu/item/:itemId` - Remove an item from the caller's latest menu
///
/// Every read path serves the same stored record, so a save or an item
/// deletion is visible through all of them at once.

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use menucraft_shared::{auth::AuthContext, models::MenuData};
use serde::Serialize;
use validator::Validate;

/// Save response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMenuResponse {
    pub success: bool,
    pub menu: MenuData,
    pub menu_id: String,
}

/// Single menu response; `menu` is `null` when the user has none yet
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub menu: Option<MenuData>,
}

/// Menu list response
#[derive(Debug, Serialize)]
pub struct MenuListResponse {
    pub menus: Vec<MenuData>,
}

/// Item deletion response
#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    pub success: bool,
    pub menu: MenuData,
}

fn menu_not_found() -> ApiError {
    ApiError::NotFound("Menu not found".to_string())
}

/// Save a menu
///
/// Without `menuId` a new menu is created under a fresh slug; with one, the
/// caller's menu is overwritten. `userId` and the timestamps in the body are
/// ignored.
///
/// # Endpoint
///
/// ```text
/// POST {base}/menu
/// Authorization: Bearer <token>
///
/// { "templateId": "classic", "businessName": "Joe's Diner", "items": [] }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "menuId": "joe-s-diner-x7k2qa", "menu": { … } }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: invalid menu data
/// - 401 Unauthorized: missing or invalid token
/// - 403 Forbidden: `menuId` belongs to another user
pub async fn save_menu(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(menu): ApiJson<MenuData>,
) -> ApiResult<Json<SaveMenuResponse>> {
    menu.validate()?;

    let menu = state.menus.save(auth.user_id(), menu).await?;
    let menu_id = menu.menu_id.clone().unwrap_or_default();

    Ok(Json(SaveMenuResponse {
        success: true,
        menu,
        menu_id,
    }))
}

/// The caller's latest menu
pub async fn get_latest_menu(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MenuResponse>> {
    let menu = state.menus.latest(auth.user_id()).await?;
    Ok(Json(MenuResponse { menu }))
}

/// The caller's menus, most recently updated first
pub async fn list_menus(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MenuListResponse>> {
    let menus = state.menus.list(auth.user_id()).await?;
    Ok(Json(MenuListResponse { menus }))
}

/// One of the caller's menus
///
/// Menus owned by someone else are reported as not found.
pub async fn get_menu(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(menu_id): Path<String>,
) -> ApiResult<Json<MenuResponse>> {
    let menu = state
        .menus
        .get_owned(auth.user_id(), &menu_id)
        .await?
        .ok_or_else(menu_not_found)?;

    Ok(Json(MenuResponse { menu: Some(menu) }))
}

/// Any menu by its public slug; the owner id is not included
pub async fn get_public_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<MenuResponse>> {
    let menu = state
        .menus
        .get_public(&slug)
        .await?
        .ok_or_else(menu_not_found)?;

    Ok(Json(MenuResponse { menu: Some(menu) }))
}

/// Remove an item from the caller's latest menu
///
/// # Errors
///
/// - 404 Not Found: the caller has no menu, or the item is not on it
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<DeleteItemResponse>> {
    let menu = state
        .menus
        .delete_item(auth.user_id(), &item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(DeleteItemResponse {
        success: true,
        menu,
    }))
}
