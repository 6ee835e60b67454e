/// Menu records
///
/// A `MenuData` is the document the menu builder produces: business details,
/// the chosen template and a flat list of items. The server assigns
/// `menu_id`, `user_id` and both timestamps; everything else comes from the
/// client as-is.
///
/// # Wire format
///
/// Field names are camelCase on the wire:
///
/// ```json
/// {
///   "menuId": "joes-diner-x7k2qa",
///   "userId": "8a3c...",
///   "templateId": "classic",
///   "businessName": "Joe's Diner",
///   "businessDescription": "Breakfast all day",
///   "primaryColor": "#b91c1c",
///   "items": [
///     { "id": "1", "name": "Pancakes", "description": "", "price": "6.50", "category": "Breakfast" }
///   ],
///   "createdAt": "2025-01-03T12:00:00Z",
///   "updatedAt": "2025-01-03T12:00:00Z"
/// }
/// ```
///
/// Fields the builder sends that are not modelled here (layout toggles and
/// similar UI state) are kept in `extra` and written back unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use validator::{Validate, ValidationError};

use crate::slug::is_valid_slug;

/// A single dish or drink on a menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Client-generated item id, unique within its menu
    #[validate(length(min = 1, max = 64, message = "Item id must be 1-64 characters"))]
    pub id: String,

    #[validate(length(min = 1, max = 200, message = "Item name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Item description must be at most 2000 characters"))]
    pub description: String,

    /// Display price, kept as entered ("6.50", "market price")
    #[serde(default)]
    #[validate(length(max = 32, message = "Price must be at most 32 characters"))]
    pub price: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: String,
}

/// A complete menu document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuData {
    /// Slug id; assigned on first save when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_menu_id"))]
    pub menu_id: Option<String>,

    /// Owner; always overwritten by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Template id must be 1-64 characters"))]
    pub template_id: String,

    #[validate(length(min = 1, max = 200, message = "Business name must be 1-200 characters"))]
    pub business_name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Business description must be at most 2000 characters"))]
    pub business_description: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Primary color must be at most 32 characters"))]
    pub primary_color: String,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<MenuItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Builder fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl MenuData {
    /// Creates an empty menu for a business, mostly useful in tests and seeds
    pub fn new(template_id: impl Into<String>, business_name: impl Into<String>) -> Self {
        Self {
            menu_id: None,
            user_id: None,
            template_id: template_id.into(),
            business_name: business_name.into(),
            business_description: String::new(),
            primary_color: String::new(),
            items: Vec::new(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Whether `user_id` owns this record
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Removes the item with `item_id`, returning whether anything was removed
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        self.items.len() != before
    }

    /// Sort key for "most recently saved first" listings
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

fn validate_menu_id(menu_id: &str) -> Result<(), ValidationError> {
    if is_valid_slug(menu_id) {
        Ok(())
    } else {
        let mut err = ValidationError::new("menu_id");
        err.message = Some("Menu id may only contain a-z, 0-9 and '-' (max 64)".into());
        Err(err)
    }
}
