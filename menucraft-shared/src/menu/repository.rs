/// Menu repository
///
/// # Storage
///
/// ```text
/// menu:{menuId}               MenuData record, owner in `userId`
/// user_menus:{userId}         JSON array of the user's menu ids
/// user_latest_menu:{userId}   id of the user's most recently saved menu
/// ```
///
/// The record is the only copy of a menu; the public slug view and the
/// per-user views all read it. Writes go record first, then indexes, so an
/// interrupted save can leave an index entry without a record, which
/// readers skip, but never two diverging copies.
///
/// # Example
///
/// ```
/// use menucraft_shared::menu::MenuRepository;
/// use menucraft_shared::models::MenuData;
/// use menucraft_shared::store::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let menus = MenuRepository::new(Arc::new(MemoryStore::new()));
///
/// let saved = menus.save("user-1", MenuData::new("classic", "Joe's Diner")).await?;
/// let slug = saved.menu_id.clone().unwrap();
/// assert!(slug.starts_with("joe-s-diner-"));
///
/// let public = menus.get_public(&slug).await?.unwrap();
/// assert_eq!(public.business_name, "Joe's Diner");
/// # Ok(())
/// # }
/// ```

use chrono::Utc;

use super::MenuError;
use crate::models::MenuData;
use crate::slug::generate_slug;
use crate::store::{get_json, set_json, SharedStore};

/// Attempts at finding an unused slug before giving up
pub const SLUG_ATTEMPTS: usize = 5;

fn menu_key(menu_id: &str) -> String {
    format!("menu:{}", menu_id)
}

fn user_menus_key(user_id: &str) -> String {
    format!("user_menus:{}", user_id)
}

fn user_latest_key(user_id: &str) -> String {
    format!("user_latest_menu:{}", user_id)
}

/// Reads and writes menus in a key-value store
#[derive(Clone)]
pub struct MenuRepository {
    store: SharedStore,
}

impl MenuRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn load(&self, menu_id: &str) -> Result<Option<MenuData>, MenuError> {
        Ok(get_json(self.store.as_ref(), &menu_key(menu_id)).await?)
    }

    async fn menu_ids(&self, user_id: &str) -> Result<Vec<String>, MenuError> {
        Ok(get_json(self.store.as_ref(), &user_menus_key(user_id))
            .await?
            .unwrap_or_default())
    }

    async fn unused_slug(&self, business_name: &str) -> Result<String, MenuError> {
        for _ in 0..SLUG_ATTEMPTS {
            let candidate = generate_slug(business_name);
            if self.store.get(&menu_key(&candidate)).await?.is_none() {
                return Ok(candidate);
            }
            tracing::debug!(slug = %candidate, "Slug collision, retrying");
        }
        Err(MenuError::SlugExhausted(SLUG_ATTEMPTS))
    }

    /// Creates or overwrites a menu owned by `user_id`
    ///
    /// # Errors
    ///
    /// `Forbidden` when `menu.menu_id` names a menu owned by another user.
    pub async fn save(&self, user_id: &str, mut menu: MenuData) -> Result<MenuData, MenuError> {
        let now = Utc::now();

        let (menu_id, existing) = match menu.menu_id.take() {
            Some(id) => {
                let existing = self.load(&id).await?;
                if let Some(stored) = &existing {
                    if !stored.is_owned_by(user_id) {
                        tracing::warn!(menu_id = %id, user_id = %user_id, "Refused save over another user's menu");
                        return Err(MenuError::Forbidden(id));
                    }
                }
                (id, existing)
            }
            None => (self.unused_slug(&menu.business_name).await?, None),
        };

        menu.created_at = existing
            .and_then(|stored| stored.created_at)
            .or(menu.created_at)
            .or(Some(now));
        menu.updated_at = Some(now);
        menu.user_id = Some(user_id.to_string());
        menu.menu_id = Some(menu_id.clone());

        set_json(self.store.as_ref(), &menu_key(&menu_id), &menu).await?;

        let mut ids = self.menu_ids(user_id).await?;
        if !ids.contains(&menu_id) {
            ids.push(menu_id.clone());
            set_json(self.store.as_ref(), &user_menus_key(user_id), &ids).await?;
        }
        set_json(self.store.as_ref(), &user_latest_key(user_id), &menu_id).await?;

        tracing::info!(menu_id = %menu_id, user_id = %user_id, items = menu.items.len(), "Menu saved");
        Ok(menu)
    }

    /// The user's most recently saved menu
    pub async fn latest(&self, user_id: &str) -> Result<Option<MenuData>, MenuError> {
        let pointer: Option<String> = get_json(self.store.as_ref(), &user_latest_key(user_id)).await?;

        if let Some(menu_id) = pointer {
            match self.load(&menu_id).await? {
                Some(menu) if menu.is_owned_by(user_id) => return Ok(Some(menu)),
                _ => tracing::warn!(menu_id = %menu_id, user_id = %user_id, "Latest menu pointer is stale"),
            }
        }

        Ok(self.list(user_id).await?.into_iter().next())
    }

    /// All of the user's menus, most recently updated first
    pub async fn list(&self, user_id: &str) -> Result<Vec<MenuData>, MenuError> {
        let ids = self.menu_ids(user_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| menu_key(id)).collect();
        let values = self.store.mget(&keys).await?;

        let mut menus = Vec::with_capacity(values.len());
        for (id, value) in ids.iter().zip(values) {
            let Some(value) = value else {
                tracing::warn!(menu_id = %id, user_id = %user_id, "Menu index entry without record");
                continue;
            };
            let menu: MenuData = serde_json::from_value(value).map_err(crate::store::StoreError::from)?;
            if menu.is_owned_by(user_id) {
                menus.push(menu);
            }
        }

        menus.sort_by(|a, b| b.last_touched().cmp(&a.last_touched()));
        Ok(menus)
    }

    /// A menu by id, only if `user_id` owns it
    pub async fn get_owned(&self, user_id: &str, menu_id: &str) -> Result<Option<MenuData>, MenuError> {
        Ok(self
            .load(menu_id)
            .await?
            .filter(|menu| menu.is_owned_by(user_id)))
    }

    /// A menu by its public slug, with the owner id withheld
    pub async fn get_public(&self, slug: &str) -> Result<Option<MenuData>, MenuError> {
        Ok(self.load(slug).await?.map(|mut menu| {
            menu.user_id = None;
            menu
        }))
    }

    /// Removes an item from the user's latest menu
    ///
    /// Returns the updated menu, or `None` when the user has no menu or the
    /// item is not on it.
    pub async fn delete_item(&self, user_id: &str, item_id: &str) -> Result<Option<MenuData>, MenuError> {
        let Some(mut menu) = self.latest(user_id).await? else {
            return Ok(None);
        };

        if !menu.remove_item(item_id) {
            return Ok(None);
        }

        let Some(menu_id) = menu.menu_id.clone().filter(|id| !id.is_empty()) else {
            return Err(MenuError::MissingId(user_id.to_string()));
        };

        menu.updated_at = Some(Utc::now());
        set_json(self.store.as_ref(), &menu_key(&menu_id), &menu).await?;

        tracing::info!(menu_id = %menu_id, item_id = %item_id, "Menu item deleted");
        Ok(Some(menu))
    }
}
