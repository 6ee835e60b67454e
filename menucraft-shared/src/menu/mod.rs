/// Menu persistence
///
/// One record per menu under `menu:{menuId}`, plus two per-user indexes
/// pointing at those records. See [`repository`] for the key layout.

pub mod repository;

pub use repository::MenuRepository;

use thiserror::Error;

use crate::store::StoreError;

/// Menu repository errors
#[derive(Debug, Error)]
pub enum MenuError {
    /// The menu id exists and belongs to someone else
    #[error("Menu {0} belongs to another user")]
    Forbidden(String),

    /// Every generated slug collided with an existing menu
    #[error("Could not allocate a unique menu id after {0} attempts")]
    SlugExhausted(usize),

    /// A stored record lacks its own id
    #[error("Stored menu for user {0} has no menu id")]
    MissingId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
