/// Data models for MenuCraft
///
/// # Models
///
/// - `menu`: menu documents and their items
/// - `user`: identity-provider users and sessions
/// - `template`: the built-in template catalog

pub mod menu;
pub mod template;
pub mod user;

pub use menu::{MenuData, MenuItem};
pub use template::Template;
pub use user::{NewUser, Session, User, UserMetadata};
