//! Menu slugs
//!
//! A slug is both the menu's id and the last segment of its public URL:
//! the business name squashed to `[a-z0-9-]` plus a random suffix.
//!
//! ```
//! use menucraft_shared::slug::{generate_slug, is_valid_slug, SUFFIX_LEN};
//!
//! let slug = generate_slug("Joe's Diner & Grill");
//! assert!(slug.starts_with("joe-s-diner-grill-"));
//! assert_eq!(slug.len(), "joe-s-diner-grill-".len() + SUFFIX_LEN);
//! assert!(is_valid_slug(&slug));
//! ```

use rand::Rng;

/// Length of the random suffix
pub const SUFFIX_LEN: usize = 6;

/// Longest base taken from the business name
pub const MAX_BASE_LEN: usize = 40;

/// Longest id accepted from clients
pub const MAX_SLUG_LEN: usize = 64;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Turns a business name into the slug base
///
/// Runs of anything outside `[a-z0-9]` collapse to a single `-`; an empty
/// result becomes `menu`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    if out.len() > MAX_BASE_LEN {
        out.truncate(MAX_BASE_LEN);
        while out.ends_with('-') {
            out.pop();
        }
    }

    if out.is_empty() {
        out.push_str("menu");
    }
    out
}

/// Random `[a-z0-9]` suffix of `SUFFIX_LEN` characters
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Generates a fresh slug for a business
pub fn generate_slug(business_name: &str) -> String {
    format!("{}-{}", slugify(business_name), random_suffix())
}

/// Whether `id` is acceptable as a menu id
pub fn is_valid_slug(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SLUG_LEN
        && !id.starts_with('-')
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
