/// Anything that is stored under a natural key in one of the stores.
///
/// The stores never generate ids, so two values with the same key
/// are the same record regardless of their other fields.
pub trait Entity {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;

    fn has_same_key(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Turns free text (a feed category, a country, a title) into a lower-case,
/// dash separated identifier, e.g. `"Gold Prices"` -> `"gold-prices"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
