//! Labels
//!
//! Option names, size labels and add-on names come from merchants, so they are compared with
//! full Unicode lower-casing: "Café Grande" and "CAFÉ GRANDE" name the same size in every lookup.
//! Both helpers fold character by character so keys built with [`fold`] always agree with
//! [`same`].

/// Case-folded key for a label.
pub fn fold(label: &str) -> String {
    label.chars().flat_map(char::to_lowercase).collect()
}

/// Whether two labels name the same thing.
pub fn same(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Whether `haystack` mentions `needle`, ignoring case.
pub fn mentions(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}
