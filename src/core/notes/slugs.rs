// Slug derivation for notes.
//
// Pure functions only; uniqueness is checked by the service against storage.

use slug::slugify;

pub const SLUG_MAX_LENGTH: usize = 100;

/// Appended to the colliding slug in the `slug` field error.
pub const WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

pub const INVALID_SLUG: &str =
    "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.";

/// Candidate slug for a note without an explicit one: the transliterated
/// title, truncated to [`SLUG_MAX_LENGTH`] characters.
pub fn slug_from_title(title: &str) -> String {
    slugify(title).chars().take(SLUG_MAX_LENGTH).collect()
}

/// Whether an explicit slug only uses URL-safe characters.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Field error for a slug already used by another note.
pub fn duplicate_slug_message(slug: &str) -> String {
    format!("{slug}{WARNING}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyrillic_title_is_transliterated() {
        assert_eq!(slug_from_title("Заголовок"), "zagolovok");
    }

    #[test]
    fn test_latin_title() {
        assert_eq!(slug_from_title("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_long_title_is_truncated() {
        let title = "a".repeat(250);
        let slug = slug_from_title(&title);
        assert_eq!(slug.chars().count(), SLUG_MAX_LENGTH);
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("unique_slug"));
        assert!(is_valid_slug("new-slug-2"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("слаг"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_duplicate_message() {
        assert_eq!(
            duplicate_slug_message("unique_slug"),
            format!("unique_slug{WARNING}")
        );
    }
}
