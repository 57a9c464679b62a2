//! ASCII slugs of sheet and variable names.

use unicode_normalization::UnicodeNormalization as _;

/// Slugify a name: accents are stripped, other non-ASCII characters are
/// dropped, letters are lowercased and every run of other characters
/// becomes a single `separator`.
///
/// ```
/// use baremes_core::slugify;
///
/// assert_eq!(slugify("Taux de CSG (activité)", '-'), "taux-de-csg-activite");
/// assert_eq!(slugify("Plafond SS", '_'), "plafond_ss");
/// ```
pub fn slugify(name: &str, separator: char) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending = false;
    for c in name.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() {
            if pending && !slug.is_empty() {
                slug.push(separator);
            }
            pending = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents_and_punctuation() {
        assert_eq!(slugify("Réduction générale « Fillon »", '_'), "reduction_generale_fillon");
        assert_eq!(slugify("  CSG - CRDS  ", '-'), "csg-crds");
        assert_eq!(slugify("Œuvres", '-'), "uvres");
    }

    #[test]
    fn test_degenerate_names() {
        assert_eq!(slugify("", '-'), "");
        assert_eq!(slugify("%%%", '-'), "");
        assert_eq!(slugify("AGIRC_ARRCO", '-'), "agirc-arrco");
    }
}
