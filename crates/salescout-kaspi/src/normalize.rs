//! Shop display-name canonicalization.
//!
//! Sellers type their shop name by hand, so matching ignores case, quotation
//! marks and whitespace layout.

const QUOTES: [char; 7] = ['"', '\'', '«', '»', '„', '“', '”'];

/// Canonicalizes a shop display name for equality comparison.
///
/// Lowercases, strips straight and typographic quotation marks, collapses
/// whitespace runs to one space and trims. `None` and empty input yield an
/// empty string.
#[must_use]
pub fn normalize_shop_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };

    let stripped: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !QUOTES.contains(c))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` if two display names refer to the same shop.
///
/// Names that normalize to the empty string never match anything.
#[must_use]
pub fn same_shop(a: &str, b: &str) -> bool {
    let a = normalize_shop_name(Some(a));
    !a.is_empty() && a == normalize_shop_name(Some(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_shop_name(Some("  GadgetPro ")), "gadgetpro");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize_shop_name(Some("Gadget \t\n Pro")), "gadget pro");
        assert_eq!(
            normalize_shop_name(Some("Gadget\u{a0}\u{a0}Pro")),
            "gadget pro"
        );
    }

    #[test]
    fn strips_straight_and_typographic_quotes() {
        assert_eq!(normalize_shop_name(Some("\"Alem\" 'Shop'")), "alem shop");
        assert_eq!(normalize_shop_name(Some("«Мега» Маркет")), "мега маркет");
        assert_eq!(normalize_shop_name(Some("„Tech“ ”Store”")), "tech store");
    }

    #[test]
    fn lowercases_cyrillic() {
        assert_eq!(normalize_shop_name(Some("ТЕХНОДОМ")), "технодом");
    }

    #[test]
    fn empty_and_absent_yield_empty() {
        assert_eq!(normalize_shop_name(None), "");
        assert_eq!(normalize_shop_name(Some("")), "");
        assert_eq!(normalize_shop_name(Some("  \"\" ")), "");
    }

    #[test]
    fn quote_removal_can_join_words() {
        // Quotes are deleted, not replaced with spaces.
        assert_eq!(normalize_shop_name(Some("Gadget\"Pro")), "gadgetpro");
    }

    #[test]
    fn same_shop_ignores_case_quotes_and_spacing() {
        assert!(same_shop("gadget pro", "Gadget  Pro"));
        assert!(same_shop("«GadgetPro»", "gadgetpro"));
        assert!(!same_shop("gadget pro", "gadgetpro"));
        assert!(!same_shop("", ""));
        assert!(!same_shop("\"\"", "''"));
    }
}
