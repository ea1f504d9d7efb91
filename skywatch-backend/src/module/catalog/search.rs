//! Name lookup over the catalog index
use skywatch_common::CelestialObject;
use strsim::jaro_winkler;

/// Default similarity threshold for fuzzy matching
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Normalize string for matching (lowercase, remove punctuation and whitespace)
pub fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
        .collect()
}

/// Exact, case-insensitive name lookup. First match in catalog order wins.
pub fn find<'a>(query: &str, entries: &'a [CelestialObject]) -> Option<&'a CelestialObject> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    entries
        .iter()
        .find(|o| o.name.eq_ignore_ascii_case(query))
        .or_else(|| {
            let normalized = normalize_name(query);
            entries.iter().find(|o| normalize_name(&o.name) == normalized)
        })
}

/// Search entries by name.
///
/// # Search Priority
/// 1. Exact match (ignoring case, punctuation and whitespace)
/// 2. Fuzzy match (Jaro-Winkler similarity >= threshold), best first
pub fn search<'a>(query: &str, entries: &'a [CelestialObject], threshold: f64) -> Vec<&'a CelestialObject> {
    let normalized = normalize_name(query);
    if normalized.is_empty() {
        return Vec::new();
    }

    let exact: Vec<&CelestialObject> = entries
        .iter()
        .filter(|o| normalize_name(&o.name) == normalized)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    let query_lower = query.trim().to_lowercase();
    let mut matches: Vec<(f64, &CelestialObject)> = entries
        .iter()
        .map(|o| (jaro_winkler(&query_lower, &o.name.to_lowercase()), o))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    // Stable sort keeps catalog order among equal scores
    matches.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    matches.into_iter().map(|(_, o)| o).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywatch_common::ObjectKind;

    fn create_test_entries() -> Vec<CelestialObject> {
        vec![
            CelestialObject::new(ObjectKind::Constellation, "Ursa Major", Some("UMa".into())),
            CelestialObject::new(ObjectKind::Constellation, "Orion", Some("Ori".into())),
            CelestialObject::new(ObjectKind::Star, "Betelgeuse", Some("27989".into())),
            CelestialObject::new(ObjectKind::Star, "Sirius", Some("32349".into())),
            CelestialObject::new(ObjectKind::Planet, "Mars", None),
            CelestialObject::new(ObjectKind::Planet, "Saturn", None),
        ]
    }

    #[test]
    fn test_find_case_insensitive() {
        let entries = create_test_entries();
        let found = find("sIrIuS", &entries).unwrap();
        assert_eq!(found.kind, ObjectKind::Star);
        assert_eq!(found.name, "Sirius");
    }

    #[test]
    fn test_find_ignores_spacing() {
        let entries = create_test_entries();
        assert_eq!(find("ursamajor", &entries).unwrap().name, "Ursa Major");
        assert!(find("   ", &entries).is_none());
        assert!(find("Vega", &entries).is_none());
    }

    #[test]
    fn test_search_exact_before_fuzzy() {
        let entries = create_test_entries();
        let results = search("Mars", &entries, DEFAULT_THRESHOLD);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Mars");
    }

    #[test]
    fn test_search_fuzzy_typo() {
        let entries = create_test_entries();
        let results = search("Betelguese", &entries, DEFAULT_THRESHOLD);
        assert!(!results.is_empty());
        assert_eq!(results[0].name, "Betelgeuse");
    }

    #[test]
    fn test_search_nothing_close() {
        let entries = create_test_entries();
        assert!(search("Andromeda Galaxy", &entries, DEFAULT_THRESHOLD).is_empty());
        assert!(search("", &entries, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Ursa Major"), "ursamajor");
        assert_eq!(normalize_name("  Alpha-Centauri "), "alphacentauri");
    }
}
