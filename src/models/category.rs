//! Display styles for free-form activity and expense categories.

use serde::Serialize;

/// Icon and colour used to render a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    /// Canonical category key
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const STYLES: &[CategoryStyle] = &[
    CategoryStyle {
        key: "food",
        label: "Food & Dining",
        icon: "utensils",
        color: "#f97316",
    },
    CategoryStyle {
        key: "transport",
        label: "Transportation",
        icon: "car",
        color: "#3b82f6",
    },
    CategoryStyle {
        key: "accommodation",
        label: "Accommodation",
        icon: "bed",
        color: "#8b5cf6",
    },
    CategoryStyle {
        key: "sightseeing",
        label: "Sightseeing",
        icon: "camera",
        color: "#10b981",
    },
    CategoryStyle {
        key: "entertainment",
        label: "Entertainment",
        icon: "ticket",
        color: "#ec4899",
    },
    CategoryStyle {
        key: "shopping",
        label: "Shopping",
        icon: "shopping-bag",
        color: "#eab308",
    },
    CategoryStyle {
        key: "adventure",
        label: "Adventure",
        icon: "mountain",
        color: "#14b8a6",
    },
];

const OTHER: CategoryStyle = CategoryStyle {
    key: "other",
    label: "Other",
    icon: "tag",
    color: "#6b7280",
};

/// Alternate spellings users type into the category field.
const ALIASES: &[(&str, &str)] = &[
    ("dining", "food"),
    ("restaurant", "food"),
    ("meal", "food"),
    ("meals", "food"),
    ("transportation", "transport"),
    ("travel", "transport"),
    ("flight", "transport"),
    ("hotel", "accommodation"),
    ("lodging", "accommodation"),
    ("stay", "accommodation"),
    ("tour", "sightseeing"),
    ("culture", "sightseeing"),
    ("activities", "entertainment"),
    ("activity", "entertainment"),
    ("nightlife", "entertainment"),
    ("outdoor", "adventure"),
];

impl CategoryStyle {
    /// Look up the style for a category string. Unknown input maps to "other".
    pub fn lookup(category: &str) -> CategoryStyle {
        let key = normalize_category(category);
        let canonical = ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, target)| *target)
            .unwrap_or(key.as_str());

        STYLES
            .iter()
            .find(|style| style.key == canonical)
            .copied()
            .unwrap_or(OTHER)
    }
}

/// Trimmed, lowercased category key; empty input becomes "other".
pub fn normalize_category(category: &str) -> String {
    let key = category.trim().to_lowercase();
    if key.is_empty() { OTHER.key.to_string() } else { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(CategoryStyle::lookup("  FOOD ").key, "food");
        assert_eq!(CategoryStyle::lookup("Hotel").key, "accommodation");
    }

    #[test]
    fn test_unknown_maps_to_other() {
        assert_eq!(CategoryStyle::lookup("souvenir stand").key, "other");
        assert_eq!(CategoryStyle::lookup("").key, "other");
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(" Food "), "food");
        assert_eq!(normalize_category("   "), "other");
    }
}
