use serde::{Deserialize, Serialize};

/// The kind of spending a transaction represents.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Snack,
    Shopping,
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

/// Descriptive fields used when displaying a category.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CategoryInfo {
    pub category: Category,
    /// The label shown to the user.
    pub label: &'static str,
    /// The icon name, as found in the lucide icon set.
    pub icon: &'static str,
    /// A short glyph used where icons cannot be drawn, e.g. in a terminal.
    pub glyph: &'static str,
    pub color: &'static str,
}

/// Every category in display order.
pub const CATEGORIES: [CategoryInfo; 4] = [
    CategoryInfo {
        category: Category::Food,
        label: "밥값",
        icon: "utensils",
        glyph: "🍚",
        color: "orange",
    },
    CategoryInfo {
        category: Category::Snack,
        label: "음료/간식",
        icon: "coffee",
        glyph: "☕",
        color: "amber",
    },
    CategoryInfo {
        category: Category::Shopping,
        label: "쇼핑",
        icon: "shopping-bag",
        glyph: "🛍",
        color: "blue",
    },
    CategoryInfo {
        category: Category::Other,
        label: "기타",
        icon: "more-horizontal",
        glyph: "…",
        color: "gray",
    },
];

impl Category {
    /// All categories in display order.
    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORIES.iter().map(|info| info.category)
    }

    /// Looks up the display information for this category.
    pub fn info(&self) -> &'static CategoryInfo {
        // The table holds one entry per variant, in declaration order.
        &CATEGORIES[*self as usize]
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_table_matches_variants() {
        for (ix, info) in CATEGORIES.iter().enumerate() {
            assert_eq!(info.category as usize, ix);
            assert_eq!(info.category.info(), info);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::Food.label(), "밥값");
        assert_eq!(Category::Snack.label(), "음료/간식");
        assert_eq!(Category::Shopping.label(), "쇼핑");
        assert_eq!(Category::Other.label(), "기타");
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Category::Shopping.to_string(), "shopping");
        assert_eq!(Category::from_str("snack").unwrap(), Category::Snack);
        assert!(Category::from_str("rent").is_err());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Category::Food).unwrap();
        assert_eq!(json, "\"food\"");
        let back: Category = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(back, Category::Other);
    }

    #[test]
    fn test_all_in_order() {
        let all: Vec<Category> = Category::all().collect();
        assert_eq!(
            all,
            vec![
                Category::Food,
                Category::Snack,
                Category::Shopping,
                Category::Other
            ]
        );
    }
}
