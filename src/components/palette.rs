use std::path::Path;

use crate::color::{ParsedHex, parse_hex};

/// Category name that matches every entry in [`Palette::filter`].
pub const ALL_CATEGORIES: &str = "All";

/// One selectable paint color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaintColor {
    pub name: String,
    pub hex: String,
    pub category: String,
}

impl PaintColor {
    pub fn new(name: &str, hex: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            hex: hex.to_string(),
            category: category.to_string(),
        }
    }
}

/// A palette entry whose hex code does not parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteDiagnostic {
    pub index: usize,
    pub name: String,
    pub hex: String,
    pub problem: ParsedHex,
}

/// Ordered list of paint colors grouped by category.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    colors: Vec<PaintColor>,
}

impl Palette {
    pub fn new(colors: Vec<PaintColor>) -> Self {
        Self { colors }
    }

    /// Exterior house colors shipped with the app.
    pub fn builtin() -> Self {
        const ENTRIES: &[(&str, &str, &str)] = &[
            ("Whites", "Chantilly Lace", "#F5F4EE"),
            ("Whites", "Alabaster", "#EDEAE0"),
            ("Whites", "Swiss Coffee", "#E9E4D4"),
            ("Neutrals", "Agreeable Gray", "#D1CBC1"),
            ("Neutrals", "Accessible Beige", "#D1C7B8"),
            ("Neutrals", "Revere Pewter", "#CCC7B9"),
            ("Neutrals", "Edgecomb Gray", "#D7D0C1"),
            ("Blues", "Hale Navy", "#434B56"),
            ("Blues", "Newburyport Blue", "#445A6A"),
            ("Blues", "Palladian Blue", "#B3C7C0"),
            ("Greens", "Evergreen Fog", "#95978A"),
            ("Greens", "Salisbury Green", "#C3C6A8"),
            ("Greens", "Jasper", "#335048"),
            ("Reds", "Caliente", "#A4343A"),
            ("Reds", "Heritage Red", "#8E3A3A"),
            ("Reds", "Terra Cotta", "#B5654A"),
            ("Darks", "Tricorn Black", "#2F2F30"),
            ("Darks", "Iron Ore", "#434341"),
            ("Darks", "Urbane Bronze", "#54504A"),
        ];
        Self {
            colors: ENTRIES
                .iter()
                .map(|(category, name, hex)| PaintColor::new(name, hex, category))
                .collect(),
        }
    }

    /// Parse `category,name,#hex` lines. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let colors = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut parts = line.splitn(3, ',');
                let category = parts.next()?.trim();
                let name = parts.next()?.trim();
                let hex = parts.next()?.trim();
                Some(PaintColor::new(name, hex, category))
            })
            .collect();
        Self { colors }
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn colors(&self) -> &[PaintColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// `"All"` followed by each category in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out = vec![ALL_CATEGORIES];
        for c in &self.colors {
            if !out.contains(&c.category.as_str()) {
                out.push(c.category.as_str());
            }
        }
        out
    }

    /// Entries whose name contains `query` (case-insensitive) within `category`.
    pub fn filter(&self, query: &str, category: &str) -> Vec<&PaintColor> {
        let query = query.to_lowercase();
        self.colors
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&query))
            .filter(|c| category == ALL_CATEGORIES || c.category == category)
            .collect()
    }

    /// Case-insensitive exact name lookup.
    pub fn find(&self, name: &str) -> Option<&PaintColor> {
        self.colors
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Entries whose hex code would silently fall back to black.
    pub fn diagnostics(&self) -> Vec<PaletteDiagnostic> {
        self.colors
            .iter()
            .enumerate()
            .filter_map(|(index, c)| {
                let parsed = parse_hex(&c.hex);
                (!parsed.is_parsed()).then(|| PaletteDiagnostic {
                    index,
                    name: c.name.clone(),
                    hex: c.hex.clone(),
                    problem: parsed,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_palette_is_valid() {
        let p = Palette::builtin();
        assert!(!p.is_empty());
        assert!(p.diagnostics().is_empty());
    }

    #[test]
    fn test_categories_order() {
        let p = Palette::builtin();
        assert_eq!(
            p.categories(),
            vec!["All", "Whites", "Neutrals", "Blues", "Greens", "Reds", "Darks"]
        );
    }

    #[test]
    fn test_filter_by_query_and_category() {
        let p = Palette::builtin();
        let grays: Vec<&str> = p.filter("GRAY", ALL_CATEGORIES).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(grays, vec!["Agreeable Gray", "Edgecomb Gray"]);

        assert_eq!(p.filter("", "Reds").len(), 3);
        assert!(p.filter("navy", "Reds").is_empty());
        assert_eq!(p.filter("", ALL_CATEGORIES).len(), p.len());
    }

    #[test]
    fn test_find() {
        let p = Palette::builtin();
        assert_eq!(p.find("hale navy").map(|c| c.hex.as_str()), Some("#434B56"));
        assert!(p.find("Hale").is_none());
    }

    #[test]
    fn test_parse_and_diagnostics() {
        let p = Palette::parse(
            "# custom colors\n\
             \n\
             Trim, Bright White, #FFFFFF\n\
             Trim, Typo White, #FFFFF\n\
             Doors, Unset,\n\
             broken line\n",
        );
        assert_eq!(p.len(), 3);
        assert_eq!(p.colors()[0], PaintColor::new("Bright White", "#FFFFFF", "Trim"));

        let diags = p.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].name, "Typo White");
        assert_eq!(diags[0].problem, ParsedHex::Malformed);
        assert_eq!(diags[1].index, 2);
        assert_eq!(diags[1].problem, ParsedHex::Empty);
    }
}
