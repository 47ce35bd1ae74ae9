//! Anatomical reference: the two tooth catalogs charts are built from.
//!
//! Primary (deciduous) teeth use the universal letter system `A`–`T`,
//! permanent teeth the universal numbering `1`–`32`. Both catalogs are
//! ordered the way a chart grid is drawn: upper right to upper left, then
//! lower left to lower right.

use serde::Serialize;

/// One entry of a tooth catalog.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ToothRef {
    /// Stable site identifier used as the chart key
    pub id: &'static str,
    /// Human readable label
    pub label: &'static str,
}

/// Which dentition a catalog entry belongs to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Dentition {
    Primary,
    Permanent,
}

const fn tooth(id: &'static str, label: &'static str) -> ToothRef {
    ToothRef { id, label }
}

/// The 20 primary teeth.
pub const PRIMARY_TEETH: [ToothRef; 20] = [
    tooth("A", "Upper Right Second Molar (Primary)"),
    tooth("B", "Upper Right First Molar (Primary)"),
    tooth("C", "Upper Right Canine (Primary)"),
    tooth("D", "Upper Right Lateral Incisor (Primary)"),
    tooth("E", "Upper Right Central Incisor (Primary)"),
    tooth("F", "Upper Left Central Incisor (Primary)"),
    tooth("G", "Upper Left Lateral Incisor (Primary)"),
    tooth("H", "Upper Left Canine (Primary)"),
    tooth("I", "Upper Left First Molar (Primary)"),
    tooth("J", "Upper Left Second Molar (Primary)"),
    tooth("K", "Lower Left Second Molar (Primary)"),
    tooth("L", "Lower Left First Molar (Primary)"),
    tooth("M", "Lower Left Canine (Primary)"),
    tooth("N", "Lower Left Lateral Incisor (Primary)"),
    tooth("O", "Lower Left Central Incisor (Primary)"),
    tooth("P", "Lower Right Central Incisor (Primary)"),
    tooth("Q", "Lower Right Lateral Incisor (Primary)"),
    tooth("R", "Lower Right Canine (Primary)"),
    tooth("S", "Lower Right First Molar (Primary)"),
    tooth("T", "Lower Right Second Molar (Primary)"),
];

/// The 32 permanent teeth.
pub const PERMANENT_TEETH: [ToothRef; 32] = [
    tooth("1", "Upper Right Third Molar (Wisdom)"),
    tooth("2", "Upper Right Second Molar"),
    tooth("3", "Upper Right First Molar"),
    tooth("4", "Upper Right Second Premolar"),
    tooth("5", "Upper Right First Premolar"),
    tooth("6", "Upper Right Canine"),
    tooth("7", "Upper Right Lateral Incisor"),
    tooth("8", "Upper Right Central Incisor"),
    tooth("9", "Upper Left Central Incisor"),
    tooth("10", "Upper Left Lateral Incisor"),
    tooth("11", "Upper Left Canine"),
    tooth("12", "Upper Left First Premolar"),
    tooth("13", "Upper Left Second Premolar"),
    tooth("14", "Upper Left First Molar"),
    tooth("15", "Upper Left Second Molar"),
    tooth("16", "Upper Left Third Molar (Wisdom)"),
    tooth("17", "Lower Left Third Molar (Wisdom)"),
    tooth("18", "Lower Left Second Molar"),
    tooth("19", "Lower Left First Molar"),
    tooth("20", "Lower Left Second Premolar"),
    tooth("21", "Lower Left First Premolar"),
    tooth("22", "Lower Left Canine"),
    tooth("23", "Lower Left Lateral Incisor"),
    tooth("24", "Lower Left Central Incisor"),
    tooth("25", "Lower Right Central Incisor"),
    tooth("26", "Lower Right Lateral Incisor"),
    tooth("27", "Lower Right Canine"),
    tooth("28", "Lower Right First Premolar"),
    tooth("29", "Lower Right Second Premolar"),
    tooth("30", "Lower Right First Molar"),
    tooth("31", "Lower Right Second Molar"),
    tooth("32", "Lower Right Third Molar (Wisdom)"),
];

/// All primary teeth in chart order.
pub fn primary_sites() -> &'static [ToothRef] {
    &PRIMARY_TEETH
}

/// All permanent teeth in chart order.
pub fn permanent_sites() -> &'static [ToothRef] {
    &PERMANENT_TEETH
}

/// Look up a site in either catalog.
pub fn find_site(site_id: &str) -> Option<(Dentition, &'static ToothRef)> {
    PRIMARY_TEETH
        .iter()
        .find(|t| t.id == site_id)
        .map(|t| (Dentition::Primary, t))
        .or_else(|| {
            PERMANENT_TEETH
                .iter()
                .find(|t| t.id == site_id)
                .map(|t| (Dentition::Permanent, t))
        })
}

/// Display label for a site id, if it exists in either catalog.
pub fn site_label(site_id: &str) -> Option<&'static str> {
    find_site(site_id).map(|(_, t)| t.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(primary_sites().len(), 20);
        assert_eq!(permanent_sites().len(), 32);
    }

    #[test]
    fn test_ids_unique_across_catalogs() {
        let ids: HashSet<_> = PRIMARY_TEETH
            .iter()
            .chain(PERMANENT_TEETH.iter())
            .map(|t| t.id)
            .collect();
        assert_eq!(ids.len(), 52);
    }

    #[test]
    fn test_find_site() {
        let (dentition, tooth) = find_site("E").unwrap();
        assert_eq!(dentition, Dentition::Primary);
        assert_eq!(tooth.label, "Upper Right Central Incisor (Primary)");

        assert_eq!(
            site_label("32"),
            Some("Lower Right Third Molar (Wisdom)")
        );
        assert!(find_site("Z").is_none());
        assert!(find_site("33").is_none());
    }
}
