//! Age brackets: which teeth are charted at which age.

use crate::anatomy::{permanent_sites, primary_sites, Dentition, ToothRef};

/// Which entries of one tooth catalog a bracket tracks.
#[derive(Debug, Clone, Copy)]
enum SiteFilter {
    None,
    All,
    Only(&'static [&'static str]),
    Except(&'static [&'static str]),
}

impl SiteFilter {
    fn includes(&self, site_id: &str) -> bool {
        match self {
            SiteFilter::None => false,
            SiteFilter::All => true,
            SiteFilter::Only(ids) => ids.contains(&site_id),
            SiteFilter::Except(ids) => !ids.contains(&site_id),
        }
    }
}

/// One closed age range and the sites charted within it.
#[derive(Debug, Clone, Copy)]
struct AgeBracket {
    min_age: u32,
    max_age: u32,
    /// Bracket label; only compared to detect crossings
    category: u32,
    primary: SiteFilter,
    permanent: SiteFilter,
}

const INFANT_PRIMARY: &[&str] = &["A", "B", "C", "D", "E", "F", "G", "H"];
const RETAINED_PRIMARY: &[&str] = &["A", "B", "I", "J", "K", "L", "S", "T"];
const ERUPTED_PERMANENT: &[&str] = &["3", "8", "9", "14", "19", "24", "25", "30"];
const THIRD_MOLARS: &[&str] = &["1", "16", "17", "32"];

/// Non-overlapping, covering every age, in ascending order.
const AGE_BRACKETS: [AgeBracket; 5] = [
    AgeBracket {
        min_age: 0,
        max_age: 2,
        category: 8,
        primary: SiteFilter::Only(INFANT_PRIMARY),
        permanent: SiteFilter::None,
    },
    AgeBracket {
        min_age: 3,
        max_age: 5,
        category: 20,
        primary: SiteFilter::All,
        permanent: SiteFilter::None,
    },
    // Mixed dentition. The category stays 24 even though 16 sites are
    // charted; stored data depends on the label.
    AgeBracket {
        min_age: 6,
        max_age: 11,
        category: 24,
        primary: SiteFilter::Only(RETAINED_PRIMARY),
        permanent: SiteFilter::Only(ERUPTED_PERMANENT),
    },
    AgeBracket {
        min_age: 12,
        max_age: 17,
        category: 28,
        primary: SiteFilter::None,
        permanent: SiteFilter::Except(THIRD_MOLARS),
    },
    AgeBracket {
        min_age: 18,
        max_age: u32::MAX,
        category: 32,
        primary: SiteFilter::None,
        permanent: SiteFilter::All,
    },
];

fn bracket_for(age: u32) -> &'static AgeBracket {
    AGE_BRACKETS
        .iter()
        .find(|b| (b.min_age..=b.max_age).contains(&age))
        .unwrap_or(&AGE_BRACKETS[AGE_BRACKETS.len() - 1])
}

/// Catalog entries charted at `age`, primary teeth first, each catalog in
/// chart order.
pub fn expected_sites(age: u32) -> Vec<(Dentition, &'static ToothRef)> {
    let bracket = bracket_for(age);
    let primary = primary_sites()
        .iter()
        .filter(|t| bracket.primary.includes(t.id))
        .map(|t| (Dentition::Primary, t));
    let permanent = permanent_sites()
        .iter()
        .filter(|t| bracket.permanent.includes(t.id))
        .map(|t| (Dentition::Permanent, t));
    primary.chain(permanent).collect()
}

/// Site ids charted at `age`, in chart order.
pub fn expected_site_set(age: u32) -> Vec<&'static str> {
    expected_sites(age).into_iter().map(|(_, t)| t.id).collect()
}

/// Bracket label for `age`: 8, 20, 24, 28 or 32.
pub fn bracket_category(age: u32) -> u32 {
    bracket_for(age).category
}

/// Whether moving from `old_age` to `new_age` crosses a bracket boundary.
pub fn crosses_bracket(old_age: u32, new_age: u32) -> bool {
    bracket_category(old_age) != bracket_category(new_age)
}
