//! The fixed, ordered twelve-month enumeration.
//!
//! Months are `chrono::Month` values everywhere in the pipeline; the sales
//! sheet labels its columns with French month names, which this module maps
//! to and from.
use chrono::Month;

pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

const LABELS: [&str; 12] = [
    "Janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Zero-based column offset of `month` (January = 0).
pub fn index(month: Month) -> usize {
    month.number_from_month() as usize - 1
}

/// Display label, as written in the sales sheet header.
pub fn label(month: Month) -> &'static str {
    LABELS[index(month)]
}

fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Resolve a header or user-typed month label.
///
/// Matching ignores case and accents, so `Janvier`, `FEVRIER` and `aout`
/// all resolve. English names (`March`, `mar`) and month numbers (`3`) are
/// accepted as well.
pub fn parse_label(s: &str) -> Option<Month> {
    let folded = fold(s);
    if folded.is_empty() {
        return None;
    }
    if let Some(i) = LABELS.iter().position(|l| fold(l) == folded) {
        return Some(MONTHS[i]);
    }
    if let Ok(n) = folded.parse::<u8>() {
        return Month::try_from(n).ok();
    }
    folded.parse::<Month>().ok()
}
