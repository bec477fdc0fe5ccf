//! Pure text helpers: canonical ids, display titles, and the local realism and
//! industry heuristics used when the oracle cannot answer.

const STOP_WORDS: &[&str] = &["a", "an", "the", "of", "and", "for", "to", "in"];

const OCCUPATIONAL_SUFFIXES: &[&str] = &["er", "or", "ist", "ian"];

/// Keyword → industry, searched in order. First match wins.
const INDUSTRY_KEYWORDS: &[(&str, &str)] = &[
    ("developer", "Technology"),
    ("engineer", "Technology"),
    ("scientist", "Research"),
    ("analyst", "Business"),
    ("teacher", "Education"),
    ("professor", "Education"),
    ("driver", "Transportation"),
    ("nurse", "Healthcare"),
    ("doctor", "Healthcare"),
    ("designer", "Creative"),
    ("accountant", "Finance"),
    ("lawyer", "Legal"),
    ("manager", "Management"),
    ("marketer", "Marketing"),
    ("salesperson", "Sales"),
];

pub const DEFAULT_INDUSTRY: &str = "General";

const MIN_PROFESSION_CHARS: usize = 3;
const MAX_PROFESSION_CHARS: usize = 60;
const MAX_PROFESSION_WORDS: usize = 6;

/// Canonical slug: lowercase, `[a-z0-9]` runs joined by single hyphens.
/// Returns an empty string when nothing survives; callers treat that as invalid input.
pub fn normalize_id(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
        // everything else is dropped without splitting the surrounding word
    }
    slug
}

/// Splits on `-`, `_` and non-letters, leaving only alphabetic words.
fn letter_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Title-cases a role name, keeping stop words lowercase except in first position.
/// Returns an empty string for input with no letters.
pub fn standardize_display_title(text: &str) -> String {
    letter_words(text)
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_ascii_lowercase();
            if i > 0 && STOP_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Crude realism gate for the offline path.
pub fn looks_like_profession(text: &str) -> bool {
    let words = letter_words(text);
    let cleaned_len = words.iter().map(|w| w.len()).sum::<usize>() + words.len().saturating_sub(1);

    if words.is_empty() || !(MIN_PROFESSION_CHARS..=MAX_PROFESSION_CHARS).contains(&cleaned_len) {
        return false;
    }
    if words.len() > MAX_PROFESSION_WORDS {
        return false;
    }

    let has_alpha_word = words.iter().any(|w| w.len() >= 2);
    let has_role_token = words.iter().any(|w| {
        let lower = w.to_ascii_lowercase();
        OCCUPATIONAL_SUFFIXES.iter().any(|s| lower.ends_with(s))
            || INDUSTRY_KEYWORDS.iter().any(|(k, _)| *k == lower)
    });

    has_alpha_word && has_role_token
}

/// Industry by first keyword contained in the title; `"General"` when none match.
pub fn infer_industry(title: &str) -> String {
    let lower = title.to_lowercase();
    INDUSTRY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, industry)| industry.to_string())
        .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id_examples() {
        assert_eq!(normalize_id("  Truck   Driver!! "), "truck-driver");
        assert_eq!(normalize_id("Software Engineer"), "software-engineer");
        assert_eq!(normalize_id("software-engineer"), "software-engineer");
        assert_eq!(normalize_id("--C++ / Rust  dev--"), "c-rust-dev");
        assert_eq!(normalize_id("Node.js Developer"), "nodejs-developer");
        assert_eq!(normalize_id("Level 3 Support"), "level-3-support");
    }

    #[test]
    fn test_normalize_id_empty_for_unnormalizable_input() {
        assert_eq!(normalize_id(""), "");
        assert_eq!(normalize_id("   "), "");
        assert_eq!(normalize_id("!!!---???"), "");
        assert_eq!(normalize_id("日本語"), "");
    }

    #[test]
    fn test_normalize_id_is_idempotent() {
        let samples = [
            "  Truck   Driver!! ",
            "Chief -- Executive _ Officer",
            "ÉLECTRICIEN du bâtiment",
            "a\tb\nc",
            "-x-",
            "42",
            "data entry / BPO",
            "   ",
            "Ünïcödé   Ströng-",
        ];
        for sample in samples {
            let once = normalize_id(sample);
            assert_eq!(normalize_id(&once), once, "input {sample:?}");
        }
    }

    #[test]
    fn test_normalize_id_never_has_edge_or_double_hyphens() {
        for sample in ["- a - - b -", "a__b", "  -- ", "x - y"] {
            let id = normalize_id(sample);
            assert!(!id.starts_with('-') && !id.ends_with('-'), "{id}");
            assert!(!id.contains("--"), "{id}");
        }
    }

    #[test]
    fn test_display_title() {
        assert_eq!(standardize_display_title("  Truck   Driver!! "), "Truck Driver");
        assert_eq!(standardize_display_title("head of the sales team"), "Head of the Sales Team");
        assert_eq!(standardize_display_title("the-data_scientist"), "The Data Scientist");
        assert_eq!(standardize_display_title("PRODUCT MANAGER"), "Product Manager");
        assert_eq!(standardize_display_title("of mice and men"), "Of Mice and Men");
        assert_eq!(standardize_display_title("1234 !!"), "");
    }

    #[test]
    fn test_looks_like_profession_accepts_roles() {
        assert!(looks_like_profession("Product Manager"));
        assert!(looks_like_profession("Truck Driver"));
        assert!(looks_like_profession("Pharmacist"));
        assert!(looks_like_profession("Librarian"));
        assert!(looks_like_profession("nurse"));
    }

    #[test]
    fn test_looks_like_profession_rejects_noise() {
        assert!(!looks_like_profession("xyzzy123"));
        assert!(!looks_like_profession("ab"));
        assert!(!looks_like_profession(""));
        assert!(!looks_like_profession("the best cat in the whole wide world"));
        assert!(!looks_like_profession(&"driver".repeat(11)));
    }

    #[test]
    fn test_infer_industry_first_match_wins() {
        assert_eq!(infer_industry("Truck Driver"), "Transportation");
        // "engineer" precedes "manager" in the keyword order
        assert_eq!(infer_industry("Engineering Manager"), "Technology");
        assert_eq!(infer_industry("NURSE practitioner"), "Healthcare");
        assert_eq!(infer_industry("Barista"), "General");
    }
}
