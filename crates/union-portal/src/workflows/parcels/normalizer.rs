use once_cell::sync::Lazy;
use regex::Regex;

static LOT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:-\d+)?").expect("lot number pattern compiles"));

/// Drop brackets and punctuation, keep letters, digits and lot hyphens,
/// collapse whitespace and lower-case.
pub fn normalize_address(value: &str) -> String {
    let cleaned: String = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' {
                ch
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First lot-number-like token, e.g. `123-4` in `역삼동 123-4`.
pub fn lot_number(normalized: &str) -> Option<&str> {
    LOT_NUMBER.find(normalized).map(|found| found.as_str())
}

/// Substring test that refuses to match inside a longer number, so `12`
/// does not hit `112-3`. A main lot number still hits its sub-lots
/// (`123` hits `123-4`).
pub fn contains_lot_number(haystack: &str, token: &str) -> bool {
    let has_sub_lot = token.contains('-');

    haystack.match_indices(token).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + token.len()..].chars().next();
        let joined_before = before.is_some_and(|ch| ch.is_ascii_digit() || ch == '-');
        let joined_after =
            after.is_some_and(|ch| ch.is_ascii_digit() || (ch == '-' && has_sub_lot));
        !joined_before && !joined_after
    })
}

/// `101동` and `101` name the same building.
pub fn normalize_unit_label(value: Option<&str>) -> Option<String> {
    let trimmed: String = value?
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .trim_end_matches(['동', '호'])
        .to_lowercase();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_brackets_and_punctuation() {
        assert_eq!(
            normalize_address("  서울특별시 양천구  목동 123-4 (목동아파트), "),
            "서울특별시 양천구 목동 123-4 목동아파트"
        );
        assert_eq!(normalize_address("\u{feff}Mok-dong 7 [B]"), "mok-dong 7 b");
    }

    #[test]
    fn lot_number_takes_first_token() {
        assert_eq!(lot_number("목동 123-4 목동아파트"), Some("123-4"));
        assert_eq!(lot_number("목동 905"), Some("905"));
        assert_eq!(lot_number("목동"), None);
    }

    #[test]
    fn lot_number_match_respects_number_boundaries() {
        assert!(contains_lot_number("서울 양천구 목동 123-4", "123-4"));
        assert!(contains_lot_number("목동 905", "905"));
        assert!(!contains_lot_number("목동 1123-4", "123-4"));
        assert!(!contains_lot_number("목동 123-45", "123-4"));
        assert!(!contains_lot_number("목동 9050", "905"));
        assert!(contains_lot_number("목동 123-4", "123"));
    }

    #[test]
    fn unit_labels_drop_suffixes() {
        assert_eq!(normalize_unit_label(Some(" 101동 ")), Some("101".to_string()));
        assert_eq!(normalize_unit_label(Some("1203호")), Some("1203".to_string()));
        assert_eq!(normalize_unit_label(Some("B")), Some("b".to_string()));
        assert_eq!(normalize_unit_label(Some("  ")), None);
        assert_eq!(normalize_unit_label(None), None);
    }
}
