use std::sync::OnceLock;

use regex::Regex;

/// Cell names are one or more ASCII letters followed by one or more ASCII digits
const CELL_NAME_PATTERN: &str = r"^[A-Za-z]+[0-9]+$";

fn cell_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CELL_NAME_PATTERN).expect("cell name pattern is valid"))
}

/// Check the fixed cell name grammar (case-sensitive, no user predicate)
pub fn is_cell_name(name: &str) -> bool {
    cell_name_regex().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["A1", "a1", "AbC123", "Z0", "xy0099"] {
            assert!(is_cell_name(name), "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "A", "1", "1A", "A1A", "A_1", "_A1", "A 1", "A1 ", "Ä1"] {
            assert!(!is_cell_name(name), "{:?} should be invalid", name);
        }
    }
}
