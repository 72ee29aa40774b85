//! UK postcode validation.
//!
//! A postcode is an outward code (`A9`, `A99`, `AA9`, `AA99`, `A9A` or
//! `AA9A`, where the second letter of a two-letter area is never I or Z)
//! followed by an inward code (`9AA`), with or without a separating space.
//! `GIR 0AA` is accepted as a special case. Letters may be either case.
//!
//! See <https://en.wikipedia.org/wiki/Postcodes_in_the_United_Kingdom#Validation>.

use std::sync::LazyLock;

use osm_clean_audit_models::PostalCodeCategory;
use regex::Regex;

/// Value stored in place of anything that is not a postcode.
pub const NOT_A_POSTAL_CODE: &str = "Not a postal code";

const OUTWARD: &str = "(?:[A-Za-z][0-9]{1,2}\
                       |[A-Za-z][A-HJ-Ya-hj-y][0-9]{1,2}\
                       |[A-Za-z][0-9][A-Za-z]\
                       |[A-Za-z][A-HJ-Ya-hj-y][0-9]?[A-Za-z])";

/// `(category, pattern)` in precedence order.
static RULES: LazyLock<[(PostalCodeCategory, Regex); 2]> = LazyLock::new(|| {
    [
        (
            PostalCodeCategory::NoSpace,
            Regex::new(&format!(
                "^(?:[Gg][Ii][Rr]0[Aa]{{2}}|{OUTWARD}[0-9][A-Za-z]{{2}})$"
            ))
            .expect("valid regex"),
        ),
        (
            PostalCodeCategory::WithSpace,
            Regex::new(&format!(
                "^(?:[Gg][Ii][Rr] 0[Aa]{{2}}|{OUTWARD} [0-9][A-Za-z]{{2}})$"
            ))
            .expect("valid regex"),
        ),
    ]
});

/// Classifies a postal code without modifying it.
#[must_use]
pub fn classify_postal_code(value: &str) -> PostalCodeCategory {
    RULES
        .iter()
        .find(|(_, re)| re.is_match(value))
        .map_or(PostalCodeCategory::Unknown, |(category, _)| *category)
}

/// Returns `value` if it is a valid postcode, [`NOT_A_POSTAL_CODE`]
/// otherwise.
#[must_use]
pub fn clean_postal_code(value: &str) -> &str {
    if classify_postal_code(value).is_valid() {
        value
    } else {
        NOT_A_POSTAL_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_space() {
        assert_eq!(
            classify_postal_code("SW1A 1AA"),
            PostalCodeCategory::WithSpace
        );
        assert_eq!(
            classify_postal_code("NW1 6XE"),
            PostalCodeCategory::WithSpace
        );
        assert_eq!(classify_postal_code("E1 6AN"), PostalCodeCategory::WithSpace);
    }

    #[test]
    fn no_space() {
        assert_eq!(classify_postal_code("SW1A1AA"), PostalCodeCategory::NoSpace);
        assert_eq!(classify_postal_code("EC1A1BB"), PostalCodeCategory::NoSpace);
        assert_eq!(classify_postal_code("w1a0ax"), PostalCodeCategory::NoSpace);
    }

    #[test]
    fn girobank() {
        assert_eq!(classify_postal_code("GIR 0AA"), PostalCodeCategory::WithSpace);
        assert_eq!(classify_postal_code("GIR0AA"), PostalCodeCategory::NoSpace);
    }

    #[test]
    fn unknown() {
        assert_eq!(classify_postal_code("12345"), PostalCodeCategory::Unknown);
        assert_eq!(classify_postal_code("SW1A  1AA"), PostalCodeCategory::Unknown);
        assert_eq!(classify_postal_code("SW1A"), PostalCodeCategory::Unknown);
        assert_eq!(classify_postal_code(""), PostalCodeCategory::Unknown);
        assert_eq!(
            classify_postal_code("SW1A 1AA, London"),
            PostalCodeCategory::Unknown
        );
    }

    #[test]
    fn second_area_letter_excludes_i_and_z() {
        assert_eq!(classify_postal_code("AI1 1AA"), PostalCodeCategory::Unknown);
        assert_eq!(classify_postal_code("AZ1 1AA"), PostalCodeCategory::Unknown);
    }

    #[test]
    fn cleaning_substitutes_sentinel() {
        assert_eq!(clean_postal_code("SW1A 1AA"), "SW1A 1AA");
        assert_eq!(clean_postal_code("London"), NOT_A_POSTAL_CODE);
    }
}
