//! Street-type audit and normalization.
//!
//! An address string is sorted into a bucket keyed by its trailing word,
//! its "street type". The pipeline for one string:
//!
//! 1. Extract the trailing token ([`street_type_token`]).
//! 2. Skip it if it looks like a house-number or postcode fragment
//!    ([`is_suppressed`]).
//! 3. If the token is canonical, bucket the string unchanged.
//! 4. If the token is a known alias, rewrite the string and bucket the
//!    rewritten form under the alias target.
//! 5. Otherwise, if the token passes [`is_promotable`], accept it as a new
//!    canonical street type and bucket the string under it.
//! 6. Otherwise drop it.
//!
//! Step 5 mutates the vocabulary, so the order in which strings are
//! classified changes the outcome for later strings. Everything lives on
//! [`StreetTypeAuditor`] so that one pass owns exactly one vocabulary.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::LazyLock;

use osm_clean_audit_models::{
    Classification, ClassificationOutcome, StreetTypeConfig, UnclassifiedReason,
};
use regex::Regex;

use crate::vocabulary::{AliasTable, Vocabulary};

/// Trailing run of non-whitespace starting at a word boundary, with an
/// optional trailing period, anchored at the end of the string. A single
/// final newline is allowed after the token and kept out of it.
static STREET_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\S+\.?)\n?$").expect("valid regex"));

/// A digit followed by anything up to the end of the token.
static NUMERIC_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\S*$").expect("valid regex"));

/// A capitalized word of at least three letters ending the token.
static CAPITALIZED_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]{2,}$").expect("valid regex"));

/// The trailing token of an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token text (including any trailing period).
    pub text: &'a str,
    /// Byte offset where the token starts.
    pub start: usize,
    /// Byte offset one past the token's end.
    pub end: usize,
}

impl Token<'_> {
    /// Byte range of the token within the address string.
    #[must_use]
    pub const fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Extracts the trailing token of `address`.
///
/// Returns `None` when the string has no such token, including when it
/// ends in whitespace other than one final newline.
#[must_use]
pub fn street_type_token(address: &str) -> Option<Token<'_>> {
    let captures = STREET_TYPE_RE.captures(address)?;
    captures.get(1).map(|m| Token {
        text: m.as_str(),
        start: m.start(),
        end: m.end(),
    })
}

/// Returns `true` if `token` carries a digit followed by more characters
/// to its end ("12A", "N1", "42").
#[must_use]
pub fn is_suppressed(token: &str) -> bool {
    NUMERIC_SUFFIX_RE.is_match(token)
}

/// Returns `true` if an unknown `token` may become a canonical street
/// type: it must end in a capitalized word of three or more letters and be
/// plain ASCII.
#[must_use]
pub fn is_promotable(token: &str) -> bool {
    CAPITALIZED_WORD_RE.is_match(token) && token.is_ascii()
}

/// Classifier state for one pass: the growing vocabulary, the alias table
/// and the buckets filled so far.
#[derive(Debug, Clone)]
pub struct StreetTypeAuditor {
    vocabulary: Vocabulary,
    aliases: AliasTable,
    buckets: BTreeMap<String, BTreeSet<String>>,
    candidates: BTreeSet<String>,
    counts: BTreeMap<ClassificationOutcome, u64>,
}

impl StreetTypeAuditor {
    /// Creates an auditor over an injected vocabulary and alias table.
    #[must_use]
    pub fn new(vocabulary: Vocabulary, aliases: AliasTable) -> Self {
        Self {
            vocabulary,
            aliases,
            buckets: BTreeMap::new(),
            candidates: BTreeSet::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Creates an auditor from the `[street_types]` configuration section.
    #[must_use]
    pub fn from_config(config: &StreetTypeConfig) -> Self {
        Self::new(
            Vocabulary::new(config.expected.iter().cloned()),
            AliasTable::new(config.aliases.clone()),
        )
    }

    /// Returns `true` if `token` needs no rewriting.
    #[must_use]
    pub fn is_canonical(&self, token: &str) -> bool {
        self.vocabulary.contains(token) || self.aliases.is_target(token)
    }

    /// Classifies one address string, recording it in the matching bucket
    /// and promoting its street type if warranted.
    pub fn classify(&mut self, address: &str) -> Classification {
        let classification = self.decide(address);

        if let Some(street_type) = classification.street_type() {
            let stored = match &classification {
                Classification::AliasHit { rewritten, .. } => rewritten.clone(),
                _ => address.to_string(),
            };
            self.buckets
                .entry(street_type.to_string())
                .or_default()
                .insert(stored);
        }
        *self.counts.entry(classification.outcome()).or_insert(0) += 1;

        classification
    }

    fn decide(&mut self, address: &str) -> Classification {
        let Some(token) = street_type_token(address) else {
            return Classification::Unclassified(UnclassifiedReason::NoToken);
        };
        self.candidates.insert(token.text.to_string());

        if is_suppressed(token.text) {
            log::trace!("Suppressed street type {:?} in {address:?}", token.text);
            return Classification::Unclassified(UnclassifiedReason::Suppressed);
        }

        if self.is_canonical(token.text) {
            return Classification::CanonicalHit {
                street_type: token.text.to_string(),
            };
        }

        if let Some(canonical) = self.aliases.canonical_for(token.text) {
            return Classification::AliasHit {
                street_type: canonical.to_string(),
                rewritten: replace_span(address, token.span(), canonical),
            };
        }

        if is_promotable(token.text) {
            log::debug!("Promoting street type {:?} from {address:?}", token.text);
            self.vocabulary.insert(token.text.to_string());
            return Classification::Promoted {
                street_type: token.text.to_string(),
            };
        }

        log::trace!("Dropped street type {:?} in {address:?}", token.text);
        Classification::Unclassified(UnclassifiedReason::Dropped)
    }

    /// Replaces an alias-mapped trailing token with its canonical form.
    ///
    /// The whole token span is replaced, trailing period included, so
    /// `"Oxford St."` becomes `"Oxford Street"`. Strings whose trailing
    /// token is canonical or unknown come back unchanged.
    #[must_use]
    pub fn rewrite<'a>(&self, address: &'a str) -> Cow<'a, str> {
        let Some(token) = street_type_token(address) else {
            return Cow::Borrowed(address);
        };
        if self.is_canonical(token.text) {
            return Cow::Borrowed(address);
        }
        match self.aliases.canonical_for(token.text) {
            Some(canonical) => Cow::Owned(replace_span(address, token.span(), canonical)),
            None => Cow::Borrowed(address),
        }
    }

    /// Classifies `address` and returns the value to persist: the rewritten
    /// string for alias hits, the original otherwise.
    pub fn normalize(&mut self, address: &str) -> String {
        match self.classify(address) {
            Classification::AliasHit { rewritten, .. } => rewritten,
            _ => address.to_string(),
        }
    }

    /// The canonical vocabulary as it stands.
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The alias table.
    #[must_use]
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Street type → address strings bucketed so far.
    #[must_use]
    pub const fn buckets(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.buckets
    }

    /// Every trailing token extracted so far.
    #[must_use]
    pub const fn candidates(&self) -> &BTreeSet<String> {
        &self.candidates
    }

    /// Classification outcome tallies.
    #[must_use]
    pub const fn counts(&self) -> &BTreeMap<ClassificationOutcome, u64> {
        &self.counts
    }
}

fn replace_span(address: &str, span: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(address.len() + replacement.len());
    out.push_str(&address[..span.start]);
    out.push_str(replacement);
    out.push_str(&address[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auditor(expected: &[&str], aliases: &[(&str, &str)]) -> StreetTypeAuditor {
        StreetTypeAuditor::new(
            Vocabulary::new(expected.iter().copied()),
            aliases.iter().copied().collect(),
        )
    }

    fn london() -> StreetTypeAuditor {
        StreetTypeAuditor::from_config(&StreetTypeConfig::default())
    }

    #[test]
    fn token_is_last_word_with_optional_period() {
        assert_eq!(street_type_token("Oxford St.").unwrap().text, "St.");
        assert_eq!(street_type_token("10 Downing Street").unwrap().text, "Street");
        assert_eq!(street_type_token("Strand").unwrap().text, "Strand");
    }

    #[test]
    fn token_span_covers_the_trailing_token() {
        let token = street_type_token("Oxford St.").unwrap();
        assert_eq!(token.span(), 7..10);
    }

    #[test]
    fn token_skips_leading_punctuation() {
        assert_eq!(street_type_token("Baker (Rd)").unwrap().text, "Rd)");
    }

    #[test]
    fn no_token_for_blank_or_trailing_whitespace() {
        assert!(street_type_token("").is_none());
        assert!(street_type_token("   ").is_none());
        assert!(street_type_token("Baker Street ").is_none());
    }

    #[test]
    fn one_final_newline_is_tolerated() {
        let token = street_type_token("Oxford St\n").unwrap();
        assert_eq!(token.text, "St");
        assert_eq!(token.span(), 7..9);
        assert!(street_type_token("Oxford St\n\n").is_none());
        assert!(street_type_token("Oxford St \n").is_none());
    }

    #[test]
    fn rewrite_keeps_a_final_newline() {
        let auditor = auditor(&["Street"], &[("St", "Street")]);
        assert_eq!(auditor.rewrite("Oxford St\n"), "Oxford Street\n");
    }

    #[test]
    fn suppresses_numeric_fragments() {
        assert!(is_suppressed("12B"));
        assert!(is_suppressed("N1"));
        assert!(is_suppressed("42"));
        assert!(!is_suppressed("Street"));
        assert!(!is_suppressed("St."));
    }

    #[test]
    fn promotion_requires_three_letter_capitalized_word() {
        assert!(is_promotable("Mews"));
        assert!(is_promotable("Way"));
        assert!(!is_promotable("Xy"));
        assert!(!is_promotable("mews"));
        assert!(!is_promotable("MEWS"));
    }

    #[test]
    fn promotion_rejects_non_ascii_even_when_shaped_like_a_word() {
        assert!(CAPITALIZED_WORD_RE.is_match("ÜberWay"));
        assert!(!is_promotable("ÜberWay"));
        assert!(!is_promotable("Straße"));
    }

    #[test]
    fn rewrite_is_a_no_op_for_canonical_tokens() {
        let auditor = london();
        for s in ["10 Downing Street", "Baker Road", "The Avenue", "Harley Hill"] {
            assert_eq!(auditor.rewrite(s), s);
        }
    }

    #[test]
    fn rewrite_replaces_the_token_and_its_period() {
        let auditor = auditor(&["Street"], &[("St", "Street"), ("St.", "Street")]);
        assert_eq!(auditor.rewrite("Oxford St."), "Oxford Street");
        assert_eq!(auditor.rewrite("Oxford St"), "Oxford Street");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let auditor = london();
        for s in ["Oxford St.", "Old Kent Rd,", "Mill HIll", "Green GROVE", "St James's"] {
            let once = auditor.rewrite(s).into_owned();
            assert_eq!(auditor.rewrite(&once), once);
        }
    }

    #[test]
    fn rewrite_leaves_unknown_tokens_alone() {
        let auditor = london();
        assert_eq!(auditor.rewrite("Shoreditch High Strasse"), "Shoreditch High Strasse");
    }

    #[test]
    fn suppressed_strings_touch_nothing() {
        let mut auditor = london();
        let before = auditor.vocabulary().clone();
        assert_eq!(
            auditor.classify("Plot 12B"),
            Classification::Unclassified(UnclassifiedReason::Suppressed)
        );
        assert!(auditor.buckets().is_empty());
        assert_eq!(auditor.vocabulary(), &before);
        assert!(auditor.candidates().contains("12B"));
    }

    #[test]
    fn canonical_hit_buckets_original_string() {
        let mut auditor = london();
        let c = auditor.classify("10 Downing Street");
        assert_eq!(
            c,
            Classification::CanonicalHit {
                street_type: "Street".to_string()
            }
        );
        assert!(auditor.buckets()["Street"].contains("10 Downing Street"));
    }

    #[test]
    fn alias_hit_buckets_rewritten_string_under_target() {
        let mut auditor = london();
        let c = auditor.classify("Old Kent Rd,");
        assert_eq!(
            c,
            Classification::AliasHit {
                street_type: "Road".to_string(),
                rewritten: "Old Kent Road".to_string(),
            }
        );
        assert!(auditor.buckets()["Road"].contains("Old Kent Road"));
        assert!(!auditor.buckets()["Road"].contains("Old Kent Rd,"));
    }

    #[test]
    fn promotion_is_monotonic() {
        let mut auditor = london();
        assert_eq!(
            auditor.classify("Kensington Mews"),
            Classification::Promoted {
                street_type: "Mews".to_string()
            }
        );
        assert!(auditor.vocabulary().contains("Mews"));
        assert_eq!(
            auditor.classify("Bathurst Mews"),
            Classification::CanonicalHit {
                street_type: "Mews".to_string()
            }
        );
        assert_eq!(auditor.buckets()["Mews"].len(), 2);
        assert_eq!(auditor.counts()[&ClassificationOutcome::Promoted], 1);
        assert_eq!(auditor.counts()[&ClassificationOutcome::CanonicalHit], 1);
    }

    #[test]
    fn gated_tokens_are_dropped_without_side_effects() {
        let mut auditor = london();
        let before = auditor.vocabulary().len();
        for s in ["Block Xy", "Hauptstraße", "rue de rivoli"] {
            assert_eq!(
                auditor.classify(s),
                Classification::Unclassified(UnclassifiedReason::Dropped),
                "{s}"
            );
        }
        assert_eq!(auditor.vocabulary().len(), before);
        assert!(auditor.buckets().is_empty());
    }

    #[test]
    fn processing_order_changes_outcomes() {
        let mut first = london();
        first.classify("Queens Gate");
        assert_eq!(
            first.classify("Palace Gate").outcome(),
            ClassificationOutcome::CanonicalHit
        );

        let mut second = london();
        assert_eq!(
            second.classify("Palace Gate").outcome(),
            ClassificationOutcome::Promoted
        );
    }

    #[test]
    fn normalize_returns_the_value_to_store() {
        let mut auditor = london();
        assert_eq!(auditor.normalize("Oxford St."), "Oxford Street");
        assert_eq!(auditor.normalize("Baker Street"), "Baker Street");
        assert_eq!(auditor.normalize("Unit 4"), "Unit 4");
    }

    #[test]
    fn end_to_end_buckets() {
        let mut auditor = auditor(&["Street", "Road"], &[("St", "Street"), ("Rd", "Road")]);
        for s in ["123 Oxford St", "10 Downing Street", "Baker Rd"] {
            auditor.classify(s);
        }

        let expected: BTreeMap<String, BTreeSet<String>> = [
            (
                "Street".to_string(),
                ["123 Oxford Street", "10 Downing Street"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            (
                "Road".to_string(),
                std::iter::once("Baker Road".to_string()).collect(),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(auditor.buckets(), &expected);
    }
}
