use std::sync::OnceLock;

use regex::Regex;

use crate::correct::CorrectionTable;
use crate::types::ParsedItem;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Stray engine artifacts: anything outside word chars, whitespace and '.'.
re!(re_artifacts, r"[^\w\s.]+");

/// Unit tokens the quantity matcher recognizes. Anything else ("dozen", …)
/// stays in the item name.
pub const RECOGNIZED_UNITS: &[&str] =
    &["kg", "g", "gr", "pkt", "lit", "can", "piece", "pieces", "pcs"];

// ── Line splitting ────────────────────────────────────────────────────────────

/// Split a line on the list-aggregation separators `+` and `,` into trimmed,
/// non-empty phrases. Lines without a separator pass through as one phrase.
pub fn split_line(line: &str) -> Vec<String> {
    line.replace('+', ",")
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Item parsing ──────────────────────────────────────────────────────────────

/// Extracts a cleaned name and optional quantity from a single phrase.
///
/// The correction table is injected at construction and shared read-only for
/// the lifetime of the parser.
pub struct ItemParser {
    corrections: CorrectionTable,
}

impl ItemParser {
    pub fn new(corrections: CorrectionTable) -> Self {
        Self { corrections }
    }

    /// Returns `None` when the phrase carries no usable item: empty after
    /// cleanup, or a name of one character or less. Never errors — engine
    /// noise degrades to fewer items.
    pub fn parse(&self, phrase: &str) -> Option<ParsedItem> {
        let cleaned = re_artifacts().replace_all(phrase, " ");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return None;
        }

        let (name_raw, quantity) = split_trailing_quantity(cleaned);
        let itemname = self.corrections.apply(&title_case(name_raw));
        if itemname.chars().count() <= 1 {
            return None;
        }
        Some(ParsedItem { itemname, quantity })
    }
}

impl Default for ItemParser {
    fn default() -> Self {
        Self::new(CorrectionTable::default())
    }
}

// ── Trailing-quantity tokenizer ───────────────────────────────────────────────
//
// Scans whitespace-delimited words from the end of the phrase:
//   1. a standalone trailing "V"/"v" marker word is discarded;
//   2. the quantity is NUMBER UNIT (two words), NUMBER[UNIT][V] (one word,
//      unit and marker attached), or a bare NUMBER;
//   3. only the trailing run is consumed — earlier numbers stay in the name.

struct Word<'a> {
    start: usize,
    text: &'a str,
}

fn split_trailing_quantity(text: &str) -> (&str, String) {
    let words = words_with_offsets(text);
    let mut end = words.len();

    if end > 0 && words[end - 1].text.eq_ignore_ascii_case("v") {
        end -= 1;
    }

    if end > 0 {
        let last = &words[end - 1];
        if end >= 2 && is_unit(last.text) {
            let prev = &words[end - 2];
            if is_number(prev.text) {
                // "2 kg" reads back as the compact token "2kg".
                let quantity = format!("{}{}", prev.text, last.text);
                return (name_before(text, prev.start), quantity);
            }
        }
        if let Some(quantity) = parse_attached_quantity(last.text) {
            return (name_before(text, last.start), quantity);
        }
    }

    let name = match words.get(end) {
        Some(marker) => name_before(text, marker.start),
        None => text,
    };
    (name, String::new())
}

fn words_with_offsets(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                words.push(Word { start: s, text: &text[s..i] });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(Word { start: s, text: &text[s..] });
    }
    words
}

fn name_before(text: &str, quantity_start: usize) -> &str {
    text[..quantity_start].trim_end()
}

/// "2", "2.5kg", "12v", "2kgV" — number with the unit and marker glued on.
fn parse_attached_quantity(word: &str) -> Option<String> {
    let trimmed = word
        .strip_suffix(['V', 'v'])
        .filter(|rest| !rest.is_empty())
        .unwrap_or(word);
    let digits = number_prefix_len(trimmed);
    if digits == 0 {
        return None;
    }
    let (number, rest) = trimmed.split_at(digits);
    if rest.is_empty() || is_unit(rest) {
        Some(format!("{number}{rest}"))
    } else {
        None
    }
}

fn is_unit(word: &str) -> bool {
    RECOGNIZED_UNITS.iter().any(|u| u.eq_ignore_ascii_case(word))
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && number_prefix_len(word) == word.len()
}

/// Length of the leading `\d+(\.\d+)?` run, 0 when the word is not number-led.
fn number_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return 0;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > i + 1 {
            i = j;
        }
    }
    i
}

/// First letter of each word upper, the rest lower. Word boundaries sit at
/// any non-alphabetic character, so "0nion" becomes "0Nion".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── split_line ────────────────────────────────────────────────────────────

    #[test]
    fn split_on_comma() {
        assert_eq!(split_line("Oil 2kg, Potato 1kg"), vec!["Oil 2kg", "Potato 1kg"]);
    }

    #[test]
    fn split_treats_plus_as_comma() {
        assert_eq!(split_line("Oil 2kg + Potato 1kg"), vec!["Oil 2kg", "Potato 1kg"]);
        assert_eq!(split_line("a + b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_drops_empty_segments() {
        assert_eq!(split_line("Oil,, ,Salt"), vec!["Oil", "Salt"]);
        assert!(split_line("+,+").is_empty());
    }

    #[test]
    fn line_without_separator_passes_through() {
        assert_eq!(split_line("Basmati Rice 5kg"), vec!["Basmati Rice 5kg"]);
    }

    #[test]
    fn split_rejoin_reconstructs_normalized_line() {
        let line = "  Oil 2kg +Potato 1kg , Salt ";
        let phrases = split_line(line);
        assert!(phrases.iter().all(|p| !p.is_empty()));
        let rejoined = phrases.join(",");
        let normalized = line.replace('+', ",");
        let expected: Vec<&str> = normalized
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(rejoined, expected.join(","));
    }

    // ── parse: rejection ──────────────────────────────────────────────────────

    #[test]
    fn empty_and_single_char_phrases_yield_nothing() {
        let parser = ItemParser::default();
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("a"), None);
        assert_eq!(parser.parse("   "), None);
        assert_eq!(parser.parse("!?*"), None);
    }

    #[test]
    fn bare_quantity_has_no_name_and_is_rejected() {
        let parser = ItemParser::default();
        assert_eq!(parser.parse("2kg"), None);
        assert_eq!(parser.parse("5"), None);
    }

    // ── parse: name and quantity ──────────────────────────────────────────────

    #[test]
    fn name_with_attached_unit_quantity() {
        let parser = ItemParser::default();
        let item = parser.parse("Basmati Rice 5kg").unwrap();
        assert_eq!(item.itemname, "Basmati Rice");
        assert_eq!(item.quantity, "5kg");
    }

    #[test]
    fn spaced_quantity_is_compacted() {
        let parser = ItemParser::default();
        let item = parser.parse("Sugar 2 kg").unwrap();
        assert_eq!(item.itemname, "Sugar");
        assert_eq!(item.quantity, "2kg");
    }

    #[test]
    fn decimal_quantity() {
        let parser = ItemParser::default();
        let item = parser.parse("Milk 1.5 lit").unwrap();
        assert_eq!(item.quantity, "1.5lit");
    }

    #[test]
    fn bare_number_quantity() {
        let parser = ItemParser::default();
        let item = parser.parse("Eggs 12").unwrap();
        assert_eq!(item.itemname, "Eggs");
        assert_eq!(item.quantity, "12");
    }

    #[test]
    fn trailing_marker_word_is_discarded() {
        let parser = ItemParser::default();
        let item = parser.parse("Sugar 2 kg V").unwrap();
        assert_eq!(item.itemname, "Sugar");
        assert_eq!(item.quantity, "2kg");

        let item = parser.parse("Tomato v").unwrap();
        assert_eq!(item.itemname, "Tomato");
        assert_eq!(item.quantity, "");
    }

    #[test]
    fn marker_attached_to_quantity_is_discarded() {
        let parser = ItemParser::default();
        let item = parser.parse("Sugar 2kgV").unwrap();
        assert_eq!(item.quantity, "2kg");
    }

    #[test]
    fn digit_free_phrase_never_gains_a_quantity() {
        let parser = ItemParser::default();
        for phrase in ["Green Chilli", "fresh coriander", "Paneer"] {
            let item = parser.parse(phrase).unwrap();
            assert_eq!(item.quantity, "", "phrase {phrase:?}");
        }
    }

    #[test]
    fn unrecognized_unit_stays_in_the_name() {
        let parser = ItemParser::default();
        let item = parser.parse("Mango 5 dozen").unwrap();
        assert_eq!(item.itemname, "Mango 5 Dozen");
        assert_eq!(item.quantity, "");
    }

    #[test]
    fn only_the_trailing_number_run_matches() {
        let parser = ItemParser::default();
        let item = parser.parse("Item 5 2kg").unwrap();
        assert_eq!(item.itemname, "Item 5");
        assert_eq!(item.quantity, "2kg");
    }

    #[test]
    fn stray_punctuation_is_stripped_before_parsing() {
        let parser = ItemParser::default();
        let item = parser.parse("Eggs!!! 12 pcs").unwrap();
        assert_eq!(item.itemname, "Eggs");
        assert_eq!(item.quantity, "12pcs");
    }

    // ── parse: casing and corrections ─────────────────────────────────────────

    #[test]
    fn names_are_title_cased() {
        let parser = ItemParser::default();
        assert_eq!(parser.parse("POTATO chips").unwrap().itemname, "Potato Chips");
    }

    #[test]
    fn title_case_is_idempotent() {
        for s in ["Green Chilli", "0Nion", "Item 5 Dozen"] {
            assert_eq!(title_case(s), s);
            assert_eq!(title_case(&title_case(s)), title_case(s));
        }
    }

    #[test]
    fn corrections_fire_after_title_casing() {
        let parser = ItemParser::default();
        assert_eq!(parser.parse("Oi 2kg").unwrap().itemname, "Oil");
        assert_eq!(parser.parse("potatc 1kg").unwrap().itemname, "Potato");
        assert_eq!(parser.parse("0nion").unwrap().itemname, "Onion");
        assert_eq!(parser.parse("chicken bonles 1kg").unwrap().itemname, "Chicken Boneless");
    }

    #[test]
    fn injected_table_is_used_instead_of_builtin() {
        let parser = ItemParser::new(CorrectionTable::new([("Melon", "Watermelon")]));
        assert_eq!(parser.parse("Melon 1").unwrap().itemname, "Watermelon");
        // No builtin entries in the injected table.
        assert_eq!(parser.parse("Potatc").unwrap().itemname, "Potatc");
    }

    // ── scenario from the wire ────────────────────────────────────────────────

    #[test]
    fn split_then_parse_scenario() {
        let parser = ItemParser::default();
        let items: Vec<_> = split_line("Oi 2kg, Potatc 1kg")
            .iter()
            .filter_map(|phrase| parser.parse(phrase))
            .collect();
        assert_eq!(
            items,
            vec![
                ParsedItem::new("Oil", "2kg"),
                ParsedItem::new("Potato", "1kg"),
            ]
        );
    }
}
