use regex::{NoExpand, Regex, RegexBuilder};

/// Immutable table of known engine misreads and their corrections.
///
/// Application is case-insensitive substring replacement, in table order.
/// An entry is skipped when its corrected form already occurs in the name;
/// that guard makes `apply` idempotent even for prefix-style entries
/// ("Oi" → "Oil" must not turn "Oil" into "Oill" on a second pass).
pub struct CorrectionTable {
    entries: Vec<Entry>,
}

struct Entry {
    misread: Regex,
    corrected_present: Regex,
    replacement: String,
}

impl CorrectionTable {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(misread, replacement)| {
                let replacement = replacement.into();
                Entry {
                    misread: literal_ci(misread.as_ref()),
                    corrected_present: literal_ci(&replacement),
                    replacement,
                }
            })
            .collect();
        Self { entries }
    }

    /// Replace every known misread occurring in `name`.
    pub fn apply(&self, name: &str) -> String {
        let mut out = name.to_string();
        for entry in &self.entries {
            if entry.corrected_present.is_match(&out) {
                continue;
            }
            if entry.misread.is_match(&out) {
                out = entry.misread.replace_all(&out, NoExpand(&entry.replacement)).into_owned();
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CorrectionTable {
    /// Misreads observed on real shopping lists.
    fn default() -> Self {
        Self::new([
            ("Oi", "Oil"),
            ("Potatc", "Potato"),
            ("0nion", "Onion"),
            ("Chines", "Chinese"),
            ("Chicken Bonles", "Chicken Boneless"),
            ("Bazal Leave", "Basil Leaves"),
            ("Casor", "Kasoor"),
            ("Capckm", "Capsicum"),
            ("Comber", "Cucumber"),
            ("Green Patta", "Green Leaves"),
            ("Salad Patta", "Salad Leaves"),
        ])
    }
}

fn literal_ci(text: &str) -> Regex {
    RegexBuilder::new(&regex::escape(text))
        .case_insensitive(true)
        .build()
        .expect("escaped literal is a valid pattern")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_full_name_is_corrected() {
        let table = CorrectionTable::default();
        assert_eq!(table.apply("Potatc"), "Potato");
        assert_eq!(table.apply("Green Patta"), "Green Leaves");
    }

    #[test]
    fn misread_inside_longer_name_is_corrected() {
        let table = CorrectionTable::default();
        assert_eq!(table.apply("Sweet Potatc"), "Sweet Potato");
    }

    #[test]
    fn match_is_case_insensitive() {
        let table = CorrectionTable::default();
        // Title-casing a leading digit leaves the next letter uppercased.
        assert_eq!(table.apply("0Nion"), "Onion");
        assert_eq!(table.apply("CAPCKM"), "Capsicum");
    }

    #[test]
    fn apply_is_idempotent() {
        let table = CorrectionTable::default();
        let once = table.apply("Oi");
        assert_eq!(once, "Oil");
        assert_eq!(table.apply(&once), "Oil");
    }

    #[test]
    fn corrected_form_already_present_is_left_alone() {
        let table = CorrectionTable::default();
        assert_eq!(table.apply("Oil"), "Oil");
        assert_eq!(table.apply("Olive Oil"), "Olive Oil");
    }

    #[test]
    fn unknown_names_pass_through() {
        let table = CorrectionTable::default();
        assert_eq!(table.apply("Tomato"), "Tomato");
    }

    #[test]
    fn custom_table_replaces_builtin_entries() {
        let table = CorrectionTable::new([("Tomatoe", "Tomato")]);
        assert_eq!(table.apply("Tomatoe"), "Tomato");
        // Builtin entries are absent from a custom table.
        assert_eq!(table.apply("Potatc"), "Potatc");
        assert_eq!(table.len(), 1);
    }
}
