use serde::{Deserialize, Serialize};

/// One recognized list entry: a cleaned item name plus an optional quantity.
///
/// `itemname` is title-cased and spell-corrected and always longer than one
/// character. `quantity` is a compact token like `2kg` or `1.5lit`, or the
/// empty string when the source phrase carried no quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedItem {
    pub itemname: String,
    pub quantity: String,
}

impl ParsedItem {
    pub fn new(itemname: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self { itemname: itemname.into(), quantity: quantity.into() }
    }

    pub fn has_quantity(&self) -> bool {
        !self.quantity.is_empty()
    }
}
