// src/collect/normalize.rs
// Keyword canonicalization and the composite dedup identity.

use crate::model::AreaTag;

/// Normalize a keyword for identity comparison: lowercase, trim, strip
/// everything except word characters (letters, digits, underscore — Unicode,
/// so CJK and other scripts survive) and whitespace, then collapse whitespace
/// runs to a single space.
///
/// Total function: any input yields a string, possibly empty.
pub fn normalize(keyword: &str) -> String {
    static RE_STRIP: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_strip = RE_STRIP.get_or_init(|| regex::Regex::new(r"[^\w\s]").unwrap());
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    let lowered = keyword.to_lowercase();
    let stripped = re_strip.replace_all(&lowered, "");
    let collapsed = re_ws.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Composite identity: two signals with the same `DedupKey` are the same hot
/// topic regardless of originating source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub area: AreaTag,
    pub normalized: String,
}

impl DedupKey {
    pub fn new(area: AreaTag, keyword: &str) -> Self {
        Self {
            area,
            normalized: normalize(keyword),
        }
    }
}
