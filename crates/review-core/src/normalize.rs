//! Text normalization: markup escaping and whitespace canonicalization.
//!
//! Escaping happens exactly once, on the raw document text, before any
//! highlight is computed. Everything downstream works on escaped text, and
//! [`VisibleText`] maps it back to what a reader actually sees.

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Escape the five markup-significant characters.
///
/// Not idempotent: escaping already-escaped text double-encodes entities.
pub fn escape_for_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Replace every whitespace run with a single space and trim both ends.
///
/// Comparison only; rendered text is never collapsed.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and lowercase, the key used for fuzzy comparisons.
pub fn normalize_for_match(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// The first `n` characters of `text`.
pub fn char_prefix(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Escaped text decoded back to visible characters, with a byte map from
/// visible offsets to escaped offsets.
#[derive(Debug, Clone)]
pub struct VisibleText {
    pub text: String,
    /// `offsets[i]` is the escaped offset of visible byte `i`; the final entry
    /// is the escaped length.
    offsets: Vec<usize>,
}

impl VisibleText {
    pub fn decode(escaped: &str) -> Self {
        let mut text = String::with_capacity(escaped.len());
        let mut offsets = Vec::with_capacity(escaped.len() + 1);
        let mut pos = 0;

        while pos < escaped.len() {
            let rest = &escaped[pos..];
            let entity = ENTITIES
                .iter()
                .find(|(entity, _)| rest.starts_with(entity));

            if let Some((entity, decoded)) = entity {
                offsets.push(pos);
                text.push(*decoded);
                pos += entity.len();
                continue;
            }

            // `pos` always sits on a char boundary: it only advances by whole
            // entities or whole chars.
            let Some(c) = rest.chars().next() else {
                break;
            };
            for i in 0..c.len_utf8() {
                offsets.push(pos + i);
            }
            text.push(c);
            pos += c.len_utf8();
        }
        offsets.push(escaped.len());

        Self { text, offsets }
    }

    /// Map a visible byte offset to the corresponding escaped offset.
    pub fn to_escaped(&self, visible: usize) -> usize {
        self.offsets[visible.min(self.offsets.len() - 1)]
    }

    /// Whether `escaped` offset sits between visible characters, i.e. not in
    /// the middle of an entity.
    pub fn is_boundary(&self, escaped: usize) -> bool {
        self.offsets.binary_search(&escaped).is_ok()
    }
}

/// Decode the entities produced by [`escape_for_markup`].
pub fn unescape(escaped: &str) -> String {
    VisibleText::decode(escaped).text
}
