//! Identifier normalization
//!
//! Classifies a raw reference as an explicit identifier, a value that needs a
//! directory lookup, or nothing at all.

use std::fmt::{self, Display, Formatter};

/// Prefix marking a reference as an explicit ID
pub const ID_PREFIX: &str = "id:";

/// Outcome of normalizing a raw reference
///
/// Exactly one classification is produced for any input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedRef {
    /// Blank input (or a bare `id:` with nothing after it)
    Empty,
    /// Usable as an identifier without lookup
    Direct(String),
    /// Name, email or partial text to be searched for
    Lookup(String),
}

impl NormalizedRef {
    /// Normalized text (empty for [`NormalizedRef::Empty`])
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Direct(v) | Self::Lookup(v) => v,
        }
    }

    /// Check if this is an explicit identifier
    #[inline]
    #[must_use]
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }

    /// Check if a directory lookup is needed
    #[inline]
    #[must_use]
    pub fn needs_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }

    /// Check if nothing was supplied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Display for NormalizedRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Direct(v) => write!(f, "id:{v}"),
            Self::Lookup(v) => write!(f, "{v:?}"),
        }
    }
}

fn has_id_prefix(value: &str) -> bool {
    value
        .get(..ID_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(ID_PREFIX))
}

/// Remove a case-insensitive `id:` prefix and surrounding whitespace
#[must_use]
pub fn strip_id_prefix(value: &str) -> &str {
    let value = value.trim();
    if has_id_prefix(value) {
        value[ID_PREFIX.len()..].trim()
    } else {
        value
    }
}

/// Check if the value parses fully as an integer
#[inline]
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}

/// Normalize a raw reference
///
/// `id:<value>` and bare integers are direct; anything else needs lookup.
#[must_use]
pub fn normalize_ref(raw: &str) -> NormalizedRef {
    let original = raw.trim();
    if original.is_empty() {
        return NormalizedRef::Empty;
    }
    let explicit = has_id_prefix(original);
    let normalized = strip_id_prefix(original);
    if normalized.is_empty() {
        return NormalizedRef::Empty;
    }
    if explicit || is_numeric(normalized) {
        NormalizedRef::Direct(normalized.to_string())
    } else {
        NormalizedRef::Lookup(normalized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_prefix_is_direct() {
        assert_eq!(normalize_ref("id:abc"), NormalizedRef::Direct("abc".into()));
        assert_eq!(normalize_ref("  ID: 42 "), NormalizedRef::Direct("42".into()));
    }

    #[test]
    fn bare_numeric_is_direct() {
        assert_eq!(normalize_ref("123"), NormalizedRef::Direct("123".into()));
        assert!(normalize_ref("-7").is_direct());
    }

    #[test]
    fn names_need_lookup() {
        let r = normalize_ref(" Work ");
        assert!(r.needs_lookup());
        assert_eq!(r.value(), "Work");
        assert!(normalize_ref("12ab").needs_lookup());
    }

    #[test]
    fn blank_and_bare_prefix_are_empty() {
        assert!(normalize_ref("").is_empty());
        assert!(normalize_ref("   ").is_empty());
        assert!(normalize_ref("id:  ").is_empty());
    }

    #[test]
    fn strip_prefix_leaves_plain_values() {
        assert_eq!(strip_id_prefix("  Inbox "), "Inbox");
        assert_eq!(strip_id_prefix("Id:9"), "9");
        assert_eq!(strip_id_prefix("identity"), "identity");
    }

    #[test]
    fn prefix_on_numeric_is_idempotent() {
        assert_eq!(normalize_ref("id:123"), normalize_ref("123"));
    }
}
