//! Fuzzy candidate ranking
//!
//! Tiered, case-insensitive matching of a query against entity names.
//! Lower rank is better:
//!
//! | tier        | rank                                              |
//! |-------------|---------------------------------------------------|
//! | exact       | `0`                                               |
//! | prefix      | `100 + slack`                                     |
//! | substring   | `200 + 8 * start + slack`                         |
//! | subsequence | `400 + gaps + slack`                              |
//!
//! where `slack = len(target) - len(query)` in characters. Items that match no
//! tier are dropped.

use crate::error::ResolveError;
use crate::web_url::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound on candidates returned by a ranking
pub const MAX_CANDIDATES: usize = 8;

const PREFIX_BASE: usize = 100;
const SUBSTRING_BASE: usize = 200;
const SUBSTRING_POSITION_WEIGHT: usize = 8;
const SUBSEQUENCE_BASE: usize = 400;

/// A possible match for a reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Entity ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Match quality (lower is better)
    pub rank: usize,
}

impl Candidate {
    /// Create new candidate
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, rank: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank,
        }
    }
}

/// Outcome of resolving one selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing supplied; the field is omitted
    Absent,
    /// Explicit identifier, trusted without lookup
    Direct(String),
    /// Unique match found by search
    Matched(String),
    /// Several candidates; the caller must choose
    Ambiguous(Vec<Candidate>),
    /// No candidate matched
    NotFound,
}

impl Resolution {
    /// Resolved ID, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Direct(id) | Self::Matched(id) => Some(id),
            _ => None,
        }
    }

    /// Check if the ID came from an explicit identifier rather than a search
    #[inline]
    #[must_use]
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }

    /// Convert into an optional ID, turning ambiguity and absence of a match into errors
    ///
    /// `Absent` maps to `Ok(None)`; only a supplied-but-unresolvable
    /// reference is an error.
    pub fn into_id(self, entity: EntityKind, input: &str) -> Result<Option<String>, ResolveError> {
        match self {
            Self::Absent => Ok(None),
            Self::Direct(id) | Self::Matched(id) => Ok(Some(id)),
            Self::Ambiguous(candidates) => Err(ResolveError::Ambiguous {
                entity,
                input: input.trim().to_string(),
                candidates,
            }),
            Self::NotFound => Err(ResolveError::NotFound {
                entity,
                input: input.trim().to_string(),
            }),
        }
    }
}

/// Rank a single target against a query (case-insensitive)
#[must_use]
pub fn candidate_rank(query: &str, target: &str) -> Option<usize> {
    rank_lowered(&query.trim().to_lowercase(), &target.trim().to_lowercase())
}

fn rank_lowered(query: &str, target: &str) -> Option<usize> {
    if query.is_empty() || target.is_empty() {
        return None;
    }
    if target == query {
        return Some(0);
    }
    let slack = target.chars().count().saturating_sub(query.chars().count());
    if target.starts_with(query) {
        return Some(PREFIX_BASE + slack);
    }
    if let Some(byte_idx) = target.find(query) {
        let start = target[..byte_idx].chars().count();
        return Some(SUBSTRING_BASE + start * SUBSTRING_POSITION_WEIGHT + slack);
    }
    subsequence_gap(query, target).map(|gap| SUBSEQUENCE_BASE + gap + slack)
}

/// Sum of gaps between consecutive matched characters, if `query` is an
/// in-order subsequence of `target`
fn subsequence_gap(query: &str, target: &str) -> Option<usize> {
    let mut pending = query.chars().peekable();
    let mut prev: Option<usize> = None;
    let mut gap = 0;
    for (ti, tc) in target.chars().enumerate() {
        let Some(&qc) = pending.peek() else { break };
        if tc != qc {
            continue;
        }
        if let Some(p) = prev {
            gap += ti - p - 1;
        }
        prev = Some(ti);
        pending.next();
    }
    pending.peek().is_none().then_some(gap)
}

/// Rank named items against a query
///
/// Output is ordered by rank, then case-insensitive name, deduplicated by ID
/// and capped at [`MAX_CANDIDATES`].
pub fn rank_candidates<T, N, I>(query: &str, items: &[T], name_of: N, id_of: I) -> Vec<Candidate>
where
    N: Fn(&T) -> &str,
    I: Fn(&T) -> &str,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let ranked = items
        .iter()
        .filter_map(|item| {
            let name = name_of(item).trim();
            rank_lowered(&query, &name.to_lowercase()).map(|rank| Candidate::new(id_of(item), name, rank))
        })
        .collect();
    finalize_candidates(ranked)
}

/// Sort, deduplicate by ID and truncate an already-ranked candidate list
#[must_use]
pub fn finalize_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.id.clone()));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Collapse a ranking: one candidate resolves, several are ambiguous, none is not-found
#[must_use]
pub fn collapse(mut candidates: Vec<Candidate>) -> Resolution {
    match candidates.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Matched(candidates.remove(0).id),
        _ => Resolution::Ambiguous(candidates),
    }
}
