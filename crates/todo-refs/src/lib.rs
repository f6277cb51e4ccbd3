//! Todo Reference Resolution
//!
//! Turns loose, human-supplied references into the exact identifiers the
//! task service requires.
//!
//! # Overview
//!
//! The reference system provides:
//! - **NormalizedRef**: `id:` prefixes, bare numeric IDs and free text
//! - **ParsedEntityUrl**: typed web URLs (`/app/task/<slug>-<id>`)
//! - **rank_candidates**: tiered fuzzy ranking bounded to [`MAX_CANDIDATES`]
//! - **DirectoryResolver**: per-entity selector resolution over an [`EntityDirectory`]
//! - **dates**: relative date normalization (`"30 days ago"`, weekday names)
//!
//! # Example
//!
//! ```rust
//! use todo_refs::{DirectoryResolver, DirectorySnapshot, Project, ProjectSelector};
//!
//! let snapshot = DirectorySnapshot::default()
//!     .with_project(Project::new("p1", "Work"))
//!     .with_project(Project::new("p2", "Workshop"));
//! let resolver = DirectoryResolver::new(snapshot);
//!
//! let resolution = resolver.resolve_project("", "work").unwrap();
//! assert_eq!(resolution.id(), Some("p1"));
//! ```

#![warn(missing_docs)]

pub mod dates;
pub mod directory;
pub mod error;
pub mod fuzzy;
pub mod normalize;
pub mod selector;
pub mod web_url;

// Re-exports
pub use dates::{normalize_date_range, normalize_date_value, DateRange};
pub use directory::{Collaborator, DirectorySnapshot, EntityDirectory, Project, Section};
pub use error::{DirectoryError, RefError, ResolveError};
pub use fuzzy::{candidate_rank, collapse, rank_candidates, Candidate, Resolution, MAX_CANDIDATES};
pub use normalize::{is_numeric, normalize_ref, strip_id_prefix, NormalizedRef, ID_PREFIX};
pub use selector::{
    AssigneeSelector, DirectoryResolver, ProjectSelector, SectionSelector, ME_REFERENCE,
};
pub use web_url::{normalize_entity_ref, parse_entity_url, EntityKind, ParsedEntityUrl};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for reference resolution
    pub use crate::{
        AssigneeSelector, Candidate, DirectoryResolver, EntityDirectory, EntityKind,
        NormalizedRef, ProjectSelector, Resolution, ResolveError, SectionSelector,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
