//! Entity-type profiles.
//!
//! A profile maps a domain (movie, company, book) to its core attributes,
//! the instruction keywords that point at each attribute, the attribute
//! names whose presence identifies the domain, and example instructions
//! handed to the oracle as guidance.
//!
//! Profiles are plain `'static` data: built at compile time, shared by every
//! request, never mutated.

use crate::error::{ClusteringError, Result};

/// Domain configuration used to interpret instructions and records.
#[derive(Debug)]
pub struct EntityTypeProfile {
    /// Domain name (e.g. "movie")
    pub name: &'static str,

    /// Core attributes, most important first
    pub core_attributes: &'static [&'static str],

    /// Attribute → instruction keywords that select it
    pub keywords: &'static [(&'static str, &'static [&'static str])],

    /// Attributes added for generic instructions ("group these")
    pub default_attributes: &'static [&'static str],

    /// Attribute names whose presence suggests this domain
    pub indicators: &'static [&'static str],

    /// Example instructions shown to the oracle
    pub guidance: &'static str,
}

impl EntityTypeProfile {
    /// The first `n` core attributes.
    pub fn leading_core_attributes(&self, n: usize) -> &'static [&'static str] {
        &self.core_attributes[..n.min(self.core_attributes.len())]
    }
}

pub static MOVIE: EntityTypeProfile = EntityTypeProfile {
    name: "movie",
    core_attributes: &["title", "name", "director", "genre", "year", "studio", "cast"],
    keywords: &[
        ("director", &["director", "directed by", "filmmaker"]),
        ("genre", &["genre", "category", "type", "style"]),
        ("year", &["year", "release", "date", "decade"]),
        ("studio", &["studio", "production", "distributor"]),
        ("cast", &["actor", "cast", "star", "starring"]),
        ("rating", &["rating", "mpaa", "certification"]),
        ("country", &["country", "origin", "language"]),
    ],
    default_attributes: &["director", "genre", "year"],
    indicators: &["director", "genre", "cast", "runtime", "imdb", "movie"],
    guidance: "MOVIE CLUSTERING EXAMPLES:
- \"group by director\" → Cluster movies by their director
- \"same genre\" → Group movies with similar genres
- \"by decade\" → Group by release decade (1990s, 2000s, etc.)
- \"same franchise\" → Group movies from same series/franchise
- \"by rating\" → Group by MPAA rating (PG, PG-13, R, etc.)",
};

pub static COMPANY: EntityTypeProfile = EntityTypeProfile {
    name: "company",
    core_attributes: &["name", "industry", "location", "size", "founded", "type"],
    keywords: &[
        ("industry", &["industry", "sector", "business", "field"]),
        ("location", &["location", "country", "city", "region", "headquarters"]),
        ("size", &["size", "employees", "revenue", "scale"]),
        ("type", &["type", "structure", "organization"]),
        ("founded", &["founded", "established", "started", "created"]),
    ],
    default_attributes: &["industry", "location", "size"],
    indicators: &["industry", "employees", "revenue", "headquarters", "ceo"],
    guidance: "COMPANY CLUSTERING EXAMPLES:
- \"same industry\" → Group companies in similar business sectors
- \"by location\" → Group companies from the same country/region
- \"by size\" → Group by company size (startup, small, large, enterprise)
- \"tech companies\" → Group technology-focused companies
- \"by founding era\" → Group by when companies were established",
};

pub static BOOK: EntityTypeProfile = EntityTypeProfile {
    name: "book",
    core_attributes: &["title", "author", "genre", "publisher", "year", "isbn"],
    keywords: &[
        ("author", &["author", "writer", "written by"]),
        ("genre", &["genre", "category", "fiction", "non-fiction"]),
        ("publisher", &["publisher", "published by"]),
        ("year", &["year", "published", "publication date"]),
    ],
    default_attributes: &[],
    indicators: &["author", "isbn", "publisher", "pages"],
    guidance: "BOOK CLUSTERING EXAMPLES:
- \"by author\" → Group books by the same author
- \"same genre\" → Group books with similar genres
- \"by publisher\" → Group books from the same publisher
- \"by publication decade\" → Group by when books were published",
};

/// Built-in profiles in detection priority order.
pub static BUILTIN_PROFILES: &[&EntityTypeProfile] = &[&MOVIE, &COMPANY, &BOOK];

/// Read-only set of profiles, ordered by detection priority.
///
/// The first profile is the default when nothing else matches.
#[derive(Debug, Clone, Copy)]
pub struct ProfileStore {
    profiles: &'static [&'static EntityTypeProfile],
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self {
            profiles: BUILTIN_PROFILES,
        }
    }
}

impl ProfileStore {
    /// Create a store over custom profiles.
    pub fn new(profiles: &'static [&'static EntityTypeProfile]) -> Result<Self> {
        if profiles.is_empty() {
            return Err(ClusteringError::Config(
                "profile store needs at least one profile".to_string(),
            ));
        }
        Ok(Self { profiles })
    }

    /// Look up a profile by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&'static EntityTypeProfile> {
        let name = name.trim();
        self.profiles
            .iter()
            .copied()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The fallback profile.
    pub fn default_profile(&self) -> &'static EntityTypeProfile {
        self.profiles[0]
    }

    /// Profiles in detection priority order.
    pub fn iter(&self) -> impl Iterator<Item = &'static EntityTypeProfile> + '_ {
        self.profiles.iter().copied()
    }
}
