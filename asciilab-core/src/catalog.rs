//! Session-scoped typeface registry (made by FontLab https://www.fontlab.com/)
//!
//! Once a typeface is found unavailable or fails to render it is excluded
//! for the rest of the session and cannot be offered again. The default
//! typeface is seeded as available and can never be excluded.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::DEFAULT_TYPEFACE;
use crate::query::CatalogQuery;

/// The popular FIGlet typefaces offered out of the box.
pub const BUILTIN_TYPEFACES: &[&str] = &[
    "Standard", "Slant", "Small", "Big", "Banner", "Block", "Digital", "Doom",
    "Gothic", "Ivrit", "Mini", "Script", "Shadow", "Speed", "Star Wars", "Alligator",
    "Alphabet", "Arrows", "Avatar", "Banner3", "Bell", "Binary", "Bulhead", "Calvin S",
    "Catwalk", "Chunky", "Contessa", "Cyberlarge", "Cybermedium", "Cybersmall", "Diamond",
    "Epic", "Fender", "Four Tops", "Fraktur", "Graffiti", "Isometric1", "Isometric2",
    "Isometric3", "Isometric4", "Jacky", "Jazmine", "Keyboard", "Larry 3D", "LCD",
    "Lean", "Letters", "Lockergnome", "Marquee", "Maxfour", "Merlin1", "Modular",
    "Nancyj-Fancy", "Ogre", "Puffy", "Rectangles", "Relief", "Roman", "Rot13",
    "Rounded", "Rowan Cap", "S Blood", "Slant Relief", "Soft", "Stacey", "Stampate",
    "Stellar", "Stop", "Straight", "Tanja", "Tengwar", "Term", "Thick", "Thin",
    "Three Point", "Toke", "Trek", "Twall", "Univers", "USA Flag", "Wavy", "Whimsy",
];

/// What the session knows about a typeface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Unknown,
    Available,
    Unavailable,
}

/// Direction for stepping through the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypefaceCatalogEntry {
    pub name: String,
    pub availability: Availability,
}

#[derive(Debug, Clone)]
pub struct TypefaceCatalog {
    offered: Vec<String>,
    states: HashMap<String, Availability>,
}

impl Default for TypefaceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TypefaceCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut offered: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !name.trim().is_empty() && !offered.contains(&name) {
                offered.push(name);
            }
        }
        if !offered.iter().any(|n| n == DEFAULT_TYPEFACE) {
            offered.insert(0, DEFAULT_TYPEFACE.to_string());
        }

        let mut states = HashMap::new();
        states.insert(DEFAULT_TYPEFACE.to_string(), Availability::Available);
        Self { offered, states }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_TYPEFACES.iter().copied())
    }

    /// Offered names in catalog order.
    pub fn names(&self) -> &[String] {
        &self.offered
    }

    pub fn len(&self) -> usize {
        self.offered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offered.is_empty()
    }

    /// Listing row for an offered name; `None` once it has been excluded.
    pub fn entry(&self, name: &str) -> Option<TypefaceCatalogEntry> {
        self.is_offered(name).then(|| TypefaceCatalogEntry {
            name: name.to_string(),
            availability: self.availability(name),
        })
    }

    pub fn is_offered(&self, name: &str) -> bool {
        self.offered.iter().any(|n| n == name)
    }

    /// Memoized availability; names never probed are `Unknown`.
    pub fn availability(&self, name: &str) -> Availability {
        self.states
            .get(name)
            .copied()
            .unwrap_or(Availability::Unknown)
    }

    /// Record a probe outcome. Terminal states are never overwritten.
    pub fn record(&mut self, name: &str, available: bool) -> Availability {
        let state = self
            .states
            .entry(name.to_string())
            .or_insert(Availability::Unknown);
        if *state == Availability::Unknown {
            *state = if available {
                Availability::Available
            } else {
                Availability::Unavailable
            };
        }
        *state
    }

    /// Add a typeface to the listing. Names excluded earlier stay out.
    pub fn offer(&mut self, name: &str) -> bool {
        if name.trim().is_empty()
            || self.is_offered(name)
            || self.availability(name) == Availability::Unavailable
        {
            return false;
        }
        self.offered.push(name.to_string());
        true
    }

    /// Drop a typeface from the listing for the rest of the session.
    /// Returns `false` for the default, which stays no matter what.
    pub fn exclude(&mut self, name: &str) -> bool {
        if name == DEFAULT_TYPEFACE {
            return false;
        }
        self.states
            .insert(name.to_string(), Availability::Unavailable);
        let before = self.offered.len();
        self.offered.retain(|n| n != name);
        before != self.offered.len()
    }

    /// Offered names matching `query`, favorites first, then alphabetical.
    pub fn listing(&self, query: &CatalogQuery, favorites: &BTreeSet<String>) -> Vec<String> {
        let mut names: Vec<String> = self
            .offered
            .iter()
            .filter(|name| query.matches(name, favorites))
            .cloned()
            .collect();

        sort_listing(&mut names, favorites);
        names
    }

    /// The neighbour of `current` in the filtered listing, wrapping at both ends.
    /// When `current` is not listed, `Next` lands on the first entry and `Prev` on the last.
    pub fn step(
        &self,
        current: &str,
        step: Step,
        query: &CatalogQuery,
        favorites: &BTreeSet<String>,
    ) -> Option<String> {
        let listing = self.listing(query, favorites);
        if listing.is_empty() {
            return None;
        }
        let len = listing.len();
        let target = match (listing.iter().position(|n| n == current), step) {
            (Some(idx), Step::Next) => (idx + 1) % len,
            (Some(idx), Step::Prev) => (idx + len - 1) % len,
            (None, Step::Next) => 0,
            (None, Step::Prev) => len - 1,
        };
        listing.into_iter().nth(target)
    }

    /// Any offered typeface, uniformly.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.offered.choose(rng).cloned()
    }
}

fn sort_listing(names: &mut [String], favorites: &BTreeSet<String>) {
    names.sort_by(|a, b| {
        let a_fav = favorites.contains(a);
        let b_fav = favorites.contains(b);
        match (a_fav, b_fav) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    });
}
