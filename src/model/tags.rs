//! Tag sets used to disambiguate components of the same type.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard tag: a claim carrying it matches components with any tags.
pub const ANY_TAG: &str = "*";

/// An ordered set of opaque tag labels.
///
/// Tags are plain labels, there is no hierarchy between them. Ordering is kept
/// stable (`BTreeSet`) so that rendered plans and error messages are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// The empty tag set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tag set from labels.
    pub fn of<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether every tag of `other` is also in `self`.
    pub fn is_superset_of(&self, other: &TagSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Whether a claim carrying these tags accepts a component tagged `component_tags`.
    ///
    /// - an empty claim only accepts untagged components
    /// - a claim containing [`ANY_TAG`] accepts everything
    /// - otherwise the component must carry every claimed tag
    pub fn matches(&self, component_tags: &TagSet) -> bool {
        if self.0.is_empty() {
            return component_tags.is_empty();
        }
        if self.contains(ANY_TAG) {
            return true;
        }
        component_tags.is_superset_of(self)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tag}")?;
        }
        write!(f, "]")
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::of(iter)
    }
}
