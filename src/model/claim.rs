//! Dependency claims: what a consumer asks the graph for.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{TagSet, TypeRef};

/// Shape and cardinality of a dependency claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimKind {
    /// Exactly one instance, resolution fails without a match.
    #[serde(alias = "one")]
    Required,
    /// One instance or explicit absence.
    Nullable,
    /// A live, re-fetchable handle to one instance.
    ValueOf,
    /// A value handle or explicit absence.
    NullableValueOf,
    /// A lazily dereferenced handle to one instance.
    PromiseOf,
    /// A promise handle or explicit absence.
    NullablePromiseOf,
    /// Every matching instance (possibly none).
    All,
    /// Every matching instance, each behind a value handle.
    AllOfValue,
    /// Every matching instance, each behind a promise handle.
    AllOfPromise,
    /// No instance, only a reified descriptor of the claimed type.
    TypeRef,
}

/// Which handle, if any, wraps a resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Plain,
    Value,
    Promise,
}

impl ClaimKind {
    /// Nullable single claims resolve to explicit absence when nothing matches.
    pub const fn is_nullable(self) -> bool {
        matches!(self, Self::Nullable | Self::NullableValueOf | Self::NullablePromiseOf)
    }

    /// Collection claims never fail on zero matches.
    pub const fn is_all(self) -> bool {
        matches!(self, Self::All | Self::AllOfValue | Self::AllOfPromise)
    }

    pub const fn is_single(self) -> bool {
        !self.is_all() && !matches!(self, Self::TypeRef)
    }

    pub const fn handle(self) -> HandleKind {
        match self {
            Self::ValueOf | Self::NullableValueOf | Self::AllOfValue => HandleKind::Value,
            Self::PromiseOf | Self::NullablePromiseOf | Self::AllOfPromise => HandleKind::Promise,
            Self::Required | Self::Nullable | Self::All | Self::TypeRef => HandleKind::Plain,
        }
    }

    /// The nullable counterpart of a single claim kind.
    pub const fn to_nullable(self) -> Self {
        match self {
            Self::Required => Self::Nullable,
            Self::ValueOf => Self::NullableValueOf,
            Self::PromiseOf => Self::NullablePromiseOf,
            other => other,
        }
    }
}

impl Default for ClaimKind {
    fn default() -> Self {
        Self::Required
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Required => "required",
            Self::Nullable => "nullable",
            Self::ValueOf => "value-of",
            Self::NullableValueOf => "nullable-value-of",
            Self::PromiseOf => "promise-of",
            Self::NullablePromiseOf => "nullable-promise-of",
            Self::All => "all",
            Self::AllOfValue => "all-of-value",
            Self::AllOfPromise => "all-of-promise",
            Self::TypeRef => "type-ref",
        };
        f.write_str(label)
    }
}

/// A consumer's typed, tagged request for a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyClaim {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    #[serde(default)]
    pub kind: ClaimKind,
}

impl DependencyClaim {
    pub fn new(ty: TypeRef, tags: TagSet, kind: ClaimKind) -> Self {
        Self {
            ty,
            tags,
            kind,
        }
    }

    /// A required, untagged claim.
    pub fn required(ty: TypeRef) -> Self {
        Self::new(ty, TagSet::empty(), ClaimKind::Required)
    }

    #[must_use]
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ClaimKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn tags_match(&self, component_tags: &TagSet) -> bool {
        self.tags.matches(component_tags)
    }
}

impl fmt::Display for DependencyClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ty, self.kind)?;
        if !self.tags.is_empty() {
            write!(f, " tags={}", self.tags)?;
        }
        Ok(())
    }
}
