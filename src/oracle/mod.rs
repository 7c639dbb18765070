//! Type compatibility queries answered on behalf of the resolver.
//!
//! The resolver never inspects types itself. Every question about subtyping,
//! wrappers, interceptors or constructibility goes through a [`TypeOracle`].
//! Implementations must be pure: the same question always gets the same
//! answer within one resolution run.
//!
//! Only the structural queries are required; `is_assignable`, `is_wrappable`
//! and `is_interceptor_for` have default implementations derived from them.
//! [`TypeUniverse`] is the table-driven implementation used by catalog files
//! and tests.

mod universe;

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::model::{DependencyClaim, TagSet, TypeRef};

pub use universe::{TypeInfo, TypeUniverse};

/// Extensibility of a type, which decides whether a cycle through it can be
/// broken with a forwarding proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Interface,
    Open,
    Abstract,
    #[default]
    Final,
}

impl TypeKind {
    /// Whether a proxy implementing the type can stand in for an instance.
    pub const fn is_substitutable(self) -> bool {
        !matches!(self, Self::Final)
    }
}

/// What the resolver needs to declare a final type on the fly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoConstructor {
    pub claims: Vec<DependencyClaim>,
    pub tags: TagSet,
}

/// Answers type questions for the resolver.
pub trait TypeOracle {
    /// Extensibility of `ty`.
    fn type_kind(&self, ty: &TypeRef) -> TypeKind;

    /// Direct supertypes of `ty` with its type arguments substituted.
    fn supertypes(&self, ty: &TypeRef) -> Vec<TypeRef>;

    /// The value type inside a wrapper type, if `ty` is one.
    fn unwrap(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// The type an interceptor type decorates, if `ty` is an interceptor.
    fn intercepted_type(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// The inner type when `ty` is the optional wrapper (`Optional<T>` gives `T`).
    fn optional_inner(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// Constructor claims for a final, non-generic, non-builtin type that can be
    /// declared without an explicit component declaration.
    fn auto_constructor(&self, ty: &TypeRef) -> Option<AutoConstructor>;

    /// Every type name the oracle knows, used for "did you mean" hints.
    fn known_type_names(&self) -> Vec<String>;

    /// Whether a value of `from` can be used where `to` is expected.
    fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if from == to {
            return true;
        }
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<TypeRef> = self.supertypes(from).into();
        while let Some(next) = queue.pop_front() {
            if &next == to {
                return true;
            }
            if seen.insert(next.clone()) {
                queue.extend(self.supertypes(&next));
            }
        }
        false
    }

    /// Whether `from` is a wrapper whose unwrapped value is assignable to `to`.
    fn is_wrappable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        self.unwrap(from).is_some_and(|inner| self.is_assignable(&inner, to))
    }

    /// Names of every type a value of `ty` can be injected as: `ty` itself, its
    /// transitive supertypes and, for a wrapper, the same for the wrapped type.
    ///
    /// Lookups index declarations by these names, so an implementation that
    /// overrides [`is_assignable`](Self::is_assignable) or
    /// [`is_wrappable`](Self::is_wrappable) must keep this a superset of what
    /// they accept.
    fn provided_type_names(&self, ty: &TypeRef) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<TypeRef> = VecDeque::from([ty.clone()]);
        queue.extend(self.unwrap(ty));
        while let Some(next) = queue.pop_front() {
            if seen.insert(next.clone()) {
                names.insert(next.name().to_string());
                queue.extend(self.supertypes(&next));
            }
        }
        names
    }

    /// Whether an interceptor of type `candidate` applies to components of type `target`.
    fn is_interceptor_for(&self, candidate: &TypeRef, target: &TypeRef) -> bool {
        self.intercepted_type(candidate)
            .is_some_and(|intercepted| self.is_assignable(target, &intercepted))
    }
}
