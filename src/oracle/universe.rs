//! Table-driven [`TypeOracle`] implementation.
//!
//! A [`TypeUniverse`] maps type names to [`TypeInfo`] descriptions. Generic
//! descriptions refer to their own parameters (`supertypes = ["Repository<T>"]`
//! on `JdbcRepository<T>`); queries substitute the actual arguments of the
//! asked type. Types missing from the table are final, have no supertypes and
//! cannot be constructed automatically.
//!
//! ```toml
//! [types.UserService]
//! kind = "interface"
//!
//! [types.UserServiceImpl]
//! supertypes = ["UserService"]
//! constructor = [{ type = "UserRepository" }]
//!
//! [types."Optional"]
//! params = ["T"]
//! optional = true
//! builtin = true
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AutoConstructor, TypeKind, TypeOracle};
use crate::model::{DependencyClaim, Substitution, TagSet, TypeRef};

/// Description of one named type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeInfo {
    pub kind: TypeKind,
    /// Type parameter names, in argument order.
    pub params: Vec<String>,
    /// Direct supertypes, expressed over `params`.
    pub supertypes: Vec<TypeRef>,
    /// For wrapper types, the value type they produce, expressed over `params`.
    pub wraps: Option<TypeRef>,
    /// For interceptor types, the decorated type.
    pub intercepts: Option<TypeRef>,
    /// Marks the built-in optional wrapper; its single parameter is the inner type.
    pub optional: bool,
    /// Platform types are never declared automatically.
    pub builtin: bool,
    /// Constructor parameters, when the type has a single usable constructor.
    pub constructor: Option<Vec<DependencyClaim>>,
    /// Tags carried by automatically declared instances.
    #[serde(skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
}

impl TypeInfo {
    pub fn interface() -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::default()
        }
    }

    pub fn open() -> Self {
        Self {
            kind: TypeKind::Open,
            ..Self::default()
        }
    }

    pub fn abstract_type() -> Self {
        Self {
            kind: TypeKind::Abstract,
            ..Self::default()
        }
    }

    pub fn final_type() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn extends(mut self, supertype: TypeRef) -> Self {
        self.supertypes.push(supertype);
        self
    }

    #[must_use]
    pub fn wraps(mut self, value: TypeRef) -> Self {
        self.wraps = Some(value);
        self
    }

    #[must_use]
    pub fn intercepts(mut self, target: TypeRef) -> Self {
        self.intercepts = Some(target);
        self
    }

    #[must_use]
    pub fn optional_wrapper(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    #[must_use]
    pub fn constructor(mut self, claims: Vec<DependencyClaim>) -> Self {
        self.constructor = Some(claims);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Map this description's parameters onto the arguments of `ty`.
    ///
    /// Arity mismatches produce an empty substitution, leaving parameters in place.
    fn substitution_for(&self, ty: &TypeRef) -> Substitution {
        let args = ty.args();
        if args.len() != self.params.len() {
            return Substitution::new();
        }
        self.params.iter().cloned().zip(args.iter().cloned()).collect()
    }

    fn instantiate(&self, template: &TypeRef, ty: &TypeRef) -> TypeRef {
        template.clone().bind_params(&self.params).substitute(&self.substitution_for(ty))
    }
}

/// A named collection of [`TypeInfo`] descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeUniverse {
    types: BTreeMap<String, TypeInfo>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, info: TypeInfo) -> Self {
        self.insert(name, info);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, info: TypeInfo) {
        self.types.insert(name.into(), info);
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn info(&self, ty: &TypeRef) -> Option<&TypeInfo> {
        if ty.is_var() {
            return None;
        }
        self.types.get(ty.name())
    }
}

impl TypeOracle for TypeUniverse {
    fn type_kind(&self, ty: &TypeRef) -> TypeKind {
        self.info(ty).map_or(TypeKind::Final, |info| info.kind)
    }

    fn supertypes(&self, ty: &TypeRef) -> Vec<TypeRef> {
        self.info(ty).map_or_else(Vec::new, |info| {
            info.supertypes.iter().map(|sup| info.instantiate(sup, ty)).collect()
        })
    }

    fn unwrap(&self, ty: &TypeRef) -> Option<TypeRef> {
        let info = self.info(ty)?;
        info.wraps.as_ref().map(|value| info.instantiate(value, ty))
    }

    fn intercepted_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        let info = self.info(ty)?;
        info.intercepts.as_ref().map(|target| info.instantiate(target, ty))
    }

    fn optional_inner(&self, ty: &TypeRef) -> Option<TypeRef> {
        let info = self.info(ty)?;
        match ty.args() {
            [inner] if info.optional => Some(inner.clone()),
            _ => None,
        }
    }

    fn auto_constructor(&self, ty: &TypeRef) -> Option<AutoConstructor> {
        let info = self.info(ty)?;
        if info.kind != TypeKind::Final || info.builtin || !info.params.is_empty() || !ty.args().is_empty() {
            return None;
        }
        info.constructor.as_ref().map(|claims| AutoConstructor {
            claims: claims.clone(),
            tags: info.tags.clone(),
        })
    }

    fn known_type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }
}
