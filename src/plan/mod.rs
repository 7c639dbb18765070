//! Construction plans produced by the resolver.
//!
//! A [`ConstructionPlan`] is the flat, ordered list of [`ResolvedComponent`]s
//! handed to a code generator. A component's index is also its position in
//! the initialization order: every construction edge points to a component
//! with a strictly smaller index. The only exception is
//! [`DependencyEdge::ProxyParameter`], the deferred back-edge of a cycle proxy,
//! which is bound to its target after resolution finishes.
//!
//! Plans serialize to JSON for code generators and carry a content
//! [fingerprint](ConstructionPlan::fingerprint) so two runs can be compared.
//! [`graph::PlanGraph`] offers graph queries over a plan.

pub mod graph;

use serde::{Deserialize, Serialize};

use crate::model::{DeclarationId, DeclarationOrigin, DependencyClaim, HandleKind, TagSet, TypeRef};

pub use graph::PlanGraph;

/// A reference to a resolved component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetRef {
    pub index: usize,
    /// The target is a wrapper; the claim receives its unwrapped value.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unwrap: bool,
}

impl TargetRef {
    pub const fn direct(index: usize) -> Self {
        Self {
            index,
            unwrap: false,
        }
    }

    pub const fn unwrapped(index: usize) -> Self {
        Self {
            index,
            unwrap: true,
        }
    }
}

/// How one claim of a component was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edge", rename_all = "kebab-case")]
pub enum DependencyEdge {
    /// The instance itself (or its unwrapped value).
    Reference {
        claim: DependencyClaim,
        target: TargetRef,
    },
    /// A live, re-fetchable handle to the instance.
    ValueOf {
        claim: DependencyClaim,
        target: TargetRef,
    },
    /// A lazily dereferenced handle to the instance.
    PromiseOf {
        claim: DependencyClaim,
        target: TargetRef,
    },
    /// Explicit absence for a nullable claim.
    Absent {
        claim: DependencyClaim,
    },
    /// Every matching instance, in index order.
    AllOf {
        claim: DependencyClaim,
        targets: Vec<TargetRef>,
    },
    /// A reified descriptor of the claimed type.
    TypeToken {
        claim: DependencyClaim,
    },
    /// Promise handle held by a cycle proxy, pointing at the declaration it forwards to.
    ProxyParameter {
        claim: DependencyClaim,
        declaration: DeclarationId,
        target: Option<usize>,
    },
}

impl DependencyEdge {
    /// Edge for a single claim matched by `target`, shaped by the claim's handle kind.
    pub fn single(claim: DependencyClaim, target: TargetRef) -> Self {
        match claim.kind.handle() {
            HandleKind::Plain => Self::Reference {
                claim,
                target,
            },
            HandleKind::Value => Self::ValueOf {
                claim,
                target,
            },
            HandleKind::Promise => Self::PromiseOf {
                claim,
                target,
            },
        }
    }

    pub fn claim(&self) -> &DependencyClaim {
        match self {
            Self::Reference {
                claim,
                ..
            }
            | Self::ValueOf {
                claim,
                ..
            }
            | Self::PromiseOf {
                claim,
                ..
            }
            | Self::Absent {
                claim,
            }
            | Self::AllOf {
                claim,
                ..
            }
            | Self::TypeToken {
                claim,
            }
            | Self::ProxyParameter {
                claim,
                ..
            } => claim,
        }
    }

    /// Indexes that must be constructed before the owner of this edge.
    ///
    /// Proxy parameters are deferred and contribute nothing.
    pub fn construction_targets(&self) -> Vec<usize> {
        match self {
            Self::Reference {
                target,
                ..
            }
            | Self::ValueOf {
                target,
                ..
            }
            | Self::PromiseOf {
                target,
                ..
            } => vec![target.index],
            Self::AllOf {
                targets,
                ..
            } => targets.iter().map(|t| t.index).collect(),
            Self::Absent {
                ..
            }
            | Self::TypeToken {
                ..
            }
            | Self::ProxyParameter {
                ..
            } => Vec::new(),
        }
    }

    pub const fn is_proxy_parameter(&self) -> bool {
        matches!(self, Self::ProxyParameter { .. })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Reference {
                target,
                ..
            } => {
                if target.unwrap {
                    "unwrap"
                } else {
                    "ref"
                }
            }
            Self::ValueOf {
                ..
            } => "value-of",
            Self::PromiseOf {
                ..
            } => "promise-of",
            Self::Absent {
                ..
            } => "absent",
            Self::AllOf {
                ..
            } => "all-of",
            Self::TypeToken {
                ..
            } => "type-token",
            Self::ProxyParameter {
                ..
            } => "proxy",
        }
    }
}

/// One node of the construction plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedComponent {
    pub index: usize,
    pub name: String,
    pub origin: DeclarationOrigin,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub root: bool,
    pub dependencies: Vec<DependencyEdge>,
    /// Indexes of interceptors wrapping this component, in plan order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interceptors: Vec<usize>,
}

/// The resolver's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPlan {
    pub components: Vec<ResolvedComponent>,
    /// Number of processing rounds it took to produce this plan.
    pub rounds: u32,
}

impl ConstructionPlan {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResolvedComponent> {
        self.components.get(index)
    }

    /// First component with the given declaration name.
    pub fn find(&self, name: &str) -> Option<&ResolvedComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn roots(&self) -> impl Iterator<Item = &ResolvedComponent> {
        self.components.iter().filter(|c| c.root)
    }

    /// Component names in construction order.
    pub fn order(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    /// Pretty JSON rendering for code generators.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 over the canonical JSON form of every component.
    ///
    /// Components are hashed in index order through `serde_json::Value`, which
    /// keeps object keys sorted, so equal plans always hash equally.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for component in &self.components {
            match serde_json::to_value(component).and_then(|v| serde_json::to_string(&v)) {
                Ok(json) => hasher.update(json.as_bytes()),
                Err(e) => {
                    tracing::warn!(
                        "Failed to serialize component '{}' for hashing: {}. Using name fallback.",
                        component.name,
                        e
                    );
                    hasher.update(b"<serialization_failed:");
                    hasher.update(component.name.as_bytes());
                    hasher.update(b">");
                }
            }
            hasher.update(b"\n");
        }
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}
