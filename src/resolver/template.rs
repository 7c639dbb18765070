//! Template unification: specializing generic declarations for concrete claims.
//!
//! A template like `JdbcRepository<T>` matches the claim `Repository<User>`
//! when its own type, one of its supertypes (with the template's variables
//! carried through) or its unwrapped value type structurally matches the
//! claimed type. The resulting substitution must bind every variable of the
//! template's type, and the specialized type must still be assignable (or
//! wrappable) to the claim.

use std::collections::{BTreeSet, VecDeque};

use crate::model::{ComponentDeclaration, DeclarationDraft, DeclarationOrigin, DependencyClaim, Substitution, TypeRef};
use crate::oracle::TypeOracle;

/// Structurally match `pattern` against a concrete type, extending `subst`.
///
/// Variables already bound must match consistently. On failure `subst` may
/// contain partial bindings and should be discarded.
pub fn match_structure(pattern: &TypeRef, concrete: &TypeRef, subst: &mut Substitution) -> bool {
    match pattern {
        TypeRef::Var(name) => match subst.get(name) {
            Some(bound) => bound == concrete,
            None => {
                subst.insert(name.clone(), concrete.clone());
                true
            }
        },
        TypeRef::Named {
            name,
            args,
        } => {
            if concrete.is_var() || name != concrete.name() || args.len() != concrete.args().len() {
                return false;
            }
            args.iter().zip(concrete.args()).all(|(p, c)| match_structure(p, c, subst))
        }
    }
}

/// Compute the substitution specializing `template` for `claim_ty`.
pub(crate) fn unify(oracle: &dyn TypeOracle, template: &ComponentDeclaration, claim_ty: &TypeRef) -> Option<Substitution> {
    let vars = template.ty.type_vars();
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([template.ty.clone()]);
    if let Some(inner) = oracle.unwrap(&template.ty) {
        queue.push_back(inner);
    }

    while let Some(shape) = queue.pop_front() {
        if !seen.insert(shape.clone()) {
            continue;
        }
        let mut subst = Substitution::new();
        if match_structure(&shape, claim_ty, &mut subst) && vars.iter().all(|v| subst.contains_key(v)) {
            let specialized = template.ty.substitute(&subst);
            if oracle.is_assignable(&specialized, claim_ty) || oracle.is_wrappable(&specialized, claim_ty) {
                return Some(subst);
            }
        }
        queue.extend(oracle.supertypes(&shape));
    }
    None
}

/// Specialize `template` with `subst` into a concrete draft.
pub(crate) fn instantiate(template: &ComponentDeclaration, subst: &Substitution) -> DeclarationDraft {
    let params = if template.type_params.is_empty() {
        template.ty.type_vars()
    } else {
        template.type_params.clone()
    };
    let bound: Vec<String> = params.iter().filter_map(|p| subst.get(p)).map(ToString::to_string).collect();
    let name = if bound.is_empty() {
        template.name.clone()
    } else {
        format!("{}<{}>", template.name, bound.join(", "))
    };

    let mut draft = DeclarationDraft::new(name, template.ty.substitute(subst))
        .tags(template.tags.clone())
        .claims(template.claims.iter().map(|claim| DependencyClaim {
            ty: claim.ty.substitute(subst),
            ..claim.clone()
        }))
        .origin(DeclarationOrigin::TemplateInstance {
            template: template.id,
            substitution: subst.clone(),
        });
    if template.is_default() {
        draft = draft.default_component();
    }
    draft
}

/// Specializations of every template matching `claim`, after tiebreaks.
///
/// With several matches, exact type matches are kept if there are any,
/// otherwise non-default ones if there are any. More than one survivor means
/// the caller has to fork.
pub(crate) fn candidates<'a, I>(oracle: &dyn TypeOracle, templates: I, claim: &DependencyClaim) -> Vec<DeclarationDraft>
where
    I: IntoIterator<Item = &'a ComponentDeclaration>,
{
    let found: Vec<DeclarationDraft> = templates
        .into_iter()
        .filter(|template| claim.tags_match(&template.tags))
        .filter_map(|template| unify(oracle, template, &claim.ty).map(|subst| instantiate(template, &subst)))
        .collect();
    if found.len() <= 1 {
        return found;
    }

    let exact: Vec<DeclarationDraft> = found.iter().filter(|d| d.ty == claim.ty).cloned().collect();
    if !exact.is_empty() {
        return exact;
    }
    let non_default: Vec<DeclarationDraft> = found.iter().filter(|d| !d.default).cloned().collect();
    if !non_default.is_empty() {
        return non_default;
    }
    found
}
