use std::collections::HashSet;

use crate::{ClassId, Substitution, TypeEnv, TypeRef, TypeVarKey};

/// Erasure of `ty`: the raw class underlying the reference.
///
/// Array erasures are interned through [`TypeEnv::array_class`]; everything else is answered
/// from the reference itself or the environment's well-known classes.
pub fn determine_raw_class(env: &dyn TypeEnv, ty: &TypeRef) -> ClassId {
    let mut seen = HashSet::new();
    raw_class_inner(env, ty, &mut seen)
}

fn raw_class_inner(env: &dyn TypeEnv, ty: &TypeRef, seen: &mut HashSet<TypeVarKey>) -> ClassId {
    let wk = env.well_known();
    match ty {
        TypeRef::Primitive(kind) => wk.primitive(*kind),
        TypeRef::Void => wk.void,
        TypeRef::Class(raw) => *raw,
        TypeRef::Parameterized(p) => p.raw,
        TypeRef::Array(element) => {
            let component = raw_class_inner(env, element, seen);
            env.array_class(component)
        }
        TypeRef::Wildcard(w) => match &w.upper {
            Some(upper) => raw_class_inner(env, upper, seen),
            None => wk.object,
        },
        TypeRef::TypeVar(var) => {
            let key = var.key();
            if !seen.insert(key.clone()) {
                return wk.object;
            }
            let out = match var.bounds.first() {
                Some(bound) => raw_class_inner(env, bound, seen),
                None => wk.object,
            };
            seen.remove(&key);
            out
        }
        TypeRef::TypeVarReference(key) => {
            if !seen.insert(key.clone()) {
                return wk.object;
            }
            let out = env
                .type_var_bounds(key)
                .and_then(|bounds| bounds.into_iter().next())
                .map(|bound| raw_class_inner(env, &bound, seen))
                .unwrap_or(wk.object);
            seen.remove(key);
            out
        }
    }
}

/// Whether `ty` mentions no type variables at all.
pub fn is_resolved(ty: &TypeRef) -> bool {
    is_resolved_in(ty, &Substitution::default())
}

/// Whether every type variable in `ty` is bound by `subst`.
pub fn is_resolved_in(ty: &TypeRef, subst: &Substitution) -> bool {
    match ty {
        TypeRef::Primitive(_) | TypeRef::Void | TypeRef::Class(_) => true,
        TypeRef::Parameterized(p) => p.arguments.iter().all(|arg| is_resolved_in(arg, subst)),
        TypeRef::Array(element) => is_resolved_in(element, subst),
        TypeRef::Wildcard(w) => {
            w.upper.as_deref().map_or(true, |b| is_resolved_in(b, subst))
                && w.lower.as_deref().map_or(true, |b| is_resolved_in(b, subst))
        }
        TypeRef::TypeVar(var) => subst.contains(&var.key()),
        TypeRef::TypeVarReference(key) => subst.contains(key),
    }
}
