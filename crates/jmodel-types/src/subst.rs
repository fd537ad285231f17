use std::collections::{HashMap, HashSet};

use crate::{ParameterizedType, TypeRef, TypeVarKey, TypeVariable, WildcardType};

/// Bindings from type variables to the types they stand for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: HashMap<TypeVarKey, TypeRef>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind each of `params` to the argument at the same position. Missing arguments leave the
    /// parameter unbound.
    pub fn from_arguments(params: &[TypeVariable], arguments: &[TypeRef]) -> Self {
        let bindings = params
            .iter()
            .zip(arguments)
            .map(|(param, arg)| (param.key(), arg.clone()))
            .collect();
        Self { bindings }
    }

    pub fn insert(&mut self, key: TypeVarKey, ty: TypeRef) {
        self.bindings.insert(key, ty);
    }

    pub fn get(&self, key: &TypeVarKey) -> Option<&TypeRef> {
        self.bindings.get(key)
    }

    pub fn contains(&self, key: &TypeVarKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVarKey, &TypeRef)> {
        self.bindings.iter()
    }
}

impl FromIterator<(TypeVarKey, TypeRef)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeVarKey, TypeRef)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Rewrite every bound type variable in `ty`.
///
/// A bound value is itself substituted again (it may mention other bound variables), but a
/// variable is never expanded inside its own expansion. Unbound variables survive with their
/// bounds substituted.
pub fn substitute(ty: &TypeRef, subst: &Substitution) -> TypeRef {
    if subst.is_empty() {
        return ty.clone();
    }
    let mut active = HashSet::new();
    substitute_inner(ty, subst, &mut active)
}

fn substitute_inner(
    ty: &TypeRef,
    subst: &Substitution,
    active: &mut HashSet<TypeVarKey>,
) -> TypeRef {
    match ty {
        TypeRef::Primitive(_) | TypeRef::Void | TypeRef::Class(_) => ty.clone(),
        TypeRef::Parameterized(ParameterizedType { raw, arguments }) => TypeRef::Parameterized(
            ParameterizedType {
                raw: *raw,
                arguments: arguments
                    .iter()
                    .map(|arg| substitute_inner(arg, subst, active))
                    .collect(),
            },
        ),
        TypeRef::Array(element) => TypeRef::Array(Box::new(substitute_inner(element, subst, active))),
        TypeRef::Wildcard(WildcardType { upper, lower }) => TypeRef::Wildcard(WildcardType {
            upper: upper
                .as_ref()
                .map(|b| Box::new(substitute_inner(b, subst, active))),
            lower: lower
                .as_ref()
                .map(|b| Box::new(substitute_inner(b, subst, active))),
        }),
        TypeRef::TypeVar(var) => {
            let key = var.key();
            if active.contains(&key) {
                return ty.clone();
            }
            active.insert(key.clone());
            let out = match subst.get(&key) {
                Some(bound) => substitute_inner(bound, subst, active),
                None => TypeRef::TypeVar(TypeVariable {
                    identifier: var.identifier.clone(),
                    owner: var.owner.clone(),
                    bounds: var
                        .bounds
                        .iter()
                        .map(|b| substitute_inner(b, subst, active))
                        .collect(),
                }),
            };
            active.remove(&key);
            out
        }
        TypeRef::TypeVarReference(key) => {
            if active.contains(key) {
                return ty.clone();
            }
            let Some(bound) = subst.get(key) else {
                return ty.clone();
            };
            active.insert(key.clone());
            let out = substitute_inner(bound, subst, active);
            active.remove(key);
            out
        }
    }
}
