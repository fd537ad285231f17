use std::collections::{HashSet, VecDeque};

use crate::{
    is_resolved, substitute, ClassId, ModelError, Result, Substitution, TypeEnv, TypeRef,
};

/// `ty`, declared on `declaring`, as seen from `viewpoint`.
///
/// Type arguments are propagated along every supertype/interface path from `viewpoint` up to
/// `declaring`. Variables that no path binds (a raw supertype reference somewhere on the way, or
/// variables owned by `viewpoint` itself) stay in the result as type variables; callers that need
/// a concrete type check [`crate::is_resolved`]. Paths that bind `declaring`'s parameters
/// differently are reported as [`ModelError::AmbiguousHierarchyPath`].
///
/// If `declaring` is not an ancestor of `viewpoint`, `ty` is returned unchanged.
pub fn resolve_relative(
    env: &dyn TypeEnv,
    ty: &TypeRef,
    declaring: ClassId,
    viewpoint: ClassId,
) -> Result<TypeRef> {
    if declaring == viewpoint || is_resolved(ty) {
        return Ok(ty.clone());
    }

    match find_instantiation(env, viewpoint, declaring)? {
        Some(found) => Ok(substitute(ty, &found.substitution)),
        None => {
            tracing::debug!(
                target = "jmodel.types",
                declaring = %env.class_name(declaring),
                viewpoint = %env.class_name(viewpoint),
                "declaring class is not a supertype of the viewpoint; nothing to substitute"
            );
            Ok(ty.clone())
        }
    }
}

/// `viewpoint` viewed as its supertype `target`, e.g. `Leaf` as `Base` gives `Base<Integer>`.
///
/// Returns `None` when `target` is not a supertype. A raw path yields a bare class reference.
pub fn instantiate_as_supertype(
    env: &dyn TypeEnv,
    viewpoint: ClassId,
    target: ClassId,
) -> Result<Option<TypeRef>> {
    if viewpoint == target {
        let class = env.class(viewpoint)?;
        if !class.is_generic() {
            return Ok(Some(TypeRef::Class(target)));
        }
        let args = class.type_parameters.iter().map(|tp| tp.as_type()).collect();
        return Ok(Some(TypeRef::parameterized(target, args)));
    }

    Ok(find_instantiation(env, viewpoint, target)?.map(|found| match found.arguments {
        Some(args) if !args.is_empty() => TypeRef::parameterized(target, args),
        _ => TypeRef::Class(target),
    }))
}

/// Whether `sub` is `sup` or inherits from it through super types or interfaces.
///
/// Every reference type is a subclass of the root object class; primitives and `void` are not.
pub fn is_subclass_of(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> Result<bool> {
    if sub == sup {
        return Ok(true);
    }
    let wk = env.well_known();
    if sub == wk.void || wk.primitive_kind(sub).is_some() {
        return Ok(false);
    }
    if sup == wk.object {
        return Ok(true);
    }

    let mut queue = VecDeque::from([sub]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) || current == wk.object {
            continue;
        }
        let class = env.class(current)?;
        for parent in class.direct_supertype_ids() {
            if parent == sup {
                return Ok(true);
            }
            queue.push_back(parent);
        }
    }
    Ok(false)
}

struct Instantiation {
    /// `None` when `target` was reached through a raw reference.
    arguments: Option<Vec<TypeRef>>,
    substitution: Substitution,
}

/// Breadth-first walk from `viewpoint` to `target`, super type before interfaces.
///
/// Each queued node carries the arguments its class is instantiated with, already expressed in
/// terms of `viewpoint`'s own variables.
fn find_instantiation(
    env: &dyn TypeEnv,
    viewpoint: ClassId,
    target: ClassId,
) -> Result<Option<Instantiation>> {
    let object = env.well_known().object;
    let start = env.class(viewpoint)?;
    let start_args: Vec<TypeRef> = start.type_parameters.iter().map(|tp| tp.as_type()).collect();

    let mut queue: VecDeque<(ClassId, Option<Vec<TypeRef>>)> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Option<Vec<TypeRef>>)> = HashSet::new();
    queue.push_back((viewpoint, Some(start_args)));

    let mut found: Option<Instantiation> = None;

    while let Some((id, args)) = queue.pop_front() {
        if !seen.insert((id, args.clone())) {
            continue;
        }

        let class = env.class(id)?;
        let substitution = match &args {
            Some(args) => Substitution::from_arguments(&class.type_parameters, args),
            None => Substitution::new(),
        };

        if id == target {
            match &found {
                None => {
                    found = Some(Instantiation {
                        arguments: args,
                        substitution,
                    })
                }
                Some(existing) if existing.substitution == substitution => {}
                Some(_) => {
                    return Err(ModelError::AmbiguousHierarchyPath {
                        declaring: env.class_name(target).to_string(),
                        viewpoint: env.class_name(viewpoint).to_string(),
                    });
                }
            }
            continue;
        }

        if id == object {
            continue;
        }

        for parent in class.super_type.iter().chain(class.interfaces.iter()) {
            match parent {
                TypeRef::Class(raw) => queue.push_back((*raw, None)),
                TypeRef::Parameterized(p) => {
                    let args = p
                        .arguments
                        .iter()
                        .map(|arg| substitute(arg, &substitution))
                        .collect();
                    queue.push_back((p.raw, Some(args)));
                }
                _ => {}
            }
        }
    }

    Ok(found)
}
