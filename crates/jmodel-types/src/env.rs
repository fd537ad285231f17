use std::sync::Arc;

use crate::{ClassId, ClassRef, Result, TypeRef, TypeVarKey, TypeVarOwner, WellKnownClasses};

/// Class lookup used by the resolution engine.
///
/// The engine never builds classes itself; implementations decide whether `class` builds lazily
/// (the registry does) or only answers from a fixed table.
pub trait TypeEnv {
    fn well_known(&self) -> &WellKnownClasses;

    /// Name interned for `id`.
    fn class_name(&self, id: ClassId) -> Arc<str>;

    /// The built class for `id`, constructing it if the environment supports that.
    fn class(&self, id: ClassId) -> Result<ClassRef>;

    /// Id of the array class whose component is `component`, interning its name on first use.
    fn array_class(&self, component: ClassId) -> ClassId;

    /// Declared bounds of the variable `key` refers to, if its owner is available.
    ///
    /// Lookup failures are not errors here: callers fall back to the root object type.
    fn type_var_bounds(&self, key: &TypeVarKey) -> Option<Vec<TypeRef>> {
        let class = self.class(key.owner.class()).ok()?;
        let params = match &key.owner {
            TypeVarOwner::Class(_) => &class.type_parameters,
            TypeVarOwner::Member { member, .. } => &class.member(member)?.type_parameters,
        };
        params
            .iter()
            .find(|tp| tp.identifier == key.identifier)
            .map(|tp| tp.bounds.clone())
    }
}
