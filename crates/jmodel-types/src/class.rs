use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::{PrimitiveType, Result, TypeEnv, TypeRef, TypeVariable};

pub const OBJECT_CLASS_NAME: &str = "java.lang.Object";
pub const VOID_BOXED_CLASS_NAME: &str = "java.lang.Void";

/// Interned handle for a class name.
///
/// Handles are allocated by whoever owns the name table (normally the class registry) and are
/// only meaningful within that table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Classes every environment must provide without consulting a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownClasses {
    pub object: ClassId,
    pub void: ClassId,
    primitives: [ClassId; 8],
}

impl WellKnownClasses {
    /// `primitives` is indexed in [`PrimitiveType::ALL`] order.
    pub fn new(object: ClassId, void: ClassId, primitives: [ClassId; 8]) -> Self {
        Self {
            object,
            void,
            primitives,
        }
    }

    pub fn primitive(&self, kind: PrimitiveType) -> ClassId {
        let idx = PrimitiveType::ALL
            .iter()
            .position(|p| *p == kind)
            .unwrap_or_default();
        self.primitives[idx]
    }

    pub fn primitive_kind(&self, id: ClassId) -> Option<PrimitiveType> {
        self.primitives
            .iter()
            .position(|p| *p == id)
            .map(|idx| PrimitiveType::ALL[idx])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
    Primitive(PrimitiveType),
    Void,
    Array { component: ClassId },
}

/// A built class description. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDetails {
    pub name: Arc<str>,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub type_parameters: Vec<TypeVariable>,
    pub super_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<MemberDetails>,
}

impl ClassDetails {
    /// A class with no supertype, interfaces, type parameters or members. Interfaces and
    /// annotations start out abstract.
    pub fn new(name: impl Into<Arc<str>>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: matches!(kind, ClassKind::Interface | ClassKind::Annotation),
            type_parameters: Vec::new(),
            super_type: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::Annotation)
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    pub fn is_record(&self) -> bool {
        self.kind == ClassKind::Record
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ClassKind::Array { .. })
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, ClassKind::Primitive(_))
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_abstract && !self.is_interface()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    pub fn array_component(&self) -> Option<ClassId> {
        match self.kind {
            ClassKind::Array { component } => Some(component),
            _ => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveType> {
        match self.kind {
            ClassKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn type_parameter(&self, identifier: &str) -> Option<&TypeVariable> {
        self.type_parameters
            .iter()
            .find(|tp| tp.identifier == identifier)
    }

    pub fn member(&self, name: &str) -> Option<&MemberDetails> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &MemberDetails> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Field)
    }

    /// Raw ids of the super type followed by the interfaces, in declaration order.
    pub fn direct_supertype_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.super_type
            .iter()
            .chain(self.interfaces.iter())
            .filter_map(TypeRef::raw_class_id)
    }
}

/// A registered class: its handle plus the shared description.
#[derive(Clone)]
pub struct ClassRef {
    id: ClassId,
    details: Arc<ClassDetails>,
}

impl ClassRef {
    pub fn new(id: ClassId, details: Arc<ClassDetails>) -> Self {
        Self { id, details }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn details(&self) -> &Arc<ClassDetails> {
        &self.details
    }

    /// Whether both refer to the same registered instance.
    pub fn ptr_eq(&self, other: &ClassRef) -> bool {
        Arc::ptr_eq(&self.details, &other.details)
    }

    /// Non-parameterized reference to this class.
    pub fn as_type(&self) -> TypeRef {
        TypeRef::Class(self.id)
    }
}

impl Deref for ClassRef {
    type Target = ClassDetails;

    fn deref(&self) -> &ClassDetails {
        &self.details
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

impl std::hash::Hash for ClassRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("id", &self.id)
            .field("name", &self.details.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    RecordComponent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDetails {
    pub name: String,
    pub kind: MemberKind,
    /// Field type, method return type or record component type.
    pub declared_type: TypeRef,
    pub is_static: bool,
    /// Method-level type parameters (empty for fields and record components).
    pub type_parameters: Vec<TypeVariable>,
}

impl MemberDetails {
    pub fn field(name: impl Into<String>, declared_type: TypeRef) -> Self {
        Self::new(name, MemberKind::Field, declared_type)
    }

    pub fn method(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self::new(name, MemberKind::Method, return_type)
    }

    pub fn record_component(name: impl Into<String>, declared_type: TypeRef) -> Self {
        Self::new(name, MemberKind::RecordComponent, declared_type)
    }

    fn new(name: impl Into<String>, kind: MemberKind, declared_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type,
            is_static: false,
            type_parameters: Vec::new(),
        }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn is_array(&self) -> bool {
        matches!(self.declared_type, TypeRef::Array(_))
    }

    /// Arrays, and types whose erasure is a subtype of one of `containers`.
    pub fn is_plural(&self, env: &dyn TypeEnv, containers: &[ClassId]) -> Result<bool> {
        if self.is_array() {
            return Ok(true);
        }
        let raw = crate::determine_raw_class(env, &self.declared_type);
        for container in containers {
            if crate::is_subclass_of(env, raw, *container)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The declared type as seen from `viewpoint`, a subtype of the declaring class.
    pub fn resolve_relative_type(
        &self,
        env: &dyn TypeEnv,
        declaring: ClassId,
        viewpoint: ClassId,
    ) -> Result<TypeRef> {
        crate::resolve_relative(env, &self.declared_type, declaring, viewpoint)
    }
}
