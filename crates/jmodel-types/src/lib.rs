//! Type model and generic-resolution engine for Java-like class models.
//!
//! Classes are referenced through interned [`ClassId`] handles; their built descriptions
//! ([`ClassDetails`]) are obtained through a [`TypeEnv`]. The engine answers two questions:
//! what a declared [`TypeRef`] erases to ([`determine_raw_class`]) and what it becomes when seen
//! from a more-derived class ([`resolve_relative`]).

#![forbid(unsafe_code)]

use std::fmt;

mod class;
mod descriptor;
mod env;
mod erasure;
mod error;
mod format;
mod hierarchy;
mod subst;

pub use crate::class::{
    ClassDetails, ClassId, ClassKind, ClassRef, MemberDetails, MemberKind, WellKnownClasses,
    OBJECT_CLASS_NAME, VOID_BOXED_CLASS_NAME,
};
pub use crate::descriptor::{array_name_for_component, ArrayName, ElementDescriptor};
pub use crate::env::TypeEnv;
pub use crate::erasure::{determine_raw_class, is_resolved, is_resolved_in};
pub use crate::error::{ModelError, Result};
pub use crate::format::format_type;
pub use crate::hierarchy::{instantiate_as_supertype, is_subclass_of, resolve_relative};
pub use crate::subst::{substitute, Substitution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Char,
    ];

    /// Java keyword, e.g. `int`.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Char => "char",
        }
    }

    /// Binary name of the wrapper class, e.g. `java.lang.Integer`.
    pub fn boxed_class_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
            PrimitiveType::Char => "java.lang.Character",
        }
    }

    /// One-letter JVM descriptor used in array class names.
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
            PrimitiveType::Char => 'C',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn from_descriptor(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.descriptor() == c)
    }

    pub fn from_boxed_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.boxed_class_name() == name)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declaration that introduces a type variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeVarOwner {
    Class(ClassId),
    /// Method-level type parameter, identified by the declaring class and member name.
    Member { class: ClassId, member: String },
}

impl TypeVarOwner {
    pub fn class(&self) -> ClassId {
        match self {
            TypeVarOwner::Class(class) => *class,
            TypeVarOwner::Member { class, .. } => *class,
        }
    }
}

/// Identity of a type variable: its owner plus the identifier it was declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarKey {
    pub owner: TypeVarOwner,
    pub identifier: String,
}

impl TypeVarKey {
    pub fn new(owner: TypeVarOwner, identifier: impl Into<String>) -> Self {
        Self {
            owner,
            identifier: identifier.into(),
        }
    }
}

/// A declared type variable together with its (upper) bounds.
///
/// `bounds` is never empty; an undeclared bound is the root object type. References to a
/// variable from inside its own bounds (`T extends Comparable<T>`) are expressed with
/// [`TypeRef::TypeVarReference`] so the tree stays finite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    pub identifier: String,
    pub owner: TypeVarOwner,
    pub bounds: Vec<TypeRef>,
}

impl TypeVariable {
    /// Variable with the default `Object` bound.
    pub fn new(identifier: impl Into<String>, owner: TypeVarOwner, object: ClassId) -> Self {
        Self {
            identifier: identifier.into(),
            owner,
            bounds: vec![TypeRef::Class(object)],
        }
    }

    pub fn with_bounds(
        identifier: impl Into<String>,
        owner: TypeVarOwner,
        bounds: Vec<TypeRef>,
        object: ClassId,
    ) -> Self {
        let bounds = if bounds.is_empty() {
            vec![TypeRef::Class(object)]
        } else {
            bounds
        };
        Self {
            identifier: identifier.into(),
            owner,
            bounds,
        }
    }

    pub fn key(&self) -> TypeVarKey {
        TypeVarKey::new(self.owner.clone(), self.identifier.clone())
    }

    /// A `TypeRef` that refers to this variable.
    pub fn as_type(&self) -> TypeRef {
        TypeRef::TypeVar(self.clone())
    }

    /// A bound-less back-reference, for use inside this variable's own bounds.
    pub fn as_reference(&self) -> TypeRef {
        TypeRef::TypeVarReference(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterizedType {
    pub raw: ClassId,
    pub arguments: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WildcardType {
    pub upper: Option<Box<TypeRef>>,
    pub lower: Option<Box<TypeRef>>,
}

impl WildcardType {
    pub fn is_unbounded(&self) -> bool {
        self.upper.is_none() && self.lower.is_none()
    }
}

/// A declared type, as written on a member, supertype or bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Void,
    Class(ClassId),
    Parameterized(ParameterizedType),
    Array(Box<TypeRef>),
    Wildcard(WildcardType),
    TypeVar(TypeVariable),
    TypeVarReference(TypeVarKey),
}

impl TypeRef {
    pub fn class(raw: ClassId) -> TypeRef {
        TypeRef::Class(raw)
    }

    pub fn parameterized(raw: ClassId, arguments: Vec<TypeRef>) -> TypeRef {
        TypeRef::Parameterized(ParameterizedType { raw, arguments })
    }

    /// Like [`TypeRef::parameterized`], but checks the argument count against the built class.
    pub fn parameterized_checked(raw: &ClassRef, arguments: Vec<TypeRef>) -> Result<TypeRef> {
        let expected = raw.type_parameters.len();
        if arguments.len() != expected {
            return Err(ModelError::ArityMismatch {
                class: raw.name.to_string(),
                expected,
                found: arguments.len(),
            });
        }
        Ok(TypeRef::parameterized(raw.id(), arguments))
    }

    pub fn array(element: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(element))
    }

    /// Nest `element` in `dimensions` array levels.
    pub fn array_of_dimensions(element: TypeRef, dimensions: usize) -> TypeRef {
        (0..dimensions).fold(element, |acc, _| TypeRef::array(acc))
    }

    pub fn unbounded_wildcard() -> TypeRef {
        TypeRef::Wildcard(WildcardType::default())
    }

    pub fn wildcard_extends(upper: TypeRef) -> TypeRef {
        TypeRef::Wildcard(WildcardType {
            upper: Some(Box::new(upper)),
            lower: None,
        })
    }

    pub fn wildcard_super(lower: TypeRef) -> TypeRef {
        TypeRef::Wildcard(WildcardType {
            upper: None,
            lower: Some(Box::new(lower)),
        })
    }

    pub fn int() -> TypeRef {
        TypeRef::Primitive(PrimitiveType::Int)
    }

    /// Nesting depth of `Array` wrappers.
    pub fn dimensions(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let TypeRef::Array(element) = current {
            depth += 1;
            current = element;
        }
        depth
    }

    /// Innermost non-array type.
    pub fn innermost_element(&self) -> &TypeRef {
        let mut current = self;
        while let TypeRef::Array(element) = current {
            current = element;
        }
        current
    }

    pub fn is_type_variable(&self) -> bool {
        matches!(self, TypeRef::TypeVar(_) | TypeRef::TypeVarReference(_))
    }

    /// The raw class for `Class`/`Parameterized`, without consulting an environment.
    pub fn raw_class_id(&self) -> Option<ClassId> {
        match self {
            TypeRef::Class(id) => Some(*id),
            TypeRef::Parameterized(p) => Some(p.raw),
            _ => None,
        }
    }
}
