use jmodel_types::{
    ClassDetails, ClassId, ClassKind, PrimitiveType, TypeEnv, TypeRef, TypeVarKey, TypeVarOwner,
    TypeVariable,
};

use crate::{BuildError, ClassDetailsBuilder, ClassRegistry};

/// A handful of `java.lang`/`java.util` declarations, enough to exercise boxing, collection
/// plurality and self-referential bounds without a real JDK.
///
/// Only type structure is modelled (type parameters, supertypes, interfaces); members are left
/// out.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalJdk;

impl MinimalJdk {
    pub const CLASS_NAMES: &'static [&'static str] = &[
        "java.io.Serializable",
        "java.lang.Cloneable",
        "java.lang.Comparable",
        "java.lang.CharSequence",
        "java.lang.Iterable",
        "java.lang.String",
        "java.lang.Number",
        "java.lang.Boolean",
        "java.lang.Byte",
        "java.lang.Short",
        "java.lang.Character",
        "java.lang.Integer",
        "java.lang.Long",
        "java.lang.Float",
        "java.lang.Double",
        "java.lang.Enum",
        "java.lang.Record",
        "java.lang.annotation.Annotation",
        "java.util.Collection",
        "java.util.List",
        "java.util.Set",
        "java.util.Map",
        "java.util.ArrayList",
        "java.util.HashSet",
        "java.util.HashMap",
    ];
}

impl ClassDetailsBuilder for MinimalJdk {
    fn build_class_details(
        &self,
        name: &str,
        registry: &ClassRegistry,
    ) -> Result<Option<ClassDetails>, BuildError> {
        let decl = Decl::new(registry, name);

        let details = match name {
            "java.io.Serializable"
            | "java.lang.Cloneable"
            | "java.lang.CharSequence"
            | "java.lang.annotation.Annotation" => decl.interface(Vec::new(), Vec::new()),
            "java.lang.Comparable" | "java.lang.Iterable" => {
                decl.interface(vec![decl.param("T")], Vec::new())
            }
            "java.util.Collection" => {
                let e = decl.param("E");
                let iterable = decl.generic("java.lang.Iterable", vec![e.as_type()]);
                decl.interface(vec![e], vec![iterable])
            }
            "java.util.List" | "java.util.Set" => {
                let e = decl.param("E");
                let collection = decl.generic("java.util.Collection", vec![e.as_type()]);
                decl.interface(vec![e], vec![collection])
            }
            "java.util.Map" => decl.interface(vec![decl.param("K"), decl.param("V")], Vec::new()),

            "java.lang.String" => decl.class(
                Vec::new(),
                decl.object(),
                vec![
                    decl.named("java.io.Serializable"),
                    decl.generic("java.lang.Comparable", vec![decl.this()]),
                    decl.named("java.lang.CharSequence"),
                ],
            ),
            "java.lang.Number" => ClassDetails {
                is_abstract: true,
                ..decl.class(
                    Vec::new(),
                    decl.object(),
                    vec![decl.named("java.io.Serializable")],
                )
            },
            "java.lang.Boolean" | "java.lang.Character" => decl.class(
                Vec::new(),
                decl.object(),
                vec![
                    decl.named("java.io.Serializable"),
                    decl.generic("java.lang.Comparable", vec![decl.this()]),
                ],
            ),
            _ if PrimitiveType::from_boxed_class_name(name).is_some() => decl.class(
                Vec::new(),
                decl.named("java.lang.Number"),
                vec![decl.generic("java.lang.Comparable", vec![decl.this()])],
            ),
            "java.lang.Enum" => {
                // E extends Enum<E>
                let key = TypeVarKey::new(TypeVarOwner::Class(decl.id), "E");
                let e = TypeVariable::with_bounds(
                    "E",
                    TypeVarOwner::Class(decl.id),
                    vec![TypeRef::parameterized(
                        decl.id,
                        vec![TypeRef::TypeVarReference(key)],
                    )],
                    decl.object_id,
                );
                let comparable = decl.generic("java.lang.Comparable", vec![e.as_type()]);
                ClassDetails {
                    is_abstract: true,
                    ..decl.class(
                        vec![e],
                        decl.object(),
                        vec![comparable, decl.named("java.io.Serializable")],
                    )
                }
            }
            "java.lang.Record" => ClassDetails {
                is_abstract: true,
                ..decl.class(Vec::new(), decl.object(), Vec::new())
            },

            "java.util.ArrayList" => decl.collection_impl("java.util.List", &["E"]),
            "java.util.HashSet" => decl.collection_impl("java.util.Set", &["E"]),
            "java.util.HashMap" => decl.collection_impl("java.util.Map", &["K", "V"]),

            _ => return Ok(None),
        };

        Ok(Some(details))
    }
}

/// Shorthands for declaring one class against the registry's name table.
struct Decl<'a> {
    registry: &'a ClassRegistry,
    name: &'a str,
    id: ClassId,
    object_id: ClassId,
}

impl<'a> Decl<'a> {
    fn new(registry: &'a ClassRegistry, name: &'a str) -> Self {
        Self {
            registry,
            name,
            id: registry.class_id(name),
            object_id: registry.well_known().object,
        }
    }

    fn named(&self, name: &str) -> TypeRef {
        TypeRef::Class(self.registry.class_id(name))
    }

    fn generic(&self, name: &str, arguments: Vec<TypeRef>) -> TypeRef {
        TypeRef::parameterized(self.registry.class_id(name), arguments)
    }

    fn this(&self) -> TypeRef {
        TypeRef::Class(self.id)
    }

    fn object(&self) -> TypeRef {
        TypeRef::Class(self.object_id)
    }

    fn param(&self, identifier: &str) -> TypeVariable {
        TypeVariable::new(identifier, TypeVarOwner::Class(self.id), self.object_id)
    }

    fn interface(&self, type_parameters: Vec<TypeVariable>, interfaces: Vec<TypeRef>) -> ClassDetails {
        ClassDetails {
            type_parameters,
            super_type: Some(self.object()),
            interfaces,
            ..ClassDetails::new(self.name, ClassKind::Interface)
        }
    }

    fn class(
        &self,
        type_parameters: Vec<TypeVariable>,
        super_type: TypeRef,
        interfaces: Vec<TypeRef>,
    ) -> ClassDetails {
        ClassDetails {
            type_parameters,
            super_type: Some(super_type),
            interfaces,
            ..ClassDetails::new(self.name, ClassKind::Class)
        }
    }

    /// `Impl<P..> implements Api<P..>, Cloneable, Serializable`.
    fn collection_impl(&self, api: &str, params: &[&str]) -> ClassDetails {
        let params: Vec<TypeVariable> = params.iter().map(|p| self.param(p)).collect();
        let api = self.generic(api, params.iter().map(TypeVariable::as_type).collect());
        self.class(
            params,
            self.object(),
            vec![
                api,
                self.named("java.lang.Cloneable"),
                self.named("java.io.Serializable"),
            ],
        )
    }
}
