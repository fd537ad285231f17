use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use jmodel_registry::{
    BuildError, ClassDetails, ClassRegistry, ModelError, NoBackend, RegistryConfig,
};
use jmodel_types::{
    determine_raw_class, format_type, is_resolved, ClassKind, MemberDetails, PrimitiveType,
    TypeEnv, TypeRef, OBJECT_CLASS_NAME,
};
use pretty_assertions::assert_eq;

use super::{class_var, counting, generic_chain, plain_class, CallCounter};

fn with_jdk(builder: impl jmodel_registry::ClassDetailsBuilder + 'static) -> ClassRegistry {
    ClassRegistry::with_config(
        builder,
        RegistryConfig {
            minimal_jdk: true,
            ..RegistryConfig::default()
        },
    )
}

#[test]
fn resolution_is_memoized_and_identity_stable() {
    let calls = CallCounter::default();
    let registry = ClassRegistry::new(counting(&calls, generic_chain));

    let first = registry.resolve_class_details("com.example.Base").unwrap();
    let second = registry.resolve_class_details("com.example.Base").unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(calls.get(), 1);
}

#[test]
fn find_never_builds() {
    let calls = CallCounter::default();
    let registry = ClassRegistry::new(counting(&calls, generic_chain));

    assert!(registry.find_class_details("com.example.Base").is_none());
    assert_eq!(calls.get(), 0);

    let built = registry.resolve_class_details("com.example.Base").unwrap();
    let found = registry.find_class_details("com.example.Base").unwrap();
    assert!(built.ptr_eq(&found));
    assert_eq!(calls.get(), 1);
}

#[test]
fn empty_name_is_rejected_before_the_builder() {
    let calls = CallCounter::default();
    let registry = ClassRegistry::new(counting(&calls, NoBackend));

    let err = registry.resolve_class_details("").unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)), "{err:?}");
    assert!(registry.collect_implementors("", false).is_err());
    assert_eq!(calls.get(), 0);
}

#[test]
fn builtin_classes_never_reach_the_builder() {
    let calls = CallCounter::default();
    let registry = ClassRegistry::new(counting(&calls, NoBackend));

    for kind in PrimitiveType::ALL {
        let class = registry.resolve_class_details(kind.name()).unwrap();
        assert_eq!(class.primitive_kind(), Some(kind));
        assert_eq!(class.id(), registry.well_known().primitive(kind));
    }
    let object = registry.resolve_class_details(OBJECT_CLASS_NAME).unwrap();
    assert!(object.super_type.is_none());
    assert!(object.interfaces.is_empty());

    let void = registry.resolve_class_details("void").unwrap();
    let boxed_void = registry.resolve_class_details("java.lang.Void").unwrap();
    assert!(void.ptr_eq(&boxed_void));
    assert_eq!(void.kind, ClassKind::Void);

    assert_eq!(calls.get(), 0);
}

#[test]
fn unknown_class_is_a_resolution_error_naming_the_class() {
    let registry = ClassRegistry::new(NoBackend);
    let err = registry.resolve_class_details("com.example.Missing").unwrap_err();
    assert_eq!(err.class_name(), Some("com.example.Missing"));
    assert!(matches!(err, ModelError::ClassResolution { .. }), "{err:?}");
}

#[test]
fn failed_builds_are_not_memoized() {
    let calls = CallCounter::default();
    let attempts = calls.clone();
    let registry = ClassRegistry::new(
        move |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            attempts.bump();
            if attempts.get() == 1 {
                return Err(BuildError::message("transient failure"));
            }
            Ok(Some(plain_class(registry, name)))
        },
    );

    let err = registry.resolve_class_details("com.example.Flaky").unwrap_err();
    assert!(err.to_string().contains("transient failure"), "{err}");
    assert!(registry.find_class_details("com.example.Flaky").is_none());

    let class = registry.resolve_class_details("com.example.Flaky").unwrap();
    assert_eq!(&*class.name, "com.example.Flaky");
    assert_eq!(calls.get(), 2);
}

#[test]
fn builder_returning_another_name_is_rejected() {
    let registry = ClassRegistry::new(
        |_: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            Ok(Some(plain_class(registry, "com.example.Other")))
        },
    );
    let err = registry.resolve_class_details("com.example.Asked").unwrap_err();
    assert_eq!(err.class_name(), Some("com.example.Asked"));
}

#[test]
fn builders_may_resolve_other_classes() {
    let registry = ClassRegistry::new(
        |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            match name {
                "com.example.Parent" => Ok(Some(plain_class(registry, name))),
                "com.example.Child" => {
                    let parent = registry.resolve_class_details("com.example.Parent")?;
                    Ok(Some(ClassDetails {
                        super_type: Some(parent.as_type()),
                        ..ClassDetails::new(name, ClassKind::Class)
                    }))
                }
                _ => Ok(None),
            }
        },
    );

    let child = registry.resolve_class_details("com.example.Child").unwrap();
    let parent = registry.find_class_details("com.example.Parent").unwrap();
    assert_eq!(child.super_type, Some(parent.as_type()));
}

#[test]
fn self_resolution_inside_a_builder_is_circular() {
    let observed: Arc<Mutex<Option<ModelError>>> = Arc::default();
    let sink = observed.clone();
    let registry = ClassRegistry::new(
        move |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            let err = registry.resolve_class_details(name).unwrap_err();
            *sink.lock().unwrap() = Some(err.clone());
            Err(err.into())
        },
    );

    let err = registry.resolve_class_details("com.example.Loop").unwrap_err();
    assert_eq!(err.class_name(), Some("com.example.Loop"));
    assert_eq!(
        observed.lock().unwrap().clone(),
        Some(ModelError::CircularConstruction {
            name: "com.example.Loop".to_string()
        })
    );
}

#[test]
fn panicking_builder_leaves_no_trace() {
    let calls = CallCounter::default();
    let attempts = calls.clone();
    let registry = ClassRegistry::new(
        move |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            attempts.bump();
            if attempts.get() == 1 {
                panic!("builder blew up");
            }
            Ok(Some(plain_class(registry, name)))
        },
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        registry.resolve_class_details("com.example.Boom")
    }));
    assert!(outcome.is_err());
    assert!(registry.find_class_details("com.example.Boom").is_none());

    assert!(registry.resolve_class_details("com.example.Boom").is_ok());
    assert_eq!(calls.get(), 2);
}

#[test]
fn encoded_array_names_decode_to_nested_arrays() {
    let registry = with_jdk(NoBackend);

    let ints = registry.resolve_class_details("[[[I").unwrap();
    let int_type = TypeRef::array_of_dimensions(TypeRef::int(), 3);
    assert_eq!(registry.type_ref_for_class(&ints).unwrap(), int_type);
    assert_eq!(determine_raw_class(&registry, &int_type), ints.id());
    assert_eq!(format_type(&registry, &int_type), "int[][][]");

    let integers = registry
        .resolve_class_details("[[[Ljava.lang.Integer;")
        .unwrap();
    let integer = registry.boxed_class(PrimitiveType::Int).unwrap();
    let integer_type = TypeRef::array_of_dimensions(integer.as_type(), 3);
    assert_eq!(registry.type_ref_for_class(&integers).unwrap(), integer_type);
    assert_eq!(determine_raw_class(&registry, &integer_type), integers.id());
    assert_eq!(
        format_type(&registry, &integers.as_type()),
        "java.lang.Integer[][][]"
    );

    // Components are registered along the way.
    let two = registry.find_class_details("[[Ljava.lang.Integer;").unwrap();
    assert_eq!(integers.array_component(), Some(two.id()));
    assert_eq!(
        integers.super_type,
        Some(TypeRef::Class(registry.well_known().object))
    );
}

#[test]
fn every_array_shape_round_trips() {
    let registry = with_jdk(NoBackend);
    let elements = [
        ("I", TypeRef::int()),
        ("C", TypeRef::Primitive(PrimitiveType::Char)),
        (
            "Ljava.lang.String;",
            TypeRef::Class(registry.class_id("java.lang.String")),
        ),
        (
            "Ljava.lang.Integer;",
            TypeRef::Class(registry.class_id("java.lang.Integer")),
        ),
    ];

    for (descriptor, element) in elements {
        for dimensions in 1..=3 {
            let name = format!("{}{descriptor}", "[".repeat(dimensions));
            let class = registry.resolve_class_details(&name).unwrap();
            let expected = TypeRef::array_of_dimensions(element.clone(), dimensions);
            assert_eq!(registry.type_ref_for_class(&class).unwrap(), expected, "{name}");
            assert_eq!(determine_raw_class(&registry, &expected), class.id(), "{name}");
        }
    }
}

#[test]
fn malformed_array_names_are_rejected() {
    let registry = ClassRegistry::new(NoBackend);
    for name in [
        "[",
        "[X",
        "[Ljava.lang.String",
        "[Ljava/lang/String;",
        "[Lint;",
        "[Lvoid;",
        "[Ljava.lang.Void;",
    ] {
        let err = registry.resolve_class_details(name).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArrayName(_)), "{name}: {err:?}");
    }
}

#[test]
fn array_of_unknown_component_fails_with_the_component_name() {
    let registry = ClassRegistry::new(NoBackend);
    let err = registry
        .resolve_class_details("[Lcom.example.Missing;")
        .unwrap_err();
    assert_eq!(err.class_name(), Some("com.example.Missing"));
}

#[test]
fn generic_arguments_propagate_through_registry_classes() {
    let registry = ClassRegistry::new(generic_chain);

    let base = registry.resolve_class_details("com.example.Base").unwrap();
    let intermediate = registry
        .resolve_class_details("com.example.Intermediate")
        .unwrap();
    let leaf = registry.resolve_class_details("com.example.Leaf").unwrap();

    let id = base.member("id").unwrap();
    let id_from_leaf = id
        .resolve_relative_type(&registry, base.id(), leaf.id())
        .unwrap();
    assert_eq!(
        id_from_leaf,
        TypeRef::Class(registry.class_id("java.lang.Integer"))
    );
    assert!(is_resolved(&id_from_leaf));

    let one = intermediate.member("one").unwrap();
    let one_from_leaf = one
        .resolve_relative_type(&registry, intermediate.id(), leaf.id())
        .unwrap();
    assert_eq!(
        one_from_leaf,
        TypeRef::Class(registry.class_id("java.lang.String"))
    );
    assert!(is_resolved(&one_from_leaf));

    let one_from_itself = one
        .resolve_relative_type(&registry, intermediate.id(), intermediate.id())
        .unwrap();
    assert!(matches!(&one_from_itself, TypeRef::TypeVar(var) if var.identifier == "T"));
    assert!(!is_resolved(&one_from_itself));
}

#[test]
fn wildcards_stay_unbounded_and_erase_to_object() {
    let registry = with_jdk(
        |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            let thing = registry.class_id("com.example.Thing");
            let details = match name {
                "com.example.Thing" => ClassDetails {
                    type_parameters: vec![class_var(registry, name, "T")],
                    ..plain_class(registry, name)
                },
                "com.example.Holder" => {
                    let object = TypeRef::Class(registry.well_known().object);
                    let list = registry.class_id("java.util.List");
                    ClassDetails {
                        members: vec![
                            MemberDetails::field(
                                "any",
                                TypeRef::parameterized(thing, vec![TypeRef::unbounded_wildcard()]),
                            ),
                            MemberDetails::field(
                                "things",
                                TypeRef::parameterized(
                                    list,
                                    vec![TypeRef::parameterized(
                                        thing,
                                        vec![TypeRef::wildcard_extends(object)],
                                    )],
                                ),
                            ),
                        ],
                        ..plain_class(registry, name)
                    }
                }
                "com.example.SubHolder" => ClassDetails {
                    super_type: Some(TypeRef::Class(registry.class_id("com.example.Holder"))),
                    ..ClassDetails::new(name, ClassKind::Class)
                },
                _ => return Ok(None),
            };
            Ok(Some(details))
        },
    );

    let holder = registry.resolve_class_details("com.example.Holder").unwrap();
    let sub = registry.resolve_class_details("com.example.SubHolder").unwrap();
    let object = registry.well_known().object;

    let any = holder
        .member("any")
        .unwrap()
        .resolve_relative_type(&registry, holder.id(), sub.id())
        .unwrap();
    let TypeRef::Parameterized(any) = any else {
        panic!("expected Thing<?>, got {any:?}");
    };
    let TypeRef::Wildcard(wildcard) = &any.arguments[0] else {
        panic!("expected wildcard argument");
    };
    assert!(wildcard.is_unbounded());
    assert_eq!(determine_raw_class(&registry, &any.arguments[0]), object);

    let things = holder
        .member("things")
        .unwrap()
        .resolve_relative_type(&registry, holder.id(), sub.id())
        .unwrap();
    assert!(registry.is_plural(holder.member("things").unwrap()).unwrap());
    let TypeRef::Parameterized(list) = &things else {
        panic!("expected List<Thing<? extends Object>>, got {things:?}");
    };
    let TypeRef::Parameterized(thing) = &list.arguments[0] else {
        panic!("expected Thing<? extends Object>");
    };
    assert_eq!(determine_raw_class(&registry, &thing.arguments[0]), object);
}

#[test]
fn plurality_follows_configured_containers() {
    let registry = ClassRegistry::with_config(
        |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            match name {
                "com.example.Bag" => Ok(Some(ClassDetails {
                    super_type: Some(TypeRef::Class(registry.well_known().object)),
                    ..ClassDetails::new(name, ClassKind::Interface)
                })),
                "com.example.TinyBag" => Ok(Some(ClassDetails {
                    interfaces: vec![TypeRef::Class(registry.class_id("com.example.Bag"))],
                    ..plain_class(registry, name)
                })),
                _ => Ok(None),
            }
        },
        RegistryConfig {
            container_types: vec![
                "java.util.Collection".to_string(),
                "java.util.Map".to_string(),
                "com.example.Bag".to_string(),
            ],
            minimal_jdk: true,
        },
    );

    let string = TypeRef::Class(registry.class_id("java.lang.String"));
    let list_of_strings =
        TypeRef::parameterized(registry.class_id("java.util.ArrayList"), vec![string.clone()]);
    let map = TypeRef::parameterized(
        registry.class_id("java.util.HashMap"),
        vec![string.clone(), string.clone()],
    );

    let cases = [
        (MemberDetails::field("name", string.clone()), false),
        (MemberDetails::field("count", TypeRef::int()), false),
        (MemberDetails::field("names", TypeRef::array(string)), true),
        (MemberDetails::field("list", list_of_strings), true),
        (MemberDetails::field("map", map), true),
        (
            MemberDetails::field(
                "bag",
                TypeRef::Class(registry.class_id("com.example.TinyBag")),
            ),
            true,
        ),
    ];
    for (member, plural) in cases {
        assert_eq!(registry.is_plural(&member).unwrap(), plural, "{}", member.name);
    }
}

#[test]
fn minimal_jdk_is_only_consulted_when_enabled() {
    let plain = ClassRegistry::new(NoBackend);
    assert!(plain.resolve_class_details("java.lang.String").is_err());

    let registry = with_jdk(NoBackend);
    let string = registry.resolve_class_details("java.lang.String").unwrap();
    assert!(string.is_concrete());

    // The primary builder still wins for names both know.
    let registry = with_jdk(
        |name: &str, registry: &ClassRegistry| -> Result<Option<ClassDetails>, BuildError> {
            Ok((name == "java.lang.String").then(|| ClassDetails {
                is_abstract: true,
                ..plain_class(registry, name)
            }))
        },
    );
    assert!(registry
        .resolve_class_details("java.lang.String")
        .unwrap()
        .is_abstract);
    assert!(registry.resolve_class_details("java.util.List").is_ok());
}
