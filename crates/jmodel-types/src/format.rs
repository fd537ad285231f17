//! Java-like rendering of type references, for diagnostics and logs.

use crate::{ArrayName, TypeEnv, TypeRef};

/// Render `ty` the way it would be spelled in Java source, using binary class names.
///
/// `java.util.Map<java.lang.String, ? extends T>`, `int[][]`.
pub fn format_type(env: &dyn TypeEnv, ty: &TypeRef) -> String {
    let mut out = String::new();
    write_type(env, ty, &mut out);
    out
}

fn write_class_name(env: &dyn TypeEnv, id: crate::ClassId, out: &mut String) {
    let name = env.class_name(id);
    match ArrayName::parse(&name) {
        Ok(array) => out.push_str(&array.java_name()),
        Err(_) => out.push_str(&name),
    }
}

fn write_type(env: &dyn TypeEnv, ty: &TypeRef, out: &mut String) {
    match ty {
        TypeRef::Primitive(kind) => out.push_str(kind.name()),
        TypeRef::Void => out.push_str("void"),
        TypeRef::Class(id) => write_class_name(env, *id, out),
        TypeRef::Parameterized(p) => {
            write_class_name(env, p.raw, out);
            out.push('<');
            for (idx, arg) in p.arguments.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_type(env, arg, out);
            }
            out.push('>');
        }
        TypeRef::Array(element) => {
            write_type(env, element, out);
            out.push_str("[]");
        }
        TypeRef::Wildcard(w) => {
            out.push('?');
            if let Some(upper) = &w.upper {
                out.push_str(" extends ");
                write_type(env, upper, out);
            }
            if let Some(lower) = &w.lower {
                out.push_str(" super ");
                write_type(env, lower, out);
            }
        }
        TypeRef::TypeVar(var) => out.push_str(&var.identifier),
        TypeRef::TypeVarReference(key) => out.push_str(&key.identifier),
    }
}
