//! Encoding of array class names (`[I`, `[[Ljava.lang.String;`).

use std::fmt;

use crate::{ModelError, PrimitiveType, Result, VOID_BOXED_CLASS_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementDescriptor {
    Primitive(PrimitiveType),
    /// Dotted binary name, e.g. `java.lang.String`.
    Object(String),
}

impl ElementDescriptor {
    /// Name of the element class as it would be registered (`int`, `java.lang.String`).
    pub fn class_name(&self) -> &str {
        match self {
            ElementDescriptor::Primitive(kind) => kind.name(),
            ElementDescriptor::Object(name) => name,
        }
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            ElementDescriptor::Primitive(kind) => out.push(kind.descriptor()),
            ElementDescriptor::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
        }
    }
}

/// A decoded array class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayName {
    pub dimensions: usize,
    pub element: ElementDescriptor,
}

impl ArrayName {
    pub fn new(dimensions: usize, element: ElementDescriptor) -> Self {
        Self {
            dimensions,
            element,
        }
    }

    /// Whether `name` uses the array encoding at all. Does not validate the rest of the name.
    pub fn is_array_name(name: &str) -> bool {
        name.starts_with('[')
    }

    pub fn parse(name: &str) -> Result<ArrayName> {
        let invalid = || ModelError::InvalidArrayName(name.to_string());

        let dimensions = name.bytes().take_while(|b| *b == b'[').count();
        if dimensions == 0 {
            return Err(invalid());
        }

        let rest = &name[dimensions..];
        let mut chars = rest.chars();
        let element = match chars.next().ok_or_else(invalid)? {
            'L' => {
                let inner = rest[1..].strip_suffix(';').ok_or_else(invalid)?;
                if inner.is_empty()
                    || inner.contains([';', '/', '['])
                    || !is_object_element(inner)
                {
                    return Err(invalid());
                }
                ElementDescriptor::Object(inner.to_string())
            }
            c => {
                let kind = PrimitiveType::from_descriptor(c).ok_or_else(invalid)?;
                if chars.next().is_some() {
                    return Err(invalid());
                }
                ElementDescriptor::Primitive(kind)
            }
        };

        Ok(ArrayName {
            dimensions,
            element,
        })
    }

    /// Parse the Java source spelling, e.g. `int[][]` or `java.lang.String[]`.
    pub fn parse_java_name(name: &str) -> Result<ArrayName> {
        let mut element = name;
        let mut dimensions = 0;
        while let Some(stripped) = element.strip_suffix("[]") {
            element = stripped;
            dimensions += 1;
        }
        if dimensions == 0 || element.is_empty() || element.contains(['[', ']', ';', '/']) {
            return Err(ModelError::InvalidArrayName(name.to_string()));
        }
        let element = match PrimitiveType::from_name(element) {
            Some(kind) => ElementDescriptor::Primitive(kind),
            None if is_object_element(element) => ElementDescriptor::Object(element.to_string()),
            None => return Err(ModelError::InvalidArrayName(name.to_string())),
        };
        Ok(ArrayName {
            dimensions,
            element,
        })
    }

    pub fn encode(&self) -> String {
        let mut out = "[".repeat(self.dimensions);
        self.element.write_descriptor(&mut out);
        out
    }

    /// Java source spelling, e.g. `java.lang.Integer[][][]`.
    pub fn java_name(&self) -> String {
        let mut out = self.element.class_name().to_string();
        for _ in 0..self.dimensions {
            out.push_str("[]");
        }
        out
    }

    /// Registered name of the component class (one dimension less).
    pub fn component_name(&self) -> String {
        if self.dimensions <= 1 {
            return self.element.class_name().to_string();
        }
        ArrayName::new(self.dimensions - 1, self.element.clone()).encode()
    }
}

impl fmt::Display for ArrayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Name of the array class whose component class is registered as `component`.
pub fn array_name_for_component(component: &str) -> String {
    if component.starts_with('[') {
        return format!("[{component}");
    }
    match PrimitiveType::from_name(component) {
        Some(kind) => format!("[{}", kind.descriptor()),
        None => format!("[L{component};"),
    }
}

/// Primitive keywords have their own descriptor letter, and there are no arrays of `void`.
fn is_object_element(name: &str) -> bool {
    PrimitiveType::from_name(name).is_none() && name != "void" && name != VOID_BOXED_CLASS_NAME
}
