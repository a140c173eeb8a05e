//! Static types attached to declarations and expression nodes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullability {
    Nullable,
    Nonnull,
}

impl Nullability {
    fn keyword(self) -> &'static str {
        match self {
            Nullability::Nullable => "_Nullable",
            Nullability::Nonnull => "_Nonnull",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Char,
    Int,
    Long,
    Float,
    Double,
    /// Deduced type placeholder (`auto`).
    Auto,
    /// Type of a string literal.
    Str,
    /// A `struct` type. `elaborated` records that the type is spelled with the `struct`
    /// keyword (C and Objective-C).
    Record { name: String, elaborated: bool },
    Pointer(Box<Type>),
    /// A nullability-qualified type such as `int * _Nullable`.
    Nullable {
        inner: Box<Type>,
        nullability: Nullability,
    },
    Function { ret: Box<Type> },
    /// The unnamed closure type of a lambda expression.
    Closure { ret: Box<Type> },
    /// Placeholder type of expressions that are rewritten into accessor calls
    /// (property references).
    PseudoObject,
}

impl Type {
    pub fn pointer_to(inner: Type) -> Type {
        Type::Pointer(Box::new(inner))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.strip_outer_nullability(), Type::Float | Type::Double)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.strip_outer_nullability(), Type::Pointer(_))
    }

    /// Drops the outermost nullability qualifier, if any.
    pub fn strip_outer_nullability(&self) -> &Type {
        match self {
            Type::Nullable { inner, .. } => inner,
            other => other,
        }
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self.strip_outer_nullability() {
            Type::Pointer(inner) => Some(inner),
            Type::Str => Some(&Type::Char),
            _ => None,
        }
    }

    /// The result type of calling a value of this type.
    pub fn call_result(&self) -> Option<&Type> {
        match self.strip_outer_nullability() {
            Type::Function { ret } | Type::Closure { ret } => Some(ret),
            Type::Pointer(inner) => match inner.as_ref() {
                Type::Function { ret } => Some(ret),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether the type can be written out in a declaration.
    pub fn is_spellable(&self) -> bool {
        match self {
            Type::Function { .. } | Type::Closure { .. } | Type::PseudoObject => false,
            Type::Pointer(inner) | Type::Nullable { inner, .. } => inner.is_spellable(),
            _ => true,
        }
    }

    /// Renders a declaration of `name` with this type, e.g. `int *name` or `auto name`.
    pub fn render_declaration(&self, name: &str) -> String {
        let ty = self.to_string();
        if ty.ends_with('*') || name.is_empty() {
            format!("{ty}{name}")
        } else {
            format!("{ty} {name}")
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Bool => f.write_str("bool"),
            Type::Char => f.write_str("char"),
            Type::Int => f.write_str("int"),
            Type::Long => f.write_str("long"),
            Type::Float => f.write_str("float"),
            Type::Double => f.write_str("double"),
            Type::Auto => f.write_str("auto"),
            Type::Str => f.write_str("const char *"),
            Type::Record { name, elaborated } => {
                if *elaborated {
                    write!(f, "struct {name}")
                } else {
                    f.write_str(name)
                }
            }
            Type::Pointer(inner) => write!(f, "{inner} *"),
            Type::Nullable { inner, nullability } => {
                write!(f, "{inner} {}", nullability.keyword())
            }
            Type::Function { ret } => write!(f, "{ret} ()"),
            Type::Closure { .. } => f.write_str("(lambda)"),
            Type::PseudoObject => f.write_str("<pseudo-object>"),
        }
    }
}
