use serde::{Deserialize, Serialize};

/// Type of an expression as computed by the checker.
///
/// `Error` is the poison type: it is given to an expression whose type could
/// not be determined, so enclosing expressions stay quiet about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    String,
    Bool,
    Error,
}

/// Initial value a declared variable holds before any assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Type {
    /// Map a type keyword to the corresponding `Type`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Type::Int),
            "string" => Some(Type::String),
            "bool" => Some(Type::Bool),
            _ => None,
        }
    }

    pub fn is_poison(self) -> bool {
        self == Type::Error
    }

    /// Default value of a variable declared with this type.
    /// `int` and `bool` start at 0, `string` empty; the poison type has none.
    pub fn default_value(self) -> Option<Value> {
        match self {
            Type::Int | Type::Bool => Some(Value::Int(0)),
            Type::String => Some(Value::Str(String::new())),
            Type::Error => None,
        }
    }

    /// Name used in diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
            Type::Bool => "bool",
            Type::Error => "error",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
