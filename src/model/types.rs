//! Type expressions used by declarations and claims.
//!
//! A [`TypeRef`] is either a named type with ordered type arguments
//! (`Repository<User>`) or a type variable (`T`). Declarations that still carry
//! type variables are templates and must be unified with a concrete claim type
//! before they can be resolved.
//!
//! Type expressions are parsed from their textual form:
//!
//! ```rust
//! use wiregraph::model::TypeRef;
//!
//! let ty: TypeRef = "Map<String, List<T>>".parse().unwrap();
//! let ty = ty.bind_params(&["T".to_string()]);
//! assert!(ty.has_type_vars());
//! assert_eq!(ty.to_string(), "Map<String, List<T>>");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::WiregraphError;

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// An unresolved type variable of a template declaration.
    Var(String),
    /// A named type, possibly parameterized.
    Named {
        /// Fully qualified or simple type name.
        name: String,
        /// Ordered type arguments.
        args: Vec<TypeRef>,
    },
}

/// Mapping from type variable names to concrete types.
pub type Substitution = BTreeMap<String, TypeRef>;

impl TypeRef {
    /// Create a named type without arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a parameterized named type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Create a type variable.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// The type name (or variable name) without arguments.
    pub fn name(&self) -> &str {
        match self {
            Self::Var(name) => name,
            Self::Named {
                name,
                ..
            } => name,
        }
    }

    /// Type arguments; empty for variables.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Var(_) => &[],
            Self::Named {
                args,
                ..
            } => args,
        }
    }

    /// Whether this is a bare type variable.
    pub const fn is_var(&self) -> bool {
        matches!(self, Self::Var(_))
    }

    /// Whether a type variable occurs anywhere in this expression.
    pub fn has_type_vars(&self) -> bool {
        match self {
            Self::Var(_) => true,
            Self::Named {
                args,
                ..
            } => args.iter().any(Self::has_type_vars),
        }
    }

    /// Collect the names of all type variables, in first-occurrence order.
    pub fn type_vars(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Self::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::Named {
                args,
                ..
            } => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
        }
    }

    /// Turn argument-less named types whose name is listed in `params` into variables.
    ///
    /// Parsing cannot tell `T` from a concrete type called `T`; the owning
    /// declaration's parameter list decides.
    #[must_use]
    pub fn bind_params(self, params: &[String]) -> Self {
        if params.is_empty() {
            return self;
        }
        match self {
            Self::Named {
                name,
                args,
            } => {
                if args.is_empty() && params.iter().any(|p| *p == name) {
                    Self::Var(name)
                } else {
                    Self::Named {
                        name,
                        args: args.into_iter().map(|a| a.bind_params(params)).collect(),
                    }
                }
            }
            var => var,
        }
    }

    /// Replace type variables using `map`; unmapped variables are kept.
    #[must_use]
    pub fn substitute(&self, map: &Substitution) -> Self {
        match self {
            Self::Var(name) => map.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named {
                name,
                args,
            } => Self::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(map)).collect(),
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{name}"),
            Self::Named {
                name,
                args,
            } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TypeRef {
    type Error = WiregraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for TypeRef {
    type Err = WiregraphError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().peekable(),
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if let Some((pos, c)) = parser.chars.next() {
            return Err(parser.error(format!("unexpected '{c}' at offset {pos}")));
        }
        Ok(ty)
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> WiregraphError {
        WiregraphError::TypeParseError {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, WiregraphError> {
        self.skip_ws();
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            let next = self.chars.peek().copied();
            return Err(match next {
                Some((pos, c)) => {
                    self.error(format!("expected type name at offset {pos}, found '{c}'"))
                }
                None => self.error("expected type name"),
            });
        }
        if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return Err(self.error(format!("malformed qualified name '{name}'")));
        }

        self.skip_ws();
        let mut args = Vec::new();
        if matches!(self.chars.peek(), Some((_, '<'))) {
            self.chars.next();
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, '>')) => break,
                    Some((pos, c)) => {
                        return Err(self.error(format!("expected ',' or '>' at offset {pos}, found '{c}'")));
                    }
                    None => return Err(self.error("unclosed '<'")),
                }
            }
        }
        Ok(TypeRef::Named {
            name,
            args,
        })
    }
}
