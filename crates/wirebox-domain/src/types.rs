//! Type descriptors
//!
//! A [`TypeDescriptor`] is an explicit structural description of a type. It
//! replaces runtime reflection for the open-generic machinery: a descriptor is
//! either a generic parameter (`T`) or a constructed type (`IHandler<T>`,
//! `IHandler<i32>`, `Basic`). Open descriptors contain at least one parameter;
//! closed descriptors contain none.
//!
//! ```text
//! pattern   IHandler<T>        closed   IHandler<i32>
//!              │ bind()                      │
//!              └────────► { T = i32 } ◄──────┘
//!                             │ substitute()
//!                             ▼
//!                      Logging<T> → Logging<i32>
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::GENERIC_ARGUMENT_SEPARATOR;
use crate::error::{Error, Result};

/// An unbound generic parameter, optionally constrained to a set of closed types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericParameter {
    name: Arc<str>,
    constraint: Option<Arc<[TypeDescriptor]>>,
}

impl GenericParameter {
    /// Parameter name, e.g. `T`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Closed types this parameter accepts, if constrained
    pub fn constraint(&self) -> Option<&[TypeDescriptor]> {
        self.constraint.as_deref()
    }

    /// Whether `candidate` satisfies the constraint
    pub fn accepts(&self, candidate: &TypeDescriptor) -> bool {
        match &self.constraint {
            Some(allowed) => allowed.iter().any(|t| t == candidate),
            None => true,
        }
    }
}

/// Structural description of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// An unbound generic parameter
    Parameter(GenericParameter),
    /// A named type with zero or more type arguments
    Constructed {
        /// Type name without arguments
        name: Arc<str>,
        /// Type arguments, in declaration order
        arguments: Arc<[TypeDescriptor]>,
    },
}

/// Parameter-name to closed-type assignments produced by [`TypeDescriptor::bind`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericBindings {
    bindings: BTreeMap<Arc<str>, TypeDescriptor>,
}

impl GenericBindings {
    /// Create an empty binding set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `ty`, returning the builder for chaining
    pub fn with(mut self, name: &str, ty: TypeDescriptor) -> Self {
        self.bindings.insert(Arc::from(name), ty);
        self
    }

    /// Look up the type bound to a parameter name
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.bindings.get(name)
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Merge `other` into `self`; fails on conflicting assignments
    pub fn merge(&mut self, other: &GenericBindings) -> bool {
        for (name, ty) in &other.bindings {
            match self.bindings.get(name) {
                Some(existing) if existing != ty => return false,
                Some(_) => {}
                None => {
                    self.bindings.insert(name.clone(), ty.clone());
                }
            }
        }
        true
    }

    fn unify(&mut self, pattern: &TypeDescriptor, closed: &TypeDescriptor) -> bool {
        match pattern {
            TypeDescriptor::Parameter(parameter) => {
                if !parameter.accepts(closed) {
                    return false;
                }
                match self.bindings.get(parameter.name()) {
                    Some(existing) => existing == closed,
                    None => {
                        self.bindings.insert(parameter.name.clone(), closed.clone());
                        true
                    }
                }
            }
            TypeDescriptor::Constructed { name, arguments } => match closed {
                TypeDescriptor::Constructed {
                    name: closed_name,
                    arguments: closed_arguments,
                } if name == closed_name && arguments.len() == closed_arguments.len() => arguments
                    .iter()
                    .zip(closed_arguments.iter())
                    .all(|(p, c)| self.unify(p, c)),
                _ => false,
            },
        }
    }
}

impl TypeDescriptor {
    /// A plain, non-generic type
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Constructed {
            name: name.into(),
            arguments: Arc::from(Vec::new()),
        }
    }

    /// A constructed generic type such as `IHandler<T>` or `IHandler<i32>`
    pub fn generic<I>(name: impl Into<Arc<str>>, arguments: I) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self::Constructed {
            name: name.into(),
            arguments: arguments.into_iter().collect(),
        }
    }

    /// An unconstrained generic parameter
    pub fn param(name: impl Into<Arc<str>>) -> Self {
        Self::Parameter(GenericParameter {
            name: name.into(),
            constraint: None,
        })
    }

    /// A generic parameter that only binds to one of `allowed`
    pub fn constrained_param<I>(name: impl Into<Arc<str>>, allowed: I) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self::Parameter(GenericParameter {
            name: name.into(),
            constraint: Some(allowed.into_iter().collect()),
        })
    }

    /// Descriptor for a Rust type, named by [`std::any::type_name`]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    /// Type name without arguments (parameter name for parameters)
    pub fn name(&self) -> &str {
        match self {
            Self::Parameter(p) => p.name(),
            Self::Constructed { name, .. } => name,
        }
    }

    /// Type arguments of a constructed type
    pub fn arguments(&self) -> &[TypeDescriptor] {
        match self {
            Self::Parameter(_) => &[],
            Self::Constructed { arguments, .. } => arguments,
        }
    }

    /// Number of type arguments
    pub fn arity(&self) -> usize {
        self.arguments().len()
    }

    /// True when the descriptor mentions at least one generic parameter
    pub fn is_open(&self) -> bool {
        match self {
            Self::Parameter(_) => true,
            Self::Constructed { arguments, .. } => arguments.iter().any(Self::is_open),
        }
    }

    /// True for generic parameters themselves
    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter(_))
    }

    /// Distinct generic parameters in first-appearance order
    pub fn generic_parameters(&self) -> Vec<&GenericParameter> {
        let mut found: Vec<&GenericParameter> = Vec::new();
        self.collect_parameters(&mut found);
        found
    }

    fn collect_parameters<'a>(&'a self, found: &mut Vec<&'a GenericParameter>) {
        match self {
            Self::Parameter(p) => {
                if !found.iter().any(|existing| existing.name == p.name) {
                    found.push(p);
                }
            }
            Self::Constructed { arguments, .. } => {
                for argument in arguments.iter() {
                    argument.collect_parameters(found);
                }
            }
        }
    }

    /// Same type name and argument count, ignoring the arguments themselves
    pub fn same_definition(&self, other: &TypeDescriptor) -> bool {
        match (self, other) {
            (
                Self::Constructed { name, arguments },
                Self::Constructed {
                    name: other_name,
                    arguments: other_arguments,
                },
            ) => name == other_name && arguments.len() == other_arguments.len(),
            _ => false,
        }
    }

    /// Unify this (open) descriptor with a closed one
    ///
    /// Returns `None` when the names or arities differ, when the same parameter
    /// would be bound to two different types, when a constraint rejects the
    /// candidate, or when `closed` is itself open.
    pub fn bind(&self, closed: &TypeDescriptor) -> Option<GenericBindings> {
        if closed.is_open() {
            return None;
        }
        let mut bindings = GenericBindings::new();
        bindings.unify(self, closed).then_some(bindings)
    }

    /// Replace every generic parameter with its bound type
    pub fn substitute(&self, bindings: &GenericBindings) -> Result<TypeDescriptor> {
        match self {
            Self::Parameter(p) => {
                let bound = bindings.get(p.name()).ok_or_else(|| {
                    Error::configuration(format!(
                        "No type argument bound for generic parameter '{}'",
                        p.name()
                    ))
                })?;
                if !p.accepts(bound) {
                    return Err(Error::configuration(format!(
                        "Type '{}' violates the constraint on generic parameter '{}'",
                        bound,
                        p.name()
                    )));
                }
                Ok(bound.clone())
            }
            Self::Constructed { name, arguments } => Ok(Self::Constructed {
                name: name.clone(),
                arguments: arguments
                    .iter()
                    .map(|a| a.substitute(bindings))
                    .collect::<Result<Vec<_>>>()?
                    .into(),
            }),
        }
    }

    /// Whether every generic parameter of this implementation type can be
    /// inferred from the arguments of `service_type`
    pub fn is_bindable_to(&self, service_type: &TypeDescriptor) -> bool {
        if !self.is_open() || !service_type.is_open() {
            return false;
        }
        let inferable = service_type.generic_parameters();
        self.generic_parameters()
            .iter()
            .all(|p| inferable.iter().any(|s| s.name() == p.name()))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(p) => write!(f, "{}", p.name()),
            Self::Constructed { name, arguments } if arguments.is_empty() => write!(f, "{name}"),
            Self::Constructed { name, arguments } => {
                write!(f, "{name}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(GENERIC_ARGUMENT_SEPARATOR)?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
        }
    }
}
