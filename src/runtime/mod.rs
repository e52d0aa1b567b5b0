//! Builtin function runtime.
//!
//! Functions live in a process-wide [`Registry`] that is built on first use
//! and never modified afterwards. Calls are validated against each
//! function's parameter list before the implementation runs, so
//! implementations can rely on argument count and types.
//!
//! Functions taking expression references (`map`, `sort_by`, `max_by`,
//! `min_by`) evaluate them through the [`Visitor`] passed to
//! [`Registry::call`].

mod builtins;
mod signature;

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::trace;

use crate::interpreter::{EvalError, Visitor};
use crate::value::Value;

pub use signature::{ArgType, Param};

/// Implementation of a builtin. Arguments have already been validated.
pub type BuiltinFn = fn(&[Value], &dyn Visitor) -> Result<Value, EvalError>;

/// A builtin function: its name, parameter specs and implementation.
#[derive(Debug, Clone, Copy)]
pub struct Function {
    name: &'static str,
    params: &'static [Param],
    invoke: BuiltinFn,
}

impl Function {
    pub const fn new(name: &'static str, params: &'static [Param], invoke: BuiltinFn) -> Self {
        Function {
            name,
            params,
            invoke,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &'static [Param] {
        self.params
    }

    /// Human-readable signature, e.g. `sort_by(array, expref)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(Param::to_string).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// Validates `args` and invokes the implementation.
    pub fn call(&self, args: &[Value], visitor: &dyn Visitor) -> Result<Value, EvalError> {
        signature::validate(self.name, self.params, args)?;
        (self.invoke)(args, visitor)
    }
}

/// Name-indexed table of builtin functions.
#[derive(Debug)]
pub struct Registry {
    functions: HashMap<&'static str, Function>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide builtin registry, built on first access.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let registry = Registry {
            functions: builtins::BUILTINS.iter().map(|f| (f.name, *f)).collect(),
        };
        trace!(functions = registry.len(), "built function registry");
        registry
    })
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All functions, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        let mut functions: Vec<&Function> = self.functions.values().collect();
        functions.sort_by_key(|f| f.name);
        functions.into_iter()
    }

    /// Looks up `name`, validates `args` against its parameters and runs it.
    pub fn call(
        &self,
        name: &str,
        args: &[Value],
        visitor: &dyn Visitor,
    ) -> Result<Value, EvalError> {
        let function = self
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        trace!(function = name, args = args.len(), "calling builtin");
        function.call(args, visitor)
    }
}
