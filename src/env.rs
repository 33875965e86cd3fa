// ABOUTME: Top-level binding environment populated by `name <- expr` statements

use crate::error::{LambdaError, Location};
use crate::expr::Expression;
use std::collections::HashMap;

/// The flat, one-shot binding table built up by top-level assignments.
///
/// Unlike a lexically nested environment, there is exactly one scope here:
/// lambda parameters are resolved by substitution (see `expr::substitute`),
/// not by environment lookup, so `Bound` only ever holds top-level names.
#[derive(Debug, Clone, Default)]
pub struct Bound {
    values: HashMap<String, Expression>,
}

impl Bound {
    pub fn new() -> Self {
        Bound {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Insert a new binding. Rebinding an existing name is a `NameError`.
    pub fn insert(
        &mut self,
        name: String,
        value: Expression,
        at: Location,
    ) -> Result<(), LambdaError> {
        if self.values.contains_key(&name) {
            return Err(LambdaError::name(
                at,
                format!("attempted assignment to bound name '{name}'"),
            ));
        }
        self.values.insert(name, value);
        Ok(())
    }
}
