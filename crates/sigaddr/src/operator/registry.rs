use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};

use super::{AddOperator, LeaOperator, Operator, TextFactory};

/// Builds an operator from its configuration value and target factories.
pub type OperatorConstructor =
    for<'a> fn(value: TextFactory<'a>, target: TextFactory<'a>) -> Box<dyn Operator + 'a>;

fn construct_add<'a>(value: TextFactory<'a>, target: TextFactory<'a>) -> Box<dyn Operator + 'a> {
    Box::new(AddOperator::from_factories(value, target))
}

fn construct_lea<'a>(value: TextFactory<'a>, target: TextFactory<'a>) -> Box<dyn Operator + 'a> {
    Box::new(LeaOperator::from_factories(value, target))
}

fn builtins() -> [(&'static str, OperatorConstructor); 2] {
    [
        ("Add", construct_add as OperatorConstructor),
        ("Lea", construct_lea as OperatorConstructor),
    ]
}

static GLOBAL: Lazy<OperatorRegistry> = Lazy::new(OperatorRegistry::with_builtins);

/// Thread-safe map from operator identifier to constructor.
pub struct OperatorRegistry {
    constructors: RwLock<HashMap<String, OperatorConstructor>>,
}

impl OperatorRegistry {
    /// An empty registry; built-ins are added on the first failed lookup.
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.ensure_builtins();
        registry
    }

    /// The process-wide registry, populated with the built-in operators.
    pub fn global() -> &'static OperatorRegistry {
        &GLOBAL
    }

    /// Register `constructor` under `identifier`, returning the constructor it replaced.
    pub fn register(
        &self,
        identifier: impl Into<String>,
        constructor: OperatorConstructor,
    ) -> Option<OperatorConstructor> {
        let identifier = identifier.into();
        debug!("Registering operator '{}'", identifier);
        self.constructors.write().insert(identifier, constructor)
    }

    /// Remove `identifier`; returns whether it was registered.
    pub fn unregister(&self, identifier: &str) -> bool {
        self.constructors.write().remove(identifier).is_some()
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.constructors.read().contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.constructors.read().keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Add every built-in operator whose identifier is not taken yet.
    ///
    /// Existing registrations are never replaced. Returns how many were added.
    pub fn ensure_builtins(&self) -> usize {
        let mut constructors = self.constructors.write();
        let mut added = 0;
        for (identifier, constructor) in builtins() {
            if !constructors.contains_key(identifier) {
                constructors.insert(identifier.to_string(), constructor);
                added += 1;
            }
        }
        added
    }

    /// Instantiate the operator registered under `identifier`.
    ///
    /// An unknown identifier triggers one [`Self::ensure_builtins`] pass before failing.
    pub fn create<'a>(
        &self,
        identifier: &str,
        value: TextFactory<'a>,
        target: TextFactory<'a>,
    ) -> Result<Box<dyn Operator + 'a>> {
        let constructor = match self.lookup(identifier) {
            Some(constructor) => constructor,
            None => {
                debug!("Operator '{}' not registered, adding built-ins", identifier);
                self.ensure_builtins();
                self.lookup(identifier)
                    .ok_or_else(|| Error::UnknownOperator(identifier.to_string()))?
            }
        };

        Ok(constructor(value, target))
    }

    fn lookup(&self, identifier: &str) -> Option<OperatorConstructor> {
        self.constructors.read().get(identifier).copied()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
