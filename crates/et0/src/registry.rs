//! Calculator constructor registry.

use std::collections::BTreeMap;

use demeter_kc::KcCurve;

use crate::Et0Calculator;
use crate::penman::PenmanFao56;

/// Constructor for a named calculator, taking an optional Kc curve.
pub type Constructor = fn(Option<KcCurve>) -> Box<dyn Et0Calculator>;

/// Explicit name-to-constructor registry for ET0 calculators.
///
/// Populated at startup rather than through hidden self-registration, so
/// the set of available methods is visible in one place. Looking up an
/// unknown name returns `None`; callers treat that as a configuration
/// error.
#[derive(Debug, Default)]
pub struct Registry {
    constructors: BTreeMap<String, Constructor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all built-in calculators.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(PenmanFao56::NAME, |corrector| {
            Box::new(PenmanFao56::new(corrector))
        });
        registry
    }

    /// Registers (or replaces) a constructor under `name`.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Instantiates the calculator registered under `name`.
    pub fn build(&self, name: &str, corrector: Option<KcCurve>) -> Option<Box<dyn Et0Calculator>> {
        self.constructors.get(name).map(|ctor| ctor(corrector))
    }

    /// Registered method names in lexical order.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}
