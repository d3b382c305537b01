use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::schema::{ActionGroupSchema, FunctionSpec};

/// A locally executable function the agent service may ask the caller to run.
///
/// The declared [`FunctionSpec`] is what gets advertised to the service;
/// argument values arrive as the strings the service sends and coercion to
/// richer types is the implementation's own responsibility.
#[async_trait]
pub trait AgentFunction: Send + Sync {
    fn spec(&self) -> FunctionSpec;

    async fn call(&self, args: FunctionArgs) -> Result<Value>;
}

/// Named string arguments from a function-invocation request.
#[derive(Debug, Clone, Default)]
pub struct FunctionArgs {
    values: HashMap<String, String>,
}

impl FunctionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| AgentError::Protocol(format!("missing parameter `{name}`")))
    }

    /// Parse a required argument into the type the callable expects.
    pub fn parse<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.require(name)?;
        raw.parse().map_err(|err| {
            AgentError::Protocol(format!("parameter `{name}`=`{raw}` did not parse: {err}"))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for FunctionArgs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Name-unique set of functions owned by one agent definition.
///
/// Built at construction and read-only afterwards; lookups are exact-name.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn AgentFunction>>,
    order: Vec<String>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. A name collision is a configuration error and is
    /// reported immediately rather than silently overwriting.
    pub fn register<F: AgentFunction + 'static>(&mut self, function: F) -> Result<()> {
        self.register_arc(Arc::new(function))
    }

    pub fn register_arc(&mut self, function: Arc<dyn AgentFunction>) -> Result<()> {
        let name = function.spec().name;
        if self.functions.contains_key(&name) {
            return Err(AgentError::DuplicateFunction(name));
        }
        self.order.push(name.clone());
        self.functions.insert(name, function);
        Ok(())
    }

    /// Absorb all functions from another registry, keeping name uniqueness.
    pub fn extend(&mut self, other: FunctionRegistry) -> Result<()> {
        for name in other.order {
            let function = other.functions[&name].clone();
            if self.functions.contains_key(&name) {
                return Err(AgentError::DuplicateFunction(name));
            }
            self.order.push(name.clone());
            self.functions.insert(name, function);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn AgentFunction>> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Derive the advertised action-group schema for every function, in
    /// registration order.
    pub fn schemas(&self) -> Vec<ActionGroupSchema> {
        self.order
            .iter()
            .map(|name| ActionGroupSchema::for_function(&self.functions[name].spec()))
            .collect()
    }
}
