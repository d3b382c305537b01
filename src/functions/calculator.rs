//! Calculator functions.
//!
//! Operands arrive as the strings the service sends and are parsed here,
//! since argument coercion belongs to the function, not the driver.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;
use crate::function::{AgentFunction, FunctionArgs, FunctionRegistry};
use crate::schema::{FunctionSpec, ParamType};

pub fn calculator_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry
        .register(AddFunction)
        .expect("calculator function names are unique");
    registry
        .register(MultiplyFunction)
        .expect("calculator function names are unique");
    registry
}

struct AddFunction;

#[async_trait]
impl AgentFunction for AddFunction {
    fn spec(&self) -> FunctionSpec {
        FunctionSpec::new("add")
            .with_description("Add two numbers")
            .with_param("a", ParamType::Number)
            .with_param("b", ParamType::Number)
    }

    async fn call(&self, args: FunctionArgs) -> Result<Value> {
        let a: f64 = args.parse("a")?;
        let b: f64 = args.parse("b")?;
        Ok(json!(a + b))
    }
}

struct MultiplyFunction;

#[async_trait]
impl AgentFunction for MultiplyFunction {
    fn spec(&self) -> FunctionSpec {
        FunctionSpec::new("multiply")
            .with_description("Multiply two numbers")
            .with_param("a", ParamType::Number)
            .with_param("b", ParamType::Number)
    }

    async fn call(&self, args: FunctionArgs) -> Result<Value> {
        let a: f64 = args.parse("a")?;
        let b: f64 = args.parse("b")?;
        Ok(json!(a * b))
    }
}
