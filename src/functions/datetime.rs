//! Datetime functions.

use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};

use crate::error::Result;
use crate::function::{AgentFunction, FunctionArgs, FunctionRegistry};
use crate::schema::FunctionSpec;

pub fn datetime_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry
        .register(CurrentDate)
        .expect("datetime function names are unique");
    registry
}

struct CurrentDate;

#[async_trait]
impl AgentFunction for CurrentDate {
    fn spec(&self) -> FunctionSpec {
        FunctionSpec::new("get_current_date").with_description("Get the current date")
    }

    async fn call(&self, _args: FunctionArgs) -> Result<Value> {
        Ok(json!(Local::now().format("%Y-%m-%d").to_string()))
    }
}
