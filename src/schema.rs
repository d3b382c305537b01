//! Declarative invocation schemas for registered functions.
//!
//! Each function carries an explicit, construction-time parameter declaration
//! instead of any runtime reflection. Deriving the Bedrock action-group wire
//! shape from it is deterministic and never fails: a missing description
//! serializes as null and an undeclared parameter type falls back to `any`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// JSON-schema-equivalent parameter types accepted by the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// Fallback marker for parameters with no declared type.
    Any,
}

impl ParamType {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
            ParamType::Any => "any",
        }
    }
}

/// One declared parameter of a registered function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
        }
    }
}

/// Declared signature of a registered function: name, description, parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<ParameterSpec>,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.parameters.push(ParameterSpec::new(name, param_type));
        self
    }

    pub fn with_optional_param(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.parameters.push(ParameterSpec::optional(name, param_type));
        self
    }
}

/// Wire projection of one parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDetail {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
}

/// Wire projection of one function descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub parameters: BTreeMap<String, ParameterDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchemaBlock {
    pub functions: Vec<FunctionDescriptor>,
}

/// Marks the action group as executed by the local caller, not the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupExecutor {
    pub custom_control: String,
}

pub const RETURN_CONTROL: &str = "RETURN_CONTROL";

/// One action group advertised to the agent service. The group is named after
/// its single function, mirroring the one-function-per-group request layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupSchema {
    pub action_group_name: String,
    pub function_schema: FunctionSchemaBlock,
    pub action_group_executor: ActionGroupExecutor,
}

impl ActionGroupSchema {
    /// Project a function declaration into the action-group wire shape.
    pub fn for_function(spec: &FunctionSpec) -> Self {
        let parameters = spec
            .parameters
            .iter()
            .map(|param| {
                (
                    param.name.clone(),
                    ParameterDetail {
                        param_type: param.param_type,
                        required: param.required,
                    },
                )
            })
            .collect();

        Self {
            action_group_name: spec.name.clone(),
            function_schema: FunctionSchemaBlock {
                functions: vec![FunctionDescriptor {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    parameters,
                }],
            },
            action_group_executor: ActionGroupExecutor {
                custom_control: RETURN_CONTROL.to_string(),
            },
        }
    }
}
