use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Two functions with the same name were registered on one agent.
    #[error("function `{0}` is already registered")]
    DuplicateFunction(String),

    /// The service requested a function the agent never advertised.
    #[error("service requested unknown function `{0}`")]
    UnknownFunction(String),

    #[error("function `{name}` invocation failed: {source}")]
    FunctionInvocation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport or service failure from the agent runtime.
    #[error("agent runtime error: {0}")]
    Runtime(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
