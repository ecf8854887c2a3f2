//! # spatial-runtime
//!
//! Session-scoped room state and the agent tool surface for Spatial Engine.
//!
//! `spatial-core` computes; this crate decides which room a call applies to,
//! turns loosely typed model arguments into validated numbers, and renders
//! results as text an agent can read back.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use spatial_runtime::{RuntimeConfig, SpatialRuntime, ToolCall};
//!
//! let runtime = SpatialRuntime::new(RuntimeConfig::default())?;
//! let session = runtime.open_session();
//!
//! runtime.call(session.id(), &ToolCall::new("set_room_parameters", json!({"area_sqm": 20})))?;
//! runtime.call(session.id(), &ToolCall::new("add_light_source", json!({"name": "Lamp", "lumens": "800 lm"})))?;
//!
//! let summary = runtime.call(session.id(), &ToolCall::new("get_room_summary", json!({})))?;
//! assert!(summary.text.contains("Lamp (800lm)"));
//! # Ok::<(), spatial_runtime::RuntimeError>(())
//! ```

pub mod config;
pub mod session;
pub mod tools;

pub use config::{ConfigError, RuntimeConfig, SessionConfig, ToolDefaults};
pub use session::{SessionHandle, SessionId, SessionStore};
pub use tools::{ToolCall, ToolDefinition, ToolExecutor, ToolKind, ToolOutput, ToolRegistry};

use spatial_core::EngineError;
use thiserror::Error;
use tracing::warn;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {}", errors.join("; "))]
    InvalidArguments { tool: String, errors: Vec<String> },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Schema for {tool} failed to compile: {message}")]
    Schema { tool: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Session store and tool executor behind one configuration.
pub struct SpatialRuntime {
    sessions: SessionStore,
    executor: ToolExecutor,
}

impl SpatialRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let sessions = SessionStore::new(&config.sessions, config.defaults.wall_reflection)?;
        let executor = ToolExecutor::new(config.defaults)?;

        Ok(Self {
            sessions,
            executor,
        })
    }

    /// Start a conversation with an empty room.
    pub fn open_session(&self) -> SessionHandle {
        self.sessions.create()
    }

    /// Returns false if the session had already expired or been closed.
    pub fn close_session(&self, id: &SessionId) -> bool {
        self.sessions.dispose(id)
    }

    pub fn active_sessions(&self) -> u64 {
        self.sessions.len()
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        self.executor.registry().definitions()
    }

    /// Execute a tool call in a session.
    pub fn call(&self, id: &SessionId, call: &ToolCall) -> Result<ToolOutput, RuntimeError> {
        let session = self
            .sessions
            .get(id)
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))?;
        self.executor.execute(&session, call)
    }

    /// Execute a tool call, reporting every failure as an error output.
    pub fn call_lenient(&self, id: &SessionId, call: &ToolCall) -> ToolOutput {
        match self.sessions.get(id) {
            Some(session) => self.executor.execute_lenient(&session, call),
            None => {
                let err = RuntimeError::SessionNotFound(id.clone());
                warn!(tool = %call.name, session = %id, "call for unknown session");
                ToolOutput::failure(&call.name, &err)
            }
        }
    }
}
