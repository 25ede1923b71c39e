//! Tool schemas and the per-turn tool registry

pub mod registry;
pub mod schema;

pub use registry::{RegisteredTool, ToolFn, ToolFunction, ToolGroup, ToolRegistry};
pub use schema::{ParamSpec, ParamType, ToolSchema};
