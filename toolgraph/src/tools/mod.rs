//! Tools and the name-keyed registry the dispatch loops look them up in.
//!
//! - [`Tool`]: one named callable with a JSON-schema input contract.
//! - [`ToolRegistry`]: registration at startup, exact-name lookup, `ToolSource` impl.
//! - Built-ins: [`StringLengthTool`], [`TripleTool`], [`TavilySearchTool`].

mod registry;
mod string_length;
mod tool;
mod triple;
pub mod web;

pub use tool::Tool;
pub use registry::ToolRegistry;
pub use string_length::{StringLengthTool, TOOL_GET_STRING_LENGTH};
pub use triple::{TripleTool, TOOL_TRIPLE};
pub use web::{
    SearchHit, SearchResults, TavilyConfig, TavilySearchTool, WebSearch, DEFAULT_TAVILY_BASE_URL,
    TOOL_TAVILY_SEARCH,
};
