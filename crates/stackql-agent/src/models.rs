//! These models represent the objects passed around by the agent
//!
//! There are a few different related formats we need to interact with:
//! - openai messages/tools, sent from the agent to the LLM
//! - json-rpc tool calls, sent from the agent to the StackQL MCP server
//! - transcript turns, returned from the agent to whatever front end drives it
//!
//! We always immediately convert those wire formats into the internal structs here,
//! so the conversation loop never deals with raw json beyond tool arguments.
pub mod message;
pub mod role;
pub mod tool;
