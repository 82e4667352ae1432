//! # Related Lines - Heuristic Code-Relationship Analysis
//!
//! Given a source file and a target line, find the other lines that are
//! semantically related to it, plus a small context summary that can be handed to a
//! language model to explain the code.
//!
//! ## Overview
//!
//! Analysis is purely lexical: regular expressions over individual lines, with no
//! parsing. Five independent finders each propose related lines:
//!
//! - **Variables**: lines sharing an identifier with the target
//! - **Functions**: definitions of functions called on the target
//! - **Control flow**: block boundaries, `else`/`catch` chains, loop jumps, switch cases
//! - **Imports**: import and re-export statements binding identifiers on the target
//! - **Class members**: members of the enclosing class used on the target
//!
//! Relationship discovery is fail-open (a failing finder is logged and skipped);
//! context construction is fail-closed (errors abort the analysis).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ MCP client       │   │ NDJSON host      │   │ CLI `analyze`    │
//! └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘
//!          │ stdio                │ Request/Response     │
//! ┌────────▼─────────┐   ┌────────▼─────────┐            │
//! │ McpServer        ├──►│ SessionRegistry  │            │
//! └──────────────────┘   └────────┬─────────┘            │
//!                        ┌────────▼─────────────────────▼─┐
//!                        │ RelationAnalyzer (5 finders)   │
//!                        └────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`analysis`]: the finders, their composition and context building
//! - [`document`]: line-indexed document access
//! - [`session`]: per-document sessions with bounded history
//! - [`messages`]: tagged-union requests and responses for hosts
//! - [`mcp_server`]: MCP protocol server implementation with tools and prompts
//! - [`types`]: MCP request/response types with JSON schema
//! - [`config`]: configuration with environment variable overrides
//! - [`error`]: error types
//! - [`paths`]: platform config locations
//!
//! ## Usage Example
//!
//! ```
//! use related_lines::analysis::find_related_lines;
//! use related_lines::document::TextDocument;
//!
//! let document = TextDocument::from_text(
//!     "const x = 5;\nlet y = 10;\nconsole.log(x + y);",
//!     "javascript",
//! );
//! assert_eq!(find_related_lines(&document, 2), vec![0, 1, 2]);
//! ```

/// Relationship finders, their composition and context building
pub mod analysis;

/// Configuration management with environment variable overrides
pub mod config;

/// Line-indexed documents and language detection
pub mod document;

/// Error types and utilities
pub mod error;

/// MCP server implementation with tools and prompts
pub mod mcp_server;

/// Tagged-union messages dispatched by the session registry
pub mod messages;

/// Platform-specific config locations
pub mod paths;

/// Open documents and their analysis history
pub mod session;

/// MCP request/response types with JSON schema definitions
pub mod types;
