use crate::config::Config;
use crate::document::{Document, TextDocument};
use crate::error::RelatedLinesError;
use crate::session::SessionRegistry;
use crate::types::*;

use anyhow::{Context, Result};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    handler::server::{router::prompt::PromptRouter, tool::ToolRouter, wrapper::Parameters},
    model::*,
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RelatedLinesMcpServer {
    sessions: Arc<RwLock<SessionRegistry>>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl RelatedLinesMcpServer {
    /// Create a new server from the default configuration sources
    pub fn new() -> Result<Self> {
        let config = Config::new().context("Failed to load configuration")?;
        Ok(Self::with_registry(SessionRegistry::from_config(&config)))
    }

    /// Create a new server around an existing session registry
    pub fn with_registry(registry: SessionRegistry) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(registry)),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    /// Shared handle to the session registry
    pub fn sessions(&self) -> Arc<RwLock<SessionRegistry>> {
        Arc::clone(&self.sessions)
    }
}

/// Open `path` from disk unless a session for it already exists.
fn ensure_open(sessions: &mut SessionRegistry, path: &str) -> Result<(), RelatedLinesError> {
    if !sessions.contains(path) {
        sessions.open_file(Path::new(path))?;
    }
    Ok(())
}

fn document_for<'a>(
    sessions: &'a SessionRegistry,
    path: &str,
) -> Result<&'a TextDocument, RelatedLinesError> {
    sessions
        .get(path)
        .map(|session| session.document())
        .ok_or_else(|| crate::error::SessionError::NotFound(path.to_string()).into())
}

/// Pair each related line with its text
fn with_text(document: &TextDocument, lines: &[usize]) -> Vec<RelatedLine> {
    lines
        .iter()
        .filter_map(|&line| {
            document.line_at(line).ok().map(|text| RelatedLine {
                line,
                text: text.to_string(),
            })
        })
        .collect()
}

impl RelatedLinesMcpServer {
    async fn analyze(
        &self,
        req: AnalyzeSelectionRequest,
    ) -> Result<AnalyzeSelectionResponse, RelatedLinesError> {
        let mut sessions = self.sessions.write().await;
        ensure_open(&mut sessions, &req.path)?;

        let result = sessions.analyze_selection(&req.path, req.selection())?;
        let prompt = if req.include_prompt {
            Some(sessions.prompt_for(&req.path, &result)?)
        } else {
            None
        };

        let document = document_for(&sessions, &req.path)?;
        Ok(AnalyzeSelectionResponse {
            related_lines: with_text(document, &result.related_lines),
            path: req.path,
            selection: result.selection,
            context: result.context,
            prompt,
        })
    }
}

#[tool_router(router = tool_router)]
impl RelatedLinesMcpServer {
    #[tool(
        description = "Open a document for analysis, or refresh it if already open. Reads the file from disk unless text is supplied."
    )]
    async fn open_document(
        &self,
        Parameters(req): Parameters<OpenDocumentRequest>,
    ) -> Result<String, String> {
        // Validate request inputs
        req.validate()?;

        let mut sessions = self.sessions.write().await;
        let outcome = match &req.text {
            Some(text) => {
                let language_id = req.language_id.clone().unwrap_or_else(|| {
                    crate::document::language_id_for_path(Path::new(&req.path)).to_string()
                });
                sessions
                    .open(req.path.clone(), text, &language_id)
                    .map_err(|e| format!("{:#}", e))?
            }
            None => sessions
                .open_file(Path::new(&req.path))
                .map_err(|e| format!("{:#}", e))?
                .1,
        };

        let document = document_for(&sessions, &req.path).map_err(|e| format!("{:#}", e))?;
        let response = OpenDocumentResponse {
            outcome,
            language_id: document.language_id().to_string(),
            line_count: document.line_count(),
            path: req.path,
        };

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }

    #[tool(description = "Close a document and discard its analysis history")]
    async fn close_document(
        &self,
        Parameters(req): Parameters<CloseDocumentRequest>,
    ) -> Result<String, String> {
        req.validate()?;

        let was_open = self.sessions.write().await.close(&req.path);
        let response = CloseDocumentResponse {
            path: req.path,
            was_open,
        };

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }

    #[tool(description = "List the open documents")]
    async fn list_documents(
        &self,
        Parameters(_req): Parameters<ListDocumentsRequest>,
    ) -> Result<String, String> {
        let response = ListDocumentsResponse {
            documents: self.sessions.read().await.list(),
        };

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }

    #[tool(
        description = "Find the lines related to a target line (shared variables, called functions, enclosing control flow, imports, class members). Opens the file if needed."
    )]
    async fn find_related_lines(
        &self,
        Parameters(req): Parameters<FindRelatedLinesRequest>,
    ) -> Result<String, String> {
        // Validate request inputs
        req.validate()?;

        let mut sessions = self.sessions.write().await;
        ensure_open(&mut sessions, &req.path).map_err(|e| format!("{:#}", e))?;

        let related = sessions
            .find_related_lines(&req.path, req.line)
            .map_err(|e| format!("{:#}", e))?;
        let document = document_for(&sessions, &req.path).map_err(|e| format!("{:#}", e))?;
        let response = FindRelatedLinesResponse {
            related_lines: with_text(document, &related),
            path: req.path,
            line: req.line,
        };

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }

    #[tool(
        description = "Analyze a selection: related lines, enclosing function and class, nearby variables, imports, and a prompt for explaining the code. Opens the file if needed."
    )]
    async fn analyze_selection(
        &self,
        Parameters(req): Parameters<AnalyzeSelectionRequest>,
    ) -> Result<String, String> {
        // Validate request inputs
        req.validate()?;

        let response = self.analyze(req).await.map_err(|e| format!("{:#}", e))?;

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }
}

// Prompts for slash commands
#[prompt_router]
impl RelatedLinesMcpServer {
    #[prompt(
        name = "explain-selection",
        description = "Explain a selection of code together with the lines related to it"
    )]
    async fn explain_selection_prompt(
        &self,
        Parameters(args): Parameters<serde_json::Value>,
    ) -> Result<GetPromptResult, McpError> {
        let path = args
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing 'path' argument", None))?;
        let start_line = args.get("start_line").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
        let end_line = args
            .get("end_line")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize);

        let req = AnalyzeSelectionRequest {
            path: path.to_string(),
            start_line,
            end_line,
            include_prompt: true,
        };
        req.validate()
            .map_err(|e| McpError::invalid_params(e, None))?;

        let response = self
            .analyze(req)
            .await
            .map_err(|e| McpError::invalid_params(format!("{:#}", e), None))?;
        let context = response.prompt.unwrap_or_default();

        let messages = vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Explain what the selected code in '{}' does and how the related lines connect to it.\n\n{}",
                path, context
            ),
        )];

        Ok(GetPromptResult {
            description: Some(format!(
                "Explain lines {}-{} of {}",
                response.selection.start_line + 1,
                response.selection.end_line + 1,
                path
            )),
            messages,
        })
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler]
impl ServerHandler for RelatedLinesMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "related-lines".into(),
                title: Some("Related Lines - Heuristic Code Relationship Analysis".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Finds the lines of a source file related to a target line. \
                Use find_related_lines for a quick lookup and analyze_selection for related lines plus context \
                and a ready-made prompt. Line numbers are 0-based."
                    .into(),
            ),
        }
    }
}

impl RelatedLinesMcpServer {
    pub async fn serve_stdio() -> Result<()> {
        tracing::info!("Starting related-lines MCP server");

        let server = Self::new().context("Failed to create MCP server")?;

        let transport = rmcp::transport::io::stdio();

        server.serve(transport).await?.waiting().await?;

        Ok(())
    }
}
