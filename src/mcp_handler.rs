use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Serialize;

use crate::config::ServerConfig;
use crate::document::DocumentService;
use crate::error::{EditError, EditResult};
use crate::handlers::{
    ApplyListParams, CreateTextBoxParams, DescribeElementParams, FormatParagraphParams,
    InsertTextParams, MergeTableCellsParams, ModifyListParams, ReplaceTextParams,
    SetIndentationParams, SlideEditor, TransformElementParams,
};
use crate::local_service::LocalDocumentService;

const INSTRUCTIONS: &str = "\
Slide editor: edits slide decks through geometry- and paragraph-aware tools.

UNITS: positions, sizes, spacing and indents are in points (1 inch = 72 pt). \
A standard slide is 720x405 pt. Rotation is in degrees.

PARAGRAPHS: paragraph indices are 0-based. List tools take a list ([0, 2]) or a \
string (\"0,2-4\", \"all\"). A selection of non-adjacent paragraphs applies to the \
whole span between the first and last selected paragraph.

WORKFLOW:
1) describe_element to read an element's position, size, rotation and paragraphs
2) transform_element to move/resize/rotate; width/height keep the other axis \
unless scale_proportionally=true
3) format_paragraph / apply_list / modify_list / set_indentation for paragraph styling
4) insert_text / replace_text for text, merge_table_cells for tables";

/// Slide editing server exposing the editing tools over MCP
#[derive(Clone)]
pub struct SlideEditorServer {
    editor: SlideEditor,
    tool_router: ToolRouter<SlideEditorServer>,
}

impl SlideEditorServer {
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        Self {
            editor: SlideEditor::new(service),
            tool_router: Self::tool_router(),
        }
    }
}

/// Turn a tool outcome into an MCP result
fn respond<T: Serialize>(tool: &str, result: EditResult<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(output) => {
            let json = serde_json::to_string_pretty(&output).map_err(|e| {
                McpError::internal_error(format!("failed to serialize {} output: {}", tool, e), None)
            })?;
            log::info!("Tool {} succeeded", tool);
            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
        Err(error) => {
            log::warn!("Tool {} failed: {}", tool, error);
            Err(to_mcp_error(tool, error))
        }
    }
}

fn to_mcp_error(tool: &str, error: EditError) -> McpError {
    let message = format!("{}: {}", tool, error);
    if error.is_caller_error() {
        McpError::invalid_params(message, None)
    } else {
        McpError::internal_error(message, None)
    }
}

#[tool_router]
impl SlideEditorServer {
    #[tool(description = "Move, resize and/or rotate a shape, image or video. Positions and sizes in points, rotation in degrees")]
    pub async fn transform_element(
        &self,
        Parameters(params): Parameters<TransformElementParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("transform_element", self.editor.transform_element(params))
    }

    #[tool(description = "Create a text box on a slide at a position and size in points, optionally rotated and with initial text")]
    pub async fn create_text_box(
        &self,
        Parameters(params): Parameters<CreateTextBoxParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("create_text_box", self.editor.create_text_box(params))
    }

    #[tool(description = "Set paragraph alignment, line spacing and spacing above/below for one paragraph or all text")]
    pub async fn format_paragraph(
        &self,
        Parameters(params): Parameters<FormatParagraphParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("format_paragraph", self.editor.format_paragraph(params))
    }

    #[tool(description = "Apply bullets or numbering to paragraphs of a shape")]
    pub async fn apply_list(
        &self,
        Parameters(params): Parameters<ApplyListParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("apply_list", self.editor.apply_list(params))
    }

    #[tool(description = "Remove bullets from paragraphs or change their bullet/numbering preset")]
    pub async fn modify_list(
        &self,
        Parameters(params): Parameters<ModifyListParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("modify_list", self.editor.modify_list(params))
    }

    #[tool(description = "Set start, first-line and end indentation (points) for paragraphs of a shape")]
    pub async fn set_indentation(
        &self,
        Parameters(params): Parameters<SetIndentationParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("set_indentation", self.editor.set_indentation(params))
    }

    #[tool(description = "Insert text into a shape at the start of a paragraph or at a character offset")]
    pub async fn insert_text(
        &self,
        Parameters(params): Parameters<InsertTextParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("insert_text", self.editor.insert_text(params))
    }

    #[tool(description = "Replace the text of one paragraph, or all text of a shape")]
    pub async fn replace_text(
        &self,
        Parameters(params): Parameters<ReplaceTextParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("replace_text", self.editor.replace_text(params))
    }

    #[tool(description = "Merge a rectangular block of cells in a table")]
    pub async fn merge_table_cells(
        &self,
        Parameters(params): Parameters<MergeTableCellsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("merge_table_cells", self.editor.merge_table_cells(params))
    }

    #[tool(description = "Describe an element: position, size and rotation in points/degrees, plus its paragraph ranges")]
    pub async fn describe_element(
        &self,
        Parameters(params): Parameters<DescribeElementParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("describe_element", self.editor.describe_element(params))
    }
}

#[tool_handler]
impl ServerHandler for SlideEditorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

/// Set up the MCP server with our tools and serve it on stdio
pub async fn start_server(config: ServerConfig) -> Result<()> {
    log::info!(
        "Starting slide editor on workspace {} (snapshot cache: {})",
        config.workspace.display(),
        config.cache_snapshots
    );

    let service = Arc::new(LocalDocumentService::new(
        config.workspace.clone(),
        config.cache_snapshots,
    ));
    let server = SlideEditorServer::new(service.clone());

    let running = server
        .serve(stdio())
        .await
        .inspect_err(|error| log::error!("serving error: {:?}", error))?;

    let quit_reason = running.waiting().await?;
    log::info!("Server stopped: {:?}", quit_reason);
    if let Some((entries, slides, elements)) = service.cache_stats() {
        log::info!(
            "Snapshot cache held {} deck(s), {} slide(s), {} element(s)",
            entries,
            slides,
            elements
        );
    }

    Ok(())
}
