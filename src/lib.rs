/// Slide Editor MCP - A Model Context Protocol server for editing slide decks
/// Resolves points/EMU geometry, paragraph ranges and element transforms for each edit

pub mod cache_system;
pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod local_service;
pub mod logging;
pub mod mcp_handler;
pub mod mutation;
pub mod paragraphs;
pub mod scope;
pub mod shared_utils;
pub mod transform;
pub mod units;

/// Re-export the server and editor for direct usage
pub use handlers::SlideEditor;
pub use mcp_handler::{SlideEditorServer, start_server};

/// Re-export the geometry and text-range engine
pub use paragraphs::{
    ParagraphRange,
    TextRangeSelector,
    TextRun,
    count_paragraphs,
    paragraph_ranges,
    range_for_index,
    range_for_indices,
};
pub use scope::{index_scope, scope_label};
pub use transform::{AffineTransform, ElementGeometry, GeometryEdit, Position, compose};
pub use units::{EMU_PER_POINT, Length, Unit, emu_to_points, points_to_emu};

/// Re-export the document collaborator contract
pub use document::{DocumentService, DocumentSnapshot, SubmitReceipt};
pub use error::{EditError, EditResult};
pub use local_service::LocalDocumentService;
pub use mutation::MutationRequest;
