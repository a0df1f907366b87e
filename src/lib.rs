// Flow Builder - Core Library

pub mod auto_writing;
pub mod catalog;
pub mod config;
pub mod edge;
pub mod editor;
pub mod error;
pub mod event;
pub mod graph;
pub mod input;
pub mod message;
pub mod node;
pub mod panels;
pub mod placement;
pub mod selection;
pub mod theme;
pub mod transform;
pub mod ui;

// Re-export main types for convenience
pub use auto_writing::{AutoWritingCatalog, AutoWritingCategory, AutoWritingEntry, AutoWritingTab};
pub use catalog::{CatalogTab, ConnectorCatalog, ConnectorCategory, ConnectorDescriptor, VisualTag};
pub use config::EditorConfig;
pub use edge::{CampaignMode, Edge, EdgeId, EdgeStyleState};
pub use editor::FlowEditor;
pub use error::{FlowError, Result};
pub use event::{EventType, GraphEvent};
pub use graph::{DeleteOutcome, GraphStore, TRIGGER_NODE_ID};
pub use input::{ClickTarget, DropTarget, InputEvent, InteractionMode};
pub use message::{inject_snippet, template_variables, BlockKind, MessageBlock, MessageConfig};
pub use node::{Node, NodeConfig, NodeId, NodeKind, Point, Rectangle, Size};
pub use panels::{PanelCoordinator, PanelKind};
pub use placement::{clamp_to_viewport, PlacementEngine};
pub use selection::{ContextMenu, SelectionController, SelectionMode};
pub use theme::{ColorToken, EdgeStroke, Theme};
pub use transform::{Viewport, ZoomLimits};
pub use ui::FlowBuilderApp;

/// Install the `tracing` subscriber used by the binaries. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flow_builder=info,warn"));
    // A second call (tests, demos) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
