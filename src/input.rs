use crate::node::{NodeId, Point};
use crate::transform::Viewport;

/// What a primary click landed on, as resolved by the renderer's hit-testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Empty canvas background
    Canvas,
    Node(NodeId),
    /// The "add" control below a node
    Affordance(NodeId),
    AddNodePanel,
    ConfigPanel,
    AutoWritingPanel,
    MessagePreviewPanel,
    ContextMenu,
    /// Chrome outside the canvas (toolbar, status bar)
    Toolbar,
}

/// Where a dragged connector was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Canvas,
    Node(NodeId),
}

/// Discrete input reported by the canvas renderer. Positions are in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PrimaryClick {
        target: ClickTarget,
        position: Point,
    },
    SecondaryClick {
        node: NodeId,
        position: Point,
    },
    /// A serialized connector descriptor released over the canvas
    Drop {
        payload: String,
        position: Point,
        onto: DropTarget,
    },
    /// A completed connect gesture
    Connect {
        source: NodeId,
        target: NodeId,
    },
    DragNode {
        node: NodeId,
        /// Pointer movement in screen space
        delta: Point,
    },
    ViewportChanged(Viewport),
    ToggleSelectMode,
    SetCampaignActive(bool),
}

/// Canvas pointer behavior chosen from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Nodes stay put; connect gestures are allowed
    #[default]
    Select,
    /// Nodes are draggable; connect gestures are ignored
    Move,
}
