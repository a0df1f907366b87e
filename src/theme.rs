use crate::edge::{Edge, EdgeStyleState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// Named colors resolved against the current theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Primary,
    MutedForeground,
    Border,
    Background,
    Foreground,
    Card,
}

impl ColorToken {
    pub fn rgb(self, theme: Theme) -> [u8; 3] {
        match (self, theme) {
            (ColorToken::Primary, Theme::Dark) => [250, 250, 250],
            (ColorToken::Primary, Theme::Light) => [24, 24, 27],
            (ColorToken::MutedForeground, Theme::Dark) => [161, 161, 170],
            (ColorToken::MutedForeground, Theme::Light) => [113, 113, 122],
            (ColorToken::Border, Theme::Dark) => [39, 39, 42],
            (ColorToken::Border, Theme::Light) => [228, 228, 231],
            (ColorToken::Background, Theme::Dark) => [17, 17, 17],
            (ColorToken::Background, Theme::Light) => [255, 255, 255],
            (ColorToken::Foreground, Theme::Dark) => [250, 250, 250],
            (ColorToken::Foreground, Theme::Light) => [9, 9, 11],
            (ColorToken::Card, Theme::Dark) => [31, 41, 55],
            (ColorToken::Card, Theme::Light) => [243, 244, 246],
        }
    }
}

/// Stroke used to draw an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStroke {
    pub color: ColorToken,
    pub width: f32,
    /// Dash and gap lengths; `None` draws a solid line
    pub dash: Option<(f32, f32)>,
}

impl EdgeStroke {
    pub fn for_edge(edge: &Edge) -> Self {
        match edge.style_state {
            EdgeStyleState::Active => Self {
                color: ColorToken::Primary,
                width: 2.0,
                dash: Some((5.0, 5.0)),
            },
            EdgeStyleState::Paused => Self {
                color: ColorToken::MutedForeground,
                width: 2.0,
                dash: None,
            },
        }
    }

    pub fn rgb(&self, theme: Theme) -> [u8; 3] {
        self.color.rgb(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::CampaignMode;
    use crate::node::NodeId;

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
    }

    #[test]
    fn test_edge_stroke_by_state() {
        let active = Edge::new(NodeId::new("a"), NodeId::new("b"), CampaignMode::new(true));
        let stroke = EdgeStroke::for_edge(&active);
        assert_eq!(stroke.color, ColorToken::Primary);
        assert_eq!(stroke.dash, Some((5.0, 5.0)));

        let paused = Edge::new(NodeId::new("a"), NodeId::new("b"), CampaignMode::new(false));
        let stroke = EdgeStroke::for_edge(&paused);
        assert_eq!(stroke.color, ColorToken::MutedForeground);
        assert_eq!(stroke.dash, None);
        assert_eq!(stroke.width, 2.0);
        assert_eq!(stroke.rgb(Theme::Light), [113, 113, 122]);
    }

    #[test]
    fn test_tokens_differ_between_themes() {
        assert_ne!(ColorToken::Background.rgb(Theme::Dark), ColorToken::Background.rgb(Theme::Light));
    }
}
