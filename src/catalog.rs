use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Icon and color reference used to render a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualTag {
    pub icon: String,
    pub color: String,
}

impl VisualTag {
    pub fn new(icon: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            color: color.into(),
        }
    }
}

/// A selectable connector, tagged with the category it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub visual_tag: VisualTag,
    pub description: String,
    #[serde(default)]
    pub category: String,
}

/// Connectors whose nodes carry an outbound message
const MESSAGING_CONNECTORS: &[&str] = &["WhatsApp", "WhatsApp Oficial"];

impl ConnectorDescriptor {
    pub fn new(
        name: impl Into<String>,
        visual_tag: VisualTag,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            visual_tag,
            description: description.into(),
            category: category.into(),
        }
    }

    pub fn is_messaging(&self) -> bool {
        MESSAGING_CONNECTORS.contains(&self.name.as_str())
    }

    /// Parse the serialized descriptor carried by a drag-and-drop gesture
    pub fn from_drag_payload(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| FlowError::InvalidDragPayload(e.to_string()))
    }

    pub fn to_drag_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn matches(&self, term: &str) -> bool {
        matches_search(&[&self.name, &self.description], term)
    }
}

/// Case-insensitive substring match over any of the given fields
pub(crate) fn matches_search(fields: &[&str], term: &str) -> bool {
    let term = term.to_lowercase();
    fields.iter().any(|field| field.to_lowercase().contains(&term))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorEntry {
    pub name: String,
    #[serde(flatten)]
    pub visual_tag: VisualTag,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorCategory {
    pub category: String,
    pub short_name: String,
    pub icon: String,
    pub description: String,
    pub items: Vec<ConnectorEntry>,
}

impl ConnectorCategory {
    fn descriptors(&self) -> impl Iterator<Item = ConnectorDescriptor> + '_ {
        self.items.iter().map(|item| {
            ConnectorDescriptor::new(
                item.name.clone(),
                item.visual_tag.clone(),
                item.description.clone(),
                self.category.clone(),
            )
        })
    }
}

/// Tab selected in the add-node panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogTab {
    #[default]
    All,
    Category(String),
}

/// Static, read-only catalog of connectors grouped by category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorCatalog {
    categories: Vec<ConnectorCategory>,
}

impl ConnectorCatalog {
    pub fn new(categories: Vec<ConnectorCategory>) -> Self {
        Self { categories }
    }

    /// Load a catalog from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn builtin() -> Self {
        fn entry(name: &str, icon: &str, color: &str, description: &str) -> ConnectorEntry {
            ConnectorEntry {
                name: name.to_string(),
                visual_tag: VisualTag::new(icon, color),
                description: description.to_string(),
            }
        }

        let channels = ConnectorCategory {
            category: "Canais".to_string(),
            short_name: "Canais".to_string(),
            icon: "message-square".to_string(),
            description: "Por onde você se comunica".to_string(),
            items: vec![
                entry("WhatsApp", "message-square", "green-500", "Mensagens WhatsApp"),
                entry("WhatsApp Oficial", "message-square", "green-600", "API Oficial WhatsApp"),
                entry("SMS", "smartphone", "gray-500", "Mensagens SMS"),
                entry("Email", "mail", "red-500", "Email Marketing"),
                entry("Performance", "mail", "orange-500", "Email com performance otimizada"),
                entry("Torpedo de Voz", "phone", "purple-500", "Mensagens de voz"),
            ],
        };

        let actions = ConnectorCategory {
            category: "Ações".to_string(),
            short_name: "Ações".to_string(),
            icon: "tag".to_string(),
            description: "O que você faz com os contatos".to_string(),
            items: vec![
                entry("Tag", "tag", "yellow-600", "Marcação de contatos"),
                entry("Tag Add", "tag", "green-700", "Adicionar tags"),
                entry("Tag Remove", "tag", "red-700", "Remover tags"),
                entry("Nota", "sticky-note", "amber-500", "Anotações e lembretes"),
                entry("Clonar", "copy", "gray-700", "Duplicar elementos"),
                entry("Email Aberto", "mail", "gray-700", "Detectar abertura de email"),
                entry("Marketing", "bar-chart", "gray-600", "Métricas de marketing"),
                entry("Pixel", "code", "pink-500", "Tracking de eventos"),
                entry("CRM", "users", "indigo-600", "Gestão de relacionamento"),
            ],
        };

        let controls = ConnectorCategory {
            category: "Controles".to_string(),
            short_name: "Controles".to_string(),
            icon: "zap".to_string(),
            description: "Como você gerencia o fluxo".to_string(),
            items: vec![
                entry("Condições", "database", "indigo-500", "Lógica condicional"),
                entry("Timer", "timer", "gray-600", "Atrasos e agendamentos"),
                entry("Aquecimento", "zap", "purple-600", "Preparação de conta"),
                entry("Webhook", "webhook", "gray-500", "Integrações HTTP"),
                entry("Sucesso", "check-circle", "green-600", "Condição de sucesso"),
                entry("Falha", "x-circle", "red-600", "Tratamento de erro"),
                entry("Avançado", "bar-chart", "purple-700", "Análises avançadas"),
            ],
        };

        Self::new(vec![channels, actions, controls])
    }

    pub fn categories(&self) -> &[ConnectorCategory] {
        &self.categories
    }

    /// Flattened view of every connector in catalog order
    pub fn all(&self) -> Vec<ConnectorDescriptor> {
        self.categories.iter().flat_map(|c| c.descriptors()).collect()
    }

    pub fn find(&self, name: &str) -> Option<ConnectorDescriptor> {
        self.categories
            .iter()
            .flat_map(|c| c.descriptors())
            .find(|d| d.name == name)
    }

    /// Connectors of any category whose name or description matches
    pub fn filter(&self, term: &str) -> Vec<ConnectorDescriptor> {
        self.all().into_iter().filter(|d| d.matches(term)).collect()
    }

    pub fn filter_category(&self, category: &str, term: &str) -> Vec<ConnectorDescriptor> {
        self.categories
            .iter()
            .filter(|c| c.category == category)
            .flat_map(|c| c.descriptors())
            .filter(|d| d.matches(term))
            .collect()
    }

    pub fn filter_tab(&self, tab: &CatalogTab, term: &str) -> Vec<ConnectorDescriptor> {
        match tab {
            CatalogTab::All => self.filter(term),
            CatalogTab::Category(category) => self.filter_category(category, term),
        }
    }
}

impl Default for ConnectorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
