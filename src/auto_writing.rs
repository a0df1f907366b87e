use crate::catalog::matches_search;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoWritingCategory {
    #[serde(rename = "padrao")]
    Standard,
    #[serde(rename = "personalizado")]
    Custom,
}

/// A snippet that can be injected into a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoWritingEntry {
    pub id: u32,
    pub title: String,
    pub text: String,
    pub preview: String,
    pub category: AutoWritingCategory,
}

impl AutoWritingEntry {
    fn matches(&self, term: &str) -> bool {
        matches_search(&[&self.title, &self.text, &self.preview], term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoWritingTab {
    #[default]
    All,
    Standard,
    Custom,
}

impl AutoWritingTab {
    fn admits(self, category: AutoWritingCategory) -> bool {
        match self {
            AutoWritingTab::All => true,
            AutoWritingTab::Standard => category == AutoWritingCategory::Standard,
            AutoWritingTab::Custom => category == AutoWritingCategory::Custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoWritingCatalog {
    entries: Vec<AutoWritingEntry>,
}

impl AutoWritingCatalog {
    pub fn new(entries: Vec<AutoWritingEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn builtin() -> Self {
        fn entry(
            id: u32,
            title: &str,
            text: &str,
            preview: &str,
            category: AutoWritingCategory,
        ) -> AutoWritingEntry {
            AutoWritingEntry {
                id,
                title: title.to_string(),
                text: text.to_string(),
                preview: preview.to_string(),
                category,
            }
        }

        Self::new(vec![
            entry(1, "Nome", "{{nome}}", "Insere o nome do lead", AutoWritingCategory::Standard),
            entry(2, "Sobrenome", "{{sobrenome}}", "Insere o sobrenome do lead", AutoWritingCategory::Standard),
            entry(7, "Teste Lead", "{{teste.lead}}", "Campo de teste do lead", AutoWritingCategory::Custom),
        ])
    }

    pub fn entries(&self) -> &[AutoWritingEntry] {
        &self.entries
    }

    pub fn get(&self, id: u32) -> Option<&AutoWritingEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries visible under `tab` whose title, text or preview match `term`
    pub fn filter(&self, term: &str, tab: AutoWritingTab) -> Vec<&AutoWritingEntry> {
        self.entries
            .iter()
            .filter(|e| tab.admits(e.category) && e.matches(term))
            .collect()
    }
}

impl Default for AutoWritingCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_entries() {
        let catalog = AutoWritingCatalog::builtin();
        assert_eq!(catalog.entries().len(), 3);
        assert_eq!(catalog.get(7).unwrap().text, "{{teste.lead}}");
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn test_filter_by_tab() {
        let catalog = AutoWritingCatalog::builtin();
        assert_eq!(catalog.filter("", AutoWritingTab::All).len(), 3);
        assert_eq!(catalog.filter("", AutoWritingTab::Standard).len(), 2);
        assert_eq!(catalog.filter("", AutoWritingTab::Custom).len(), 1);
    }

    #[test]
    fn test_filter_by_search() {
        let catalog = AutoWritingCatalog::builtin();

        let hits = catalog.filter("SOBRE", AutoWritingTab::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        // Every entry previews something about the lead
        assert_eq!(catalog.filter("lead", AutoWritingTab::All).len(), 3);
        assert!(catalog.filter("lead", AutoWritingTab::Custom).iter().all(|e| e.id == 7));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&AutoWritingCategory::Custom).unwrap();
        assert_eq!(json, "\"personalizado\"");
    }
}
