use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    File,
}

/// One block of an outbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBlock {
    pub id: Ulid,
    pub kind: BlockKind,
    pub content: String,
    pub placeholder: String,
}

impl MessageBlock {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            kind: BlockKind::Text,
            content: content.into(),
            placeholder: "Digite aqui...".to_string(),
        }
    }

    pub fn file() -> Self {
        Self {
            id: Ulid::new(),
            kind: BlockKind::File,
            content: String::new(),
            placeholder: "Anexar arquivo...".to_string(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == BlockKind::Text
    }
}

/// Message content carried by messaging nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageConfig {
    pub stage_name: String,
    pub blocks: Vec<MessageBlock>,
    pub device: Option<String>,
    pub schedule_date_limit: bool,
    pub schedule_time_interval: bool,
}

impl MessageConfig {
    /// A message starting with a single empty text block
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            blocks: vec![MessageBlock::text("")],
            device: None,
            schedule_date_limit: false,
            schedule_time_interval: false,
        }
    }

    pub fn add_block(&mut self, kind: BlockKind) -> Ulid {
        let block = match kind {
            BlockKind::Text => MessageBlock::text(""),
            BlockKind::File => MessageBlock::file(),
        };
        let id = block.id;
        self.blocks.push(block);
        id
    }

    pub fn remove_block(&mut self, id: Ulid) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        self.blocks.len() != before
    }

    pub fn set_block_content(&mut self, id: Ulid, content: impl Into<String>) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Rename the stage; blank names fall back to the default
    pub fn rename_stage(&mut self, name: &str) {
        let trimmed = name.trim();
        self.stage_name = if trimmed.is_empty() {
            "Enviar mensagem WhatsApp".to_string()
        } else {
            trimmed.to_string()
        };
    }
}

/// Append `snippet` to the last text block. Returns false when there is none.
pub fn inject_snippet(blocks: &mut [MessageBlock], snippet: &str) -> bool {
    match blocks.iter_mut().rev().find(|b| b.is_text()) {
        Some(block) => {
            block.content.push_str(snippet);
            true
        }
        None => false,
    }
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("valid template pattern"))
}

/// Placeholder names referenced by `{{name}}` markers, in order, without duplicates
pub fn template_variables(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for capture in variable_pattern().captures_iter(text) {
        let name = capture[1].to_string();
        if !found.contains(&name) {
            found.push(name);
        }
    }
    found
}
