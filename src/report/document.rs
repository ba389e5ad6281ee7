//! Structured report content, independent of any rendering backend.

use std::path::PathBuf;

use serde::Serialize;

/// One labelled row of a two-column report table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub value: String,
}

impl TableRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Block {
    Title(String),
    Heading(String),
    Table(Vec<TableRow>),
    /// Image file drawn at a fixed size, in inches.
    Image {
        path: PathBuf,
        width_in: f32,
        height_in: f32,
    },
    /// Vertical gap in points.
    Spacer(f32),
    /// Small italic paragraph, wrapped to the page width.
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_image(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, Block::Image { .. }))
    }

    /// Value of the first table row with this label, across all tables.
    pub fn table_value(&self, label: &str) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Table(rows) => rows
                .iter()
                .find(|r| r.label == label)
                .map(|r| r.value.as_str()),
            _ => None,
        })
    }

    /// Whether any visible text in the document contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.blocks.iter().any(|b| match b {
                Block::Title(t) | Block::Heading(t) | Block::Note(t) => t.contains(needle),
                Block::Table(rows) => rows
                    .iter()
                    .any(|r| r.label.contains(needle) || r.value.contains(needle)),
                Block::Image { .. } | Block::Spacer(_) => false,
            })
    }
}
