//! Pure mapping from a [`Block`] to terminal lines.
//!
//! Dispatch is total over all variants: every block renders something, in
//! input order, including a visible placeholder for unrecognized types. Table
//! blocks additionally carry their own `(columns, rows)` so the caller can
//! offer a client-side CSV export independent of the thread-level export.

use crate::chat::types::{Block, EMPHASIS_WARNING};
use crate::export;
use console::style;

/// Exportable payload of a table block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExport {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub filename: &'static str,
}

/// Displayable form of one block.
#[derive(Debug, Clone, Default)]
pub struct RenderedBlock {
    pub lines: Vec<String>,
    pub table_export: Option<TableExport>,
    pub choice_ids: Vec<String>,
}

pub fn render_blocks(blocks: &[Block]) -> Vec<RenderedBlock> {
    blocks.iter().map(render_block).collect()
}

pub fn render_block(block: &Block) -> RenderedBlock {
    match block {
        Block::Text {
            text,
            emphasis,
            subtle,
        } => render_text(text, emphasis.as_deref(), *subtle),
        Block::Card { title, kv } => render_card(title, kv),
        Block::Table {
            caption,
            columns,
            rows,
            footnote,
        } => render_table(caption.as_deref(), columns, rows, footnote.as_deref()),
        Block::Choice { prompt, choices } => {
            let mut lines = vec![style(prompt).bold().to_string()];
            let mut choice_ids = Vec::with_capacity(choices.len());
            for choice in choices {
                let mut line = format!("  [{}] {}", choice.id, choice.label);
                if let Some(description) = &choice.description {
                    line.push_str(&format!(" - {description}"));
                }
                lines.push(line);
                choice_ids.push(choice.id.clone());
            }
            RenderedBlock {
                lines,
                choice_ids,
                ..RenderedBlock::default()
            }
        }
        Block::Chips { items } => {
            let tags: Vec<String> = items.iter().map(|c| format!("[{}]", c.label)).collect();
            RenderedBlock {
                lines: vec![tags.join(" ")],
                ..RenderedBlock::default()
            }
        }
        Block::Unknown => RenderedBlock {
            lines: vec![style("[unsupported block]").dim().to_string()],
            ..RenderedBlock::default()
        },
    }
}

fn render_text(text: &str, emphasis: Option<&str>, subtle: bool) -> RenderedBlock {
    // Emphasis and subtle are independent axes; a subtle warning keeps
    // both the marker and the dim modifier.
    let mut styled = if emphasis == Some(EMPHASIS_WARNING) {
        style(format!("! {text}")).yellow()
    } else {
        style(text.to_string())
    };
    if subtle {
        styled = styled.dim();
    }
    RenderedBlock {
        lines: vec![styled.to_string()],
        ..RenderedBlock::default()
    }
}

fn render_card(title: &str, kv: &[(String, String)]) -> RenderedBlock {
    // Pairs with empty values are dropped before display.
    let entries: Vec<&(String, String)> = kv.iter().filter(|(_, v)| !v.is_empty()).collect();
    let key_width = entries.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);

    let mut lines = vec![style(title).bold().to_string()];
    for (key, value) in entries {
        lines.push(format!("  {key:<key_width$}  {value}"));
    }
    RenderedBlock {
        lines,
        ..RenderedBlock::default()
    }
}

fn render_table(
    caption: Option<&str>,
    columns: &[String],
    rows: &[Vec<String>],
    footnote: Option<&str>,
) -> RenderedBlock {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 3);
    if let Some(caption) = caption {
        lines.push(style(caption).bold().to_string());
    }
    lines.push(format_row(columns, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row, &widths));
    }
    if let Some(footnote) = footnote {
        lines.push(style(footnote).dim().to_string());
    }

    RenderedBlock {
        lines,
        table_export: Some(TableExport {
            columns: columns.to_vec(),
            rows: rows.to_vec(),
            filename: export::BLOCK_EXPORT_FILENAME,
        }),
        ..RenderedBlock::default()
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
