//! Rich-text documents
//!
//! Notes and AI summaries arrive as a recursive node tree (type tag,
//! optional literal text, optional children). The tree is never stored;
//! it is flattened to a linear markdown string on demand. Node kinds are a
//! closed set so rendering dispatches on an enum instead of inspecting
//! shapes at every call site.

use serde::{Deserialize, Serialize};

/// One node of a rich-text document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocNode {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    pub attrs: Option<NodeAttrs>,
    pub content: Vec<DocNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttrs {
    pub level: Option<u8>,
}

/// Closed set of node kinds. Unrecognized tags render their children and
/// nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Doc,
    Heading,
    Paragraph,
    BulletList,
    OrderedList,
    ListItem,
    HardBreak,
    Text,
    Unknown,
}

impl NodeKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "doc" => NodeKind::Doc,
            "heading" => NodeKind::Heading,
            "paragraph" => NodeKind::Paragraph,
            "bulletList" | "bullet_list" => NodeKind::BulletList,
            "orderedList" | "ordered_list" => NodeKind::OrderedList,
            "listItem" | "list_item" => NodeKind::ListItem,
            "hardBreak" | "hard_break" => NodeKind::HardBreak,
            "text" => NodeKind::Text,
            _ => NodeKind::Unknown,
        }
    }
}

impl DocNode {
    /// Flatten the tree to markdown. Block nodes end with a blank line,
    /// list items nest by two spaces per level.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        render(self, &mut out, 0, None);
        let trimmed = out.trim_end();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\n", trimmed)
        }
    }
}

fn render(node: &DocNode, out: &mut String, depth: usize, ordinal: Option<usize>) {
    match NodeKind::from_tag(&node.kind) {
        NodeKind::Doc | NodeKind::Unknown => {
            for child in &node.content {
                render(child, out, depth, None);
            }
        }
        NodeKind::Heading => {
            let level = node
                .attrs
                .as_ref()
                .and_then(|a| a.level)
                .unwrap_or(1)
                .clamp(1, 6);
            out.push_str(&"#".repeat(level as usize));
            out.push(' ');
            render_inline(node, out);
            out.push_str("\n\n");
        }
        NodeKind::Paragraph => {
            render_inline(node, out);
            out.push_str("\n\n");
        }
        NodeKind::BulletList => {
            for child in &node.content {
                render(child, out, depth, None);
            }
            if depth == 0 {
                out.push('\n');
            }
        }
        NodeKind::OrderedList => {
            for (i, child) in node.content.iter().enumerate() {
                render(child, out, depth, Some(i + 1));
            }
            if depth == 0 {
                out.push('\n');
            }
        }
        NodeKind::ListItem => {
            out.push_str(&"  ".repeat(depth));
            match ordinal {
                Some(n) => out.push_str(&format!("{}. ", n)),
                None => out.push_str("- "),
            }
            let mut line = String::new();
            let mut nested = String::new();
            for child in &node.content {
                match NodeKind::from_tag(&child.kind) {
                    NodeKind::BulletList | NodeKind::OrderedList => {
                        render(child, &mut nested, depth + 1, None)
                    }
                    _ => render_inline(child, &mut line),
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
            out.push_str(&nested);
        }
        NodeKind::HardBreak => out.push('\n'),
        NodeKind::Text => {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
        }
    }
}

/// Concatenate a node's inline content, ignoring block structure.
fn render_inline(node: &DocNode, out: &mut String) {
    if NodeKind::from_tag(&node.kind) == NodeKind::Text {
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        return;
    }
    if NodeKind::from_tag(&node.kind) == NodeKind::HardBreak {
        out.push('\n');
        return;
    }
    for child in &node.content {
        render_inline(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> DocNode {
        DocNode {
            kind: "text".into(),
            text: Some(s.into()),
            ..Default::default()
        }
    }

    fn node(kind: &str, content: Vec<DocNode>) -> DocNode {
        DocNode {
            kind: kind.into(),
            content,
            ..Default::default()
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let doc = node(
            "doc",
            vec![
                DocNode {
                    kind: "heading".into(),
                    attrs: Some(NodeAttrs { level: Some(2) }),
                    content: vec![text("Summary")],
                    ..Default::default()
                },
                node("paragraph", vec![text("Decisions were made.")]),
            ],
        );
        assert_eq!(doc.to_markdown(), "## Summary\n\nDecisions were made.\n");
    }

    #[test]
    fn test_nested_lists() {
        let doc = node(
            "doc",
            vec![node(
                "bulletList",
                vec![
                    node("listItem", vec![node("paragraph", vec![text("top")])]),
                    node(
                        "listItem",
                        vec![
                            node("paragraph", vec![text("parent")]),
                            node(
                                "bulletList",
                                vec![node("listItem", vec![node("paragraph", vec![text("child")])])],
                            ),
                        ],
                    ),
                ],
            )],
        );
        assert_eq!(doc.to_markdown(), "- top\n- parent\n  - child\n");
    }

    #[test]
    fn test_ordered_list_numbering() {
        let doc = node(
            "orderedList",
            vec![
                node("listItem", vec![text("first")]),
                node("listItem", vec![text("second")]),
            ],
        );
        assert_eq!(doc.to_markdown(), "1. first\n2. second\n");
    }

    #[test]
    fn test_hard_break() {
        let doc = node(
            "paragraph",
            vec![text("line one"), node("hardBreak", vec![]), text("line two")],
        );
        assert_eq!(doc.to_markdown(), "line one\nline two\n");
    }

    #[test]
    fn test_unknown_node_renders_children() {
        let doc = node(
            "doc",
            vec![node(
                "customBlock",
                vec![node("paragraph", vec![text("still here")])],
            )],
        );
        assert_eq!(doc.to_markdown(), "still here\n");
    }

    #[test]
    fn test_empty_doc() {
        assert_eq!(node("doc", vec![]).to_markdown(), "");
    }

    #[test]
    fn test_parses_from_json() {
        let doc: DocNode = serde_json::from_str(
            r#"{"type": "doc", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "hi"}]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.to_markdown(), "hi\n");
    }
}
