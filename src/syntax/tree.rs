//! Document tree nodes and their traversal.

use smol_str::SmolStr;

use crate::base::DocId;
use crate::hir::{BlockId, DocumentSource, RawDefinition, RawReference};

/// The kind of a tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Section,
    /// An inline block. References inside share a [`BlockId`].
    Paragraph,
    /// An object description, e.g. `.. class:: Widget`.
    Definition { objtype: SmolStr, name: SmolStr },
    /// A cross-reference, e.g. `:class:`Widget``.
    Reference { tag: SmolStr, target: SmolStr },
    Text,
}

/// A node of a parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// First line of the node (1-indexed), if the parser knows it.
    pub line: Option<u32>,
    /// Last line of the node itself, when it spans several lines.
    pub end_line: Option<u32>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, line: Option<u32>, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            line,
            end_line: None,
            children,
        }
    }

    pub fn section(line: u32, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::Section, Some(line), children)
    }

    pub fn paragraph(line: u32, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::Paragraph, Some(line), children)
    }

    pub fn definition(
        objtype: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
        line: u32,
        children: Vec<SyntaxNode>,
    ) -> Self {
        let kind = NodeKind::Definition {
            objtype: objtype.into(),
            name: name.into(),
        };
        Self::new(kind, Some(line), children)
    }

    pub fn reference(tag: impl Into<SmolStr>, target: impl Into<SmolStr>, line: u32) -> Self {
        let kind = NodeKind::Reference {
            tag: tag.into(),
            target: target.into(),
        };
        Self::new(kind, Some(line), Vec::new())
    }

    pub fn text(line: u32) -> Self {
        Self::new(NodeKind::Text, Some(line), Vec::new())
    }

    /// Set the last line of this node.
    pub fn with_end_line(mut self, end_line: u32) -> Self {
        self.end_line = Some(end_line);
        self
    }

    /// Drop the line information, as a parser might for synthesized nodes.
    pub fn without_line(mut self) -> Self {
        self.line = None;
        self.end_line = None;
        self
    }

    /// The last line covered by this node and all of its descendants.
    pub fn last_line(&self) -> Option<u32> {
        let own = self.end_line.or(self.line);
        self.children
            .iter()
            .filter_map(SyntaxNode::last_line)
            .chain(own)
            .max()
    }

    /// Pre-order traversal of this node and its descendants, tagging each
    /// node with the paragraph block it belongs to.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![(self, None)],
            next_block: 0,
        }
    }
}

/// Pre-order iterator over a subtree.
///
/// Block ids are assigned to paragraphs in traversal order.
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    stack: Vec<(&'a SyntaxNode, Option<BlockId>)>,
    next_block: u32,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (&'a SyntaxNode, Option<BlockId>);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, outer) = self.stack.pop()?;
        let block = if node.kind == NodeKind::Paragraph {
            let id = BlockId(self.next_block);
            self.next_block += 1;
            Some(id)
        } else {
            outer
        };
        self.stack
            .extend(node.children.iter().rev().map(|child| (child, block)));
        Some((node, block))
    }
}

/// A parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTree {
    doc: DocId,
    root: SyntaxNode,
}

impl DocumentTree {
    pub fn new(doc: DocId, children: Vec<SyntaxNode>) -> Self {
        Self {
            doc,
            root: SyntaxNode::new(NodeKind::Document, None, children),
        }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }
}

impl DocumentSource for DocumentTree {
    fn document(&self) -> DocId {
        self.doc
    }

    fn definitions(&self) -> impl Iterator<Item = RawDefinition<'_>> + '_ {
        self.root.descendants().filter_map(|(node, _)| match &node.kind {
            NodeKind::Definition { objtype, name } => Some(RawDefinition {
                objtype: objtype.as_str(),
                name: name.as_str(),
                line: node.line,
                end_line: node.last_line(),
            }),
            _ => None,
        })
    }

    fn references(&self) -> impl Iterator<Item = RawReference<'_>> + '_ {
        self.root.descendants().filter_map(|(node, block)| match &node.kind {
            NodeKind::Reference { tag, target } => Some(RawReference {
                tag: tag.as_str(),
                target: target.as_str(),
                line: node.line,
                block,
            }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentTree {
        DocumentTree::new(
            DocId::new(0),
            vec![SyntaxNode::section(
                1,
                vec![
                    SyntaxNode::paragraph(
                        3,
                        vec![
                            SyntaxNode::text(3),
                            SyntaxNode::reference("mod", "os", 3),
                            SyntaxNode::reference("func", "os.getcwd", 4),
                        ],
                    ),
                    SyntaxNode::definition(
                        "class",
                        "Widget",
                        6,
                        vec![
                            SyntaxNode::paragraph(8, vec![SyntaxNode::reference("class", "Widget", 8)]),
                            SyntaxNode::definition(
                                "method",
                                "Widget.draw",
                                10,
                                vec![SyntaxNode::paragraph(12, vec![SyntaxNode::text(12)]).with_end_line(14)],
                            ),
                        ],
                    ),
                ],
            )],
        )
    }

    #[test]
    fn test_definitions_in_document_order() {
        let tree = sample();
        let defs: Vec<_> = tree.definitions().collect();

        assert_eq!(
            defs,
            vec![
                RawDefinition {
                    objtype: "class",
                    name: "Widget",
                    line: Some(6),
                    end_line: Some(14),
                },
                RawDefinition {
                    objtype: "method",
                    name: "Widget.draw",
                    line: Some(10),
                    end_line: Some(14),
                },
            ]
        );
    }

    #[test]
    fn test_references_carry_blocks() {
        let tree = sample();
        let refs: Vec<_> = tree.references().map(|r| (r.target, r.line, r.block)).collect();

        assert_eq!(
            refs,
            vec![
                ("os", Some(3), Some(BlockId(0))),
                ("os.getcwd", Some(4), Some(BlockId(0))),
                ("Widget", Some(8), Some(BlockId(1))),
            ]
        );
    }

    #[test]
    fn test_sequences_are_restartable() {
        let tree = sample();
        assert_eq!(tree.references().count(), 3);
        assert_eq!(tree.references().count(), 3);
        assert_eq!(tree.definitions().count(), 2);
    }

    #[test]
    fn test_reference_outside_paragraph_has_no_block() {
        let tree = DocumentTree::new(DocId::new(0), vec![SyntaxNode::section(1, vec![SyntaxNode::reference("mod", "os", 1)])]);
        let refs: Vec<_> = tree.references().collect();
        assert_eq!(refs[0].block, None);
    }

    #[test]
    fn test_last_line() {
        let node = SyntaxNode::section(1, vec![SyntaxNode::text(4), SyntaxNode::text(2).with_end_line(7)]);
        assert_eq!(node.last_line(), Some(7));
        assert_eq!(SyntaxNode::text(3).without_line().last_line(), None);
    }
}
