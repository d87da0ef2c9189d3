use crate::document::{Document, Node, NodeId};

struct Pending {
    id: NodeId,
    depth: usize,
    // Start nodes are walked alone, their siblings belong to someone else.
    follow_sibling: bool,
}

/// Pre-order walk over one or more subtrees of a [`Document`].
///
/// Yields `(id, node, depth)` where depth is relative to the start nodes.
pub struct DomWalker<'a> {
    document: &'a Document,
    stack: Vec<Pending>,
}

impl<'a> DomWalker<'a> {
    pub fn new(document: &'a Document, roots: &[NodeId]) -> Self {
        // Reversed so the first root ends up on top of the stack
        let stack = roots
            .iter()
            .rev()
            .map(|&id| Pending {
                id,
                depth: 0,
                follow_sibling: false,
            })
            .collect();

        Self { document, stack }
    }
}

impl<'a> Iterator for DomWalker<'a> {
    type Item = (NodeId, &'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let Pending {
            id,
            depth,
            follow_sibling,
        } = self.stack.pop()?;
        let node = &self.document[id];

        // Sibling goes under the child so the whole subtree is drained first
        if follow_sibling {
            if let Some(sibling) = node.next_sibling {
                self.stack.push(Pending {
                    id: sibling,
                    depth,
                    follow_sibling: true,
                });
            }
        }
        if let Some(child) = node.first_child {
            self.stack.push(Pending {
                id: child,
                depth: depth + 1,
                follow_sibling: true,
            });
        }

        Some((id, node, depth))
    }
}
