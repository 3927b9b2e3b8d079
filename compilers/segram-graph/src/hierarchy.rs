use crate::Graph;
use petgraph::graphmap::NodeTrait;

/// One edge visited by [`Hierarchy`]. Sources without children are
/// reported once with `child == None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<N> {
    pub depth: usize,
    pub parent: N,
    pub child: Option<N>,
}

struct Frame<N> {
    depth: usize,
    node: N,
    next: usize,
}

/// Pre-order depth-first walk over all edges reachable from the sources.
///
/// Uses an explicit stack; descent stops at a depth equal to the number
/// of nodes so a cyclic graph cannot loop forever.
pub struct Hierarchy<'g, N: NodeTrait> {
    graph: &'g Graph<N>,
    sources: std::vec::IntoIter<N>,
    stack: Vec<Frame<N>>,
    limit: usize,
}

impl<'g, N: NodeTrait> Hierarchy<'g, N> {
    pub(crate) fn new(graph: &'g Graph<N>) -> Self {
        Self {
            graph,
            sources: graph.sources().into_iter(),
            stack: Vec::new(),
            limit: graph.len(),
        }
    }
}

impl<'g, N: NodeTrait> Iterator for Hierarchy<'g, N> {
    type Item = Step<N>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(frame) = self.stack.last_mut() {
                let (depth, node) = (frame.depth, frame.node);
                if let Some(&child) = self.graph.children(&node).get(frame.next) {
                    frame.next += 1;
                    if depth + 1 < self.limit {
                        self.stack.push(Frame { depth: depth + 1, node: child, next: 0 });
                    }
                    return Some(Step { depth, parent: node, child: Some(child) });
                }
                self.stack.pop();
                continue;
            }

            let source = self.sources.next()?;
            if self.graph.children(&source).is_empty() {
                return Some(Step { depth: 0, parent: source, child: None });
            }
            self.stack.push(Frame { depth: 0, node: source, next: 0 });
        }
    }
}
