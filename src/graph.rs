//! Diff-style segment graph built from an alignment.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Common,
    Distinct,
}

/// A maximal run of aligned positions of one kind.
///
/// `Common` holds characters equal on both sides. `Distinct` holds the
/// characters of each side over a run of mismatches and gaps; either side
/// may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlignmentGraphNode {
    Common { text: String },
    Distinct { lhs: String, rhs: String },
}

/// Operations over the two node shapes.
pub trait AlignmentGraphVisitor {
    type Output;

    fn visit_common(&mut self, text: &str) -> Self::Output;
    fn visit_distinct(&mut self, lhs: &str, rhs: &str) -> Self::Output;
}

impl AlignmentGraphNode {
    pub fn node_type(&self) -> NodeType {
        match self {
            AlignmentGraphNode::Common { .. } => NodeType::Common,
            AlignmentGraphNode::Distinct { .. } => NodeType::Distinct,
        }
    }

    /// Length in code points of the longer side.
    pub fn max_length(&self) -> usize {
        match self {
            AlignmentGraphNode::Common { text } => text.chars().count(),
            AlignmentGraphNode::Distinct { lhs, rhs } => lhs.chars().count().max(rhs.chars().count()),
        }
    }

    pub fn visit<V: AlignmentGraphVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            AlignmentGraphNode::Common { text } => visitor.visit_common(text),
            AlignmentGraphNode::Distinct { lhs, rhs } => visitor.visit_distinct(lhs, rhs),
        }
    }
}

impl fmt::Display for AlignmentGraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentGraphNode::Common { text } => write!(f, "{{text: '{}'}}", text),
            AlignmentGraphNode::Distinct { lhs, rhs } => write!(f, "{{lhs: '{}', rhs: '{}'}}", lhs, rhs),
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Lhs,
    Rhs,
}

/// Collects one side's text from a node sequence.
struct SideText {
    side: Side,
    text: String,
}

impl AlignmentGraphVisitor for SideText {
    type Output = ();

    fn visit_common(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn visit_distinct(&mut self, lhs: &str, rhs: &str) {
        match self.side {
            Side::Lhs => self.text.push_str(lhs),
            Side::Rhs => self.text.push_str(rhs),
        }
    }
}

fn side_text(nodes: &[AlignmentGraphNode], side: Side) -> String {
    let mut visitor = SideText {
        side,
        text: String::new(),
    };
    for node in nodes {
        node.visit(&mut visitor);
    }
    visitor.text
}

/// The lhs text the graph was built from.
pub fn lhs_text(nodes: &[AlignmentGraphNode]) -> String {
    side_text(nodes, Side::Lhs)
}

/// The rhs text the graph was built from.
pub fn rhs_text(nodes: &[AlignmentGraphNode]) -> String {
    side_text(nodes, Side::Rhs)
}

#[derive(Debug, Default)]
pub struct AlignmentGraphBuilder {
    text_segments: Vec<AlignmentGraphNode>,
    current_segment: Option<AlignmentGraphNode>,
}

impl AlignmentGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the aligned positions once, coalescing consecutive positions of
    /// the same kind into one node.
    ///
    /// # Panics
    ///
    /// If the gap vectors differ in length, mark a gap on both sides at the
    /// same position, or do not consume exactly the characters of both
    /// texts. Each of these means the alignment itself is broken.
    pub fn build_graph(
        mut self,
        lhs: &[char],
        rhs: &[char],
        lhs_gaps: &[bool],
        rhs_gaps: &[bool],
    ) -> Vec<AlignmentGraphNode> {
        assert_eq!(lhs_gaps.len(), rhs_gaps.len(), "Gap vectors differ in length");

        let mut lhs_it = lhs.iter().copied();
        let mut rhs_it = rhs.iter().copied();

        for (&lhs_has_gap, &rhs_has_gap) in lhs_gaps.iter().zip(rhs_gaps) {
            assert!(
                !(lhs_has_gap && rhs_has_gap),
                "Both texts have a gap at the same aligned position"
            );

            let lhs_c = if lhs_has_gap { None } else { Some(next_char(&mut lhs_it, "lhs")) };
            let rhs_c = if rhs_has_gap { None } else { Some(next_char(&mut rhs_it, "rhs")) };

            match (lhs_c, rhs_c) {
                (Some(a), Some(b)) if a == b => self.append_to_common_segment(a),
                _ => self.append_to_distinct_segment(lhs_c, rhs_c),
            }
        }

        assert!(lhs_it.next().is_none(), "Gap vectors do not cover all of lhs");
        assert!(rhs_it.next().is_none(), "Gap vectors do not cover all of rhs");

        self.finalize_graph()
    }

    fn append_to_common_segment(&mut self, c: char) {
        if !matches!(self.current_segment, Some(AlignmentGraphNode::Common { .. })) {
            self.start_segment(AlignmentGraphNode::Common { text: String::new() });
        }
        if let Some(AlignmentGraphNode::Common { text }) = &mut self.current_segment {
            text.push(c);
        }
    }

    fn append_to_distinct_segment(&mut self, lhs_c: Option<char>, rhs_c: Option<char>) {
        if !matches!(self.current_segment, Some(AlignmentGraphNode::Distinct { .. })) {
            self.start_segment(AlignmentGraphNode::Distinct {
                lhs: String::new(),
                rhs: String::new(),
            });
        }
        if let Some(AlignmentGraphNode::Distinct { lhs, rhs }) = &mut self.current_segment {
            lhs.extend(lhs_c);
            rhs.extend(rhs_c);
        }
    }

    fn start_segment(&mut self, node: AlignmentGraphNode) {
        if let Some(finished) = self.current_segment.replace(node) {
            self.text_segments.push(finished);
        }
    }

    fn finalize_graph(mut self) -> Vec<AlignmentGraphNode> {
        if let Some(finished) = self.current_segment.take() {
            self.text_segments.push(finished);
        }
        self.text_segments
    }
}

fn next_char(it: &mut impl Iterator<Item = char>, side: &str) -> char {
    match it.next() {
        Some(c) => c,
        None => panic!("Gap vectors are longer than {}", side),
    }
}
