//! Random expression trees built from the operator table.
//!
//! A tree is grown top-down. At every level the generator first decides
//! whether to stop with a terminal, with a probability that is multiplied by
//! `prob_increase` on the way down, then draws an operator whose shape fits
//! the request, weighted by the table weights.

use std::fmt;

use rand::Rng;

use super::operators::{QuizOperator, Shape, OPERATORS};

/// From this depth on a terminal is forced whatever the probabilities say.
pub const MAX_TREE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub operator: &'static QuizOperator,
    pub children: Vec<Node>,
}

impl Node {
    /// Non-terminal nodes in this subtree, including `self`.
    pub fn non_terminal_count(&self) -> usize {
        if self.children.is_empty() {
            return 0;
        }
        1 + self
            .children
            .iter()
            .map(Node::non_terminal_count)
            .sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operator = self.operator;
        f.write_str(operator.prefix)?;
        if !operator.infix.is_empty() {
            for (position, child) in self.children.iter().enumerate() {
                if position > 0 {
                    f.write_str(operator.infix)?;
                }
                // `a - (b + c)` keeps its grouping; nothing else needs parentheses.
                let grouped = operator.infix == " - "
                    && position == 1
                    && matches!(child.operator.infix, " - " | " + ");
                if grouped {
                    write!(f, "({child})")?;
                } else {
                    write!(f, "{child}")?;
                }
            }
        }
        f.write_str(operator.suffix)
    }
}

pub struct Generator<R> {
    rng: R,
}

impl<R: Rng> Generator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Renders a fresh tree. Unless `dcp` is set, one inner node is swapped
    /// for an operator of opposite curvature first.
    pub fn expression(
        &mut self,
        wanted: &[Shape],
        prob_terminate: f64,
        prob_increase: f64,
        dcp: bool,
    ) -> String {
        let mut root = self.tree(wanted, prob_terminate, prob_increase);
        if !dcp {
            self.add_dcp_error(&mut root);
        }
        root.to_string()
    }

    pub fn tree(&mut self, wanted: &[Shape], prob_terminate: f64, prob_increase: f64) -> Node {
        self.tree_at(wanted, prob_terminate, prob_increase, 1)
    }

    fn tree_at(
        &mut self,
        wanted: &[Shape],
        prob_terminate: f64,
        prob_increase: f64,
        depth: usize,
    ) -> Node {
        let terminal = depth >= MAX_TREE_DEPTH || self.rng.gen::<f64>() < prob_terminate;

        let mut candidates: Vec<&'static QuizOperator> = wanted
            .iter()
            .flat_map(|shape| {
                OPERATORS
                    .iter()
                    .filter(move |op| op.terminal == terminal && op.shape.satisfies(*shape))
            })
            .collect();
        if candidates.is_empty() {
            candidates = OPERATORS.iter().filter(|op| op.terminal).collect();
        }

        let operator = self.weighted_choice(&candidates).unwrap_or(&OPERATORS[0]);
        let children = (0..operator.num_args)
            .map(|position| operator.argument_shapes(position))
            .filter(|shapes| !shapes.is_empty())
            .map(|shapes| {
                self.tree_at(&shapes, prob_terminate * prob_increase, prob_increase, depth + 1)
            })
            .collect();

        Node { operator, children }
    }

    /// Draws one operator with probability proportional to its weight.
    pub fn weighted_choice(
        &mut self,
        operators: &[&'static QuizOperator],
    ) -> Option<&'static QuizOperator> {
        let total: f64 = operators.iter().map(|op| op.weight).sum();
        let mut choice = total * self.rng.gen::<f64>();
        for &operator in operators {
            choice -= operator.weight;
            if choice <= 0.0 {
                return Some(operator);
            }
        }
        operators.last().copied()
    }

    /// Replaces one non-root inner node with an operator of the same arity
    /// and swapped curvature. Trees with a single inner node are left alone.
    pub fn add_dcp_error(&mut self, root: &mut Node) {
        let total = root.non_terminal_count();
        if total > 1 {
            let choice = self.rng.gen_range(2..=total);
            let mut seen = 0;
            self.replace_non_terminal(root, choice, &mut seen);
        }
    }

    fn replace_non_terminal(&mut self, node: &mut Node, choice: usize, seen: &mut usize) {
        if node.children.is_empty() {
            return;
        }
        *seen += 1;
        if *seen == choice {
            let current = node.operator;
            let options: Vec<&'static QuizOperator> = OPERATORS
                .iter()
                .filter(|op| {
                    op.num_args == current.num_args
                        && op.shape.convex == current.shape.concave
                        && op.shape.concave == current.shape.convex
                })
                .collect();
            if let Some(replacement) = self.weighted_choice(&options) {
                node.operator = replacement;
            }
        }
        for child in &mut node.children {
            self.replace_non_terminal(child, choice, seen);
        }
    }
}
