use minipl_common::Symbol;

use super::nodes::{BinaryOp, Node, NodeId, NodeKind, RawTree, SyntaxTree, TreeError, UnaryOp};
use crate::semantic::types::Type;

/// Incremental constructor for a [`SyntaxTree`].
///
/// Children must be added before their parent; every method returns the id
/// of the node it appended. `finish` validates the shape.
///
/// ```ignore
/// let mut b = TreeBuilder::new();
/// let x = b.reference(Symbol::identifier("x", 1, 5));
/// let ty = b.type_annotation(Symbol::new("int", TokenCategory::Type, Position::new(1, 8)), Type::Int);
/// let decl = b.declaration(Symbol::keyword("var", 1, 1), x, ty, None);
/// let root = b.statements(Symbol::keyword("program", 1, 1), vec![decl]);
/// let tree = b.finish(root)?;
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node of any kind.
    pub fn push(&mut self, symbol: Symbol, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, symbol });
        id
    }

    pub fn integer(&mut self, symbol: Symbol) -> NodeId {
        self.push(symbol, NodeKind::IntegerLiteral)
    }

    pub fn string(&mut self, symbol: Symbol) -> NodeId {
        self.push(symbol, NodeKind::StringLiteral)
    }

    pub fn reference(&mut self, symbol: Symbol) -> NodeId {
        self.push(symbol, NodeKind::Reference)
    }

    pub fn type_annotation(&mut self, symbol: Symbol, declared: Type) -> NodeId {
        self.push(symbol, NodeKind::TypeAnnotation { declared })
    }

    pub fn binary(&mut self, symbol: Symbol, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(symbol, NodeKind::BinaryExpr { op, lhs, rhs })
    }

    pub fn unary(&mut self, symbol: Symbol, op: UnaryOp, operand: NodeId) -> NodeId {
        self.push(symbol, NodeKind::UnaryExpr { op, operand })
    }

    pub fn declaration(
        &mut self,
        symbol: Symbol,
        reference: NodeId,
        annotation: NodeId,
        initializer: Option<NodeId>,
    ) -> NodeId {
        self.push(
            symbol,
            NodeKind::Declaration {
                reference,
                annotation,
                initializer,
            },
        )
    }

    pub fn assign(&mut self, symbol: Symbol, reference: NodeId, value: NodeId) -> NodeId {
        self.push(symbol, NodeKind::Assign { reference, value })
    }

    pub fn print(&mut self, symbol: Symbol, args: Vec<NodeId>) -> NodeId {
        self.push(symbol, NodeKind::Print { args })
    }

    pub fn read(&mut self, symbol: Symbol, target: NodeId) -> NodeId {
        self.push(symbol, NodeKind::Read { target })
    }

    pub fn assert(&mut self, symbol: Symbol, argument: NodeId) -> NodeId {
        self.push(symbol, NodeKind::Assert { argument })
    }

    pub fn statements(&mut self, symbol: Symbol, statements: Vec<NodeId>) -> NodeId {
        self.push(symbol, NodeKind::StatementList { statements })
    }

    pub fn range(&mut self, symbol: Symbol, start: NodeId, end: NodeId) -> NodeId {
        self.push(symbol, NodeKind::Range { start, end })
    }

    pub fn for_condition(&mut self, symbol: Symbol, reference: NodeId, range: NodeId) -> NodeId {
        self.push(symbol, NodeKind::ForCondition { reference, range })
    }

    pub fn for_loop(&mut self, symbol: Symbol, condition: NodeId, body: NodeId) -> NodeId {
        self.push(symbol, NodeKind::For { condition, body })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate the collected nodes and freeze them into a tree rooted at `root`.
    pub fn finish(self, root: NodeId) -> Result<SyntaxTree, TreeError> {
        SyntaxTree::try_from(RawTree {
            root,
            nodes: self.nodes,
        })
    }
}
