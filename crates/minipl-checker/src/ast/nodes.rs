use minipl_common::Symbol;
use serde::{Deserialize, Serialize};

use crate::semantic::types::Type;

// ============================================================================
// Node identity
// ============================================================================

/// Index of a node inside its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "&")]
    And,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "=",
            BinaryOp::Lt => "<",
            BinaryOp::And => "&",
        }
    }

    /// Whether the operator always produces `bool` for matching operands.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Lt)
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "!")]
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// The closed set of syntax node kinds, each with its ordered child slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    /// `var <reference> : <annotation> [:= <expr>]`; the initializer is an
    /// `Assign` to the declared identifier.
    Declaration {
        reference: NodeId,
        annotation: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initializer: Option<NodeId>,
    },
    /// `<reference> := <value>`
    Assign { reference: NodeId, value: NodeId },
    /// An identifier occurrence; the name is the symbol's lexeme.
    Reference,
    /// `print <args>`
    Print { args: Vec<NodeId> },
    /// `read <target>`
    Read { target: NodeId },
    /// `assert (<argument>)`
    Assert { argument: NodeId },
    BinaryExpr {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    UnaryExpr { op: UnaryOp, operand: NodeId },
    IntegerLiteral,
    StringLiteral,
    /// `int`, `string` or `bool` after a declaration's colon.
    TypeAnnotation { declared: Type },
    StatementList { statements: Vec<NodeId> },
    /// `<reference> in <range>`
    ForCondition { reference: NodeId, range: NodeId },
    /// `<start> .. <end>`
    Range { start: NodeId, end: NodeId },
    /// `for <condition> do <body> end for`
    For { condition: NodeId, body: NodeId },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Declaration { .. } => "Declaration",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::Reference => "Reference",
            NodeKind::Print { .. } => "Print",
            NodeKind::Read { .. } => "Read",
            NodeKind::Assert { .. } => "Assert",
            NodeKind::BinaryExpr { .. } => "BinaryExpr",
            NodeKind::UnaryExpr { .. } => "UnaryExpr",
            NodeKind::IntegerLiteral => "IntegerLiteral",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::TypeAnnotation { .. } => "TypeAnnotation",
            NodeKind::StatementList { .. } => "StatementList",
            NodeKind::ForCondition { .. } => "ForCondition",
            NodeKind::Range { .. } => "Range",
            NodeKind::For { .. } => "For",
        }
    }

    /// Child ids in structural (visiting) order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Declaration {
                reference,
                annotation,
                initializer,
            } => {
                let mut children = vec![*reference, *annotation];
                children.extend(*initializer);
                children
            }
            NodeKind::Assign { reference, value } => vec![*reference, *value],
            NodeKind::Print { args } => args.clone(),
            NodeKind::Read { target } => vec![*target],
            NodeKind::Assert { argument } => vec![*argument],
            NodeKind::BinaryExpr { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::UnaryExpr { operand, .. } => vec![*operand],
            NodeKind::StatementList { statements } => statements.clone(),
            NodeKind::ForCondition { reference, range } => vec![*reference, *range],
            NodeKind::Range { start, end } => vec![*start, *end],
            NodeKind::For { condition, body } => vec![*condition, *body],
            NodeKind::Reference
            | NodeKind::IntegerLiteral
            | NodeKind::StringLiteral
            | NodeKind::TypeAnnotation { .. } => Vec::new(),
        }
    }
}

/// A syntax node: its kind (with child slots) and the token it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub symbol: Symbol,
}

// ============================================================================
// Tree arena
// ============================================================================

/// Errors detected while loading or building a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("malformed syntax tree JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("root {root} is outside the tree ({len} nodes)")]
    RootOutOfRange { root: NodeId, len: usize },
    #[error("node {parent} refers to missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("node {child} has more than one parent ({first} and {second})")]
    SharedChild {
        child: NodeId,
        first: NodeId,
        second: NodeId,
    },
    #[error("root {root} is also a child of {parent}")]
    RootHasParent { root: NodeId, parent: NodeId },
    #[error("{parent_kind} {parent} expects a {expected} as its {slot}, found {found} {child}")]
    UnexpectedChild {
        parent: NodeId,
        parent_kind: &'static str,
        slot: &'static str,
        expected: &'static str,
        child: NodeId,
        found: &'static str,
    },
    #[error("type annotation {node} must declare int, string or bool")]
    UndeclarableType { node: NodeId },
    #[error("declaration {declaration} of `{declared}` has an initializer assigning to `{assigned}`")]
    InitializerTarget {
        declaration: NodeId,
        declared: String,
        assigned: String,
    },
    #[error("syntax tree is nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Deepest root-to-leaf path a tree may have. The checker walks the tree
/// recursively, so this bounds its stack use.
pub const MAX_TREE_DEPTH: usize = 512;

/// Serialized form of a tree, before shape validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTree {
    pub root: NodeId,
    pub nodes: Vec<Node>,
}

/// An immutable, shape-validated syntax tree stored as a node arena.
///
/// Every child id is in range, every node has at most one parent and the
/// root has none, so a walk from the root visits each node once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct SyntaxTree {
    root: NodeId,
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Load a tree produced by an external parser.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let raw: RawTree = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node with the given id.
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }
}

impl TryFrom<RawTree> for SyntaxTree {
    type Error = TreeError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        validate(&raw)?;
        Ok(SyntaxTree {
            root: raw.root,
            nodes: raw.nodes,
        })
    }
}

fn validate(raw: &RawTree) -> Result<(), TreeError> {
    let len = raw.nodes.len();
    if raw.root.index() >= len {
        return Err(TreeError::RootOutOfRange {
            root: raw.root,
            len,
        });
    }

    let mut parents: Vec<Option<NodeId>> = vec![None; len];
    for (idx, node) in raw.nodes.iter().enumerate() {
        let parent = NodeId(idx as u32);
        for child in node.kind.children() {
            let Some(slot) = parents.get_mut(child.index()) else {
                return Err(TreeError::DanglingChild { parent, child });
            };
            if let Some(first) = *slot {
                return Err(TreeError::SharedChild {
                    child,
                    first,
                    second: parent,
                });
            }
            *slot = Some(parent);
        }
    }
    if let Some(parent) = parents[raw.root.index()] {
        return Err(TreeError::RootHasParent {
            root: raw.root,
            parent,
        });
    }

    for (idx, node) in raw.nodes.iter().enumerate() {
        check_slots(raw, NodeId(idx as u32), &node.kind)?;
    }
    check_depth(raw)
}

/// Reject trees whose depth below the root exceeds [`MAX_TREE_DEPTH`].
fn check_depth(raw: &RawTree) -> Result<(), TreeError> {
    let mut pending = vec![(raw.root, 1usize)];
    while let Some((id, depth)) = pending.pop() {
        if depth > MAX_TREE_DEPTH {
            return Err(TreeError::TooDeep {
                limit: MAX_TREE_DEPTH,
            });
        }
        for child in raw.nodes[id.index()].kind.children() {
            pending.push((child, depth + 1));
        }
    }
    Ok(())
}

/// Check the kind-restricted child slots of one node.
fn check_slots(raw: &RawTree, id: NodeId, kind: &NodeKind) -> Result<(), TreeError> {
    let expect = |slot: &'static str,
                  expected: &'static str,
                  child: NodeId,
                  accepts: fn(&NodeKind) -> bool|
     -> Result<(), TreeError> {
        let found = &raw.nodes[child.index()].kind;
        if accepts(found) {
            Ok(())
        } else {
            Err(TreeError::UnexpectedChild {
                parent: id,
                parent_kind: kind.name(),
                slot,
                expected,
                child,
                found: found.name(),
            })
        }
    };

    match kind {
        NodeKind::Declaration {
            reference,
            annotation,
            initializer,
        } => {
            expect("reference", "Reference", *reference, is_reference)?;
            expect("annotation", "TypeAnnotation", *annotation, |k| {
                matches!(k, NodeKind::TypeAnnotation { .. })
            })?;
            if let Some(init) = initializer {
                expect("initializer", "Assign", *init, |k| {
                    matches!(k, NodeKind::Assign { .. })
                })?;
                check_initializer_target(raw, id, *reference, *init)?;
            }
        }
        NodeKind::Assign { reference, .. } => {
            expect("reference", "Reference", *reference, is_reference)?;
        }
        NodeKind::ForCondition { reference, range } => {
            expect("reference", "Reference", *reference, is_reference)?;
            expect("range", "Range", *range, |k| matches!(k, NodeKind::Range { .. }))?;
        }
        NodeKind::For { condition, body } => {
            expect("condition", "ForCondition", *condition, |k| {
                matches!(k, NodeKind::ForCondition { .. })
            })?;
            expect("body", "StatementList", *body, |k| {
                matches!(k, NodeKind::StatementList { .. })
            })?;
        }
        NodeKind::TypeAnnotation { declared } => {
            if declared.is_poison() {
                return Err(TreeError::UndeclarableType { node: id });
            }
        }
        _ => {}
    }
    Ok(())
}

/// The initializer of `var x ...` must assign to `x` itself.
fn check_initializer_target(
    raw: &RawTree,
    declaration: NodeId,
    reference: NodeId,
    init: NodeId,
) -> Result<(), TreeError> {
    let NodeKind::Assign { reference: target, .. } = raw.nodes[init.index()].kind else {
        return Ok(());
    };
    let declared = &raw.nodes[reference.index()].symbol.lexeme;
    let assigned = &raw.nodes[target.index()].symbol.lexeme;
    if declared == assigned {
        return Ok(());
    }
    Err(TreeError::InitializerTarget {
        declaration,
        declared: declared.clone(),
        assigned: assigned.clone(),
    })
}

fn is_reference(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Reference)
}
