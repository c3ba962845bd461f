use minipl_common::{CheckOptions, DiagnosticBag, DiagnosticKind, Symbol};
use tracing::trace;

use crate::ast::nodes::*;

use super::resolved::ResolvedTypes;
use super::scope::{LoopGuard, SymbolTable};
use super::type_checker;
use super::types::Type;
use super::Analysis;

/// Single-pass type checker over one syntax tree.
///
/// Owns all per-pass state: the flat symbol table, the set of loop-bound
/// identifiers, the resolved-type side table and the diagnostics. A fresh
/// checker is built for every pass.
pub struct Checker<'t> {
    pub(super) tree: &'t SyntaxTree,
    pub(super) options: CheckOptions,
    pub(super) symbols: SymbolTable,
    pub(super) loop_guard: LoopGuard,
    pub(super) types: ResolvedTypes,
    pub(super) diagnostics: DiagnosticBag,
}

impl<'t> Checker<'t> {
    pub fn new(tree: &'t SyntaxTree, options: CheckOptions) -> Self {
        Self {
            tree,
            options,
            symbols: SymbolTable::new(),
            loop_guard: LoopGuard::new(),
            types: ResolvedTypes::new(tree.len()),
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Walk the whole tree from its root and return the results.
    pub fn run(mut self) -> Analysis {
        self.visit(self.tree.root());
        Analysis {
            diagnostics: self.diagnostics,
            types: self.types,
            symbols: self.symbols,
        }
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    pub(super) fn visit(&mut self, id: NodeId) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::StatementList { statements } => {
                for stmt in statements {
                    self.visit(*stmt);
                }
            }
            NodeKind::Declaration {
                reference,
                annotation,
                initializer,
            } => self.check_declaration(*reference, *annotation, *initializer),
            NodeKind::Assign { reference, value } => self.check_assign(node, *reference, *value),
            NodeKind::Print { args } => {
                for arg in args {
                    self.visit(*arg);
                }
            }
            NodeKind::Read { target } => self.check_read(node, *target),
            NodeKind::Assert { argument } => self.check_assert(node, *argument),
            NodeKind::ForCondition { reference, range } => {
                self.check_for_condition(node, *reference, *range)
            }
            NodeKind::Range { start, end } => self.check_range(node, *start, *end),
            NodeKind::For { condition, body } => self.check_for(*condition, *body),

            NodeKind::Reference => self.resolve_reference(id),
            NodeKind::BinaryExpr { op, lhs, rhs } => self.resolve_binary(id, *op, *lhs, *rhs),
            NodeKind::UnaryExpr { op, operand } => self.resolve_unary(id, *op, *operand),
            NodeKind::IntegerLiteral => self.record(id, Type::Int),
            NodeKind::StringLiteral => self.record(id, Type::String),
            NodeKind::TypeAnnotation { declared } => self.record(id, *declared),
        }
    }

    /// Visit `id` and return the type it resolved to, if any.
    pub(super) fn resolve(&mut self, id: NodeId) -> Option<Type> {
        self.visit(id);
        self.types.get(id)
    }

    // ====================================================================
    // Expressions
    // ====================================================================

    fn resolve_reference(&mut self, id: NodeId) {
        let symbol = &self.node(id).symbol;
        let ty = match self.symbols.lookup(&symbol.lexeme).map(|entry| entry.ty) {
            Some(ty) => ty,
            None => {
                self.report(DiagnosticKind::UndefinedReference, symbol);
                Type::Error
            }
        };
        self.record(id, ty);
    }

    fn resolve_binary(&mut self, id: NodeId, op: BinaryOp, lhs: NodeId, rhs: NodeId) {
        // Both operands are resolved (and report) before the operator is checked.
        let left = self.resolve(lhs);
        let right = self.resolve(rhs);
        let (Some(left), Some(right)) = (left, right) else {
            return;
        };
        match type_checker::check_binary_op(left, op, right) {
            Ok(ty) => self.record(id, ty),
            Err(DiagnosticKind::MismatchedOperands) if !self.options.report_operand_mismatch => {}
            Err(kind) => {
                self.report(kind, &self.node(id).symbol);
                self.record(id, Type::Error);
            }
        }
    }

    fn resolve_unary(&mut self, id: NodeId, op: UnaryOp, operand: NodeId) {
        let Some(operand) = self.resolve(operand) else {
            return;
        };
        match type_checker::check_unary_op(op, operand) {
            Ok(ty) => self.record(id, ty),
            Err(kind) => {
                self.report(kind, &self.node(id).symbol);
                self.record(id, Type::Error);
            }
        }
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    pub(super) fn node(&self, id: NodeId) -> &'t Node {
        self.tree.node(id)
    }

    pub(super) fn record(&mut self, id: NodeId, ty: Type) {
        self.types.set(id, ty);
    }

    pub(super) fn report(&mut self, kind: DiagnosticKind, symbol: &Symbol) {
        trace!(line = symbol.position.line, lexeme = %symbol.lexeme, "{}", kind);
        self.diagnostics.error(kind, symbol);
    }
}
