use minipl_common::DiagnosticKind;
use tracing::trace;

use crate::ast::nodes::{Node, NodeId, NodeKind};

use super::resolver::Checker;
use super::scope::Entry;
use super::types::Type;

/// Statement rules: declarations, assignment, `read`, `assert` and loops.
impl<'t> Checker<'t> {
    // ====================================================================
    // Declarations
    // ====================================================================

    pub(super) fn check_declaration(
        &mut self,
        reference: NodeId,
        annotation: NodeId,
        initializer: Option<NodeId>,
    ) {
        let Some(declared) = self.resolve(annotation) else {
            return;
        };
        let target = &self.node(reference).symbol;
        let Some(entry) = Entry::new(declared, target.clone()) else {
            return;
        };

        if self.symbols.define(&target.lexeme, entry).is_err() {
            self.report(DiagnosticKind::ExistingVariable, target);
            if self.options.check_rejected_initializers {
                if let Some(init) = initializer {
                    self.resolve_rejected_initializer(init);
                }
            }
            return;
        }

        trace!(name = %target.lexeme, ty = %declared, "declared variable");
        self.record(reference, declared);
        if let Some(init) = initializer {
            self.visit(init);
        }
    }

    /// Resolve the value of a rejected declaration's initializer so errors
    /// inside it still surface. No assignment rule applies to it.
    fn resolve_rejected_initializer(&mut self, init: NodeId) {
        if let NodeKind::Assign { value, .. } = self.node(init).kind {
            self.visit(value);
        }
    }

    // ====================================================================
    // Assignment
    // ====================================================================

    pub(super) fn check_assign(&mut self, node: &'t Node, reference: NodeId, value: NodeId) {
        let target = &self.node(reference).symbol;
        let name = target.lexeme.as_str();
        let declared = self.symbols.lookup(name).map(|entry| entry.ty);

        if self.options.report_undefined_target_reference {
            self.visit(reference);
        } else {
            self.record(reference, declared.unwrap_or(Type::Error));
        }

        if self.loop_guard.contains(name) {
            self.report(
                DiagnosticKind::LoopVariableAssignment {
                    name: name.to_string(),
                },
                &node.symbol,
            );
            return;
        }
        let Some(declared) = declared else {
            self.report(DiagnosticKind::UndefinedAssignment, &node.symbol);
            return;
        };

        if self.resolve(value) != Some(declared) {
            self.report(DiagnosticKind::IncompatibleAssignment, target);
        }
    }

    // ====================================================================
    // read / assert
    // ====================================================================

    pub(super) fn check_read(&mut self, node: &'t Node, target: NodeId) {
        let ty = self.resolve(target);
        if !matches!(self.node(target).kind, NodeKind::Reference) {
            self.report(DiagnosticKind::ReadTargetNotVariable, &node.symbol);
        } else if !matches!(ty, Some(Type::Int | Type::String)) {
            self.report(DiagnosticKind::ReadTargetType, &node.symbol);
        }
    }

    pub(super) fn check_assert(&mut self, node: &'t Node, argument: NodeId) {
        if self.resolve(argument) != Some(Type::Bool) {
            self.report(DiagnosticKind::NonBooleanAssert, &node.symbol);
        }
    }

    // ====================================================================
    // Loops
    // ====================================================================

    pub(super) fn check_for_condition(&mut self, node: &'t Node, reference: NodeId, range: NodeId) {
        let loop_ty = self.resolve(reference);
        self.visit(range);
        if loop_ty != Some(Type::Int) {
            self.report(DiagnosticKind::LoopVariableType, &node.symbol);
        }
    }

    pub(super) fn check_range(&mut self, node: &'t Node, start: NodeId, end: NodeId) {
        let start_ty = self.resolve(start);
        let end_ty = self.resolve(end);
        if start_ty != Some(Type::Int) || end_ty != Some(Type::Int) {
            self.report(DiagnosticKind::RangeDelimiterType, &node.symbol);
        }
    }

    pub(super) fn check_for(&mut self, condition: NodeId, body: NodeId) {
        self.visit(condition);
        let loop_var = match self.node(condition).kind {
            NodeKind::ForCondition { reference, .. } => {
                Some(self.node(reference).symbol.lexeme.as_str())
            }
            _ => None,
        };

        // A loop nested over the same variable leaves the outer binding alone.
        let bound = loop_var.filter(|name| self.loop_guard.enter(name));
        if let Some(name) = bound {
            trace!(name = %name, "loop variable bound");
        }
        self.visit(body);
        if let Some(name) = bound {
            self.loop_guard.exit(name);
            trace!(name = %name, "loop variable released");
        }
    }
}
