use minipl_common::DiagnosticKind;

use crate::ast::nodes::{BinaryOp, UnaryOp};

use super::types::Type;

/// Check a binary operation and return the result type, or the rule it breaks.
pub fn check_binary_op(left: Type, op: BinaryOp, right: Type) -> Result<Type, DiagnosticKind> {
    // Poison propagates without additional errors.
    if left.is_poison() || right.is_poison() {
        return Ok(Type::Error);
    }
    if left != right {
        return Err(DiagnosticKind::MismatchedOperands);
    }
    if op.is_comparison() {
        return Ok(Type::Bool);
    }

    match (left, op) {
        (Type::Int, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) => Ok(Type::Int),
        (Type::String, BinaryOp::Add) => Ok(Type::String),
        (Type::Bool, BinaryOp::And) => Ok(Type::Bool),
        _ => Err(DiagnosticKind::OperatorNotApplicable {
            operator: op.symbol().to_string(),
            operand: left.display_name().to_string(),
        }),
    }
}

/// Check a unary operation and return the result type.
pub fn check_unary_op(op: UnaryOp, operand: Type) -> Result<Type, DiagnosticKind> {
    if operand.is_poison() {
        return Ok(Type::Error);
    }
    match (op, operand) {
        (UnaryOp::Not, Type::Bool) => Ok(Type::Bool),
        (UnaryOp::Not, _) => Err(DiagnosticKind::NonBooleanNegation),
    }
}
