use crate::symbol::Symbol;

/// The semantic rule a diagnostic reports.
///
/// The display text of each variant is the diagnostic's description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("Declaration of an existing variable")]
    ExistingVariable,
    #[error("Reference to an undefined variable")]
    UndefinedReference,
    #[error("Assignment to a loop variable {name}")]
    LoopVariableAssignment { name: String },
    #[error("Assignment to undefined variable")]
    UndefinedAssignment,
    #[error("Assignment to an uncompatible type")]
    IncompatibleAssignment,
    #[error("Mismatched operator types")]
    MismatchedOperands,
    #[error("Can not apply {operator} to {operand}")]
    OperatorNotApplicable { operator: String, operand: String },
    #[error("Unary ! can only operate on boolean expressions")]
    NonBooleanNegation,
    #[error("Read must happen to a variable")]
    ReadTargetNotVariable,
    #[error("Read must happen to a string or int variable")]
    ReadTargetType,
    #[error("Assert must have a boolean parameter")]
    NonBooleanAssert,
    #[error("Loop variable must be a declared int")]
    LoopVariableType,
    #[error("Range delimiters must be integers")]
    RangeDelimiterType,
}

/// A semantic-rule violation attributed to the source symbol that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub symbol: Symbol,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, symbol: Symbol) -> Self {
        Self { kind, symbol }
    }

    pub fn description(&self) -> String {
        self.kind.to_string()
    }

    pub fn line(&self) -> u32 {
        self.symbol.position.line
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: on line {}.", self.kind, self.symbol.position.line)
    }
}

/// Ordered, append-only collector for diagnostics found during a check pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, kind: DiagnosticKind, symbol: &Symbol) {
        self.report(Diagnostic::new(kind, symbol.clone()));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
