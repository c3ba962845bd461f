pub mod resolved;
pub mod resolver;
pub mod scope;
pub mod type_checker;
pub mod types;
pub mod validator;

use minipl_common::{CheckOptions, DiagnosticBag};
use tracing::debug;

use crate::ast::SyntaxTree;

pub use resolved::ResolvedTypes;
pub use resolver::Checker;
pub use scope::{Entry, LoopGuard, SymbolTable};
pub use types::{Type, Value};

/// Everything one checking pass produces.
#[derive(Debug)]
pub struct Analysis {
    /// Rule violations in detection order.
    pub diagnostics: DiagnosticBag,
    /// Resolved type of every visited node.
    pub types: ResolvedTypes,
    /// Variables declared by the program.
    pub symbols: SymbolTable,
}

impl Analysis {
    pub fn is_well_typed(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Check `tree` with the default options.
pub fn check(tree: &SyntaxTree) -> Analysis {
    check_with_options(tree, CheckOptions::default())
}

/// Run the single type-checking pass over `tree`.
///
/// The pass visits every node reachable from the root exactly once, in
/// structural order, and never stops early: all violations are collected.
/// Each call builds fresh state, so checking the same tree twice yields the
/// same result.
pub fn check_with_options(tree: &SyntaxTree, options: CheckOptions) -> Analysis {
    debug!(nodes = tree.len(), ?options, "checking program");
    let analysis = Checker::new(tree, options).run();
    debug!(
        diagnostics = analysis.diagnostics.len(),
        variables = analysis.symbols.len(),
        "check finished"
    );
    analysis
}
