//! Whole-program checks: trees built with `TreeBuilder` or loaded from JSON.

use minipl_checker::ast::{BinaryOp, NodeId, NodeKind, UnaryOp, MAX_TREE_DEPTH};
use minipl_checker::semantic::{Type, Value};
use minipl_checker::{check, check_with_options, SyntaxTree, TreeBuilder, TreeError};
use minipl_common::config::parse_config;
use minipl_common::{CheckOptions, Position, Symbol, TokenCategory};

/// Small front end for writing programs one statement per line.
struct Program {
    b: TreeBuilder,
    statements: Vec<NodeId>,
}

impl Program {
    fn new() -> Self {
        Self {
            b: TreeBuilder::new(),
            statements: Vec::new(),
        }
    }

    fn int(&mut self, value: i64, line: u32) -> NodeId {
        self.b.integer(Symbol::new(
            value.to_string(),
            TokenCategory::Integer,
            Position::new(line, 10),
        ))
    }

    fn text(&mut self, value: &str, line: u32) -> NodeId {
        self.b
            .string(Symbol::new(value, TokenCategory::String, Position::new(line, 10)))
    }

    fn var(&mut self, name: &str, line: u32) -> NodeId {
        self.b.reference(Symbol::identifier(name, line, 5))
    }

    fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, line: u32) -> NodeId {
        self.b
            .binary(Symbol::operator(op.symbol(), line, 12), op, lhs, rhs)
    }

    fn assign_node(&mut self, name: &str, value: NodeId, line: u32) -> NodeId {
        let target = self.var(name, line);
        self.b.assign(Symbol::operator(":=", line, 7), target, value)
    }

    /// `var <name> : <ty> [:= <init>];`
    fn declare(&mut self, name: &str, ty: Type, init: Option<NodeId>, line: u32) -> NodeId {
        let reference = self.var(name, line);
        let annotation = self.b.type_annotation(
            Symbol::new(ty.display_name(), TokenCategory::Type, Position::new(line, 8)),
            ty,
        );
        let initializer = init.map(|value| self.assign_node(name, value, line));
        let decl = self.b.declaration(
            Symbol::keyword("var", line, 1),
            reference,
            annotation,
            initializer,
        );
        self.statements.push(decl);
        decl
    }

    fn assign(&mut self, name: &str, value: NodeId, line: u32) -> NodeId {
        let stmt = self.assign_node(name, value, line);
        self.statements.push(stmt);
        stmt
    }

    fn print(&mut self, args: Vec<NodeId>, line: u32) {
        let stmt = self.b.print(Symbol::keyword("print", line, 1), args);
        self.statements.push(stmt);
    }

    fn assert(&mut self, argument: NodeId, line: u32) {
        let stmt = self.b.assert(Symbol::keyword("assert", line, 1), argument);
        self.statements.push(stmt);
    }

    /// `for <name> in <start>..<end> do <body> end for;` where `body` holds
    /// statements already built but not yet added to the program.
    fn for_loop(&mut self, name: &str, start: i64, end: i64, body: Vec<NodeId>, line: u32) {
        let reference = self.var(name, line);
        let start = self.int(start, line);
        let end = self.int(end, line);
        let range = self.b.range(Symbol::operator("..", line, 11), start, end);
        let condition = self
            .b
            .for_condition(Symbol::keyword("in", line, 7), reference, range);
        let body = self.b.statements(Symbol::keyword("do", line, 15), body);
        let stmt = self
            .b
            .for_loop(Symbol::keyword("for", line, 1), condition, body);
        self.statements.push(stmt);
    }

    /// Remove the most recent statement so it can be nested in a loop body.
    fn take_last(&mut self) -> NodeId {
        self.statements.pop().expect("no statement to take")
    }

    fn finish(self) -> SyntaxTree {
        let Program { mut b, statements } = self;
        let root = b.statements(Symbol::keyword("program", 1, 1), statements);
        b.finish(root).expect("program shape")
    }
}

fn descriptions(tree: &SyntaxTree) -> Vec<String> {
    check(tree)
        .diagnostics
        .iter()
        .map(|d| d.description())
        .collect()
}

// -- Required behaviors --

#[test]
fn declare_and_assign_is_well_typed() {
    let mut p = Program::new();
    p.declare("x", Type::Int, None, 1);
    let five = p.int(5, 2);
    let stmt = p.assign("x", five, 2);
    let tree = p.finish();

    let analysis = check(&tree);
    assert!(analysis.is_well_typed(), "{:?}", analysis.diagnostics);
    assert_eq!(analysis.types.get(NodeId(0)), Some(Type::Int));
    let NodeKind::Assign { reference, .. } = tree.node(stmt).kind else {
        panic!("expected an assignment");
    };
    assert_eq!(tree.node(reference).symbol.lexeme, "x");
    assert_eq!(analysis.types.get(reference), Some(Type::Int));
    assert_eq!(analysis.symbols.lookup("x").map(|e| e.ty), Some(Type::Int));
}

#[test]
fn print_of_undeclared_variable() {
    let mut p = Program::new();
    let y = p.var("y", 1);
    p.print(vec![y], 1);
    let tree = p.finish();
    assert_eq!(
        descriptions(&tree),
        vec!["Reference to an undefined variable"]
    );
}

#[test]
fn duplicate_declaration_reported_once() {
    let mut p = Program::new();
    p.declare("x", Type::Int, None, 1);
    p.declare("x", Type::Int, None, 2);
    let tree = p.finish();

    let analysis = check(&tree);
    let found: Vec<_> = analysis.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(found, vec!["Declaration of an existing variable: on line 2."]);
    assert_eq!(analysis.symbols.len(), 1);
    assert_eq!(
        analysis.symbols.lookup("x").unwrap().declared_at.line(),
        1
    );
}

#[test]
fn string_variable_rejects_int() {
    let mut p = Program::new();
    p.declare("s", Type::String, None, 1);
    let five = p.int(5, 2);
    p.assign("s", five, 2);
    let tree = p.finish();
    assert_eq!(
        descriptions(&tree),
        vec!["Assignment to an uncompatible type"]
    );
}

#[test]
fn assert_of_integer_sum() {
    let mut p = Program::new();
    let one = p.int(1, 1);
    let other = p.int(1, 1);
    let sum = p.binary(BinaryOp::Add, one, other, 1);
    p.assert(sum, 1);
    let tree = p.finish();
    assert_eq!(
        descriptions(&tree),
        vec!["Assert must have a boolean parameter"]
    );
}

#[test]
fn loop_variable_guard_ends_with_loop() {
    let mut p = Program::new();
    p.declare("i", Type::Int, None, 1);
    let three = p.int(3, 2);
    p.assign("i", three, 2);
    let inner = p.take_last();
    p.for_loop("i", 1, 10, vec![inner], 2);
    let seven = p.int(7, 3);
    p.assign("i", seven, 3);
    let tree = p.finish();

    let analysis = check(&tree);
    let found: Vec<_> = analysis.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(found, vec!["Assignment to a loop variable i: on line 2."]);
}

#[test]
fn two_undefined_operands_reported_in_order() {
    let mut p = Program::new();
    let a = p.var("undefA", 1);
    let b = p.var("undefB", 1);
    let sum = p.binary(BinaryOp::Add, a, b, 1);
    p.print(vec![sum], 1);
    let tree = p.finish();

    let analysis = check(&tree);
    let found: Vec<_> = analysis
        .diagnostics
        .iter()
        .map(|d| (d.description(), d.symbol.lexeme.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Reference to an undefined variable".to_string(), "undefA".to_string()),
            ("Reference to an undefined variable".to_string(), "undefB".to_string()),
        ]
    );
    assert_eq!(analysis.types.get(sum), Some(Type::Error));
}

#[test]
fn checking_twice_gives_identical_results() {
    let mut p = Program::new();
    p.declare("x", Type::Int, None, 1);
    p.declare("x", Type::Bool, None, 2);
    let s = p.text("a", 3);
    let n = p.int(1, 3);
    let bad = p.binary(BinaryOp::Sub, s, n, 3);
    p.print(vec![bad], 3);
    let q = p.var("q", 4);
    let not = p.b.unary(Symbol::operator("!", 4, 8), UnaryOp::Not, q);
    p.assert(not, 4);
    let tree = p.finish();

    let first = check(&tree);
    let second = check(&tree);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.types, second.types);
    assert_eq!(first.diagnostics.len(), 4);
}

#[test]
fn initializer_for_another_variable_is_rejected() {
    let mut p = Program::new();
    p.declare("y", Type::String, None, 1);
    let reference = p.var("x", 2);
    let annotation = p.b.type_annotation(
        Symbol::new("int", TokenCategory::Type, Position::new(2, 8)),
        Type::Int,
    );
    let five = p.int(5, 2);
    let init = p.assign_node("y", five, 2);
    let decl = p
        .b
        .declaration(Symbol::keyword("var", 2, 1), reference, annotation, Some(init));
    p.statements.push(decl);

    let Program { mut b, statements } = p;
    let root = b.statements(Symbol::keyword("program", 1, 1), statements);
    let err = b.finish(root).unwrap_err();
    assert!(
        matches!(
            &err,
            TreeError::InitializerTarget { declared, assigned, .. }
                if declared == "x" && assigned == "y"
        ),
        "{err}"
    );
}

/// `var f : bool; assert !!...!f;` with the `!` chain reaching `depth` levels
/// below the program root.
fn negation_chain(depth: usize) -> Result<SyntaxTree, TreeError> {
    let mut p = Program::new();
    p.declare("f", Type::Bool, None, 1);
    // program -> assert -> `!`... -> f
    let negations = depth - 3;
    let mut expr = p.var("f", 2);
    for column in 0..negations {
        expr = p
            .b
            .unary(Symbol::operator("!", 2, 8 + column as u32), UnaryOp::Not, expr);
    }
    p.assert(expr, 2);
    let Program { mut b, statements } = p;
    let root = b.statements(Symbol::keyword("program", 1, 1), statements);
    b.finish(root)
}

#[test]
fn deepest_accepted_tree_is_checked() {
    let tree = negation_chain(MAX_TREE_DEPTH).unwrap();
    let analysis = check(&tree);
    assert!(analysis.is_well_typed(), "{:?}", analysis.diagnostics);
}

#[test]
fn tree_past_depth_limit_is_rejected() {
    let err = negation_chain(MAX_TREE_DEPTH + 1).unwrap_err();
    assert!(matches!(err, TreeError::TooDeep { limit: MAX_TREE_DEPTH }));

    let err = negation_chain(20_000).unwrap_err();
    assert!(matches!(err, TreeError::TooDeep { .. }));
}

// -- A larger program --

#[test]
fn program_with_every_statement_kind() {
    let mut p = Program::new();
    let init = p.int(0, 1);
    p.declare("total", Type::Int, Some(init), 1);
    let hello = p.text("sum: ", 2);
    p.declare("label", Type::String, Some(hello), 2);
    p.declare("done", Type::Bool, None, 3);
    p.declare("i", Type::Int, None, 4);

    let total = p.var("total", 5);
    let i = p.var("i", 5);
    let sum = p.binary(BinaryOp::Add, total, i, 5);
    p.assign("total", sum, 5);
    let body = p.take_last();
    p.for_loop("i", 1, 10, vec![body], 5);

    let total = p.var("total", 6);
    let limit = p.int(100, 6);
    let lt = p.binary(BinaryOp::Lt, total, limit, 6);
    p.assign("done", lt, 6);

    let label = p.var("label", 7);
    let total = p.var("total", 7);
    p.print(vec![label, total], 7);

    let done = p.var("done", 8);
    let again = p.var("done", 8);
    let both = p.binary(BinaryOp::And, done, again, 8);
    p.assert(both, 8);

    let target = p.var("label", 9);
    let read = p.b.read(Symbol::keyword("read", 9, 1), target);
    p.statements.push(read);
    let tree = p.finish();

    let analysis = check(&tree);
    assert!(analysis.is_well_typed(), "{:?}", analysis.diagnostics);
    assert_eq!(analysis.symbols.len(), 4);
    assert_eq!(
        analysis.symbols.lookup("label").unwrap().default,
        Value::Str(String::new())
    );
    assert_eq!(analysis.types.get(lt), Some(Type::Bool));
}

// -- Configuration --

#[test]
fn options_from_toml_change_reported_diagnostics() {
    let config = parse_config(
        r#"
        [checker]
        report_operand_mismatch = false
        report_undefined_target_reference = true
        "#,
    )
    .unwrap();

    let mut p = Program::new();
    let n = p.int(1, 1);
    let s = p.text("a", 1);
    let mixed = p.binary(BinaryOp::Eq, n, s, 1);
    p.print(vec![mixed], 1);
    let value = p.int(2, 2);
    p.assign("ghost", value, 2);
    let tree = p.finish();

    let default: Vec<_> = descriptions(&tree);
    assert_eq!(
        default,
        vec!["Mismatched operator types", "Assignment to undefined variable"]
    );

    let configured: Vec<_> = check_with_options(&tree, config.checker)
        .diagnostics
        .iter()
        .map(|d| d.description())
        .collect();
    assert_eq!(
        configured,
        vec![
            "Reference to an undefined variable",
            "Assignment to undefined variable"
        ]
    );
}

#[test]
fn default_options_match_empty_config() {
    let config = parse_config("").unwrap();
    assert_eq!(config.checker, CheckOptions::default());
}

// -- JSON trees --

const PROGRAM_JSON: &str = r#"{
    "root": 6,
    "nodes": [
        {"kind": "Reference",
         "symbol": {"lexeme": "x", "category": "identifier", "position": {"line": 1, "column": 5}}},
        {"kind": "TypeAnnotation", "declared": "int",
         "symbol": {"lexeme": "int", "category": "type", "position": {"line": 1, "column": 8}}},
        {"kind": "Declaration", "reference": 0, "annotation": 1,
         "symbol": {"lexeme": "var", "category": "keyword", "position": {"line": 1, "column": 1}}},
        {"kind": "Reference",
         "symbol": {"lexeme": "x", "category": "identifier", "position": {"line": 2, "column": 7}}},
        {"kind": "StringLiteral",
         "symbol": {"lexeme": "oops", "category": "string", "position": {"line": 2, "column": 11}}},
        {"kind": "BinaryExpr", "op": "-", "lhs": 3, "rhs": 4,
         "symbol": {"lexeme": "-", "category": "operator", "position": {"line": 2, "column": 9}}},
        {"kind": "StatementList", "statements": [2, 7],
         "symbol": {"lexeme": "program", "category": "keyword", "position": {"line": 1, "column": 1}}},
        {"kind": "Print", "args": [5],
         "symbol": {"lexeme": "print", "category": "keyword", "position": {"line": 2, "column": 1}}}
    ]
}"#;

#[test]
fn json_program_checked() {
    let tree = SyntaxTree::from_json(PROGRAM_JSON).unwrap();
    let analysis = check(&tree);
    let found: Vec<_> = analysis.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(found, vec!["Mismatched operator types: on line 2."]);
    assert_eq!(analysis.types.get(NodeId(3)), Some(Type::Int));
    assert_eq!(analysis.types.get(NodeId(5)), Some(Type::Error));
}

#[test]
fn json_round_trip_preserves_tree() {
    let tree = SyntaxTree::from_json(PROGRAM_JSON).unwrap();
    let json = tree.to_json().unwrap();
    let reloaded = SyntaxTree::from_json(&json).unwrap();
    assert_eq!(tree, reloaded);
}

#[test]
fn json_for_body_must_be_statement_list() {
    let json = r#"{
        "root": 5,
        "nodes": [
            {"kind": "Reference",
             "symbol": {"lexeme": "i", "category": "identifier", "position": {"line": 1, "column": 5}}},
            {"kind": "IntegerLiteral",
             "symbol": {"lexeme": "1", "category": "integer", "position": {"line": 1, "column": 10}}},
            {"kind": "IntegerLiteral",
             "symbol": {"lexeme": "2", "category": "integer", "position": {"line": 1, "column": 13}}},
            {"kind": "Range", "start": 1, "end": 2,
             "symbol": {"lexeme": "..", "category": "operator", "position": {"line": 1, "column": 11}}},
            {"kind": "ForCondition", "reference": 0, "range": 3,
             "symbol": {"lexeme": "in", "category": "keyword", "position": {"line": 1, "column": 7}}},
            {"kind": "For", "condition": 4, "body": 6,
             "symbol": {"lexeme": "for", "category": "keyword", "position": {"line": 1, "column": 1}}},
            {"kind": "Print", "args": [],
             "symbol": {"lexeme": "print", "category": "keyword", "position": {"line": 2, "column": 1}}}
        ]
    }"#;
    let err = SyntaxTree::from_json(json).unwrap_err();
    assert!(
        matches!(
            err,
            TreeError::UnexpectedChild {
                slot: "body",
                expected: "StatementList",
                ..
            }
        ),
        "{err}"
    );
}
