use brook::ast_printer::AstPrinter;
use brook::error::BrookError;
use brook::expr::{Expr, LiteralValue};
use brook::parser::Parser;
use brook::scanner::Scanner;
use brook::stmt::Stmt;
use brook::token::Token;

fn parse_source(source: &str) -> (Vec<Stmt>, Vec<BrookError>) {
    let tokens: Vec<Token> = Scanner::new(source.as_bytes())
        .collect::<Result<Vec<Token>, BrookError>>()
        .expect("test source should scan cleanly");

    Parser::new(tokens).parse()
}

/// Parse a single expression statement and render the expression in
/// canonical prefix form.
fn parse_expression(source: &str) -> String {
    let (statements, errors) = parse_source(&format!("{};", source));

    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
    assert_eq!(statements.len(), 1);

    match &statements[0] {
        Stmt::Expression(expr) => AstPrinter::print(expr),
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(parse_expression("1 + 2 * 3"), "add(1, mul(2, 3))");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(parse_expression("(1 + 2) * 3"), "mul(paren(add(1, 2)), 3)");
}

#[test]
fn unary_binds_tighter_than_binary() {
    assert_eq!(parse_expression("-1 - -2"), "sub(neg(1), neg(2))");
}

#[test]
fn comparison_binds_tighter_than_equality() {
    assert_eq!(parse_expression("1 < 2 == true"), "eq(lt(1, 2), true)");
}

#[test]
fn logical_or_is_looser_than_and() {
    assert_eq!(parse_expression("a or b and c"), "or(a, and(b, c))");
}

#[test]
fn logical_operators_build_logical_nodes() {
    let (statements, errors) = parse_source("a and b;");
    assert!(errors.is_empty());

    match &statements[0] {
        Stmt::Expression(expr) => {
            assert!(
                matches!(expr, Expr::Logical { .. }),
                "'and' should parse to a Logical node, got {:?}",
                expr
            );
        }
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(parse_expression("a = b = 1"), "set(a, set(b, 1))");
}

#[test]
fn calls_chain_left_to_right() {
    assert_eq!(parse_expression("f(1)(2)"), "call(call(f, 1), 2)");
}

#[test]
fn canonical_form_is_deterministic() {
    let source = "f(a + 1) or !done and x <= 2 * (y - 3)";
    assert_eq!(parse_expression(source), parse_expression(source));
}

#[test]
fn invalid_assignment_target_is_nonfatal() {
    let (statements, errors) = parse_source("1 = 2;\nprint 3;");

    // The bad assignment is reported at the '=' but the statement (and the
    // one after it) still parse.
    assert_eq!(statements.len(), 2);
    assert_eq!(errors.len(), 1);

    let message = errors[0].to_string();
    assert!(message.contains("Invalid assignment target."), "{}", message);
    assert!(message.contains(" at '='"), "{}", message);
}

#[test]
fn for_loop_desugars_to_while() {
    let (statements, errors) = parse_source("for (var i = 0; i < 3; i = i + 1) print i;");
    assert!(errors.is_empty());
    assert_eq!(statements.len(), 1);

    // { var i = 0; while (i < 3) { print i; i = i + 1; } }
    let outer = match &statements[0] {
        Stmt::Block(stmts) => stmts,
        other => panic!("Expected desugared block, got {:?}", other),
    };
    assert_eq!(outer.len(), 2);
    assert!(matches!(&outer[0], Stmt::Var { .. }));

    let (condition, body) = match &outer[1] {
        Stmt::While { condition, body } => (condition, body),
        other => panic!("Expected while loop, got {:?}", other),
    };
    assert_eq!(AstPrinter::print(condition), "lt(i, 3)");

    let inner = match body.as_ref() {
        Stmt::Block(stmts) => stmts,
        other => panic!("Expected loop body block, got {:?}", other),
    };
    assert_eq!(inner.len(), 2);
    assert!(matches!(&inner[0], Stmt::Print(_)));

    match &inner[1] {
        Stmt::Expression(expr) => assert_eq!(AstPrinter::print(expr), "set(i, add(i, 1))"),
        other => panic!("Expected increment expression, got {:?}", other),
    }
}

#[test]
fn for_loop_with_empty_clauses_desugars_bare() {
    let (statements, errors) = parse_source("for (;;) break;");
    assert!(errors.is_empty());
    assert_eq!(statements.len(), 1);

    // No init and no increment mean no wrapping blocks; the missing
    // condition becomes a literal true.
    match &statements[0] {
        Stmt::While { condition, body } => {
            assert!(matches!(condition, Expr::Literal(LiteralValue::True)));
            assert!(matches!(body.as_ref(), Stmt::Break { .. }));
        }
        other => panic!("Expected bare while loop, got {:?}", other),
    }
}

#[test]
fn parse_error_synchronizes_to_next_statement() {
    let (statements, errors) = parse_source("var 1 = 2;\nprint 3;");

    // The bad declaration contributes no node; the next one parses.
    assert_eq!(statements.len(), 1);
    assert!(matches!(&statements[0], Stmt::Print(_)));

    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("Expect variable name."));
}

#[test]
fn multiple_errors_accumulate_in_one_pass() {
    let (statements, errors) = parse_source("var 1;\nvar 2;\nvar ok = 3;");

    assert_eq!(statements.len(), 1);
    assert_eq!(errors.len(), 2);
}

#[test]
fn error_at_eof_reports_at_end() {
    let (_, errors) = parse_source("print 1 +");

    assert!(!errors.is_empty());
    assert!(
        errors[0].to_string().contains(" at end"),
        "{}",
        errors[0].to_string()
    );
}

#[test]
fn more_than_255_arguments_is_reported() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));

    let (statements, errors) = parse_source(&source);

    // Non-fatal: the call still parses.
    assert_eq!(statements.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .to_string()
        .contains("Can't have more than 255 arguments."));
}

#[test]
fn more_than_255_parameters_is_reported() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let (statements, errors) = parse_source(&source);

    assert_eq!(statements.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .to_string()
        .contains("Can't have more than 255 parameters."));
}
