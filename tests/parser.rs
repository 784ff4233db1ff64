use stepcheck::expr::{add, mul, neg, pow, sub, Equation, Expr, Func, Statement};
use stepcheck::{parse_equation, parse_expr, parse_statement, rational, CasError};

fn x() -> Expr {
    Expr::var("x")
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(
        parse_expr("1 + 2*x").unwrap(),
        add(Expr::integer(1), mul(Expr::integer(2), x()))
    );
    assert_eq!(
        parse_expr("x - 1 - 2").unwrap(),
        sub(sub(x(), Expr::integer(1)), Expr::integer(2))
    );
    assert_eq!(
        parse_expr("x^2^3").unwrap(),
        pow(x(), pow(Expr::integer(2), Expr::integer(3)))
    );
    assert_eq!(
        parse_expr("(x + 1)*2").unwrap(),
        mul(add(x(), Expr::integer(1)), Expr::integer(2))
    );
}

#[test]
fn unary_minus_binds_looser_than_power() {
    assert_eq!(
        parse_expr("-x^2").unwrap(),
        neg(pow(x(), Expr::integer(2)))
    );
    assert_eq!(
        parse_expr("x^-1").unwrap(),
        pow(x(), neg(Expr::integer(1)))
    );
}

#[test]
fn both_power_spellings_give_the_same_tree() {
    assert_eq!(parse_expr("x**2").unwrap(), parse_expr("x^2").unwrap());
    assert_eq!(
        parse_expr("(x+2)**3 * y").unwrap(),
        parse_expr("(x + 2)^3*y").unwrap()
    );
}

#[test]
fn decimals_are_parsed_exactly() {
    assert_eq!(parse_expr("0.5").unwrap(), Expr::rational(rational(1, 2)));
    assert_eq!(parse_expr("1.25").unwrap(), Expr::rational(rational(5, 4)));
}

#[test]
fn functions_and_square_roots() {
    assert_eq!(
        parse_expr("sin(x)").unwrap(),
        Expr::apply(Func::Sin, x())
    );
    assert_eq!(
        parse_expr("sqrt(x + 1)").unwrap(),
        pow(add(x(), Expr::integer(1)), Expr::constant(1, 2))
    );
    assert!(parse_expr("frobnicate(x)").is_err());
    assert!(parse_expr("sin + 1").is_err());
}

#[test]
fn statements_take_the_right_shape() {
    assert!(matches!(
        parse_statement("x^2 - 4").unwrap(),
        Statement::Expression(_)
    ));
    assert_eq!(
        parse_statement("x + 2 = 0").unwrap(),
        Statement::Equation(Equation::new(add(x(), Expr::integer(2)), Expr::integer(0)))
    );
    match parse_statement("x+2=0 or x+3=0").unwrap() {
        Statement::Branch(alternatives) => {
            assert_eq!(alternatives.len(), 2);
            assert_eq!(alternatives[1], parse_equation("x + 3 = 0").unwrap());
        }
        other => panic!("expected a branch, got {other:?}"),
    }
}

#[test]
fn identifiers_may_contain_the_disjunction_keyword() {
    assert_eq!(parse_expr("order + x").unwrap(), add(Expr::var("order"), x()));
    assert!(matches!(
        parse_statement("origin = 1").unwrap(),
        Statement::Equation(_)
    ));
}

#[test]
fn malformed_input_is_a_parse_error() {
    let inputs = [
        "x +* 2",
        "(x + 1",
        "x + 1)",
        "",
        "x = 1 = 2",
        "x = 1 or",
        "x + 1 or x = 2",
        "2 $ x",
    ];
    for input in inputs {
        match parse_statement(input) {
            Err(CasError::Parse(message)) => assert!(!message.is_empty()),
            other => panic!("expected a parse error for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn parse_errors_name_the_offending_text() {
    let err = parse_expr("x +* 2").unwrap_err();
    assert!(err.to_string().contains("x +* 2"), "{err}");
}

#[test]
fn equation_parser_rejects_other_shapes() {
    assert!(parse_equation("x + 1").is_err());
    assert!(parse_equation("x = 1 or x = 2").is_err());
    assert!(parse_expr("x = 1").is_err());
}

#[test]
fn deeply_nested_input_is_a_parse_error() {
    let nested = format!("{}x{} = 0", "(".repeat(1000), ")".repeat(1000));
    match parse_statement(&nested) {
        Err(CasError::Parse(message)) => assert!(message.contains("nested too deeply"), "{message}"),
        other => panic!("expected a parse error, got {other:?}"),
    }

    let negations = format!("{}x", "-".repeat(1000));
    assert!(matches!(parse_expr(&negations), Err(CasError::Parse(_))));
    let exponents = vec!["x"; 1000].join("^");
    assert!(matches!(parse_expr(&exponents), Err(CasError::Parse(_))));
    let calls = format!("{}x{}", "sin(".repeat(1000), ")".repeat(1000));
    assert!(matches!(parse_expr(&calls), Err(CasError::Parse(_))));
}

#[test]
fn overlong_sums_are_a_parse_error() {
    let sum = vec!["x"; 5000].join(" + ");
    match parse_expr(&sum) {
        Err(CasError::Parse(message)) => assert!(message.contains("nested too deeply"), "{message}"),
        other => panic!("expected a parse error, got {other:?}"),
    }
    let product = vec!["x"; 5000].join("*");
    assert!(parse_expr(&product).is_err());
}

#[test]
fn moderate_nesting_still_parses() {
    let nested = format!("{}x{}", "(".repeat(32), ")".repeat(32));
    assert_eq!(parse_expr(&nested).unwrap(), x());
    let sum = vec!["x"; 100].join(" + ");
    assert!(parse_expr(&sum).is_ok());
    assert!(parse_expr("sin(cos(sqrt(-(x^2 + 1))))").is_ok());
}
