//! Whole-pipeline tests: source text in, syntax tree (or error) out.

use commandscript::{
    base::{source_file::SourceFile, Error, SyntaxError},
    lexical::token::{OperatorKind, TokenKind},
    parse,
    syntax::syntax_tree::{
        expression::{Component, Expression, ExpressionTerm, Name},
        Render,
    },
    tokenize,
};

fn single_expression(source: &str) -> Expression {
    let program = parse(source).expect("Failed to parse");
    assert_eq!(program.statements().len(), 1);

    let statement = program.statements()[0]
        .as_expression()
        .expect("Expected an expression statement");
    assert_eq!(statement.tuple().items().len(), 1);

    statement.tuple().items()[0].clone()
}

/// Unwraps the single-term precedence wrappers down to the component leaf.
fn leaf_component(expression: &Expression) -> &Component {
    let mut expression = expression;

    loop {
        assert!(expression.chain().is_empty(), "Expected a chainless wrapper");
        assert!(expression.unary().is_none(), "Expected a non-unary wrapper");

        match expression.first() {
            ExpressionTerm::Expression(inner) => expression = inner,
            ExpressionTerm::Component(component) => return component,
        }
    }
}

/// Descends through the single-term wrappers to the first level that carries
/// an operator chain.
fn chained_level(expression: &Expression) -> &Expression {
    let mut expression = expression;

    loop {
        if !expression.chain().is_empty() {
            return expression;
        }

        match expression.first() {
            ExpressionTerm::Expression(inner) => expression = inner,
            ExpressionTerm::Component(_) => panic!("Expected a chained expression"),
        }
    }
}

fn syntax_error(source: &str) -> SyntaxError {
    match parse(source) {
        Ok(_) => panic!("Expecting parsing failure for {source:?}"),
        Err(Error::SyntaxError(err)) => err,
    }
}

#[test]
fn integer_literal_bases() {
    let tokens = tokenize("0 0b101 0x1F 017 42").expect("Failed to tokenize");

    let values: Vec<i64> = tokens
        .iter()
        .filter_map(|token| token.as_integer().ok())
        .collect();

    assert_eq!(values, vec![0, 5, 31, 15, 42]);
    assert!(tokens.last().expect("Token stream is never empty").is_eof());
}

#[test]
fn float_literals_and_ranges() {
    let tokens = tokenize("1.5 0.0").expect("Failed to tokenize");
    assert_eq!(tokens[0].as_float().expect("Expected a float"), 1.5);
    assert_eq!(tokens[1].as_float().expect("Expected a float"), 0.0);

    // the point only starts a fraction when a digit follows, so a range
    // operator after an integer is not swallowed
    let tokens = tokenize("1..5").expect("Failed to tokenize");
    assert_eq!(tokens[0].kind(), &TokenKind::Integer(1));
    assert_eq!(tokens[1].kind(), &TokenKind::Operator(OperatorKind::Range));
    assert_eq!(tokens[2].kind(), &TokenKind::Integer(5));
}

#[test]
fn render_shows_flat_chain() {
    let program = parse("1 + 2").expect("Failed to parse");
    let rendered = program.render(0);

    assert!(rendered.starts_with("Program\n"));
    assert!(rendered.contains("Chained '+'"));
    assert!(rendered.contains("Integer 1"));
    assert!(rendered.contains("Integer 2"));

    let program = parse("x = 0.0").expect("Failed to parse");
    assert!(program.render(0).contains("Float 0.0"));
}

#[test]
fn repeated_parses_agree() {
    let source = "m = { a -> 1 }\nf(1, 2)\ng = (x, y) -> x + y";

    let first = parse(source).expect("Failed to parse");
    let second = parse(source).expect("Failed to parse");

    assert_eq!(first, second);
    assert_eq!(first.render(0), second.render(0));
}

#[test]
fn for_loop_targets() {
    let program = parse("for ((a, b) in xs) y").expect("Failed to parse");
    let for_statement = program.statements()[0]
        .as_for()
        .expect("Expected a for statement");

    let sequence = for_statement.targets().items()[0]
        .as_sequence()
        .expect("Expected a nested sequence");
    assert_eq!(sequence.items().len(), 2);
    assert!(sequence.is_destructuring());

    // a single bare target needs no parentheses and no comma
    let program = parse("for (a in xs) y").expect("Failed to parse");
    let for_statement = program.statements()[0]
        .as_for()
        .expect("Expected a for statement");

    assert_eq!(for_statement.targets().items().len(), 1);
    assert!(!for_statement.targets().is_destructuring());
}

#[test]
fn assignment_destructuring() {
    // a parenthesized single target destructures only with the extra comma
    let program = parse("(a,) = t").expect("Failed to parse");
    let assign = program.statements()[0]
        .as_assign()
        .expect("Expected an assignment");

    assert!(assign.targets().is_destructuring());
    let sequence = assign.targets().items()[0]
        .as_sequence()
        .expect("Expected a nested sequence");
    assert_eq!(sequence.items().len(), 1);

    let program = parse("a, b = t").expect("Failed to parse");
    let assign = program.statements()[0]
        .as_assign()
        .expect("Expected an assignment");

    assert!(assign.targets().is_destructuring());
    assert_eq!(assign.targets().items().len(), 2);

    // without the comma the parentheses are a grouping, which is not a
    // valid assignment target
    let err = syntax_error("(a) = t");
    assert!(err.message().contains("Unexpected token"));
}

#[test]
fn parenthesized_grouping_in_relations() {
    let expression = single_expression("(a) in xs");
    let relations = chained_level(&expression);

    assert!(relations.is_relations());
    assert_eq!(relations.chain().len(), 1);
    assert_eq!(relations.chain()[0].0, OperatorKind::In);
}

#[test]
fn relation_chains_stay_flat() {
    let expression = single_expression("a < b < c");
    let relations = chained_level(&expression);

    assert!(relations.is_relations());
    assert_eq!(relations.chain().len(), 2);
    assert_eq!(relations.chain()[0].0, OperatorKind::Less);
    assert_eq!(relations.chain()[1].0, OperatorKind::Less);
}

#[test]
fn lambda_and_tuple_disambiguation() {
    // `()` followed by the pointer operator is a zero-argument lambda
    let expression = single_expression("() -> 1");
    let unit = leaf_component(&expression)
        .base()
        .as_unit()
        .expect("Expected a unit");
    let lambda = unit.kind().as_lambda().expect("Expected a lambda");
    assert!(lambda.name().is_none());
    assert!(lambda.params().is_empty());

    // one parenthesized name plus the pointer operator is a one-argument
    // lambda
    let expression = single_expression("(x) -> x");
    let unit = leaf_component(&expression)
        .base()
        .as_unit()
        .expect("Expected a unit");
    let lambda = unit.kind().as_lambda().expect("Expected a lambda");
    assert_eq!(
        lambda.params().iter().map(Name::name).collect::<Vec<_>>(),
        vec!["x"]
    );

    // without the pointer operator the same tokens are a plain grouping
    let expression = single_expression("(x)");
    let unit = leaf_component(&expression)
        .base()
        .as_unit()
        .expect("Expected a unit");
    let grouped = unit.kind().as_expression().expect("Expected a grouping");
    assert_eq!(
        grouped.as_argument_name().map(Name::name),
        Some(&"x".to_owned())
    );

    let expression = single_expression("(x, y)");
    let unit = leaf_component(&expression)
        .base()
        .as_unit()
        .expect("Expected a unit");
    let tuple = unit.kind().as_tuple().expect("Expected a tuple");
    assert_eq!(tuple.items().len(), 2);

    let expression = single_expression("(x, y) -> x");
    let unit = leaf_component(&expression)
        .base()
        .as_unit()
        .expect("Expected a unit");
    let lambda = unit.kind().as_lambda().expect("Expected a lambda");
    assert_eq!(lambda.params().len(), 2);

    // every item must reinterpret as a parameter name, otherwise the items
    // stay a tuple and the pointer operator is left dangling
    syntax_error("(x, 1) -> x");

    // a trailing comma forces the tuple reading
    syntax_error("(x, y,) -> x");
}

#[test]
fn map_entry_shorthand() {
    let program = parse("m = { a -> 1, b -> 2 }").expect("Failed to parse");
    let assign = program.statements()[0]
        .as_assign()
        .expect("Expected an assignment");
    assert_eq!(assign.value().items().len(), 1);

    let unit = leaf_component(&assign.value().items()[0])
        .base()
        .as_unit()
        .expect("Expected a unit");
    let map = unit.kind().as_map().expect("Expected a map");
    assert_eq!(map.items().len(), 2);

    // the pointer-pair keys are synthesized string constants
    let (key, _) = &map.items()[0];
    let constant = leaf_component(key)
        .base()
        .as_constant()
        .expect("Expected a constant key");
    assert_eq!(constant.value().as_string(), Some(&"a".to_owned()));

    // a colon entry keeps the key expression as written
    let program = parse("m = { a: 1 }").expect("Failed to parse");
    let assign = program.statements()[0]
        .as_assign()
        .expect("Expected an assignment");

    let unit = leaf_component(&assign.value().items()[0])
        .base()
        .as_unit()
        .expect("Expected a unit");
    let map = unit.kind().as_map().expect("Expected a map");

    let (key, _) = &map.items()[0];
    let name = leaf_component(key)
        .base()
        .as_name()
        .expect("Expected a name key");
    assert_eq!(name.name(), "a");
}

#[test]
fn attribute_continues_across_newline() {
    let expression = single_expression("x\n.y");
    let component = leaf_component(&expression);

    assert_eq!(component.base().as_name().map(Name::name), Some(&"x".to_owned()));
    assert_eq!(component.modifiers().len(), 1);

    let attribute = component.modifiers()[0]
        .as_attribute()
        .expect("Expected an attribute");
    assert_eq!(attribute.name().name(), "y");
}

#[test]
fn operator_on_next_line_ends_component() {
    let expression = single_expression("x\n+ y");
    let term = chained_level(&expression);

    assert_eq!(term.chain().len(), 1);
    assert_eq!(term.chain()[0].0, OperatorKind::Plus);

    // the newline rolled back out of the component, so the first term is the
    // bare name without modifiers
    let ExpressionTerm::Expression(first) = term.first() else {
        panic!("Expected a wrapped first term");
    };
    let component = leaf_component(first);
    assert_eq!(component.base().as_name().map(Name::name), Some(&"x".to_owned()));
    assert!(component.modifiers().is_empty());
}

#[test]
fn lexer_failures_are_positioned() {
    let Err(Error::SyntaxError(err)) = tokenize(r#""\q""#) else {
        panic!("Expecting tokenizing failure");
    };
    assert_eq!(err.row(), 1);
    assert!(err.message().contains("Invalid escape character 'q'"));

    let Err(Error::SyntaxError(err)) = tokenize("'never ends") else {
        panic!("Expecting tokenizing failure");
    };
    assert!(err.message().contains("Unexpected EOF"));
}

#[test]
fn control_flow_context_checks() {
    assert!(syntax_error("break").message().contains("outside of a loop"));
    assert!(syntax_error("continue").message().contains("outside of a loop"));
    assert!(syntax_error("return 1")
        .message()
        .contains("outside of a function"));

    // no loop encloses the function body here
    assert!(syntax_error("def f() break").message().contains("outside of a loop"));

    parse("while (x) break").expect("Failed to parse");
    parse("for (a in xs) continue").expect("Failed to parse");
    parse("def f() return 1").expect("Failed to parse");
    parse("g = () -> return 1").expect("Failed to parse");
}

#[test]
fn statement_terminators() {
    let program = parse("a\nb; c").expect("Failed to parse");
    assert_eq!(program.statements().len(), 3);
}

#[test]
fn if_else_statement() {
    let program = parse("if (a) b\nelse c").expect("Failed to parse");
    let if_statement = program.statements()[0]
        .as_if()
        .expect("Expected an if statement");

    assert!(if_statement.else_branch().is_some());
}

#[test]
fn try_except_finally() {
    let program = parse("try x\nexcept (E as e) y\nfinally z").expect("Failed to parse");
    let try_statement = program.statements()[0]
        .as_try()
        .expect("Expected a try statement");

    assert_eq!(try_statement.handlers().len(), 1);
    let handler = &try_statement.handlers()[0];
    assert!(!handler.is_wildcard());
    assert_eq!(handler.types().len(), 1);
    assert_eq!(handler.binding().as_ref().map(Name::name), Some(&"e".to_owned()));
    assert!(try_statement.finally().is_some());

    let program = parse("try x\nexcept y").expect("Failed to parse");
    let try_statement = program.statements()[0]
        .as_try()
        .expect("Expected a try statement");
    assert!(try_statement.handlers()[0].is_wildcard());

    assert!(syntax_error("try x")
        .message()
        .contains("'try' statement requires"));
}

#[test]
fn delete_needs_a_mutable_target() {
    let program = parse("delete x.y").expect("Failed to parse");
    assert!(program.statements()[0].is_delete());

    assert!(syntax_error("delete f()").message().contains("must be mutable"));
}

#[test]
fn inplace_operation() {
    let program = parse("x += 1").expect("Failed to parse");
    let inplace = program.statements()[0]
        .as_in_place()
        .expect("Expected an in-place statement");

    assert_eq!(inplace.op(), OperatorKind::InplaceAdd);
}

#[test]
fn import_and_define() {
    let program = parse("import os.path").expect("Failed to parse");
    let import = program.statements()[0]
        .as_import()
        .expect("Expected an import");
    assert_eq!(
        import.names().iter().map(Name::name).collect::<Vec<_>>(),
        vec!["os", "path"]
    );

    let program = parse("def f(a, b) { return a\n}").expect("Failed to parse");
    let define = program.statements()[0]
        .as_define()
        .expect("Expected a definition");

    assert_eq!(define.name().as_ref().map(Name::name), Some(&"f".to_owned()));
    assert_eq!(define.params().len(), 2);
    assert!(define.body().is_block());
}

#[test]
fn assignment_tuple_form() {
    let program = parse("a = 1, 2").expect("Failed to parse");
    let assign = program.statements()[0]
        .as_assign()
        .expect("Expected an assignment");

    assert!(assign.is_tuple());
    assert_eq!(assign.value().items().len(), 2);

    let program = parse("a = 1").expect("Failed to parse");
    let assign = program.statements()[0]
        .as_assign()
        .expect("Expected an assignment");

    assert!(!assign.is_tuple());
    assert_eq!(assign.value().items().len(), 1);
}

#[test]
fn error_display_marks_the_position() {
    let source = "(a) = t";
    let rendered = syntax_error(source).display_with(&SourceFile::new(source));

    assert!(rendered.contains("(a) = t"));
    assert!(rendered.contains("Unexpected token"));
    assert!(rendered.contains('^'));
}
