use crate::helpers::execute_with_error;
use insta::assert_display_snapshot;

#[test]
fn adding_a_string_and_a_number_is_reported() {
    let (output, error) = execute_with_error(r#"print "a" + 1;"#);
    assert!(output.is_empty());
    assert_display_snapshot!(error, @"[line 1] + Runtime Error: Operands must both be a number or a string.")
}

#[test]
fn a_runtime_error_stops_the_remaining_statements() {
    let (output, error) = execute_with_error("print 1;\nprint nil + 1;\nprint 2;");
    assert_display_snapshot!(output, @r###"
    1
    "###);
    assert_display_snapshot!(error, @"[line 2] + Runtime Error: Operands must both be a number or a string.")
}

#[test]
fn arithmetic_on_non_numbers_is_reported() {
    let (_, error) = execute_with_error(r#"print "a" * 2;"#);
    assert_display_snapshot!(error, @"[line 1] * Runtime Error: Both operands must be a number.")
}

#[test]
fn negating_a_non_number_is_reported() {
    let (_, error) = execute_with_error(r#"print -"a";"#);
    assert_display_snapshot!(error, @"[line 1] - Runtime Error: Operand must be a number.")
}

#[test]
fn reading_an_undefined_variable_is_reported() {
    let (_, error) = execute_with_error("print missing;");
    assert_display_snapshot!(error, @"[line 1] missing Runtime Error: Undefined variable 'missing'.")
}

#[test]
fn assigning_an_undefined_variable_is_reported() {
    let (_, error) = execute_with_error("missing = 1;");
    assert_display_snapshot!(error, @"[line 1] missing Runtime Error: Undefined variable 'missing'.")
}

#[test]
fn calling_a_non_callable_is_reported() {
    let (_, error) = execute_with_error(r#""totally"();"#);
    assert_display_snapshot!(error, @"[line 1] ) Runtime Error: Can only call functions and classes.")
}

#[test]
fn an_arity_mismatch_is_reported() {
    let (_, error) = execute_with_error("fun f(a) { return a; }\nf(1, 2);");
    assert_display_snapshot!(error, @"[line 2] ) Runtime Error: Expected 1 arguments but got 2.")
}

#[test]
fn property_access_on_a_non_instance_is_reported() {
    let (_, error) = execute_with_error("print 4.x;");
    assert_display_snapshot!(error, @"[line 1] x Runtime Error: Only instances have properties.")
}

#[test]
fn setting_a_field_on_a_non_instance_is_reported() {
    let (_, error) = execute_with_error(r#"var s = "str"; s.field = 1;"#);
    assert_display_snapshot!(error, @"[line 1] field Runtime Error: Only instances have fields.")
}

#[test]
fn reading_an_undefined_property_is_reported() {
    let (_, error) = execute_with_error("class A {}\nprint A().missing;");
    assert_display_snapshot!(error, @"[line 2] missing Runtime Error: Undefined property 'missing'.")
}

#[test]
fn an_undefined_super_method_is_reported() {
    let (_, error) = execute_with_error(
        "class A {}\nclass B < A {\n  m() {\n    super.missing();\n  }\n}\nB().m();",
    );
    assert_display_snapshot!(error, @"[line 4] missing Runtime Error: Undefined property 'missing'.")
}

#[test]
fn inheriting_from_a_non_class_is_reported() {
    let (_, error) = execute_with_error("var NotAClass = 1;\nclass Sub < NotAClass {}");
    assert_display_snapshot!(error, @"[line 2] NotAClass Runtime Error: Superclass must be a class.")
}

#[test]
fn static_errors_prevent_execution() {
    let (output, error) = execute_with_error("print 1; return 1;");
    assert!(output.is_empty());
    assert_display_snapshot!(error, @"[line 1] Error at 'return': Cannot return from top-level code.")
}

#[test]
fn parse_errors_prevent_execution() {
    let (output, error) = execute_with_error("print 1;\nprint ;");
    assert!(output.is_empty());
    assert_display_snapshot!(error, @"[line 2] Parse Error at ';': Expect expression.")
}
