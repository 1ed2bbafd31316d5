use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn two_branch_conditional_works() {
    let source = r#"if (3 > 5) {
    print true;
} else {
    print false;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    false
    "###);
}

#[test]
fn single_branch_conditional_works() {
    let source = r#"if (5 > 2) {
    print true;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    "###);
}

#[test]
fn while_loops_run_until_their_condition_turns_false() {
    let source = r#"var i = 0;
while (i < 3) {
    print i;
    i = i + 1;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    0
    1
    2
    "###);
}

#[test]
fn while_bodies_do_not_need_braces() {
    let source = r#"var i = 0;
while (i < 2) i = i + 1;
print i;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    2
    "###);
}

#[test]
fn a_for_loop_is_equivalent_to_its_desugared_while_loop() {
    let for_output = execute("for (var i = 0; i < 3; i = i + 1) print i;");
    let while_output = execute("{ var i = 0; while (i < 3) { print i; i = i + 1; } }");
    assert_eq!(for_output, while_output);
    assert_display_snapshot!(for_output, @r###"
    0
    1
    2
    "###);
}

#[test]
fn logical_operators_short_circuit_to_the_deciding_operand() {
    let source = r#"print nil or "fallback";
print "first" and "second";
print false and oops;
print true or oops;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    fallback
    second
    false
    true
    "###);
}
