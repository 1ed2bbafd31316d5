use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn multiplication_binds_tighter_than_addition() {
    let output = execute("print 1 + 2 * 3;");
    assert_display_snapshot!(output, @r###"
    7
    "###);
}

#[test]
fn grouping_overrides_precedence() {
    let output = execute("print (1 + 2) * 3;");
    assert_display_snapshot!(output, @r###"
    9
    "###);
}

#[test]
fn strings_concatenate_with_plus() {
    let output = execute(r#"print "a" + "b";"#);
    assert_display_snapshot!(output, @r###"
    ab
    "###);
}

#[test]
fn integer_valued_doubles_print_without_a_fraction() {
    let output = execute("print 10 / 4; print 8 / 4; print 0.5 * 2;");
    assert_display_snapshot!(output, @r###"
    2.5
    2
    1
    "###);
}

#[test]
fn division_by_zero_follows_ieee_754() {
    let output = execute("print 1 / 0; print -1 / 0;");
    assert_display_snapshot!(output, @r###"
    inf
    -inf
    "###);
}

#[test]
fn comparisons_require_and_compare_numbers() {
    let output = execute("print 1 < 2; print 2 <= 2; print 3 > 4; print 4 >= 4;");
    assert_display_snapshot!(output, @r###"
    true
    true
    false
    true
    "###);
}

#[test]
fn equality_is_deep_for_values_and_strict_across_types() {
    let source = r#"print nil == nil;
print nil == 1;
print "a" == "a";
print 1 == "1";
print 1 == 1;
print true != false;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    false
    true
    false
    true
    true
    "###);
}

#[test]
fn double_negation_round_trips() {
    let output = execute("print -(-3); print !!true; print !!nil;");
    assert_display_snapshot!(output, @r###"
    3
    true
    false
    "###);
}

#[test]
fn only_nil_and_false_are_falsy() {
    let source = r#"print !nil;
print !false;
print !0;
print !"";
print !true;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    true
    false
    false
    false
    "###);
}
