use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn declare_and_invoke_function() {
    let source = r#"fun sayHi(first, last) {
  print "Hi, " + first + " " + last + "!";
}

sayHi("Dear", "Reader");"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    Hi, Dear Reader!
    "###);
}

#[test]
fn functions_are_first_class_values() {
    let source = r#"fun f() {}
print f;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    <fn f>
    "###);
}

#[test]
fn a_function_without_a_return_evaluates_to_nil() {
    let source = r#"fun noop() {}
print noop();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    nil
    "###);
}

#[test]
fn a_bare_return_evaluates_to_nil() {
    let source = r#"fun f() { return; }
print f();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    nil
    "###);
}

#[test]
fn a_return_unwinds_out_of_nested_blocks_and_loops() {
    let source = r#"fun firstAboveTen(start) {
  while (true) {
    if (start > 10) {
      return start;
    }
    start = start + 1;
  }
}
print firstAboveTen(3);"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    11
    "###);
}

#[test]
fn recursive_functions_can_call_themselves() {
    let source = r#"fun fib(n) {
  if (n <= 1) { return n; }
  return fib(n - 2) + fib(n - 1);
}
print fib(10);"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    55
    "###);
}

#[test]
fn closures_capture_their_defining_environment() {
    let source = r#"fun makeCounter() {
  var i = 0;
  fun count() {
    i = i + 1;
    return i;
  }
  return count;
}

var counter = makeCounter();
print counter();
print counter();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    1
    2
    "###);
}

#[test]
fn sibling_closures_share_their_captured_variable() {
    let source = r#"fun makePair() {
  var n = 0;
  fun increment() { n = n + 1; }
  fun read() { return n; }
  increment();
  increment();
  print read();
}
makePair();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    2
    "###);
}

#[test]
fn the_clock_native_is_monotonically_non_decreasing() {
    let output = execute("print clock() <= clock();");
    assert_display_snapshot!(output, @r###"
    true
    "###);
}

#[test]
fn native_functions_print_opaquely() {
    let output = execute("print clock;");
    assert_display_snapshot!(output, @r###"
    <native fn>
    "###);
}
