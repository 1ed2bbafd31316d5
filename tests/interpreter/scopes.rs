use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn lexical_scopes_are_interpreted_correctly() {
    let source = r#"var a = "global a";
var b = "global b";
var c = "global c";
{
  var a = "outer a";
  var b = "outer b";
  {
    var a = "inner a";
    print a;
    print b;
    print c;
  }
  print a;
  print b;
  print c;
}
print a;
print b;
print c;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    inner a
    outer b
    global c
    outer a
    outer b
    global c
    global a
    global b
    global c
    "###);
}

#[test]
fn a_block_shadows_without_clobbering() {
    let source = r#"var a = 1;
{
  var a = 2;
  print a;
}
print a;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    2
    1
    "###);
}

#[test]
fn a_closure_keeps_the_binding_it_resolved_to() {
    let source = r#"var a = "global";
{
  fun showA() {
    print a;
  }

  showA();
  var a = "block";
  showA();
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    global
    global
    "###);
}

#[test]
fn assignments_in_inner_scopes_reach_the_declaring_scope() {
    let source = r#"var a = 1;
{
  a = 2;
}
print a;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    2
    "###);
}
