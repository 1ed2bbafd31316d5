use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn classes_and_instances_print_by_name() {
    let source = r#"class Bagel {}
print Bagel;
print Bagel();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    Bagel
    Bagel instance
    "###);
}

#[test]
fn fields_are_stored_per_instance() {
    let source = r#"class Box {}
var first = Box();
var second = Box();
first.content = "coin";
second.content = "button";
print first.content;
print second.content;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    coin
    button
    "###);
}

#[test]
fn methods_see_instance_state_through_this() {
    let source = r#"class Cake {
  taste() {
    print "The " + this.flavor + " cake is delicious!";
  }
}

var cake = Cake();
cake.flavor = "chocolate";
cake.taste();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    The chocolate cake is delicious!
    "###);
}

#[test]
fn initializers_run_on_construction() {
    let source = r#"class Point {
  init(x, y) {
    this.x = x;
    this.y = y;
  }
}

var point = Point(1, 2);
print point.x + point.y;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    3
    "###);
}

#[test]
fn an_initializer_called_directly_returns_its_instance() {
    let source = r#"class Foo {
  init() {
    this.n = 1;
    return;
  }
}

var foo = Foo();
print foo.init() == foo;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    "###);
}

#[test]
fn bound_methods_remember_their_instance() {
    let source = r#"class Speaker {
  speak() {
    print this.word;
  }
}

var speaker = Speaker();
speaker.word = "hi";
var method = speaker.speak;
method();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    hi
    "###);
}

#[test]
fn fields_shadow_methods() {
    let source = r#"class Thing {
  describe() {
    print "method";
  }
}

var thing = Thing();
fun replacement() {
  print "field";
}
thing.describe = replacement;
thing.describe();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    field
    "###);
}

#[test]
fn a_set_expression_evaluates_to_the_assigned_value() {
    let source = r#"class Pair {}
var pair = Pair();
print pair.left = 1;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    1
    "###);
}
