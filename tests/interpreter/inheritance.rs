use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn methods_are_inherited() {
    let source = r#"class A {
  greet() {
    print "hi";
  }
}
class B < A {}
B().greet();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    hi
    "###);
}

#[test]
fn subclasses_override_methods() {
    let source = r#"class A {
  method() {
    print "A method";
  }
}
class B < A {
  method() {
    print "B method";
  }
}
B().method();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    B method
    "###);
}

#[test]
fn super_calls_skip_the_override() {
    let source = r#"class A {
  method() {
    print "A method";
  }
}
class B < A {
  method() {
    print "B method";
  }
  test() {
    super.method();
  }
}
B().test();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    A method
    "###);
}

#[test]
fn super_binds_to_the_class_declaring_the_method() {
    let source = r#"class A {
  method() {
    print "A";
  }
}
class B < A {
  method() {
    print "B";
  }
  test() {
    super.method();
  }
}
class C < B {}
C().test();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    A
    "###);
}

#[test]
fn initializers_chain_through_super() {
    let source = r#"class A {
  init(n) {
    this.n = n;
  }
}
class B < A {
  init(n) {
    super.init(n);
    this.n = n * 2;
  }
}
print B(3).n;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    6
    "###);
}

#[test]
fn a_subclass_inherits_its_superclass_initializer() {
    let source = r#"class A {
  init(n) {
    this.n = n;
  }
}
class B < A {}
print B(5).n;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    5
    "###);
}

#[test]
fn inherited_methods_see_subclass_instances() {
    let source = r#"class Doughnut {
  cook() {
    print "Fry until golden, " + this.kind + ".";
  }
}
class BostonCream < Doughnut {}
var pastry = BostonCream();
pastry.kind = "Boston cream";
pastry.cook();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    Fry until golden, Boston cream.
    "###);
}
