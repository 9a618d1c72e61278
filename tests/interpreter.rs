mod common;

use common::{compile_errors, output_of, run, runtime_error, session};
use rox::error::RunError;
use rox::value::Value;

// ───────────────────────────── expressions ─────────────────────────────

#[test]
fn test_arithmetic_and_number_printing() {
    assert_eq!(
        output_of("print 1 + 2 * 3;\nprint 7 / 2;\nprint -(4 - 6);\nprint 10 / 4 * 2;"),
        vec!["7", "3.5", "2", "5"]
    );
}

#[test]
fn test_division_by_zero_follows_ieee() {
    assert_eq!(
        output_of("print 1 / 0;\nprint -1 / 0;\nprint 0 / 0 == 0 / 0;"),
        vec!["inf", "-inf", "false"]
    );
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        output_of("var a = \"foo\";\nprint a + \"bar\";\nprint \"\" + \"\";"),
        vec!["foobar", ""]
    );
}

#[test]
fn test_equality() {
    let source = r#"
        print 1 == 1;
        print "a" == "a";
        print nil == nil;
        print nil == false;
        print 0 == false;
        print "1" == 1;
        print 1 != 2;
    "#;

    assert_eq!(
        output_of(source),
        vec!["true", "true", "true", "false", "false", "false", "true"]
    );
}

#[test]
fn test_truthiness() {
    let source = r#"
        if (0) print "zero is truthy"; else print "no";
        if ("") print "empty string is truthy"; else print "no";
        if (nil) print "no"; else print "nil is falsy";
        if (false) print "no"; else print "false is falsy";
        print !nil;
        print !0;
    "#;

    assert_eq!(
        output_of(source),
        vec![
            "zero is truthy",
            "empty string is truthy",
            "nil is falsy",
            "false is falsy",
            "true",
            "false",
        ]
    );
}

#[test]
fn test_logical_operators_yield_operands_and_short_circuit() {
    let source = r#"
        print "hi" or 2;
        print nil or "yes";
        print nil and boom();
        print 1 and 2;
        var called = false;
        fun touch() { called = true; return true; }
        true or touch();
        print called;
    "#;

    assert_eq!(output_of(source), vec!["hi", "yes", "nil", "2", "false"]);
}

// ───────────────────────────── variables ───────────────────────────────

#[test]
fn test_block_scoping_and_shadowing() {
    let source = r#"
        var a = "outer";
        {
            var a = "inner";
            print a;
        }
        print a;
        var b;
        print b;
    "#;

    assert_eq!(output_of(source), vec!["inner", "outer", "nil"]);
}

#[test]
fn test_assignment_reaches_enclosing_frame() {
    let source = r#"
        var a = 1;
        {
            a = a + 1;
            {
                a = a * 10;
            }
        }
        print a;
        print a = 3;
    "#;

    assert_eq!(output_of(source), vec!["20", "3"]);
}

#[test]
fn test_undefined_variable() {
    let (out, err) = runtime_error("print 1;\nprint missing;");

    assert_eq!(out, "1\n");
    assert_eq!(err, "Undefined variable 'missing'.\n[line 2]");

    let (_, err) = runtime_error("missing = 1;");
    assert_eq!(err, "Undefined variable 'missing'.\n[line 1]");
}

// ───────────────────────────── control flow ────────────────────────────

#[test]
fn test_while_and_for_loops() {
    let source = r#"
        var i = 0;
        while (i < 3) {
            print i;
            i = i + 1;
        }
        for (var j = 0; j < 3; j = j + 1) print j * 10;
    "#;

    assert_eq!(output_of(source), vec!["0", "1", "2", "0", "10", "20"]);
}

#[test]
fn test_for_loop_variable_is_scoped_to_loop() {
    let (out, err) = runtime_error("for (var k = 0; k < 1; k = k + 1) {}\nprint k;");

    assert_eq!(out, "");
    assert_eq!(err, "Undefined variable 'k'.\n[line 2]");
}

#[test]
fn test_return_unwinds_loops_and_blocks() {
    let source = r#"
        fun first_over(limit) {
            for (var i = 0; ; i = i + 1) {
                {
                    if (i * i > limit) return i;
                }
            }
        }
        print first_over(10);
    "#;

    assert_eq!(output_of(source), vec!["4"]);
}

// ───────────────────────────── functions ───────────────────────────────

#[test]
fn test_recursion() {
    let source = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(15);
    "#;

    assert_eq!(output_of(source), vec!["610"]);
}

#[test]
fn test_function_without_return_yields_nil() {
    assert_eq!(
        output_of("fun f() {}\nprint f();\nfun g() { return; }\nprint g();"),
        vec!["nil", "nil"]
    );
}

#[test]
fn test_closures_capture_by_reference() {
    let source = r#"
        fun make_counter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }

        var c1 = make_counter();
        var c2 = make_counter();
        print c1();
        print c1();
        print c2();
    "#;

    assert_eq!(output_of(source), vec!["1", "2", "1"]);
}

#[test]
fn test_closures_share_captured_frame() {
    let source = r#"
        var get;
        var set;
        {
            var shared = "before";
            fun g() { return shared; }
            fun s(v) { shared = v; }
            get = g;
            set = s;
        }
        set("after");
        print get();
    "#;

    assert_eq!(output_of(source), vec!["after"]);
}

#[test]
fn test_closure_in_loop_sees_value_at_call_time() {
    let source = r#"
        var show;
        for (var i = 0; i < 3; i = i + 1) {
            if (i == 0) {
                fun capture() { print i; }
                show = capture;
            }
        }
        show();
    "#;

    assert_eq!(output_of(source), vec!["3"]);
}

#[test]
fn test_arity_mismatch() {
    let (_, err) = runtime_error("fun add(a, b) { return a + b; }\nadd(1);");

    assert_eq!(err, "Expected 2 arguments but got 1.\n[line 2]");
}

#[test]
fn test_calling_a_non_callable() {
    let (_, err) = runtime_error("var x = \"text\";\nx();");

    assert_eq!(err, "Can only call functions and constructors.\n[line 2]");
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let source = r#"
        var log = "";
        fun note(s) { log = log + s; return s; }
        fun three(a, b, c) { return a + b + c; }
        print three(note("a"), note("b"), note("c"));
        print log;
    "#;

    assert_eq!(output_of(source), vec!["abc", "abc"]);
}

#[test]
fn test_value_printing() {
    let source = r#"
        fun f() {}
        class Foo {}
        print f;
        print clock;
        print Foo;
        print Foo();
        print true;
        print nil;
    "#;

    assert_eq!(
        output_of(source),
        vec!["<fn f>", "<native fn>", "Foo", "Foo instance", "true", "nil"]
    );
}

#[test]
fn test_clock_is_a_positive_number() {
    let (mut lox, _) = session();

    match lox.evaluate("clock()") {
        Ok(Value::Number(ms)) => assert!(ms > 0.0),
        other => panic!("expected a number, got {:?}", other),
    }

    assert_eq!(output_of("var t = clock();\nprint clock() >= t;"), vec!["true"]);
}

// ───────────────────────────── classes ─────────────────────────────────

#[test]
fn test_fields_and_methods() {
    let source = r#"
        class Point {
            init(x, y) {
                this.x = x;
                this.y = y;
            }
            sum() {
                return this.x + this.y;
            }
        }

        var p = Point(1, 2);
        print p.sum();
        p.x = 10;
        print p.sum();
        p.label = "extra";
        print p.label;
    "#;

    assert_eq!(output_of(source), vec!["3", "12", "extra"]);
}

#[test]
fn test_bound_method_remembers_its_instance() {
    let source = r#"
        class Greeter {
            init(name) { this.name = name; }
            greet() { return "hi " + this.name; }
        }

        var method = Greeter("ada").greet;
        print method();
    "#;

    assert_eq!(output_of(source), vec!["hi ada"]);
}

#[test]
fn test_fields_shadow_methods() {
    let source = r#"
        class A {
            m() { return "method"; }
        }
        var a = A();
        fun other() { return "field"; }
        a.m = other;
        print a.m();
    "#;

    assert_eq!(output_of(source), vec!["field"]);
}

#[test]
fn test_instances_compare_by_identity() {
    let source = r#"
        class A {}
        var a = A();
        var b = a;
        print a == b;
        print a == A();
    "#;

    assert_eq!(output_of(source), vec!["true", "false"]);
}

#[test]
fn test_constructor_arity_follows_init() {
    let (_, err) = runtime_error("class A { init(a) {} }\nA();");
    assert_eq!(err, "Expected 1 arguments but got 0.\n[line 2]");

    let (_, err) = runtime_error("class B {}\nB(1);");
    assert_eq!(err, "Expected 0 arguments but got 1.\n[line 2]");
}

#[test]
fn test_property_errors() {
    let (_, err) = runtime_error("class A {}\nprint A().missing;");
    assert_eq!(err, "Undefined property 'missing'.\n[line 2]");

    let (_, err) = runtime_error("var n = 1;\nprint n.x;");
    assert_eq!(err, "Only instances have properties.\n[line 2]");

    let (_, err) = runtime_error("var n = 1;\nn.x = 2;");
    assert_eq!(err, "Only instances have fields.\n[line 2]");
}

// ───────────────────────────── inheritance ─────────────────────────────

#[test]
fn test_inherited_methods_and_super() {
    let source = r#"
        class Animal {
            init(name) { this.name = name; }
            speak() { return this.name + " makes a sound"; }
            kind() { return "animal"; }
        }

        class Dog < Animal {
            speak() { return super.speak() + " (woof)"; }
        }

        var d = Dog("rex");
        print d.speak();
        print d.kind();
    "#;

    assert_eq!(output_of(source), vec!["rex makes a sound (woof)", "animal"]);
}

#[test]
fn test_super_binds_to_the_declaring_superclass() {
    let source = r#"
        class A {
            method() { return "A"; }
        }
        class B < A {
            method() { return "B"; }
            test() { return super.method(); }
        }
        class C < B {}

        print C().test();
    "#;

    assert_eq!(output_of(source), vec!["A"]);
}

#[test]
fn test_superclass_must_be_a_class() {
    let (_, err) = runtime_error("var NotAClass = \"nope\";\nclass A < NotAClass {}");

    assert_eq!(err, "Superclass must be a class.\n[line 2]");
}

// ───────────────────────────── errors ──────────────────────────────────

#[test]
fn test_operand_type_errors() {
    let (_, err) = runtime_error("print -\"x\";");
    assert_eq!(err, "Operand must be a number.\n[line 1]");

    let (_, err) = runtime_error("print 1 < \"2\";");
    assert_eq!(err, "Operands must be numbers.\n[line 1]");

    let (_, err) = runtime_error("print \"a\" + 1;");
    assert_eq!(err, "Operands must be two numbers or two strings.\n[line 1]");
}

#[test]
fn test_runtime_error_abandons_remaining_statements() {
    let (out, result) = run("print \"before\";\nprint 1 + nil;\nprint \"after\";");

    assert_eq!(out, "before\n");

    match result {
        Err(e @ RunError::Runtime(_)) => {
            assert_eq!(e.exit_code(), 70);
            assert_eq!(e.to_string(), "Operands must be two numbers or two strings.\n[line 2]");
        }
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_scan_and_parse_errors_are_reported_together() {
    assert_eq!(
        compile_errors("var a = @;\nprint ;"),
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
            "[line 2] Error at ';': Expect expression.",
        ]
    );
}

// ───────────────────────────── sessions ────────────────────────────────

#[test]
fn test_definitions_persist_across_runs() {
    let (mut lox, buffer) = session();

    lox.run("var count = 1;").unwrap();
    lox.run("fun bump() { count = count + 1; return count; }").unwrap();
    lox.run("print bump();").unwrap();
    lox.run("print bump();").unwrap();

    assert_eq!(buffer.contents(), "2\n3\n");
}

#[test]
fn test_closure_from_earlier_run_stays_callable() {
    let (mut lox, buffer) = session();

    lox.run("fun outer() { var x = \"kept\"; fun inner() { return x; } return inner; }")
        .unwrap();
    lox.run("var f = outer();").unwrap();
    lox.run("{ var y = 1; print f(); }").unwrap();

    assert_eq!(buffer.contents(), "kept\n");
}

#[test]
fn test_failed_run_does_not_poison_session() {
    let (mut lox, buffer) = session();

    assert!(lox.run("print ;").is_err());
    assert!(lox.run("print undefined_name;").is_err());
    lox.run("print \"still alive\";").unwrap();

    assert_eq!(buffer.contents(), "still alive\n");
}

#[test]
fn test_evaluate_single_expression() {
    let (mut lox, _) = session();

    lox.run("var base = 40;").unwrap();

    match lox.evaluate("base + 2") {
        Ok(value) => assert_eq!(value, Value::Number(42.0)),
        Err(e) => panic!("evaluation failed: {}", e),
    }

    match lox.evaluate("\"a\" + \"b\"") {
        Ok(value) => assert_eq!(value.to_string(), "ab"),
        Err(e) => panic!("evaluation failed: {}", e),
    }

    assert!(matches!(lox.evaluate("1 +"), Err(RunError::Compile(_))));
    assert!(matches!(lox.evaluate("-nil"), Err(RunError::Runtime(_))));
}
