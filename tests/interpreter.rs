use brook::error::BrookError;
use brook::interpreter::Interpreter;
use brook::RunError;

/// Run brook code against a fresh interpreter and return the program output.
fn run(code: &str) -> Result<String, RunError> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut buffer);

    brook::run(code, &mut interpreter)?;

    Ok(String::from_utf8(buffer).expect("program output should be UTF-8"))
}

fn runtime_error(code: &str) -> BrookError {
    match run(code) {
        Err(RunError::Runtime(error)) => error,
        Err(RunError::Static(errors)) => panic!("Expected runtime error, got {:?}", errors),
        Ok(output) => panic!("Expected runtime error, program printed {:?}", output),
    }
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(run("print 1 + 2 * 3;").unwrap(), "7\n");
}

#[test]
fn number_display_strips_integer_fraction() {
    assert_eq!(run("print 3/2; print 4/2;").unwrap(), "1.5\n2\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run("print \"pi≈\" + \"3\";").unwrap(), "pi≈3\n");
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_eq!(run("print 1/0;").unwrap(), "inf\n");
}

#[test]
fn truthiness_only_nil_and_false_are_falsy() {
    let output = run("print !nil; print !false; print !0; print !\"\";").unwrap();
    assert_eq!(output, "true\ntrue\nfalse\nfalse\n");
}

#[test]
fn equality_is_strict_by_variant() {
    let output = run(
        "print 1 == \"1\"; print nil == nil; print \"a\" == \"a\"; print true == 1;",
    )
    .unwrap();
    assert_eq!(output, "false\ntrue\ntrue\nfalse\n");
}

#[test]
fn variable_scoping_and_shadowing() {
    let code = "\
        var a = 1;\n\
        {\n\
            var a = 2;\n\
            print a;\n\
        }\n\
        print a;";

    assert_eq!(run(code).unwrap(), "2\n1\n");
}

#[test]
fn if_else_dispatch() {
    let code = "\
        var a = \"cond2\";\n\
        if (a == \"cond1\") {\n\
            print \"first\";\n\
        } else if (a == \"cond2\") {\n\
            print \"second\";\n\
        }";

    assert_eq!(run(code).unwrap(), "second\n");
}

#[test]
fn while_loop() {
    let code = "\
        var a = 0;\n\
        while (a < 5) {\n\
            print a;\n\
            a = a + 1;\n\
        }";

    assert_eq!(run(code).unwrap(), "0\n1\n2\n3\n4\n");
}

#[test]
fn for_loop_desugaring_runs() {
    assert_eq!(
        run("for (var i = 0; i < 3; i = i + 1) print i;").unwrap(),
        "0\n1\n2\n"
    );
}

#[test]
fn for_loop_with_missing_clauses() {
    let code = "\
        var a = 20;\n\
        for (; a < 23;) { print a; a = a + 1; }";

    assert_eq!(run(code).unwrap(), "20\n21\n22\n");
}

#[test]
fn break_exits_innermost_loop() {
    let code = "\
        var i = 0;\n\
        while (true) {\n\
            if (i == 3) break;\n\
            i = i + 1;\n\
        }\n\
        print i;";

    assert_eq!(run(code).unwrap(), "3\n");
}

#[test]
fn break_only_leaves_the_inner_loop() {
    let code = "\
        for (var i = 0; i < 2; i = i + 1) {\n\
            for (var j = 0; j < 5; j = j + 1) {\n\
                if (j == 1) break;\n\
                print i + j;\n\
            }\n\
        }";

    assert_eq!(run(code).unwrap(), "0\n1\n");
}

#[test]
fn break_unwind_restores_enclosing_scope() {
    let code = "\
        var a = 1;\n\
        while (true) {\n\
            var a = 2;\n\
            break;\n\
        }\n\
        print a;";

    assert_eq!(run(code).unwrap(), "1\n");
}

#[test]
fn short_circuit_skips_the_right_operand() {
    let code = "\
        fun sideEffect() {\n\
            print \"evaluated\";\n\
            return true;\n\
        }\n\
        print true or sideEffect();\n\
        print false and sideEffect();";

    // sideEffect never runs, so "evaluated" never appears.
    assert_eq!(run(code).unwrap(), "true\nfalse\n");
}

#[test]
fn logical_operators_yield_operand_values() {
    let output = run("print nil or \"fallback\"; print 1 and 2;").unwrap();
    assert_eq!(output, "fallback\n2\n");
}

#[test]
fn function_return_unwinds_out_of_the_body() {
    let code = "\
        fun getNumber() {\n\
            return 82;\n\
            print \"Shouldn't reach this.\";\n\
        }\n\
        print getNumber();";

    assert_eq!(run(code).unwrap(), "82\n");
}

#[test]
fn falling_off_a_function_yields_nil() {
    assert_eq!(run("fun f() {} print f();").unwrap(), "nil\n");
}

#[test]
fn recursion() {
    let code = "\
        fun fib(n) {\n\
            if (n <= 1) return n;\n\
            return fib(n - 2) + fib(n - 1);\n\
        }\n\
        for (var i = 0; i < 10; i = i + 1) {\n\
            print fib(i);\n\
        }";

    assert_eq!(run(code).unwrap(), "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn functions_are_first_class() {
    let code = "\
        fun say(n) { print n; }\n\
        var sayAlias = say;\n\
        sayAlias(\"test string\");";

    assert_eq!(run(code).unwrap(), "test string\n");
}

#[test]
fn callables_display_by_name() {
    assert_eq!(run("fun f() {} print f; print clock;").unwrap(), "<fn f>\n<native fn>\n");
}

#[test]
fn clock_returns_a_number() {
    assert_eq!(run("print clock() >= 0;").unwrap(), "true\n");
}

#[test]
fn closure_counter() {
    let code = "\
        fun makeCounter() {\n\
            var i = 0;\n\
            fun count() {\n\
                i = i + 1;\n\
                return i;\n\
            }\n\
            return count;\n\
        }\n\
        var c = makeCounter();\n\
        print c();\n\
        print c();\n\
        print c();";

    assert_eq!(run(code).unwrap(), "1\n2\n3\n");
}

#[test]
fn closures_capture_by_reference() {
    let code = "\
        var i = 0;\n\
        fun inc() {\n\
            i = i + 1;\n\
            return i;\n\
        }\n\
        print inc();\n\
        print inc();\n\
        i = 10;\n\
        print inc();";

    // Assignments after capture are observable through the closure.
    assert_eq!(run(code).unwrap(), "1\n2\n11\n");
}

#[test]
fn closures_hold_their_declaration_scope() {
    let code = "\
        var f;\n\
        {\n\
            var divisor = 2;\n\
            fun half(n) { return n / divisor; }\n\
            f = half;\n\
        }\n\
        var divisor = 300;\n\
        print f(8);";

    // The closure reads the captured block frame, not the later global.
    assert_eq!(run(code).unwrap(), "4\n");
}

#[test]
fn runtime_type_error_for_subtraction() {
    let error = runtime_error("print \"a\" - 1;");
    assert_eq!(error.to_string(), "Operands must be numbers.\n[line 1]");
}

#[test]
fn runtime_type_error_for_unary_minus() {
    let error = runtime_error("print -\"a\";");
    assert_eq!(error.to_string(), "Operand must be a number.\n[line 1]");
}

#[test]
fn plus_rejects_mixed_operands() {
    let error = runtime_error("print 1 + \"a\";");
    assert_eq!(
        error.to_string(),
        "Operands must be two numbers or two strings.\n[line 1]"
    );
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let error = runtime_error("print missing;");
    assert_eq!(error.to_string(), "Undefined variable 'missing'.\n[line 1]");
}

#[test]
fn runtime_error_reports_the_offending_line() {
    let error = runtime_error("var a = 1;\nvar b = 2;\nprint a - \"x\";");
    assert_eq!(error.to_string(), "Operands must be numbers.\n[line 3]");
}

#[test]
fn only_callables_can_be_called() {
    let error = runtime_error("\"not a function\"();");
    assert_eq!(
        error.to_string(),
        "Can only call functions and classes.\n[line 1]"
    );
}

#[test]
fn arity_mismatch_is_a_runtime_error() {
    let error = runtime_error("fun f(a, b) { return a + b; }\nf(1);");
    assert_eq!(error.to_string(), "Expected 2 arguments but got 1.\n[line 2]");
}

#[test]
fn static_errors_block_execution() {
    let result = run("var a = \"outer\"; { var a = a; }");

    match result {
        Err(RunError::Static(errors)) => {
            assert!(errors
                .iter()
                .any(|e| e.to_string().contains("Cannot read local variable in its own initializer.")));
        }
        other => panic!("Expected static error, got {:?}", other),
    }
}

#[test]
fn definitions_persist_across_runs() {
    // One interpreter, several inputs: the REPL flow.
    let mut buffer: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut buffer);

    brook::run("fun max(x, y) { if (x > y) return x; return y; }", &mut interpreter)
        .expect("declaration should run");
    brook::run("print max(10, 20);", &mut interpreter).expect("call should run");
    brook::run("print max(5, 4);", &mut interpreter).expect("call should run");

    assert_eq!(String::from_utf8(buffer).unwrap(), "20\n5\n");
}

#[test]
fn scope_is_restored_after_a_runtime_error_in_a_block() {
    let mut buffer: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut buffer);

    brook::run("var a = 1;", &mut interpreter).expect("declaration should run");

    // The block defines a shadowing `a`, then dies mid-statement.
    let result = brook::run("{ var a = 2; print \"x\" - 1; }", &mut interpreter);
    assert!(matches!(result, Err(RunError::Runtime(_))));

    // The outer environment is back in force.
    brook::run("print a;", &mut interpreter).expect("variable should still resolve");

    assert_eq!(String::from_utf8(buffer).unwrap(), "1\n");
}
