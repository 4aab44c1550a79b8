// End-to-end tests driving the public library API directly, in the
// teacher's style: build a `Vm`, interpret a whole program, and assert on
// its observable final state (globals, `InterpretResult`) rather than
// shelling out to the compiled binary.

use ruff::value::Value;
use ruff::vm::{InterpretResult, Vm};

fn number(vm: &Vm, name: &str) -> f64 {
    match vm.global(name) {
        Some(Value::Number(n)) => n,
        other => panic!("expected global '{name}' to be a number, got {other:?}"),
    }
}

fn string(vm: &Vm, name: &str) -> String {
    match vm.global(name) {
        Some(Value::String(s)) => s.chars.clone(),
        other => panic!("expected global '{name}' to be a string, got {other:?}"),
    }
}

fn boolean(vm: &Vm, name: &str) -> bool {
    match vm.global(name) {
        Some(Value::Bool(b)) => b,
        other => panic!("expected global '{name}' to be a bool, got {other:?}"),
    }
}

#[test]
fn arithmetic_precedence() {
    let mut vm = Vm::new();
    let result = vm.interpret("var result = 1 + 2 * 3;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(number(&vm, "result"), 7.0);
}

#[test]
fn string_concatenation_and_shared_identity() {
    let mut vm = Vm::new();
    let source = r#"
        var a = "hi";
        var b = "!";
        var c = a + b;
    "#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(string(&vm, "c"), "hi!");

    // Two identical string literals compiled separately share one interned
    // allocation, so `==` on them is true (identity after interning).
    let mut vm2 = Vm::new();
    assert_eq!(vm2.interpret(r#"var same = "hi" == "hi";"#), InterpretResult::Ok);
    assert!(boolean(&vm2, "same"));
}

#[test]
fn for_loop_accumulates() {
    let mut vm = Vm::new();
    let source = r#"
        var x = 0;
        for (var i = 0; i < 5; i = i + 1) { x = x + i; }
    "#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(number(&vm, "x"), 10.0);
}

#[test]
fn zero_is_truthy() {
    let mut vm = Vm::new();
    let source = r#"
        var branch = "unset";
        if (nil or 0) { branch = "t"; } else { branch = "f"; }
    "#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(string(&vm, "branch"), "t");
}

#[test]
fn nested_blocks_shadow_without_leaking() {
    let mut vm = Vm::new();
    let source = r#"
        var outerSeen = "";
        var innerSeen = "";
        {
            var a = 1;
            {
                var a = 2;
                innerSeen = a;
            }
            outerSeen = a;
        }
    "#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(number(&vm, "innerSeen"), 2.0);
    assert_eq!(number(&vm, "outerSeen"), 1.0);
}

#[test]
fn undefined_top_level_variable_is_a_runtime_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("print a;"), InterpretResult::RuntimeError);
}

#[test]
fn reading_local_in_its_own_initializer_is_a_compile_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("{ var a = a; }"), InterpretResult::CompileError);
}

#[test]
fn missing_expression_is_a_compile_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("1 + ;"), InterpretResult::CompileError);
}

#[test]
fn redeclaring_a_local_in_the_same_scope_is_a_compile_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("{ var a; var a; }"), InterpretResult::CompileError);
}

#[test]
fn too_many_constants_is_a_compile_error() {
    let mut vm = Vm::new();
    let mut src = String::new();
    for i in 0..257 {
        src.push_str(&format!("print {i};\n"));
    }
    assert_eq!(vm.interpret(&src), InterpretResult::CompileError);
}

#[test]
fn dividing_by_zero_is_not_an_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("var r = 1 / 0;"), InterpretResult::Ok);
    assert_eq!(number(&vm, "r"), f64::INFINITY);
}

#[test]
fn globals_persist_across_repl_style_interpret_calls() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("var counter = 1;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("counter = counter + 1;"), InterpretResult::Ok);
    assert_eq!(number(&vm, "counter"), 2.0);
}

#[test]
fn fun_keyword_is_rejected_with_a_compile_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("fun add(a, b) { return a + b; }"), InterpretResult::CompileError);
}

#[test]
fn return_statement_is_rejected_with_a_compile_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("return 1;"), InterpretResult::CompileError);
}

#[test]
fn class_keyword_is_rejected_with_a_compile_error() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("class Foo {}"), InterpretResult::CompileError);
}

#[test]
fn short_circuit_and_or_do_not_evaluate_unreached_side() {
    // The right side of `and`/`or` would itself be a runtime error if
    // evaluated; a passing `Ok` result demonstrates it was skipped.
    let mut vm = Vm::new();
    let source = r#"
        var left = false and undefinedGlobal;
        var right = true or undefinedGlobal;
    "#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert!(!boolean(&vm, "left"));
    assert!(boolean(&vm, "right"));
}
