// Integration tests exercising the translator end to end, against the
// scenarios it must reproduce exactly.

use jackc::translate;

fn lines(vm: &str) -> Vec<&str> {
    vm.lines().collect()
}

#[test]
fn s1_empty_void_function() {
    let vm = translate("class A { function void f() { return; } }", None).unwrap();
    let lines = lines(&vm);
    assert_eq!(lines, vec!["function A.f 0", "\tpush constant 0", "\treturn"]);
}

#[test]
fn s2_constructor_with_one_field() {
    let source = "class A { field int x; constructor A new() { let x = 7; return this; } }";
    let vm = translate(source, None).unwrap();
    let lines = lines(&vm);
    assert_eq!(
        lines,
        vec![
            "function A.new 0",
            "\tpush constant 1",
            "\tcall Memory.alloc 1",
            "\tpop pointer 0",
            "\tpush constant 7",
            "\tpop this 0",
            "\tpush pointer 0",
            "\treturn",
        ]
    );
}

#[test]
fn s3_while_loop_with_negation() {
    let source = "class A { function void f() { var int x; while (x) { let x = x - 1; } return; } }";
    let vm = translate(source, None).unwrap();
    let lines = lines(&vm);

    let label_loop = lines.iter().position(|l| *l == "label L0").unwrap();
    let label_exit = lines.iter().position(|l| *l == "label L1").unwrap();
    assert!(label_loop < label_exit);
    assert!(lines.contains(&"\tpush local 0"));
    assert!(lines.contains(&"\tnot"));
    assert!(lines.contains(&"\tif-goto L1"));
    assert!(lines.contains(&"\tgoto L0"));
}

#[test]
fn s4_string_literal_construction() {
    let source = r#"class A { function void f() { do Output.printString("Hi"); return; } }"#;
    let vm = translate(source, None).unwrap();
    let lines = lines(&vm);

    let expected_prefix = vec![
        "function A.f 0",
        "\tpush constant 2",
        "\tcall String.new 1",
        "\tpush constant 72",
        "\tcall String.appendChar 2",
        "\tpush constant 105",
        "\tcall String.appendChar 2",
        "\tcall Output.printString 1",
        "\tpop temp 0",
    ];
    assert_eq!(&lines[..expected_prefix.len()], &expected_prefix[..]);
}

#[test]
fn s5_array_read_in_expression() {
    let source = "class A { function void f() { var Array a; var int i; let i = a[0] + 1; return; } }";
    let vm = translate(source, None).unwrap();
    let lines = lines(&vm);

    assert!(lines.contains(&"\tpush local 0"));
    assert!(lines.contains(&"\tpush constant 0"));
    assert!(lines.contains(&"\tadd"));
    assert!(lines.contains(&"\tpop pointer 1"));
    assert!(lines.contains(&"\tpush that 0"));
    assert!(lines.contains(&"\tpush constant 1"));
    assert!(lines.contains(&"\tpop local 1"));
}

#[test]
fn s6_method_call_on_variable_vs_class() {
    let source = r#"
        class A {
            function void f() {
                var Foo a;
                do a.draw();
                do Screen.clear();
                return;
            }
        }
    "#;
    let vm = translate(source, None).unwrap();
    let lines = lines(&vm);

    let draw_idx = lines.iter().position(|l| *l == "\tcall Foo.draw 1").unwrap();
    assert_eq!(lines[draw_idx - 1], "\tpush local 0");
    assert_eq!(lines[draw_idx + 1], "\tpop temp 0");

    let clear_idx = lines
        .iter()
        .position(|l| *l == "\tcall Screen.clear 0")
        .unwrap();
    assert_eq!(lines[clear_idx + 1], "\tpop temp 0");
}

#[test]
fn method_receiver_is_wired_before_the_body_runs() {
    let source = "class Point { field int x; method int getX() { return x; } }";
    let vm = translate(source, None).unwrap();
    let lines = lines(&vm);

    assert_eq!(
        &lines[..4],
        &[
            "function Point.getX 0",
            "\tpush argument 0",
            "\tpop pointer 0",
            "\tpush this 0",
        ]
    );
}

#[test]
fn redefinition_in_the_same_scope_is_rejected() {
    let source = "class A { function void f() { var int x; var int x; return; } }";
    let err = translate(source, None).unwrap_err();
    assert!(matches!(err, jackc::CompileError::Semantic { .. }));
}

#[test]
fn missing_semicolon_is_a_syntax_error() {
    let source = "class A { function void f() { var int x; let x = 1 return; } }";
    let err = translate(source, None).unwrap_err();
    assert!(matches!(err, jackc::CompileError::Syntactic { .. }));
}
