use pretty_assertions::assert_eq;

use toyc::chunk::{Chunk, OpCode};
use toyc::compiler::compile;
use toyc::disassembler::disassemble;
use toyc::error::{Diagnostic, Location, ToyError};
use toyc::object::StringInterner;

fn compiled(source: &str) -> Chunk {
    let mut strings = StringInterner::new();

    match compile(source, &mut strings) {
        Ok(chunk) => chunk,
        Err(e) => panic!("{:?} failed to compile: {:?}", source, e),
    }
}

fn diagnostics(source: &str) -> Vec<Diagnostic> {
    let mut strings = StringInterner::new();

    match compile(source, &mut strings) {
        Err(ToyError::Compile(diagnostics)) => diagnostics,
        other => panic!("{:?} should not compile, got {:?}", source, other),
    }
}

fn listing(chunk: &Chunk) -> Vec<(OpCode, Option<u8>)> {
    chunk.instructions().map(|i| (i.op, i.operand)).collect()
}

#[test]
fn test_empty_program_is_just_return() {
    assert_eq!(compiled("").opcodes(), vec![OpCode::Return]);
}

#[test]
fn test_global_variable_round_trip() {
    let chunk = compiled("var x = 1; print x;");

    assert_eq!(
        listing(&chunk),
        vec![
            (OpCode::Constant, Some(0)),
            (OpCode::DefineGlobal, Some(1)),
            (OpCode::GetGlobal, Some(2)),
            (OpCode::Print, None),
            (OpCode::Return, None),
        ]
    );
}

#[test]
fn test_global_without_initializer_is_nil() {
    let chunk = compiled("var x;");

    assert_eq!(
        chunk.opcodes(),
        vec![OpCode::Nil, OpCode::DefineGlobal, OpCode::Return]
    );
}

#[test]
fn test_expression_statement_pops_its_value() {
    let chunk = compiled("x = 1 + 2;");

    assert_eq!(
        chunk.opcodes(),
        vec![
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Add,
            OpCode::SetGlobal,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn test_locals_use_slots_and_are_popped_on_exit() {
    let chunk = compiled("{ var a = 1; var b = a; print b; }");

    assert_eq!(
        listing(&chunk),
        vec![
            (OpCode::Constant, Some(0)),
            (OpCode::GetLocal, Some(0)),
            (OpCode::GetLocal, Some(1)),
            (OpCode::Print, None),
            (OpCode::Pop, None),
            (OpCode::Pop, None),
            (OpCode::Return, None),
        ]
    );
}

#[test]
fn test_local_assignment() {
    let chunk = compiled("{ var a; a = 3; }");

    assert_eq!(
        listing(&chunk),
        vec![
            (OpCode::Nil, None),
            (OpCode::Constant, Some(0)),
            (OpCode::SetLocal, Some(0)),
            (OpCode::Pop, None),
            (OpCode::Pop, None),
            (OpCode::Return, None),
        ]
    );
}

#[test]
fn test_shadowing_in_nested_scope_resolves_innermost() {
    let chunk = compiled("{ var a = 1; { var a = 2; print a; } print a; }");

    assert_eq!(
        listing(&chunk),
        vec![
            (OpCode::Constant, Some(0)),
            (OpCode::Constant, Some(1)),
            (OpCode::GetLocal, Some(1)),
            (OpCode::Print, None),
            (OpCode::Pop, None),
            (OpCode::GetLocal, Some(0)),
            (OpCode::Print, None),
            (OpCode::Pop, None),
            (OpCode::Return, None),
        ]
    );
}

#[test]
fn test_initializer_sees_the_outer_binding() {
    let chunk = compiled("{ var a = 1; { var a = a; } }");

    assert_eq!(
        listing(&chunk),
        vec![
            (OpCode::Constant, Some(0)),
            (OpCode::GetLocal, Some(0)),
            (OpCode::Pop, None),
            (OpCode::Pop, None),
            (OpCode::Return, None),
        ]
    );
}

#[test]
fn test_duplicate_local_in_same_scope() {
    let diagnostics = diagnostics("{ var a = 1; var a = 2; }");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "A variable with this name was already declared in this scope"
    );
    assert_eq!(diagnostics[0].location, Location::At("a".to_string()));
}

#[test]
fn test_globals_may_be_redeclared() {
    let chunk = compiled("var a = 1; var a = 2;");

    assert_eq!(
        chunk.opcodes(),
        vec![
            OpCode::Constant,
            OpCode::DefineGlobal,
            OpCode::Constant,
            OpCode::DefineGlobal,
            OpCode::Return,
        ]
    );
}

#[test]
fn test_synchronize_reports_one_error_per_statement() {
    let diagnostics = diagnostics("print 1 +; print 2; var = 3; print 4;");

    assert_eq!(diagnostics.len(), 2, "{:?}", diagnostics);
    assert_eq!(diagnostics[0].message, "Expected expression");
    assert_eq!(diagnostics[0].location, Location::At(";".to_string()));
    assert_eq!(diagnostics[1].message, "Expected variable name");
    assert_eq!(diagnostics[1].location, Location::At("=".to_string()));
}

#[test]
fn test_synchronize_stops_before_statement_keyword() {
    let diagnostics = diagnostics("1 + + \nprint 2 +;");

    assert_eq!(diagnostics.len(), 2, "{:?}", diagnostics);
    assert_eq!(diagnostics[0].line, 1);
    assert_eq!(diagnostics[1].line, 2);
}

#[test]
fn test_invalid_assignment_in_statement() {
    let diagnostics = diagnostics("1 + 2 = 3;");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Invalid assignment target");
}

#[test]
fn test_unterminated_block() {
    let diagnostics = diagnostics("{ var a = 1;");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Expected '}' after block");
    assert_eq!(diagnostics[0].location, Location::End);
}

#[test]
fn test_compile_failure_is_a_compile_error() {
    let mut strings = StringInterner::new();
    let result = compile("print ;", &mut strings);

    let Err(err) = result else {
        panic!("expected failure");
    };

    assert_eq!(err.to_string(), "compilation failed with 1 error(s)");
}

#[test]
fn test_disassembly_of_program() {
    let mut strings = StringInterner::new();
    let chunk = match compile("var answer = 42;\nprint answer;", &mut strings) {
        Ok(chunk) => chunk,
        Err(e) => panic!("{:?}", e),
    };

    let text = disassemble(&chunk, &strings, "program");

    assert_eq!(
        text,
        "== program ==\n\
         0000    1 OP_CONSTANT         0 '42'\n\
         0002    | OP_DEFINE_GLOBAL    1 'answer'\n\
         0004    2 OP_GET_GLOBAL       2 'answer'\n\
         0006    | OP_PRINT\n\
         0007    | OP_RETURN\n"
    );
}
