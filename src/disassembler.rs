use crate::chunk::{Chunk, Instruction, OpCode};
use crate::object::StringInterner;

/// Render `chunk` as a listing, one instruction per line:
///
/// ```text
/// == name ==
/// 0000    1 OP_CONSTANT         0 '1.5'
/// 0002    | OP_NEGATE
/// ```
pub fn disassemble(chunk: &Chunk, strings: &StringInterner, name: &str) -> String {
    let mut out = format!("== {} ==\n", name);

    let mut last_line = None;

    for instruction in chunk.instructions() {
        out.push_str(&instruction_line(chunk, strings, &instruction, last_line));
        out.push('\n');

        last_line = Some(instruction.line);
    }

    out
}

fn instruction_line(
    chunk: &Chunk,
    strings: &StringInterner,
    instruction: &Instruction,
    last_line: Option<usize>,
) -> String {
    let mut line = format!("{:04} ", instruction.offset);

    if last_line == Some(instruction.line) {
        line.push_str("   | ");
    } else {
        line.push_str(&format!("{:4} ", instruction.line));
    }

    let name = instruction.op.name();

    match (instruction.op, instruction.operand) {
        (OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal, Some(idx)) => {
            let value = chunk
                .constant(idx)
                .map(|v| v.display(strings).to_string())
                .unwrap_or_else(|| "<missing>".to_string());

            line.push_str(&format!("{:<16} {:4} '{}'", name, idx, value));
        }

        (_, Some(slot)) => {
            line.push_str(&format!("{:<16} {:4}", name, slot));
        }

        (_, None) => line.push_str(name),
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_listing_marks_repeated_lines() {
        let mut chunk = Chunk::new();
        let strings = StringInterner::new();

        let idx = chunk.add_constant(Value::Number(1.5));
        chunk.write_with_operand(OpCode::Constant, idx as u8, 1);
        chunk.write(OpCode::Negate, 1);
        chunk.write(OpCode::Return, 2);

        let listing = disassemble(&chunk, &strings, "test");
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines[0], "== test ==");
        assert_eq!(lines[1], "0000    1 OP_CONSTANT         0 '1.5'");
        assert_eq!(lines[2], "0002    | OP_NEGATE");
        assert_eq!(lines[3], "0003    2 OP_RETURN");
    }

    #[test]
    fn test_global_operands_show_their_name() {
        let mut chunk = Chunk::new();
        let mut strings = StringInterner::new();

        let name = strings.intern("answer");
        let idx = chunk.add_constant(Value::String(name));
        chunk.write_with_operand(OpCode::GetGlobal, idx as u8, 7);
        chunk.write_with_operand(OpCode::SetLocal, 2, 7);

        let listing = disassemble(&chunk, &strings, "globals");

        assert!(listing.contains("OP_GET_GLOBAL       0 'answer'"), "{}", listing);
        assert!(listing.contains("OP_SET_LOCAL        2"), "{}", listing);
    }
}
