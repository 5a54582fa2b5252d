pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod error;
pub mod object;
pub mod parser;
pub mod rules;
pub mod scanner;
pub mod token;
pub mod value;
