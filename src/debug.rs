// File: src/debug.rs
//
// Bytecode disassembler, gated behind the `debug_trace` feature. Mirrors
// clox's debug.c: walk a chunk's code array printing one human-readable
// line per instruction, with the constant/jump/slot operand resolved.

use crate::chunk::{Chunk, OpCode};

pub fn disassemble_chunk(chunk: &Chunk, name: &str) {
    println!("== {name} ==");
    let mut offset = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(chunk, offset);
    }
}

/// Prints one instruction starting at `offset`, returning the offset of the
/// next instruction.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> usize {
    print!("{offset:04} ");
    if offset > 0 && chunk.lines[offset] == chunk.lines[offset - 1] {
        print!("   | ");
    } else {
        print!("{:4} ", chunk.lines[offset]);
    }

    let byte = chunk.code[offset];
    match OpCode::try_from(byte) {
        Ok(op) => match op {
            OpCode::Constant => constant_instruction(op.name(), chunk, offset),
            OpCode::DefineGlobal | OpCode::GetGlobal | OpCode::SetGlobal => {
                constant_instruction(op.name(), chunk, offset)
            }
            OpCode::GetLocal | OpCode::SetLocal => byte_instruction(op.name(), chunk, offset),
            OpCode::Jump | OpCode::JumpIfFalse => jump_instruction(op.name(), 1, chunk, offset),
            OpCode::Loop => jump_instruction(op.name(), -1, chunk, offset),
            _ => simple_instruction(op.name(), offset),
        },
        Err(byte) => {
            println!("Unknown opcode {byte}");
            offset + 1
        }
    }
}

fn simple_instruction(name: &str, offset: usize) -> usize {
    println!("{name}");
    offset + 1
}

fn constant_instruction(name: &str, chunk: &Chunk, offset: usize) -> usize {
    let constant = chunk.code[offset + 1];
    println!("{name:<16} {constant:4} '{}'", chunk.constants[constant as usize]);
    offset + 2
}

fn byte_instruction(name: &str, chunk: &Chunk, offset: usize) -> usize {
    let slot = chunk.code[offset + 1];
    println!("{name:<16} {slot:4}");
    offset + 2
}

fn jump_instruction(name: &str, sign: i32, chunk: &Chunk, offset: usize) -> usize {
    let jump = u16::from_be_bytes([chunk.code[offset + 1], chunk.code[offset + 2]]) as i32;
    let target = offset as i32 + 3 + sign * jump;
    println!("{name:<16} {offset:4} -> {target}");
    offset + 3
}
