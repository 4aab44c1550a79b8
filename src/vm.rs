// File: src/vm.rs
//
// The stack-based virtual machine: fetch/decode/dispatch over a compiled
// chunk, one call frame per active function invocation. Values live on one
// shared stack; a frame's `slot_base` is the stack index its locals (and,
// at slot 0, the callee itself) start from.

use std::rc::Rc;

use crate::chunk::OpCode;
use crate::compiler;
use crate::errors::RuffError;
use crate::table::Table;
use crate::value::{intern_string, ObjFunction, Value};

#[cfg(feature = "debug_trace")]
use crate::debug::disassemble_instruction;

const FRAMES_MAX: usize = 64;
const STACK_MAX: usize = FRAMES_MAX * 256;

struct CallFrame {
    function: Rc<ObjFunction>,
    ip: usize,
    slot_base: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    CompileError,
    RuntimeError,
}

/// One VM instance per process invocation for `ruff run`, or one long-lived
/// instance for the whole REPL session so globals and functions persist
/// across lines.
pub struct Vm {
    stack: Vec<Value>,
    frames: Vec<CallFrame>,
    globals: Table,
    intern_set: Table,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(256),
            frames: Vec::with_capacity(FRAMES_MAX),
            globals: Table::new(),
            intern_set: Table::new(),
        }
    }

    fn reset_stack(&mut self) {
        self.stack.clear();
        self.frames.clear();
    }

    /// Looks up a global by name without going through the compiler/intern
    /// table. `Table::get` compares keys by `Rc` identity or by value (see
    /// `Table::find_entry`), so a throwaway probe string matches an interned
    /// one with equal bytes. Exists so callers (tests, an embedding host)
    /// can inspect a program's final state without scraping stdout.
    pub fn global(&self, name: &str) -> Option<Value> {
        let probe = Rc::new(crate::value::ObjString::new(name.to_string()));
        self.globals.get(&probe)
    }

    fn push(&mut self, value: Value) {
        if self.stack.len() >= STACK_MAX {
            panic!("stack overflow: value stack exceeded {STACK_MAX} slots");
        }
        self.stack.push(value);
    }

    fn pop(&mut self) -> Value {
        self.stack.pop().expect("pop called on an empty stack")
    }

    fn peek(&self, distance: usize) -> &Value {
        let index = self.stack.len() - 1 - distance;
        &self.stack[index]
    }

    /// Compiles and runs `source`. Clears any stack/frame state left over
    /// from a previous call first: unlike the book's single `run()` per
    /// process lifetime, a `Vm` here may be reused across many REPL lines,
    /// and each line is a fresh top-level program rather than a continuation
    /// of the last one's half-finished stack.
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        self.reset_stack();

        let function = match compiler::compile(source, &mut self.intern_set) {
            Some(function) => function,
            None => return InterpretResult::CompileError,
        };

        self.push(Value::Function(Rc::clone(&function)));
        self.frames.push(CallFrame { function, ip: 0, slot_base: 0 });

        self.run()
    }

    fn runtime_error(&self, message: impl Into<String>) -> RuffError {
        let frame = self.frames.last().expect("runtime error raised with no active frame");
        let line = frame.function.chunk.lines[frame.ip.saturating_sub(1)];
        RuffError::runtime(message, line)
    }

    fn fail(&mut self, err: RuffError) -> InterpretResult {
        eprintln!("{err}");
        self.reset_stack();
        InterpretResult::RuntimeError
    }

    fn read_byte(&mut self) -> u8 {
        let frame = self.frames.last_mut().expect("read_byte called with no active frame");
        let byte = frame.function.chunk.code[frame.ip];
        frame.ip += 1;
        byte
    }

    fn read_u16(&mut self) -> u16 {
        let hi = self.read_byte();
        let lo = self.read_byte();
        u16::from_be_bytes([hi, lo])
    }

    fn read_constant(&mut self) -> Value {
        let index = self.read_byte();
        let frame = self.frames.last().expect("read_constant called with no active frame");
        frame.function.chunk.constants[index as usize].clone()
    }

    fn run(&mut self) -> InterpretResult {
        loop {
            #[cfg(feature = "debug_trace")]
            {
                print!("          ");
                for value in &self.stack {
                    print!("[ {value} ]");
                }
                println!();
                let frame = self.frames.last().expect("trace with no active frame");
                disassemble_instruction(&frame.function.chunk, frame.ip);
            }

            let byte = self.read_byte();
            let op = match OpCode::try_from(byte) {
                Ok(op) => op,
                Err(byte) => panic!("invalid opcode byte {byte} in compiled chunk"),
            };

            match op {
                OpCode::Constant => {
                    let constant = self.read_constant();
                    self.push(constant);
                }
                OpCode::Nil => self.push(Value::Nil),
                OpCode::True => self.push(Value::Bool(true)),
                OpCode::False => self.push(Value::Bool(false)),
                OpCode::Pop => {
                    self.pop();
                }
                OpCode::DefineGlobal => {
                    let name = self.read_constant();
                    let name = name.as_string().expect("DefineGlobal constant must be a string").clone();
                    let value = self.pop();
                    self.globals.set(name, value);
                }
                OpCode::GetGlobal => {
                    let name = self.read_constant();
                    let name = name.as_string().expect("GetGlobal constant must be a string").clone();
                    match self.globals.get(&name) {
                        Some(value) => self.push(value),
                        None => {
                            let err = self.runtime_error(format!("Undefined variable '{}'.", name.chars));
                            return self.fail(err);
                        }
                    }
                }
                OpCode::SetGlobal => {
                    let name = self.read_constant();
                    let name = name.as_string().expect("SetGlobal constant must be a string").clone();
                    let value = self.peek(0).clone();
                    if self.globals.set(Rc::clone(&name), value) {
                        // set() returns true for a brand new key; an
                        // assignment to an undefined global is an error, so
                        // undo the speculative insert.
                        self.globals.delete(&name);
                        let err = self.runtime_error(format!("Undefined variable '{}'.", name.chars));
                        return self.fail(err);
                    }
                }
                OpCode::GetLocal => {
                    let slot = self.read_byte() as usize;
                    let base = self.frames.last().unwrap().slot_base;
                    self.push(self.stack[base + slot].clone());
                }
                OpCode::SetLocal => {
                    let slot = self.read_byte() as usize;
                    let base = self.frames.last().unwrap().slot_base;
                    self.stack[base + slot] = self.peek(0).clone();
                }
                OpCode::Equal => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a.equals(&b)));
                }
                OpCode::Greater => {
                    if let Err(err) = self.binary_compare(|a, b| a > b) {
                        return self.fail(err);
                    }
                }
                OpCode::Less => {
                    if let Err(err) = self.binary_compare(|a, b| a < b) {
                        return self.fail(err);
                    }
                }
                OpCode::Add => {
                    if let Err(err) = self.add() {
                        return self.fail(err);
                    }
                }
                OpCode::Subtract => {
                    if let Err(err) = self.binary_number(|a, b| a - b) {
                        return self.fail(err);
                    }
                }
                OpCode::Multiply => {
                    if let Err(err) = self.binary_number(|a, b| a * b) {
                        return self.fail(err);
                    }
                }
                OpCode::Divide => {
                    if let Err(err) = self.binary_number(|a, b| a / b) {
                        return self.fail(err);
                    }
                }
                OpCode::Not => {
                    let value = self.pop();
                    self.push(Value::Bool(value.is_falsey()));
                }
                OpCode::Negate => {
                    if !self.peek(0).is_number() {
                        let err = self.runtime_error("Operand must be a number.");
                        return self.fail(err);
                    }
                    let n = self.pop().as_number().unwrap();
                    self.push(Value::Number(-n));
                }
                OpCode::Print => {
                    let value = self.pop();
                    println!("{value}");
                }
                OpCode::Jump => {
                    let jump = self.read_u16();
                    self.frames.last_mut().unwrap().ip += jump as usize;
                }
                OpCode::JumpIfFalse => {
                    let jump = self.read_u16();
                    if self.peek(0).is_falsey() {
                        self.frames.last_mut().unwrap().ip += jump as usize;
                    }
                }
                OpCode::Loop => {
                    let offset = self.read_u16();
                    self.frames.last_mut().unwrap().ip -= offset as usize;
                }
                OpCode::Return => {
                    return InterpretResult::Ok;
                }
            }
        }
    }

    fn binary_number(&mut self, op: impl Fn(f64, f64) -> f64) -> Result<(), RuffError> {
        if !self.peek(0).is_number() || !self.peek(1).is_number() {
            return Err(self.runtime_error("Operands must be numbers."));
        }
        let b = self.pop().as_number().unwrap();
        let a = self.pop().as_number().unwrap();
        self.push(Value::Number(op(a, b)));
        Ok(())
    }

    fn binary_compare(&mut self, op: impl Fn(f64, f64) -> bool) -> Result<(), RuffError> {
        if !self.peek(0).is_number() || !self.peek(1).is_number() {
            return Err(self.runtime_error("Operands must be numbers."));
        }
        let b = self.pop().as_number().unwrap();
        let a = self.pop().as_number().unwrap();
        self.push(Value::Bool(op(a, b)));
        Ok(())
    }

    fn add(&mut self) -> Result<(), RuffError> {
        if self.peek(0).is_number() && self.peek(1).is_number() {
            let b = self.pop().as_number().unwrap();
            let a = self.pop().as_number().unwrap();
            self.push(Value::Number(a + b));
            return Ok(());
        }
        if self.peek(0).is_string() && self.peek(1).is_string() {
            let b = self.pop();
            let a = self.pop();
            let concatenated = format!("{}{}", a.string_chars().unwrap(), b.string_chars().unwrap());
            let interned = intern_string(&mut self.intern_set, &concatenated);
            self.push(Value::String(interned));
            return Ok(());
        }
        Err(self.runtime_error("Operands must be two numbers or two strings."))
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_precedence_and_grouping() {
        let mut vm = Vm::new();
        assert_eq!(vm.interpret("print (1 + 2) * 3 - 4 / 2;"), InterpretResult::Ok);
    }

    #[test]
    fn string_concatenation_and_identity_sharing() {
        let mut vm = Vm::new();
        let source = r#"
            var a = "foo" + "bar";
            var b = "foobar";
            print a == b;
        "#;
        assert_eq!(vm.interpret(source), InterpretResult::Ok);
    }

    #[test]
    fn for_loop_accumulator() {
        let mut vm = Vm::new();
        let source = r#"
            var total = 0;
            for (var i = 0; i < 5; i = i + 1) {
                total = total + i;
            }
            print total;
        "#;
        assert_eq!(vm.interpret(source), InterpretResult::Ok);
    }

    #[test]
    fn truthy_zero_short_circuits_or() {
        let mut vm = Vm::new();
        assert_eq!(vm.interpret("print 0 or \"unreached\";"), InterpretResult::Ok);
    }

    #[test]
    fn nested_block_shadowing() {
        let mut vm = Vm::new();
        let source = r#"
            var a = "outer";
            {
                var a = "inner";
                print a;
            }
            print a;
        "#;
        assert_eq!(vm.interpret(source), InterpretResult::Ok);
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let mut vm = Vm::new();
        assert_eq!(vm.interpret("print nope;"), InterpretResult::RuntimeError);
    }

    #[test]
    fn globals_persist_across_separate_interpret_calls() {
        let mut vm = Vm::new();
        assert_eq!(vm.interpret("var counter = 1;"), InterpretResult::Ok);
        assert_eq!(vm.interpret("print counter;"), InterpretResult::Ok);
    }

    #[test]
    fn compile_error_returns_without_running() {
        let mut vm = Vm::new();
        assert_eq!(vm.interpret("1 + ;"), InterpretResult::CompileError);
    }
}
