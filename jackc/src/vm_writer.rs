// ===============================================
// Metadata — vm_writer v0.1.0
// ===============================================
// _component_:     VM instruction emitter
// _description_:   Formats the translator's decisions into VM instruction
//                  lines and writes them to any `io::Write` sink. `label`
//                  and `function` sit at column zero; every other
//                  instruction is written with a single leading tab,
//                  matching the reference VM emitter's layout.
// ===============================================

use std::io::{self, Write};

use crate::token::{Command, Segment};

pub struct VmWriter<W: Write> {
    sink: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(sink: W) -> Self {
        VmWriter { sink }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.sink, "\tpush {segment} {index}")
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.sink, "\tpop {segment} {index}")
    }

    pub fn write_arithmetic(&mut self, command: Command) -> io::Result<()> {
        writeln!(self.sink, "\t{command}")
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.sink, "label {label}")
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.sink, "\tgoto {label}")
    }

    pub fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.sink, "\tif-goto {label}")
    }

    pub fn write_call(&mut self, name: &str, arg_count: u16) -> io::Result<()> {
        writeln!(self.sink, "\tcall {name} {arg_count}")
    }

    pub fn write_function(&mut self, name: &str, local_count: u16) -> io::Result<()> {
        writeln!(self.sink, "function {name} {local_count}")
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.sink, "\treturn")
    }

    /// `push constant <n>`, the only way an integer literal enters the VM.
    pub fn write_constant(&mut self, value: u16) -> io::Result<()> {
        self.write_push(Segment::Constant, value)
    }

    /// `push pointer 0` — reads the current object's base address.
    pub fn write_push_this_ptr(&mut self) -> io::Result<()> {
        self.write_push(Segment::Pointer, 0)
    }

    /// `pop pointer 0` — sets `this` for a constructor/method prologue.
    pub fn write_pop_this_ptr(&mut self) -> io::Result<()> {
        self.write_pop(Segment::Pointer, 0)
    }

    /// `push pointer 1` — reads the current `that` base address.
    pub fn write_push_that_ptr(&mut self) -> io::Result<()> {
        self.write_push(Segment::Pointer, 1)
    }

    /// `pop pointer 1` — sets `that` ahead of an array element access.
    pub fn write_pop_that_ptr(&mut self) -> io::Result<()> {
        self.write_pop(Segment::Pointer, 1)
    }

    /// Flushes and releases the underlying sink, surfacing any buffered
    /// I/O error instead of swallowing it on drop.
    pub fn close(mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_lines_are_tab_indented() {
        let mut buf = Vec::new();
        {
            let mut writer = VmWriter::new(&mut buf);
            writer.write_push(Segment::Local, 2).unwrap();
            writer.write_pop(Segment::Argument, 0).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "\tpush local 2\n\tpop argument 0\n");
    }

    #[test]
    fn label_and_function_sit_at_column_zero() {
        let mut buf = Vec::new();
        {
            let mut writer = VmWriter::new(&mut buf);
            writer.write_function("Foo.bar", 1).unwrap();
            writer.write_label("WHILE_EXP0").unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "function Foo.bar 1\nlabel WHILE_EXP0\n");
    }

    #[test]
    fn pointer_helpers_emit_segment_pointer() {
        let mut buf = Vec::new();
        {
            let mut writer = VmWriter::new(&mut buf);
            writer.write_pop_this_ptr().unwrap();
            writer.write_push_that_ptr().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "\tpop pointer 0\n\tpush pointer 1\n");
    }
}
