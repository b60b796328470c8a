use std::cell::RefCell;
use std::rc::Rc;

use crate::component::Component;

use super::memory_map::REG_SB;

/// Bytes captured by a [`SerialPrinter`], shared with whoever inspects them.
pub type SerialOutput = Rc<RefCell<Vec<u8>>>;

/// Debug sink on the serial data register.
///
/// Test ROMs print their results by writing characters to SB; this
/// component records every such byte and logs each completed line. It never
/// answers reads, so SB itself stays unmapped.
#[derive(Debug, Default)]
pub struct SerialPrinter {
    output: SerialOutput,
    line: Vec<u8>,
}

impl SerialPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the captured bytes; stays valid after the printer is
    /// attached to a machine.
    pub fn output(&self) -> SerialOutput {
        Rc::clone(&self.output)
    }
}

impl Component for SerialPrinter {
    fn read(&self, _address: u16) -> Option<u8> {
        None
    }

    fn write(&mut self, address: u16, data: u8) {
        if address != REG_SB {
            return;
        }
        self.output.borrow_mut().push(data);
        if data == b'\n' {
            log::info!("serial: {}", String::from_utf8_lossy(&self.line));
            self.line.clear();
        } else {
            self.line.push(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_bytes_written_to_sb() {
        let mut printer = SerialPrinter::new();
        let output = printer.output();
        for &b in b"ok\n" {
            printer.write(REG_SB, b);
        }
        printer.write(0xFF02, 0x81);
        assert_eq!(output.borrow().as_slice(), b"ok\n");
        assert_eq!(printer.read(REG_SB), None);
        assert!(printer.line.is_empty());
    }
}
