/// A participant on the memory bus.
///
/// Each component answers for the address ranges it owns and ignores the
/// others: `read` returns `None` for addresses it does not handle, and
/// `write` silently drops them.
pub trait Component {
    fn read(&self, address: u16) -> Option<u8>;
    fn write(&mut self, address: u16, data: u8);
}

impl<C: Component + ?Sized> Component for Box<C> {
    fn read(&self, address: u16) -> Option<u8> {
        (**self).read(address)
    }

    fn write(&mut self, address: u16, data: u8) {
        (**self).write(address, data)
    }
}
