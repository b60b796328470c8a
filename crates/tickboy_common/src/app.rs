use crate::key::Key;

/// An emulator as seen by a frontend.
///
/// The frontend owns the window and the event loop; each iteration it
/// forwards key events, then asks the app to fill `screen` with the next
/// frame as packed RGB24 pixels of `width() * height()` size.
pub trait App {
    fn init(&mut self);
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
}
