/// Host keyboard keys understood by the emulators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    A,
    S,
    Z,
    X,
    Escape,
    None,
}
