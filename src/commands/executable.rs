use crate::frame::Frame;
use crate::store::Storage;

pub trait Executable {
    /// Runs the command against the store and returns the reply to send back. A command performs
    /// at most one store operation.
    fn exec(self, store: &dyn Storage) -> Frame;
}
