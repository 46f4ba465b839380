/// Owned read/write pair for a simulation field.
///
/// A stage samples the `read` half and writes the `write` half; `swap`
/// exchanges the roles in O(1) so the freshest result becomes readable.
/// Holding the halves as separate struct fields lets `split` hand out a
/// shared read borrow alongside the exclusive write borrow, which rules out
/// same-buffer read/write aliasing at compile time.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleBuffered<T> {
    read: T,
    write: T,
}

impl<T> DoubleBuffered<T> {
    pub fn new(read: T, write: T) -> Self {
        Self { read, write }
    }

    pub fn read(&self) -> &T {
        &self.read
    }

    pub(crate) fn read_mut(&mut self) -> &mut T {
        &mut self.read
    }

    /// Borrow the read buffer and the write buffer together.
    pub fn split(&mut self) -> (&T, &mut T) {
        (&self.read, &mut self.write)
    }

    /// Exchange buffer roles. Pointer swap only, no data copy.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    pub fn both_mut(&mut self) -> (&mut T, &mut T) {
        (&mut self.read, &mut self.write)
    }
}

impl<T: Clone> DoubleBuffered<T> {
    pub fn filled(value: T) -> Self {
        Self {
            read: value.clone(),
            write: value,
        }
    }
}
