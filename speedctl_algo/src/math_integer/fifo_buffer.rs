// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Fixed-capacity ring buffer with a run-time length.
///
/// Storage is `N` slots; only the first `len` are in use. Writing overwrites the oldest slot.
pub struct BufferFIFO<T, const N: usize> {
    buffer: [T; N],

    len: usize,
    idx: usize, // Next slot to be overwritten (= oldest value)
}

impl<T, const N: usize> BufferFIFO<T, N>
where
    T: Default + Copy,
{
    /// Buffer using all `N` slots.
    pub fn new() -> Self {
        Self {
            buffer: [T::default(); N],
            len: N,
            idx: 0,
        }
    }

    /// Buffer using `len` slots. Returns `None` if `len` is zero or exceeds `N`.
    pub fn with_len(len: usize) -> Option<Self> {
        if len == 0 || len > N {
            return None;
        }
        Some(Self {
            buffer: [T::default(); N],
            len,
            idx: 0,
        })
    }

    /// Oldest value, the one the next write replaces.
    pub fn read(&self) -> T {
        self.buffer[self.idx]
    }

    /// Writes `value` over the oldest slot and returns what was there.
    pub fn pop(&mut self, value: T) -> T {
        let temp = self.buffer[self.idx];
        self.buffer[self.idx] = value;
        self.idx += 1;
        if self.idx == self.len {
            self.idx = 0;
        }
        temp
    }

    /// Slots in use, in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.buffer[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Refills every slot with `T::default()` and rewinds.
    pub fn clear(&mut self) {
        self.buffer = [T::default(); N];
        self.idx = 0;
    }
}

impl<T, const N: usize> Default for BufferFIFO<T, N>
where
    T: Default + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_returns_value_written_len_writes_ago() {
        let mut fifo = BufferFIFO::<u32, 8>::with_len(3).unwrap();
        assert_eq!(fifo.pop(1), 0);
        assert_eq!(fifo.pop(2), 0);
        assert_eq!(fifo.pop(3), 0);
        assert_eq!(fifo.pop(4), 1);
        assert_eq!(fifo.read(), 2);
        assert_eq!(fifo.as_slice(), &[4, 2, 3]);
    }

    #[test]
    fn rejects_zero_and_oversized_lengths() {
        assert!(BufferFIFO::<u8, 4>::with_len(0).is_none());
        assert!(BufferFIFO::<u8, 4>::with_len(5).is_none());
        assert_eq!(BufferFIFO::<u8, 4>::with_len(4).unwrap().len(), 4);
    }

    #[test]
    fn clear_rewinds_and_zeroes() {
        let mut fifo = BufferFIFO::<i32, 2>::new();
        fifo.pop(5);
        fifo.clear();
        assert_eq!(fifo.as_slice(), &[0, 0]);
        assert_eq!(fifo.pop(9), 0);
    }
}
