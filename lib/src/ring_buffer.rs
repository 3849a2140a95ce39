/// Fixed-capacity FIFO backed by an inline array.
///
/// `const`-constructible so it can sit inside a `static` lock shared with an
/// interrupt handler. Producers that must never fail use
/// [`push_overwrite`](Self::push_overwrite), which drops the oldest element.
#[derive(Debug)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    head: usize,
    tail: usize,
    count: usize,
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer whose slots are pre-filled with `value`.
    #[inline(always)]
    pub const fn new_with(value: T) -> Self {
        Self {
            data: [value; N],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub const fn is_full(&self) -> bool {
        self.count >= N
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Push, evicting the oldest element when full.
    #[inline(always)]
    pub fn push_overwrite(&mut self, value: T) {
        if N == 0 {
            return;
        }
        if self.is_full() {
            self.tail = (self.tail + 1) % N;
            self.count -= 1;
        }
        self.data[self.head] = value;
        self.head = (self.head + 1) % N;
        self.count += 1;
    }

    /// Push without eviction; returns false if full.
    #[inline(always)]
    pub fn try_push(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.data[self.head] = value;
        self.head = (self.head + 1) % N;
        self.count += 1;
        true
    }

    #[inline(always)]
    pub fn try_pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.data[self.tail];
        self.tail = (self.tail + 1) % N;
        self.count -= 1;
        Some(value)
    }

    #[inline(always)]
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        Some(&self.data[self.tail])
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new_with(T::default())
    }
}
