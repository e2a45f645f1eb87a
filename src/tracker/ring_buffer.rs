/// Fixed-capacity history that overwrites its oldest entry once full.
///
/// Storage is allocated once; `head` is the slot the next push writes to.
#[derive(Debug, Clone)]
pub struct RingBuffer<T: Copy> {
    slots: Vec<T>,
    capacity: usize,
    head: usize,
}

impl<T: Copy> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.head] = value;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Oldest slot index; wraps to `head` only once the buffer is full.
    fn start(&self) -> usize {
        if self.is_full() {
            self.head
        } else {
            0
        }
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.start());
        older.iter().chain(newer.iter())
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        self.iter().skip(self.len().saturating_sub(n))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    /// Change capacity, keeping the newest entries that still fit.
    pub fn resize(&mut self, capacity: usize) {
        if capacity == self.capacity {
            return;
        }
        let kept: Vec<T> = self.recent(capacity).copied().collect();
        self.slots = Vec::with_capacity(capacity);
        self.capacity = capacity;
        self.head = 0;
        for value in kept {
            self.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_in_order() {
        let mut buf = RingBuffer::new(4);
        assert!(buf.is_empty());
        assert_eq!(buf.iter().next(), None);
        for i in 1..=3 {
            buf.push(i);
        }
        assert_eq!(buf.to_vec(), vec![1, 2, 3]);
        assert_eq!(buf.iter().next_back(), Some(&3));
        assert!(!buf.is_full());
        buf.push(4);
        assert!(buf.is_full());
        assert_eq!(buf.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_wraps_and_evicts_oldest() {
        let mut buf = RingBuffer::new(3);
        for i in 0..8 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.to_vec(), vec![5, 6, 7]);
        assert_eq!(buf.iter().next_back(), Some(&7));
        assert_eq!(buf.iter().rev().copied().collect::<Vec<_>>(), vec![7, 6, 5]);
    }

    #[test]
    fn test_recent() {
        let mut buf = RingBuffer::new(5);
        for i in 0..7 {
            buf.push(i);
        }
        assert_eq!(buf.recent(2).copied().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(buf.recent(50).copied().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6]);
        assert_eq!(buf.recent(0).count(), 0);
    }

    #[test]
    fn test_clear_restarts_cursor() {
        let mut buf = RingBuffer::new(2);
        buf.push(1);
        buf.push(2);
        buf.push(3);
        buf.clear();
        assert!(buf.is_empty());
        buf.push(9);
        assert_eq!(buf.to_vec(), vec![9]);
        assert_eq!(buf.capacity(), 2);
    }

    #[test]
    fn test_resize_keeps_newest() {
        let mut buf = RingBuffer::new(4);
        for i in 0..6 {
            buf.push(i);
        }
        buf.resize(2);
        assert_eq!(buf.to_vec(), vec![4, 5]);
        buf.push(6);
        assert_eq!(buf.to_vec(), vec![5, 6]);

        buf.resize(5);
        buf.push(7);
        assert_eq!(buf.to_vec(), vec![5, 6, 7]);
    }
}
