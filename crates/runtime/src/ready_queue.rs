/// Deferred work released once readiness flips.
///
/// Callbacks run in registration order, each exactly once.
pub struct ReadyQueue<T> {
    pending: Vec<Box<dyn FnOnce(&mut T)>>,
}

impl<T> ReadyQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, callback: impl FnOnce(&mut T) + 'static) {
        self.pending.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes every queued callback, leaving the queue empty.
    ///
    /// Callers run them after releasing any borrow of the queue's owner, so
    /// a callback may safely enqueue more work.
    pub fn take(&mut self) -> Vec<Box<dyn FnOnce(&mut T)>> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for ReadyQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ReadyQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ReadyQueue;

    #[test]
    fn drains_in_order_once() {
        let mut q: ReadyQueue<Vec<u32>> = ReadyQueue::new();
        q.push(|v| v.push(1));
        q.push(|v| v.push(2));
        assert_eq!(q.len(), 2);

        let mut target = Vec::new();
        for cb in q.take() {
            cb(&mut target);
        }
        assert_eq!(target, vec![1, 2]);
        assert!(q.is_empty());
        assert!(q.take().is_empty());
    }
}
