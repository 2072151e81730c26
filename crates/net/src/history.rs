use std::collections::VecDeque;

/// One decoded delta payload tagged with the host tick it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry<T> {
    pub tick: u64,
    pub payload: T,
}

/// Receive-side buffer of decoded deltas, ordered by host tick.
///
/// Entries are kept sorted on insertion so late arrivals slot into tick
/// order; equal ticks keep their arrival order. Draining never releases an
/// entry tagged with a future tick — the simulation applies it once its own
/// tick catches up.
#[derive(Clone, Debug, Default)]
pub struct HistoryQueue<T> {
    entries: VecDeque<HistoryEntry<T>>,
}

impl<T> HistoryQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Host tick of the next entry in line.
    pub fn next_tick(&self) -> Option<u64> {
        self.entries.front().map(|entry| entry.tick)
    }

    /// Inserts behind every entry with an equal or earlier tick.
    pub fn push(&mut self, tick: u64, payload: T) {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.tick > tick)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, HistoryEntry { tick, payload });
    }

    /// Pops the next entry whose tick is due at `tick`, oldest first.
    /// Returns `None` once only future-tagged entries remain.
    pub fn pop_due(&mut self, tick: u64) -> Option<T> {
        if self.next_tick()? > tick {
            return None;
        }
        self.entries.pop_front().map(|entry| entry.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_order_pushes_come_back_in_tick_order() {
        let mut queue = HistoryQueue::new();
        queue.push(3, "c");
        queue.push(1, "a");
        queue.push(2, "b");

        assert_eq!(queue.pop_due(3), Some("a"));
        assert_eq!(queue.pop_due(3), Some("b"));
        assert_eq!(queue.pop_due(3), Some("c"));
        assert_eq!(queue.pop_due(3), None);
    }

    #[test]
    fn equal_ticks_keep_arrival_order() {
        let mut queue = HistoryQueue::new();
        queue.push(5, "first");
        queue.push(5, "second");

        assert_eq!(queue.pop_due(5), Some("first"));
        assert_eq!(queue.pop_due(5), Some("second"));
    }

    #[test]
    fn future_entries_stay_queued() {
        let mut queue = HistoryQueue::new();
        queue.push(10, "later");

        assert_eq!(queue.pop_due(9), None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(10), Some("later"));
    }
}
