//! Priority-ordered pending list.

use std::collections::VecDeque;
use std::collections::vec_deque::Drain;

use careerdesk_core::RequestId;

use crate::priority::Priority;

/// A request waiting for admission.
#[derive(Debug)]
pub(crate) struct Entry<T> {
    pub id: RequestId,
    pub priority: Priority,
    pub item: T,
}

/// Pending requests, highest priority first and oldest first within a priority.
///
/// A new entry is placed before the first entry of strictly lower weight, so
/// it never jumps ahead of peers of the same priority that are already waiting.
#[derive(Debug)]
pub(crate) struct PendingList<T> {
    entries: VecDeque<Entry<T>>,
}

impl<T> PendingList<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Insert at the priority-ordered position; returns that position.
    pub fn insert(&mut self, id: RequestId, priority: Priority, item: T) -> usize {
        let weight = priority.weight();
        let position = self
            .entries
            .iter()
            .position(|e| e.priority.weight() < weight)
            .unwrap_or(self.entries.len());

        self.entries.insert(position, Entry { id, priority, item });
        position
    }

    pub fn pop_front(&mut self) -> Option<Entry<T>> {
        self.entries.pop_front()
    }

    pub fn remove(&mut self, id: RequestId) -> Option<Entry<T>> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    pub fn drain(&mut self) -> Drain<'_, Entry<T>> {
        self.entries.drain(..)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn priority_strategy() -> impl Strategy<Value = Priority> {
        prop::sample::select(Priority::ALL.to_vec())
    }

    #[test]
    fn priority_major_fifo_minor() {
        let mut list = PendingList::new();
        list.insert(RequestId::new(), Priority::Low, "a");
        list.insert(RequestId::new(), Priority::High, "b");
        list.insert(RequestId::new(), Priority::Normal, "c");
        list.insert(RequestId::new(), Priority::Normal, "d");
        list.insert(RequestId::new(), Priority::High, "e");

        let order: Vec<_> = std::iter::from_fn(|| list.pop_front().map(|e| e.item)).collect();
        assert_eq!(order, vec!["b", "e", "c", "d", "a"]);
    }

    #[test]
    fn insert_reports_position() {
        let mut list = PendingList::new();
        assert_eq!(list.insert(RequestId::new(), Priority::Normal, 1), 0);
        assert_eq!(list.insert(RequestId::new(), Priority::Normal, 2), 1);
        assert_eq!(list.insert(RequestId::new(), Priority::High, 3), 0);
        assert_eq!(list.insert(RequestId::new(), Priority::Low, 4), 3);
    }

    #[test]
    fn remove_by_id_keeps_remaining_order() {
        let mut list = PendingList::new();
        let first = RequestId::new();
        let second = RequestId::new();
        let third = RequestId::new();
        list.insert(first, Priority::Normal, 1);
        list.insert(second, Priority::Normal, 2);
        list.insert(third, Priority::Normal, 3);

        assert_eq!(list.remove(second).map(|e| e.item), Some(2));
        assert!(list.remove(second).is_none());
        assert_eq!(list.len(), 2);

        let rest: Vec<_> = list.drain().map(|e| e.id).collect();
        assert_eq!(rest, vec![first, third]);
        assert!(list.is_empty());
    }

    proptest! {
        #[test]
        fn popping_yields_stable_sort_by_weight(priorities in prop::collection::vec(priority_strategy(), 0..64)) {
            let mut list = PendingList::new();
            for (seq, priority) in priorities.iter().enumerate() {
                list.insert(RequestId::new(), *priority, seq);
            }

            let mut expected: Vec<(Priority, usize)> =
                priorities.iter().copied().zip(0..).collect();
            expected.sort_by_key(|(p, _)| std::cmp::Reverse(p.weight()));

            let actual: Vec<(Priority, usize)> =
                std::iter::from_fn(|| list.pop_front().map(|e| (e.priority, e.item))).collect();

            prop_assert_eq!(actual, expected);
        }
    }
}
