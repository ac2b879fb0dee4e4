use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub const DEFAULT_PRIORITY: usize = 0;
pub const HIGH_PRIORITY: usize = 1;
pub const PRIORITY_CLASSES: usize = 3;

struct State<T> {
    classes: Vec<VecDeque<T>>,
    closed: bool,
}

/// A blocking multi-class FIFO. Items of a higher class always leave before
/// items of a lower one; within a class the order is first in, first out.
pub struct CommandQueue<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> CommandQueue<T> {
    pub fn new(classes: usize) -> Self {
        let mut queues = Vec::new();
        queues.resize_with(classes.max(1), VecDeque::new);

        CommandQueue {
            state: Mutex::new(State {
                classes: queues,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item` to class `priority`, clamped to the highest class.
    pub fn put(&self, priority: usize, item: T) {
        let mut state = self.lock();
        let class = priority.min(state.classes.len() - 1);
        state.classes[class].push_back(item);
        drop(state);
        self.ready.notify_one();
    }

    /// Blocks until an item is available. Returns `None` once the queue has
    /// been closed.
    pub fn get(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = Self::pop(&mut state) {
                return Some(item);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn try_get(&self) -> Option<T> {
        Self::pop(&mut self.lock())
    }

    fn pop(state: &mut State<T>) -> Option<T> {
        state
            .classes
            .iter_mut()
            .rev()
            .find(|class| !class.is_empty())
            .and_then(|class| class.pop_front())
    }

    /// Wakes every blocked `get`; queued items are dropped.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.classes.iter_mut().for_each(VecDeque::clear);
        drop(state);
        self.ready.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().classes.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        CommandQueue::new(PRIORITY_CLASSES)
    }
}
