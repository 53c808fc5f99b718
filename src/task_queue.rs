//! FIFO queue of deferred UI tasks.
//!
//! Stands in for "post to the UI thread": a task posted while another is
//! running never runs re-entrantly; it waits until everything queued ahead of
//! it has run. Clones share one queue.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug)]
pub struct TaskQueue<T> {
    tasks: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tasks: Rc::clone(&self.tasks),
        }
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            tasks: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` after everything already queued
    pub fn post(&self, task: T) {
        self.tasks.borrow_mut().push_back(task);
    }

    /// Next task to run, if any
    pub fn pop(&self) -> Option<T> {
        self.tasks.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run tasks until the queue is empty, including tasks posted by the
    /// tasks themselves. Returns how many ran.
    pub fn run_until_idle(&self, mut run: impl FnMut(T)) -> usize {
        let mut ran = 0;
        // The borrow ends before `run`, so tasks may post more tasks.
        while let Some(task) = self.pop() {
            run(task);
            ran += 1;
        }
        ran
    }
}
