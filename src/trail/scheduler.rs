use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Fire-once deferred actions on a private monotonic clock
///
/// The clock only moves through [`Scheduler::advance`], so the same sequence of
/// calls always fires the same tasks in the same order.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_handle: u64,
    /// (due time, handle) min-heap; the handle breaks ties in scheduling order
    queue: BinaryHeap<Reverse<(Duration, TaskHandle)>>,
    /// Tasks that have neither fired nor been cancelled
    tasks: HashMap<TaskHandle, T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_handle: 0,
            queue: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks still waiting to fire
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Schedule `task` to fire once `delay` has elapsed
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;

        self.queue.push(Reverse((self.now + delay, handle)));
        self.tasks.insert(handle, task);
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        // The heap entry stays behind and is skipped when it comes due
        self.tasks.remove(&handle).is_some()
    }

    /// Move the clock forward and collect every task that came due
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;

        let mut due = Vec::new();
        while let Some(Reverse((at, handle))) = self.queue.peek().copied() {
            if at > self.now {
                break;
            }
            self.queue.pop();
            if let Some(task) = self.tasks.remove(&handle) {
                due.push(task);
            }
        }
        due
    }

    /// Drop every pending task, including cancelled entries still in the queue
    pub fn clear(&mut self) {
        self.queue.clear();
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(30), "c");
        scheduler.schedule(ms(10), "a");
        scheduler.schedule(ms(20), "b");

        assert!(scheduler.advance(ms(5)).is_empty());
        assert_eq!(scheduler.advance(ms(25)), vec!["a", "b", "c"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(10), 1);
        scheduler.schedule(ms(10), 2);
        scheduler.schedule(ms(10), 3);

        assert_eq!(scheduler.advance(ms(10)), vec![1, 2, 3]);
    }

    #[test]
    fn test_delay_is_relative_to_current_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(ms(100));
        scheduler.schedule(ms(10), "late");

        assert!(scheduler.advance(ms(9)).is_empty());
        assert_eq!(scheduler.advance(ms(1)), vec!["late"]);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(ms(10), "keep");
        let drop = scheduler.schedule(ms(10), "drop");

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.advance(ms(50)), vec!["keep"]);
        // Cancelling after firing is a no-op
        assert!(!scheduler.cancel(keep));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut scheduler = Scheduler::new();
        let cancelled = scheduler.schedule(ms(1), ());
        scheduler.schedule(ms(2), ());
        scheduler.cancel(cancelled);
        scheduler.clear();

        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.queue.is_empty());
        assert!(scheduler.advance(ms(10)).is_empty());
    }
}
