//! Timers for the housekeeping sweeps. The scheduler owns no world state: it
//! only tells its owner which tasks are due, so every mutation happens on the
//! owner's single timeline.

/// Housekeeping the simulation knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    SettleScan,
    EvictOldest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry {
    id: TaskId,
    task: Task,
    due: f64,
    /// `None` for one-shot tasks
    period: Option<f64>,
}

/// Wall-clock timers driven by [`Scheduler::advance`]
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the scheduler was created
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    fn push(&mut self, task: Task, delay: f64, period: Option<f64>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, task, due: self.now + delay, period });
        id
    }

    /// Run `task` every `period` seconds, first after one period.
    /// Non-positive periods are rejected.
    pub fn schedule_repeating(&mut self, period: f64, task: Task) -> Option<TaskId> {
        if period.is_nan() || period <= 0.0 {
            log::warn!("refusing to schedule {task:?} with period {period}");
            return None;
        }
        Some(self.push(task, period, Some(period)))
    }

    /// Run `task` once after `delay` seconds
    pub fn schedule_once(&mut self, delay: f64, task: Task) -> TaskId {
        self.push(task, delay.max(0.0), None)
    }

    /// Returns false if the task had already fired or been cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Move the clock forward and return every task that came due, in due
    /// order. A repeating task that is several periods behind fires once per
    /// missed period.
    pub fn advance(&mut self, dt: f64) -> Vec<Task> {
        self.now += dt.max(0.0);
        let now = self.now;
        let mut fired: Vec<(f64, TaskId, Task)> = Vec::new();

        self.entries.retain_mut(|entry| {
            while entry.due <= now {
                fired.push((entry.due, entry.id, entry.task));
                match entry.period {
                    Some(period) => entry.due += period,
                    None => return false,
                }
            }
            true
        });

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, task)| task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeating_fires_each_period() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(1.0, Task::SettleScan);
        assert!(scheduler.advance(0.5).is_empty());
        assert_eq!(scheduler.advance(0.5), vec![Task::SettleScan]);
        assert!(scheduler.advance(0.75).is_empty());
        assert_eq!(scheduler.advance(0.25), vec![Task::SettleScan]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_repeating_catches_up_after_long_frame() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(1.0, Task::EvictOldest);
        assert_eq!(scheduler.advance(3.5).len(), 3);
        assert_eq!(scheduler.advance(0.5).len(), 1);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(2.0, Task::SettleScan);
        assert!(scheduler.advance(1.0).is_empty());
        assert_eq!(scheduler.advance(1.0), vec![Task::SettleScan]);
        assert!(scheduler.advance(10.0).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_due_order_across_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(1.5, Task::EvictOldest);
        scheduler.schedule_repeating(1.0, Task::SettleScan);
        assert_eq!(
            scheduler.advance(2.0),
            vec![Task::SettleScan, Task::EvictOldest, Task::SettleScan]
        );
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_repeating(1.0, Task::SettleScan).unwrap();
        scheduler.schedule_once(1.0, Task::EvictOldest);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.advance(1.0), vec![Task::EvictOldest]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_rejects_non_positive_period() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.schedule_repeating(0.0, Task::SettleScan).is_none());
        assert!(scheduler.schedule_repeating(f64::NAN, Task::SettleScan).is_none());
        assert_eq!(scheduler.pending(), 0);
    }
}
