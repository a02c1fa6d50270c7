//! Deferred work queue drained once per UI update cycle.
//!
//! Controllers never invoke listener code synchronously from inside
//! `dismiss()`. They enqueue a job here instead and the host drains the
//! queue on its next frame, so listeners cannot re-enter the caller that
//! triggered the dismissal.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::error::HookError;

type Job = Box<dyn FnOnce() -> Result<(), HookError>>;

#[derive(Clone, Default)]
pub struct UiScheduler {
    queue: Rc<RefCell<VecDeque<(&'static str, Job)>>>,
}

impl UiScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, label: &'static str, job: F)
    where
        F: FnOnce() -> Result<(), HookError> + 'static,
    {
        self.queue.borrow_mut().push_back((label, Box::new(job)));
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run every job queued before this call and return how many ran.
    ///
    /// Jobs scheduled while flushing wait for the next flush. A failing job
    /// is logged and does not stop the remaining ones.
    pub fn flush(&self) -> usize {
        let jobs: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = jobs.len();
        for (label, job) in jobs {
            if let Err(err) = job() {
                tracing::warn!(job = label, error = %err, "scheduled ui job failed");
            }
        }
        count
    }
}

impl fmt::Debug for UiScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn jobs_scheduled_during_flush_run_next_cycle() {
        let sched = UiScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let (s2, h2) = (sched.clone(), hits.clone());
        sched.schedule("outer", move || {
            h2.set(h2.get() + 1);
            let h3 = h2.clone();
            s2.schedule("inner", move || {
                h3.set(h3.get() + 10);
                Ok(())
            });
            Ok(())
        });
        assert_eq!(sched.flush(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.flush(), 1);
        assert_eq!(hits.get(), 11);
    }

    #[test]
    fn failing_job_does_not_block_others() {
        let sched = UiScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        sched.schedule("bad", || Err(HookError::failed("boom")));
        sched.schedule("good", move || {
            r.set(true);
            Ok(())
        });
        assert_eq!(sched.flush(), 2);
        assert!(ran.get());
    }
}
