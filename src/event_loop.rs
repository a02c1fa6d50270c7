use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;
use crate::scheduler::UiScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The frame loop that drives the UI task.
///
/// Each frame it:
/// 1. Flushes the [`UiScheduler`], so panel state listeners queued since the
///    last frame run now and never inside the call that queued them.
/// 2. Calls the handler with `None` (the draw tick).
/// 3. Drains pending input, handing each event to the handler.
/// 4. Sleeps for the frame interval, which is where `present()` futures and
///    exit transitions on the same `LocalSet` make progress.
pub struct EventLoop<D> {
    driver: D,
    frame_interval: Duration,
    scheduler: UiScheduler,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, frame_interval: Duration, scheduler: UiScheduler) -> Self {
        Self {
            driver,
            frame_interval,
            scheduler,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn scheduler(&self) -> &UiScheduler {
        &self.scheduler
    }

    pub async fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            self.scheduler.flush();
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            // Drain the queue so bursts (drags, scrolling) don't lag a frame
            // per event.
            while self.driver.poll(Duration::ZERO)? {
                let event = self.driver.read()?;
                if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                    self.scheduler.flush();
                    return Ok(());
                }
            }

            tokio::time::sleep(self.frame_interval).await;
        }
        self.scheduler.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInputDriver;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::cell::Cell;
    use std::rc::Rc;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn dispatches_events_until_quit() {
        let driver = ScriptedInputDriver::new([key('a'), key('b'), key('q'), key('z')]);
        let mut ev = EventLoop::new(driver, Duration::from_millis(1), UiScheduler::new());
        let mut seen = Vec::new();
        let mut ticks = 0;
        ev.run(|_, event| {
            match event {
                None => ticks += 1,
                Some(Event::Key(k)) => {
                    seen.push(k.code);
                    if k.code == KeyCode::Char('q') {
                        return Ok(ControlFlow::Quit);
                    }
                }
                Some(_) => {}
            }
            Ok(ControlFlow::Continue)
        })
        .await
        .unwrap();
        assert_eq!(
            seen,
            vec![KeyCode::Char('a'), KeyCode::Char('b'), KeyCode::Char('q')]
        );
        assert_eq!(ticks, 1);
        assert_eq!(ev.driver().remaining(), 1);
    }

    #[tokio::test]
    async fn flushes_scheduler_every_frame() {
        let scheduler = UiScheduler::new();
        let ran = Rc::new(Cell::new(0));
        let r = ran.clone();
        scheduler.schedule("test", move || {
            r.set(r.get() + 1);
            Ok(())
        });
        let mut ev = EventLoop::new(
            ScriptedInputDriver::default(),
            Duration::from_millis(1),
            scheduler.clone(),
        );
        let mut frames = 0;
        let observed = ran.clone();
        ev.run(|_, _| {
            frames += 1;
            // the job queued before the loop has run by the first tick
            assert_eq!(observed.get(), 1);
            Ok(if frames == 3 {
                ControlFlow::Quit
            } else {
                ControlFlow::Continue
            })
        })
        .await
        .unwrap();
        assert_eq!(scheduler.pending(), 0);
    }
}
