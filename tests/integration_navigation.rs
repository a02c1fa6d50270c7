mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{session, settle};
use term_popover::{
    BlockingRules, DismissOutcome, NavigationEvent, NavigationTransition, NavigationWatcher,
    PresentOptions, locator,
};
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::{LocalSet, spawn_local};

#[tokio::test]
async fn blocking_route_closes_every_panel() {
    LocalSet::new()
        .run_until(async {
            let s = session();
            let (tx, rx) = unbounded_channel();
            let watcher = spawn_local(
                NavigationWatcher::new(s.stack().clone(), BlockingRules::default()).run(rx),
            );

            let mut tasks = Vec::new();
            for options in [
                PresentOptions::anchored("k1"),
                PresentOptions::centered(),
                PresentOptions::centered().nested(),
            ] {
                let s = s.clone();
                tasks.push(spawn_local(async move {
                    s.present::<String, _>(options, |_| "panel".to_string()).await
                }));
            }
            settle().await;
            assert_eq!(s.stack().active_len(), 3);

            tx.send(NavigationEvent::Pushed(NavigationTransition::page("home")))
                .unwrap();
            settle().await;
            assert_eq!(s.stack().active_len(), 3);

            tx.send(NavigationEvent::Pushed(NavigationTransition::dialog("confirm")))
                .unwrap();
            for task in tasks {
                assert_eq!(task.await.unwrap(), None);
            }
            assert!(s.stack().is_empty());
            assert!(s.host().borrow().entries.is_empty());

            drop(tx);
            assert_eq!(watcher.await.unwrap(), 3);
        })
        .await;
}

#[tokio::test]
async fn escape_falls_back_to_navigation_through_locator() {
    LocalSet::new()
        .run_until(async {
            let routes = Rc::new(RefCell::new(vec!["settings".to_string()]));
            let r = Rc::clone(&routes);
            let s = session().with_navigation_fallback(move || r.borrow_mut().pop().is_some());
            locator::install(s.service()).unwrap();

            let s2 = s.clone();
            let task = spawn_local(async move {
                s2.present::<String, _>(PresentOptions::anchored("k1"), |_| "menu".to_string())
                    .await
            });
            settle().await;
            let top = locator::topmost().unwrap();

            assert_eq!(
                locator::dismiss(None).await,
                Ok(DismissOutcome::Panel(top.id()))
            );
            assert_eq!(task.await.unwrap(), None);
            assert_eq!(locator::dismiss(None).await, Ok(DismissOutcome::Navigation));
            assert!(routes.borrow().is_empty());
            assert_eq!(locator::dismiss(None).await, Ok(DismissOutcome::Nothing));

            locator::teardown().unwrap();
            assert!(!locator::is_installed());
        })
        .await;
}
