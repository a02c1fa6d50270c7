use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::Event;
use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::Level;

use term_popover::constants::{
    DEFAULT_DRAG_DISMISS_THRESHOLD, DEFAULT_EXIT_DURATION, DEFAULT_FRAME_INTERVAL,
};
use term_popover::drivers::{ConsoleInputDriver, ConsoleOutputDriver, InputDriver, OutputDriver};
use term_popover::event_loop::{ControlFlow, EventLoop};
use term_popover::keybindings::{Action, KeyBindings};
use term_popover::log_buffer::{LogHandle, set_global_log};
use term_popover::terminal::{MessagePanel, OverlayHost, PanelContent};
use term_popover::tracing_sub::{self, SubscriberMakeWriter};
use term_popover::ui::UiFrame;
use term_popover::{
    MountGuard, NavigationEvent, NavigationTransition, NavigationWatcher, PanelConfig, PanelStack,
    PresentOptions, PresentationSession, UiScheduler, locator, theme,
};

const AFTER_HELP: &str = indoc! {"
    Keys:
      1 / 2 / 3   open the File, Edit or View menu under its toolbar entry
      c           open a centered message
      n           open a nested panel over the topmost one
      m           push or pop a simulated modal route
      Esc         dismiss the topmost panel (pops the route when none is open)
      x           dismiss every panel
      q           quit

    Pressing the key of the menu that is already open closes it.
"};

const MENUS: [(&str, &str); 3] = [("file", "File"), ("edit", "Edit"), ("view", "View")];

#[derive(Debug, Parser)]
#[command(
    name = "term-popover",
    about = "Anchored popover panels in the terminal",
    after_help = AFTER_HELP
)]
struct Args {
    /// Leave an open menu alone when its key is pressed again
    #[arg(long)]
    no_toggle: bool,

    /// Exit transition length in milliseconds
    #[arg(long, default_value_t = DEFAULT_EXIT_DURATION.as_millis() as u64)]
    exit_ms: u64,

    /// Rows a panel must be dragged down before it closes
    #[arg(long, default_value_t = DEFAULT_DRAG_DISMISS_THRESHOLD)]
    drag_threshold: u16,

    /// Append logs to this file instead of the on-screen log
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value_t = Level::DEBUG)]
    log_level: Level,
}

impl Args {
    fn config(&self) -> PanelConfig {
        PanelConfig::new()
            .with_toggle_on_duplicate(!self.no_toggle)
            .with_exit_duration(Duration::from_millis(self.exit_ms))
            .with_drag_dismiss_threshold(self.drag_threshold)
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let log = LogHandle::default();
    set_global_log(log.clone());
    let writer = match &args.log_file {
        Some(path) => SubscriberMakeWriter::to_file(path)?,
        None => SubscriberMakeWriter::default(),
    };
    tracing_sub::init(args.log_level, writer);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let result = local.block_on(&runtime, run(args.config(), log, &mut output));
    output.exit()?;
    result
}

async fn run(config: PanelConfig, log: LogHandle, output: &mut ConsoleOutputDriver) -> io::Result<()> {
    let scheduler = UiScheduler::new();
    let host = Rc::new(RefCell::new(OverlayHost::new()));
    let routes: Rc<RefCell<Vec<NavigationTransition>>> = Rc::default();
    let (nav_tx, nav_rx) = unbounded_channel();

    let fallback = {
        let routes = Rc::clone(&routes);
        let nav_tx = nav_tx.clone();
        move || match routes.borrow_mut().pop() {
            Some(route) => {
                if nav_tx.send(NavigationEvent::Popped(route)).is_err() {
                    tracing::warn!("navigation watcher is gone");
                }
                true
            }
            None => false,
        }
    };
    let session = PresentationSession::with_parts(PanelStack::new(), host, scheduler.clone(), config)
        .with_navigation_fallback(fallback);
    locator::install(session.service()).map_err(io::Error::other)?;

    let watcher = NavigationWatcher::new(session.stack().clone(), config.blocking_rules());
    let watcher_task = tokio::task::spawn_local(watcher.run(nav_rx));

    let mut demo = Demo {
        session,
        routes,
        nav: nav_tx,
        last_result: Rc::default(),
        bindings: KeyBindings::standard(),
        log,
        mount: MountGuard::new(),
    };

    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), DEFAULT_FRAME_INTERVAL, scheduler);
    event_loop.driver().set_mouse_capture(true)?;
    let result = event_loop
        .run(|_driver, event| demo.handle(output, event))
        .await;

    demo.session.dismiss_all();
    drop(demo);
    watcher_task.abort();
    locator::teardown().map_err(io::Error::other)?;
    result
}

struct Demo {
    session: PresentationSession<OverlayHost>,
    routes: Rc<RefCell<Vec<NavigationTransition>>>,
    nav: UnboundedSender<NavigationEvent>,
    last_result: Rc<RefCell<Option<String>>>,
    bindings: KeyBindings,
    log: LogHandle,
    mount: MountGuard,
}

impl Demo {
    fn handle(&mut self, output: &mut ConsoleOutputDriver, event: Option<Event>) -> io::Result<ControlFlow> {
        let Some(event) = event else {
            output.draw(|frame| self.draw(frame))?;
            return Ok(ControlFlow::Continue);
        };
        if self.session.host().borrow_mut().handle_event(&event) {
            return Ok(ControlFlow::Continue);
        }
        if let Event::Key(key) = &event
            && let Some(action) = self.bindings.action_for_key(key)
        {
            return Ok(self.perform(action));
        }
        Ok(ControlFlow::Continue)
    }

    fn perform(&mut self, action: Action) -> ControlFlow {
        match action {
            Action::OpenFileMenu => self.open_menu(0),
            Action::OpenEditMenu => self.open_menu(1),
            Action::OpenViewMenu => self.open_menu(2),
            Action::OpenCentered => {
                let panel = MessagePanel::new(
                    "Notice",
                    indoc! {"
                        Centered panels stack on top of
                        whatever is already open.
                    "},
                )
                .with_choice("OK", "ok");
                self.spawn_present("notice", PresentOptions::centered(), panel);
            }
            Action::OpenNested => {
                let panel = MessagePanel::new("Details", "Nested over the panel below.")
                    .with_choice("Close", "closed");
                self.spawn_present("details", PresentOptions::at(6, 4).nested(), panel);
            }
            Action::ToggleModalRoute => self.toggle_modal_route(),
            Action::DismissTopmost => {
                tokio::task::spawn_local(async {
                    match locator::dismiss(None).await {
                        Ok(outcome) => tracing::debug!(?outcome, "escape handled"),
                        Err(err) => tracing::warn!(%err, "escape ignored"),
                    }
                });
            }
            Action::DismissAll => {
                let dismissed = self.session.dismiss_all();
                tracing::info!(dismissed, "dismissed every panel");
            }
            Action::Quit => return ControlFlow::Quit,
        }
        ControlFlow::Continue
    }

    fn open_menu(&self, index: usize) {
        let (key, label) = MENUS[index];
        let panel = match key {
            "file" => MessagePanel::new(label, "File actions")
                .with_choice("New", "new")
                .with_choice("Open", "open")
                .with_choice("Save", "save"),
            "edit" => MessagePanel::new(label, "Edit actions")
                .with_choice("Undo", "undo")
                .with_choice("Redo", "redo"),
            _ => MessagePanel::new(label, "View actions")
                .with_choice("Zoom in", "zoom-in")
                .with_choice("Zoom out", "zoom-out"),
        };
        let options = PresentOptions::anchored(key).with_dismiss_on_outside_tap(true);
        self.spawn_present(key, options, panel);
    }

    fn spawn_present(&self, name: &'static str, options: PresentOptions, panel: MessagePanel) {
        let session = self.session.clone();
        let last = Rc::clone(&self.last_result);
        let options = options.with_mount(self.mount.token());
        tokio::task::spawn_local(async move {
            let picked = session
                .present::<String, _>(options, move |ctx| -> Box<dyn PanelContent> {
                    ctx.animation().enable_exit_transition();
                    Box::new(panel)
                })
                .await;
            tracing::info!(panel = name, ?picked, "panel closed");
            *last.borrow_mut() = Some(format!("{name}: {}", picked.as_deref().unwrap_or("-")));
        });
    }

    fn toggle_modal_route(&self) {
        let mut routes = self.routes.borrow_mut();
        let event = match routes.pop() {
            Some(route) => NavigationEvent::Popped(route),
            None => {
                let route = NavigationTransition::dialog("modal");
                routes.push(route.clone());
                NavigationEvent::Pushed(route)
            }
        };
        if self.nav.send(event).is_err() {
            tracing::warn!("navigation watcher is gone");
        }
    }

    fn draw(&self, mut frame: UiFrame<'_>) {
        let area = frame.area();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut host = self.session.host().borrow_mut();

        let toolbar = Rect { height: 1, ..area };
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::toolbar_bg())),
            toolbar,
        );
        let open = self.session.stack().current_anchor_key();
        let mut x = area.x.saturating_add(1);
        for (key, label) in MENUS {
            let text = format!(" {label} ");
            let width = text.chars().count() as u16;
            let style = if open.as_ref().is_some_and(|k| k.as_str() == key) {
                Style::default()
                    .fg(theme::toolbar_active_fg())
                    .bg(theme::toolbar_active_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::toolbar_fg()).bg(theme::toolbar_bg())
            };
            frame.set_string(x, area.y, &text, style);
            host.anchors_mut().register(key, Rect::new(x, area.y, width, 1));
            x = x.saturating_add(width + 1);
        }

        let help_style = Style::default().fg(theme::status_fg());
        let mut y = area.y.saturating_add(2);
        for (action, keys) in self.bindings.help_entries() {
            frame.set_string(2, y, &format!("{:>14}  {action}", keys.join(" / ")), help_style);
            y = y.saturating_add(1);
        }

        let route = self
            .routes
            .borrow()
            .last()
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| "-".to_string());
        let last = self.last_result.borrow().clone().unwrap_or_else(|| "-".to_string());
        let status = format!(
            "panels: {}  route: {route}  last: {last}",
            self.session.stack().active_len()
        );
        y = y.saturating_add(1);
        frame.set_string(
            2,
            y,
            &status,
            Style::default().fg(theme::accent()).add_modifier(Modifier::BOLD),
        );

        let log_top = y.saturating_add(2);
        let log_rows = area.y.saturating_add(area.height).saturating_sub(log_top) as usize;
        let log_style = Style::default().fg(theme::log_fg());
        for (offset, line) in self.log.tail(log_rows).iter().enumerate() {
            frame.set_string(2, log_top.saturating_add(offset as u16), line, log_style);
        }

        host.render(&mut frame);
    }
}
