use std::time::{Duration, Instant};

use backdrop_config::{CapabilityOverrides, Config};
use backdrop_core::{
    Broadcast, CapabilitySource, Debounce, Nav, Theme, Throttle, View, Viewport,
};
use backdrop_effects::{BackdropState, Layers};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::Paragraph,
};
use tracing::{debug, info};

mod cli;
mod logging;
mod probe;

use cli::Args;
use probe::HostCapabilities;

/// Quiet period before a terminal resize reaches the layers.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);
/// Minimum spacing between accepted toggle keys.
const KEY_THROTTLE: Duration = Duration::from_millis(150);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    if args.save_config {
        let path = match &args.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        println!("configuration written to {}", path.display());
        return Ok(());
    }

    let log_path = logging::init(&config.log_level)?;
    info!(?log_path, fps = config.fps, theme = config.theme.label(), "starting backdrop");

    let source = HostCapabilities::detect().with_overrides(&config.capabilities);
    let terminal = ratatui::init();
    let result = App::new(config, source).run(terminal);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    view: View,
    theme: Theme,
    /// Capability readings used for every (re)mount.
    source: HostCapabilities,
    /// Live reduced motion preference, toggled from the keyboard.
    reduced_motion: bool,
    motion_changes: Broadcast<bool>,
    backdrop: BackdropState,
    viewport: Viewport,
    resize_debounce: Debounce<Viewport>,
    key_throttle: Throttle,
    started: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config, source: HostCapabilities) -> Self {
        let reduced_motion = source.reduced_motion().available().unwrap_or(false);
        Self {
            running: false,
            view: View::default(),
            theme: config.theme,
            config,
            source,
            reduced_motion,
            motion_changes: Broadcast::new(),
            backdrop: BackdropState::new(),
            viewport: Viewport::default(),
            resize_debounce: Debounce::new(RESIZE_DEBOUNCE),
            key_throttle: Throttle::new(KEY_THROTTLE),
            started: Instant::now(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let size = terminal.size()?;
        self.mount(Viewport::new(size.width, size.height));

        let period = self.config.frame_period();
        let mut next_frame = Instant::now();
        while self.running {
            let now = Instant::now();
            if let Some(viewport) = self.resize_debounce.poll(now) {
                self.apply_resize(viewport);
            }
            if now >= next_frame {
                self.backdrop.tick(self.elapsed_ms(now));
                terminal.draw(|frame| self.render(frame))?;
                next_frame = now + period;
            }
            self.handle_crossterm_events(self.poll_timeout(next_frame))?;
        }

        self.backdrop.unmount();
        info!("backdrop stopped");
        Ok(())
    }

    fn layers(&self) -> Layers {
        Layers {
            rain: self.config.rain,
            shapes: self.config.shapes,
            particles: self.config.particles,
        }
    }

    /// Mount every enabled layer at `viewport`.
    fn mount(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let layers = self.layers();
        self.backdrop
            .mount(layers, viewport, &self.source, &self.motion_changes);
    }

    fn remount(&mut self) {
        debug!("remounting backdrop");
        self.mount(self.viewport);
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        debug!(
            cols = viewport.cols,
            rows = viewport.rows,
            "terminal resized"
        );
        self.viewport = viewport;
        self.backdrop.resize(viewport);
    }

    fn elapsed_ms(&self, now: Instant) -> u64 {
        let elapsed = now.duration_since(self.started).as_millis();
        u64::try_from(elapsed).unwrap_or(u64::MAX)
    }

    /// Wait until the next frame or the pending resize, whichever is sooner.
    fn poll_timeout(&self, next_frame: Instant) -> Duration {
        let now = Instant::now();
        let frame_wait = next_frame.saturating_duration_since(now);
        match self.resize_debounce.deadline() {
            Some(deadline) => frame_wait.min(deadline.saturating_duration_since(now)),
            None => frame_wait,
        }
    }

    /// Renders the backdrop and the foreground card.
    fn render(&self, frame: &mut Frame) {
        self.backdrop.render(frame, self.theme);

        let color = Color::from(self.theme.text());
        let accent = Color::from(backdrop_core::color::TEAL);
        let body = self.body_lines();

        let chunks = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(body.len() as u16),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

        let title = Paragraph::new(Line::from(vec![
            "backdrop".bold().fg(accent),
            format!("  {}", self.view.label()).fg(color),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[1]);

        let body = Paragraph::new(body)
            .style(Style::new().fg(color))
            .alignment(Alignment::Center);
        frame.render_widget(body, chunks[3]);

        let help = Line::from(vec![
            "q".bold().fg(accent),
            " quit  ".fg(color),
            "t".bold().fg(accent),
            " theme  ".fg(color),
            "v".bold().fg(accent),
            " view  ".fg(color),
            "m".bold().fg(accent),
            " motion  ".fg(color),
            "r".bold().fg(accent),
            " remount".fg(color),
        ])
        .centered();
        frame.render_widget(help, chunks[5]);
    }

    fn body_lines(&self) -> Vec<Line<'static>> {
        let on_off = |b: bool| if b { "on" } else { "off" };
        match self.view {
            View::Home => {
                let snapshot = self.source.sample().snapshot();
                vec![
                    Line::from(format!("theme {}", self.theme.label().to_lowercase())),
                    Line::from(format!(
                        "low performance {}  reduced motion {}",
                        on_off(snapshot.low_performance),
                        on_off(self.reduced_motion)
                    )),
                ]
            }
            View::Samples => {
                let mounted = self.backdrop.mounted();
                let particles = self.backdrop.particles().map_or(0, |p| p.particles().len());
                let frozen = self.backdrop.shapes().is_some_and(|s| s.reduced_motion());
                vec![
                    Line::from(format!("rain {}", on_off(mounted.rain))),
                    Line::from(format!(
                        "shapes {}{}",
                        on_off(mounted.shapes),
                        if frozen { " (still)" } else { "" }
                    )),
                    Line::from(format!(
                        "particles {} ({particles})",
                        on_off(mounted.particles)
                    )),
                ]
            }
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    self.on_key_event(key, Instant::now())
                }
                Event::Resize(cols, rows) => self
                    .resize_debounce
                    .push(Viewport::new(cols, rows), Instant::now()),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent, now: Instant) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('t')) => self.throttled(now, Self::toggle_theme),
            (_, KeyCode::Char('v')) => self.throttled(now, |app| app.navigate(Nav::Next)),
            (_, KeyCode::Char('m')) => self.throttled(now, Self::toggle_reduced_motion),
            (_, KeyCode::Char('r')) => self.throttled(now, Self::remount),
            _ => {}
        }
    }

    fn throttled(&mut self, now: Instant, action: impl FnOnce(&mut Self)) {
        if self.key_throttle.call(now, || ()).is_some() {
            action(self);
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
    }

    fn navigate(&mut self, nav: Nav) {
        self.view = self.view.navigate(nav);
    }

    /// Flip reduced motion for mounted layers and for later remounts.
    fn toggle_reduced_motion(&mut self) {
        self.reduced_motion = !self.reduced_motion;
        self.source = self.source.with_overrides(&CapabilityOverrides {
            reduced_motion: Some(self.reduced_motion),
            ..CapabilityOverrides::default()
        });
        self.motion_changes.emit(self.reduced_motion);
        info!(
            reduced_motion = self.reduced_motion,
            "motion preference changed"
        );
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::{CapabilitySignals, Hint};

    fn app() -> App {
        let source = HostCapabilities::from_signals(CapabilitySignals {
            logical_cores: Hint::Available(8),
            device_memory_gb: Hint::Available(16.0),
            ..CapabilitySignals::default()
        });
        let mut app = App::new(Config::default(), source);
        app.running = true;
        app.mount(Viewport::new(80, 24));
        app
    }

    fn press(app: &mut App, c: char, at: Instant) {
        app.on_key_event(KeyEvent::from(KeyCode::Char(c)), at);
    }

    #[test]
    fn test_quit_keys() {
        let mut a = app();
        a.on_key_event(KeyEvent::from(KeyCode::Esc), Instant::now());
        assert!(!a.running);

        let mut a = app();
        a.on_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert!(!a.running);
    }

    #[test]
    fn test_toggles_are_throttled() {
        let mut a = app();
        let t0 = Instant::now();
        press(&mut a, 't', t0);
        press(&mut a, 't', t0 + Duration::from_millis(50));
        assert_eq!(a.theme, Theme::Light);

        press(&mut a, 'v', t0 + Duration::from_millis(200));
        assert_eq!(a.view, View::Samples);
        press(&mut a, 't', t0 + Duration::from_millis(400));
        assert_eq!(a.theme, Theme::Dark);
    }

    #[test]
    fn test_reduced_motion_reaches_mounted_shapes() {
        let mut a = app();
        assert!(!a.reduced_motion);
        press(&mut a, 'm', Instant::now());
        a.backdrop.tick(16);
        assert!(a.backdrop.shapes().is_some_and(|s| s.reduced_motion()));
    }

    #[test]
    fn test_remount_keeps_reduced_motion() {
        let mut a = app();
        let t0 = Instant::now();
        press(&mut a, 'm', t0);
        press(&mut a, 'r', t0 + Duration::from_millis(200));
        assert!(a.backdrop.shapes().is_some_and(|s| s.reduced_motion()));
        assert_eq!(a.motion_changes.listeners(), 1);
    }

    #[test]
    fn test_disabled_layer_stays_unmounted() {
        let source = HostCapabilities::default();
        let config = Config {
            rain: false,
            ..Config::default()
        };
        let mut a = App::new(config, source);
        a.mount(Viewport::new(80, 24));
        assert!(!a.backdrop.mounted().rain);
        assert!(a.backdrop.mounted().particles);
    }

    #[test]
    fn test_samples_view_lists_layers() {
        let mut a = app();
        a.navigate(Nav::Samples);
        let text: Vec<String> = a.body_lines().iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "rain on");
        assert_eq!(text[2], "particles on (50)");
    }
}
