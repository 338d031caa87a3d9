use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};

use playbook_metrics::app::{App, InputMode, StatusLevel};
use playbook_metrics::domain::{format_target, Playbook};
use playbook_metrics::editor::PendingPolicy;
use playbook_metrics::store::PlaybookFile;
use playbook_metrics::{config, logging, ui};

#[derive(Debug, Parser)]
#[command(
    name = "pbmetrics",
    version,
    about = "Edit the metrics tracked by an incident playbook"
)]
struct Args {
    /// Playbook JSON file (created on first save)
    playbook: PathBuf,

    /// Print the metrics and exit
    #[arg(long)]
    list: bool,

    /// What happens to a request made while another one is queued
    #[arg(long, value_parser = parse_policy)]
    policy: Option<PendingPolicy>,
}

fn parse_policy(value: &str) -> std::result::Result<PendingPolicy, String> {
    PendingPolicy::parse(value).ok_or_else(|| format!("expected replace or reject, got {value}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load()?;
    let _log_guard = logging::init(&config.log_dir(), config.log_level())?;

    let store = PlaybookFile::new(&args.playbook);
    let playbook = store
        .load()
        .with_context(|| format!("open playbook {}", args.playbook.display()))?;

    if args.list {
        print_metrics(&playbook);
        return Ok(());
    }

    let policy = args.policy.unwrap_or(config.pending_policy);
    info!(?policy, path = %args.playbook.display(), "starting editor");
    let mut app = App::new(playbook, policy)
        .with_store(store)
        .with_export_dir(config.export_dir());
    app.set_status("? for help", StatusLevel::Info);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %format!("{err:#}"), "editor loop failed");
        eprintln!("{err:?}");
    }

    Ok(())
}

fn print_metrics(playbook: &Playbook) {
    println!("{}", playbook.title);
    if playbook.metrics.is_empty() {
        println!("  (no metrics)");
        return;
    }
    for (i, metric) in playbook.metrics.iter().enumerate() {
        let target = if metric.target == 0 {
            "-".to_string()
        } else {
            format_target(metric.target, metric.metric_type)
        };
        println!(
            "{:>2}. {:<32} {:<9} {}",
            i + 1,
            metric.title,
            metric.metric_type.as_str(),
            target
        );
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        app.sync_context();
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            info!("editor closed");
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    if app.is_confirming() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return;
    }

    if app.add_menu.is_some() {
        app.handle_add_menu_key(key);
        return;
    }

    if app.input_mode == InputMode::Command {
        handle_command_mode(app, key);
        return;
    }

    if app.is_editing() {
        handle_form_mode(app, key);
        return;
    }

    handle_normal_mode(app, key);
}

/// Keys while a row is open. Control chords act on the list, the rest edit
/// the form.
fn handle_form_mode(app: &mut App, key: KeyEvent) {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        app.handle_form_key(key);
        return;
    }
    match key.code {
        KeyCode::Char('a') => app.open_add_menu(),
        KeyCode::Char('e') => app.request_edit(app.selected),
        KeyCode::Char('d') => app.request_delete(app.selected),
        KeyCode::Char('n') => app.move_selection_down(),
        KeyCode::Char('p') => app.move_selection_up(),
        KeyCode::Char('w') => app.write_playbook(),
        KeyCode::Char('c') => app.request_quit(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.request_quit(),
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Char('a') => app.open_add_menu(),
        KeyCode::Char('e') | KeyCode::Enter => {
            if !app.editor.is_empty() {
                app.request_edit(app.selected);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if !app.editor.is_empty() {
                app.request_delete(app.selected);
            }
        }
        KeyCode::Char('w') => app.write_playbook(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Up => app.recall_last_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}
