mod app;
mod components;

use std::io;
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use keywarden_service::BlockingHttpService;
use ratatui::prelude::*;

use app::App;

const DEFAULT_PORT: u16 = 3711;
const DEFAULT_URL: &str = "http://127.0.0.1:3711";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Parse CLI: keywarden [--server URL]
    // No args → spawn keywarden-server locally then run the TUI
    // --server URL → connect to an existing server
    let (server_url, mut child) = if let Some(pos) = args.iter().position(|a| a == "--server") {
        let url = args
            .get(pos + 1)
            .context("--server requires a URL argument")?;
        (url.clone(), None)
    } else {
        let child = spawn_server()?;
        (DEFAULT_URL.to_string(), Some(child))
    };

    let service = BlockingHttpService::new(&server_url);
    wait_for_server(&service)?;

    let result = run_tui(service);

    // Cleanup: kill the server if we spawned it
    if let Some(ref mut child) = child {
        let _ = child.kill();
        let _ = child.wait();
    }

    result
}

fn spawn_server() -> Result<Child> {
    // Look for keywarden-server next to our own binary first,
    // then fall back to PATH
    let self_exe = std::env::current_exe().unwrap_or_default();
    let sibling = self_exe.parent().map(|d| d.join("keywarden-server"));

    let server_bin = if sibling.as_ref().is_some_and(|p| p.exists()) {
        sibling.unwrap()
    } else {
        "keywarden-server".into()
    };

    let child = Command::new(&server_bin)
        .env("KEYWARDEN_BIND", "127.0.0.1")
        .env("KEYWARDEN_PORT", DEFAULT_PORT.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {}", server_bin.display()))?;

    Ok(child)
}

fn wait_for_server(service: &BlockingHttpService) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(10);

    loop {
        if service.health_check().is_ok() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            bail!(
                "keywarden-server did not become ready within {}s",
                timeout.as_secs()
            );
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn run_tui(service: BlockingHttpService) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: BlockingHttpService,
) -> Result<()> {
    let mut app = App::new(service)?;

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
