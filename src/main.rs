use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bureau::app::App;
use bureau::config::Settings;
use bureau::event::Event;
use bureau::{logging, tui, ui};
use crossterm::event::EventStream;
use futures_util::StreamExt;
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let workspace_root = match env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => env::current_dir().context("無法取得目前目錄")?,
    };
    let settings = Settings::load(&workspace_root)?;
    logging::init(&workspace_root, &settings.logging)?;
    info!("Starting bureau in {}", workspace_root.display());

    let mut app = App::new(workspace_root, settings)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;
    if let Err(err) = &result {
        error!("Bureau stopped with an error: {:#}", err);
    }
    info!("Bureau exited");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut stream = EventStream::new();
    let mut interval = tokio::time::interval(app.tick_rate());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        let event = tokio::select! {
            _ = interval.tick() => Event::Tick,
            maybe_event = stream.next() => {
                match maybe_event {
                    Some(Ok(event)) => match Event::from_terminal(event) {
                        Some(event) => event,
                        None => continue,
                    },
                    Some(Err(err)) => return Err(err).context("讀取終端機事件失敗"),
                    None => break,
                }
            }
        };

        match event {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.handle_key(key),
            Event::Resize => {}
        }
    }
    Ok(())
}
