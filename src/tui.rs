use std::io::{Stdout, stdout};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use crossterm::{
    ExecutableCommand,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use log::{debug, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// 是否已要求終端機回報修飾鍵（例如 Shift+Enter），還原時需要撤銷。
static KEYBOARD_ENHANCED: AtomicBool = AtomicBool::new(false);

pub fn init() -> Result<Tui> {
    stdout()
        .execute(EnterAlternateScreen)
        .context("無法進入替代畫面")?;
    enable_raw_mode().context("無法啟用 raw mode")?;
    enable_keyboard_enhancement();
    Terminal::new(CrosstermBackend::new(stdout())).context("無法建立終端機")
}

fn enable_keyboard_enhancement() {
    match supports_keyboard_enhancement() {
        Ok(true) => {
            let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES;
            match stdout().execute(PushKeyboardEnhancementFlags(flags)) {
                Ok(_) => {
                    KEYBOARD_ENHANCED.store(true, Ordering::SeqCst);
                    debug!("Keyboard enhancement enabled");
                }
                Err(err) => warn!("Failed to enable keyboard enhancement: {}", err),
            }
        }
        Ok(false) => debug!("Terminal does not report key modifiers; use Alt+Enter or Ctrl+J for newlines"),
        Err(err) => warn!("Cannot query keyboard enhancement support: {}", err),
    }
}

pub fn restore() -> Result<()> {
    if KEYBOARD_ENHANCED.swap(false, Ordering::SeqCst) {
        stdout()
            .execute(PopKeyboardEnhancementFlags)
            .context("無法還原鍵盤模式")?;
    }
    stdout()
        .execute(LeaveAlternateScreen)
        .context("無法離開替代畫面")?;
    disable_raw_mode().context("無法停用 raw mode")?;
    Ok(())
}

/// Restores the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        default_hook(info);
    }));
}
