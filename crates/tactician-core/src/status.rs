//! Live status board
//!
//! One line per account, re-rendered in place on every change. Lines keep
//! the order in which their keys were first seen. Messages printed through
//! the board appear above the block without tearing it.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Width of the bar drawn by [`progress_bar`], excluding brackets
pub const PROGRESS_BAR_WIDTH: usize = 20;

const CURSOR_UP_CLEAR_LINE: &str = "\x1b[1A\x1b[2K";

struct Inner {
    lines: HashMap<String, String>,
    order: Vec<String>,
    /// Lines currently drawn on the terminal
    rendered: usize,
    writer: Box<dyn Write + Send>,
}

impl Inner {
    fn erase(&mut self) {
        for _ in 0..self.rendered {
            let _ = self.writer.write_all(CURSOR_UP_CLEAR_LINE.as_bytes());
        }
        let _ = self.writer.write_all(b"\r");
        self.rendered = 0;
    }

    fn draw(&mut self) {
        for key in &self.order {
            if let Some(line) = self.lines.get(key) {
                let _ = writeln!(self.writer, "{}", line);
            }
        }
        self.rendered = self.order.len();
        let _ = self.writer.flush();
    }

    fn redraw(&mut self) {
        self.erase();
        self.draw();
    }
}

/// Shared multi-line status display
pub struct StatusBoard {
    inner: Mutex<Inner>,
}

impl StatusBoard {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lines: HashMap::new(),
                order: Vec::new(),
                rendered: 0,
                writer: Box::new(writer),
            }),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Board that tracks lines without drawing them
    pub fn hidden() -> Self {
        Self::new(io::sink())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add or replace the line under `key`
    pub fn set_line(&self, key: &str, line: impl Into<String>) {
        let mut inner = self.lock();
        if inner.lines.insert(key.to_string(), line.into()).is_none() {
            inner.order.push(key.to_string());
        }
        inner.redraw();
    }

    pub fn remove_line(&self, key: &str) {
        let mut inner = self.lock();
        if inner.lines.remove(key).is_some() {
            inner.order.retain(|k| k != key);
        }
        inner.redraw();
    }

    /// Print a permanent message above the live block
    pub fn print(&self, message: impl fmt::Display) {
        let mut inner = self.lock();
        inner.erase();
        let _ = writeln!(inner.writer, "{}", message);
        inner.draw();
    }

    /// Erase the live block and forget every line
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.erase();
        inner.lines.clear();
        inner.order.clear();
        let _ = inner.writer.flush();
    }

    /// Snapshot of the current lines in display order
    pub fn lines(&self) -> Vec<(String, String)> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|k| inner.lines.get(k).map(|l| (k.clone(), l.clone())))
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().order.clone()
    }
}

impl fmt::Debug for StatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBoard")
            .field("keys", &self.keys())
            .finish()
    }
}

/// `[#####               ]`, filled in proportion to `current / target`
pub fn progress_bar(current: i64, target: i64) -> String {
    let filled = if target <= 0 {
        0
    } else {
        let ratio = current.clamp(0, target) as f64 / target as f64;
        (ratio * PROGRESS_BAR_WIDTH as f64).round() as usize
    };
    format!(
        "[{}{}]",
        "#".repeat(filled),
        " ".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
