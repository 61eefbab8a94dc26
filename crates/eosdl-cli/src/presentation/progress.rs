//! Terminal progress for downloads.
//!
//! Presentation only: renders [`ProgressSnapshot`]s received from the
//! orchestrator's watch channel. Draws to stderr, and nothing at all when
//! stderr is not a terminal.

use std::io::{self, IsTerminal};
use std::time::Duration;

use eosdl_download::{CancellationToken, ProgressSnapshot};
use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use tokio::sync::watch;

const MAX_LABEL: usize = 40;

/// Single aggregate bar over every task of a run.
pub struct DownloadProgressBar {
    bar: ProgressBar,
    saw_length: bool,
}

impl DownloadProgressBar {
    pub fn new() -> Self {
        let target = if io::stderr().is_terminal() {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            saw_length: false,
        }
    }

    /// Reflect the latest snapshot.
    pub fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_message(label(snapshot));

        if let Some(total) = snapshot.total().filter(|t| *t > 0) {
            if !self.saw_length {
                self.bar.set_style(bar_style());
                self.saw_length = true;
            }
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
            self.bar.set_position(snapshot.downloaded().min(total));
        } else {
            self.bar.set_position(snapshot.downloaded());
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for DownloadProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Render snapshots until `stop` fires or the sender goes away.
pub async fn render(mut rx: watch::Receiver<ProgressSnapshot>, stop: CancellationToken) {
    let mut bar = DownloadProgressBar::new();
    loop {
        bar.update(&rx.borrow_and_update());
        tokio::select! {
            () = stop.cancelled() => break,
            changed = rx.changed() => if changed.is_err() { break },
        }
    }
    bar.finish();
}

fn label(snapshot: &ProgressSnapshot) -> String {
    let count = snapshot.tasks.len();
    let name = match snapshot.tasks.as_slice() {
        [only] => truncate(&only.file_name),
        _ => format!("{count} files"),
    };
    if count > 1 {
        format!("{name} [{}/{count}]", snapshot.finished())
    } else {
        name
    }
}

fn truncate(raw: &str) -> String {
    if raw.chars().count() <= MAX_LABEL {
        return raw.to_string();
    }
    let mut buf: String = raw.chars().take(MAX_LABEL - 1).collect();
    buf.push('…');
    buf
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg} {human_bytes}")
        .map(with_byte_keys)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg} {bar:28.cyan/blue} {human_bytes:>9} / {human_total:>9} ({percent:>3}%) @ {binary_bytes_per_sec} ETA {eta}",
    )
    .map(with_byte_keys)
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn with_byte_keys(style: ProgressStyle) -> ProgressStyle {
    style
        .with_key("human_bytes", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{}", HumanBytes(state.pos()));
        })
        .with_key("human_total", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let value = state
                .len()
                .map_or_else(|| "?".to_string(), |len| HumanBytes(len).to_string());
            let _ = write!(w, "{value}");
        })
}
