use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print a step header, e.g. `[Step 3/7] Writing application files...`.
pub fn step(n: usize, total: usize, msg: &str) {
    println!("\n{} {msg}", style(format!("[Step {n}/{total}]")).cyan().bold());
}

/// Print an indented detail line under the current step.
pub fn detail(msg: &str) {
    println!("  {msg}");
}

pub fn warn(msg: &str) {
    println!("  {}", style(msg).yellow());
}

/// Create a spinner with a message.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
