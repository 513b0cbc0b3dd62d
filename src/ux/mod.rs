use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::render::PreviewPaths;
use crate::session::{Generated, Session};

pub fn submit_label(reset: bool) -> &'static str {
    if reset {
        "Generate page"
    } else {
        "Ask AI to modify the generated page"
    }
}

pub fn toggle_label(show_code: bool) -> &'static str {
    if show_code {
        "Hide code and explanations"
    } else {
        "Show code and explanations"
    }
}

pub fn banner() {
    println!("{}", "vibe_pagegen".bold());
    println!("Describe the web page you want. Finish with a line containing only '.'");
    println!("Type {} for commands.\n", ":help".cyan());
}

pub fn print_help() {
    println!("\n{}", "Commands".bold());
    println!("  {}        submit the text typed so far", ".".cyan());
    println!("  {}  start a new page from the text (always resets)", ":generate".cyan());
    println!("  {}    ask for changes to the current page", ":modify".cyan());
    println!("  {}    show or hide code and explanations", ":toggle".cyan());
    println!("  {}  reset checkbox (start over on next submit)", ":reset [on|off]".cyan());
    println!("  {}    session summary", ":status".cyan());
    println!("  {}      open the preview in a browser", ":open".cyan());
    println!("  {}     discard the text typed so far", ":clear".cyan());
    println!("  {}      leave", ":quit".cyan());
    println!();
}

/// Shown before reading input so the user knows what submitting will do.
pub fn print_prompt(session: &Session, reset_checkbox: bool) {
    let reset = session.should_reset(reset_checkbox);
    let mut line = format!("[{}]", submit_label(reset)).green().to_string();
    if session.has_generated() {
        let checkbox = if reset_checkbox { "[x] Reset" } else { "[ ] Reset" };
        let toggle = format!(":toggle = {}", toggle_label(session.show_code));
        line.push_str(&format!("  {}  {}", checkbox.dimmed(), toggle.dimmed()));
    }
    println!("{}", line);
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn continuation() {
    print!(". ");
    let _ = io::stdout().flush();
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn print_notice(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn print_generated(g: &Generated, paths: &PreviewPaths) {
    let what = if g.reset { "[CREATED]".green().bold() } else { "[UPDATED]".yellow().bold() };
    let lang = if g.language.is_empty() { "untagged" } else { g.language.as_str() };
    println!("\n{} {} ({} block, {} bytes)", what, "Generated website".bold(), lang, g.bytes);
    println!("  page:    {}", paths.page.display());
    println!("  preview: {}", paths.preview.display());
    println!();
}

/// Print the raw reply, colouring fenced code so it stands out from the prose.
pub fn print_explanation(output: &str) {
    println!("\n{}", "Code and explanations".bold());
    let mut in_fence = false;
    for line in output.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            println!("{}", line.dimmed());
        } else if in_fence {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
    println!();
}

pub fn print_status(session: &Session, reset_checkbox: bool, paths: Option<&PreviewPaths>) {
    println!("\n{}", "Session".bold());
    println!("  messages:   {}", session.messages.len());
    println!("  phase:      {:?}", session.phase());
    let code = match &session.code {
        Some(c) => format!("{} bytes", c.len()),
        None => "none".to_string(),
    };
    println!("  code:       {}", code);
    println!("  show code:  {}", session.show_code);
    println!("  reset box:  {}", reset_checkbox);
    if let Some(p) = paths {
        println!("  preview:    {}", p.preview.display());
    }
    println!();
}
