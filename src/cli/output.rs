//! Terminal output of the btedit commands
//!
//! Colors follow NO_COLOR, CLICOLOR and CLICOLOR_FORCE. Rendered trees and
//! config dumps stay uncolored so they can be piped into files.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Report a failed command on stderr.
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Report an operation that left the tree unchanged.
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// A new document was written.
pub fn created(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// One structural edit, with the verb right-aligned: `   Moved 3 "Wait" under 1`.
pub fn edited(verb: &str, msg: &(impl Display + ?Sized)) {
    println!("{:>8} {}", verb.green().bold(), msg);
}

/// Bold title line above a block of [`stat`] lines.
pub fn title(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn stat(key: &str, value: &(impl Display + ?Sized)) {
    println!("  {:<7}{}", format!("{key}:"), value);
}

/// Uncolored text block, printed as is.
pub fn raw(text: &(impl Display + ?Sized)) {
    println!("{text}");
}

/// Write a rendered tree to stdout.
///
/// Unlike the other helpers a closed pipe is reported to the caller.
pub fn tree(rendered: &(impl Display + ?Sized)) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "{rendered}")?;
    out.flush()
}
