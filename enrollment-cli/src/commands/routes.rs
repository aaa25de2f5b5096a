//! Implementation of the `enrollment routes` command.

use colored::{ColoredString, Colorize};
use enrollment::api;
use enrollment::prelude::Method;

use super::colors;

/// Prints every registered route in registration order.
pub fn execute() {
    let table = api::routes().route_table();

    println!();
    println!("  {:<8} {}", "METHOD".bold(), "PATH".bold());
    println!(
        "  {}",
        "─".repeat(40).custom_color(colors::subtext())
    );
    for (method, path) in &table {
        println!("  {:<8} {}", paint(method), path.custom_color(colors::sky()));
    }
    println!();
    println!(
        "  {} routes",
        table.len().to_string().custom_color(colors::green())
    );
}

fn paint(method: &Method) -> ColoredString {
    let name = format!("{:<8}", method.as_str());
    let color = if method == Method::GET {
        colors::green()
    } else if method == Method::POST {
        colors::lavender()
    } else if method == Method::DELETE {
        colors::red()
    } else {
        colors::peach()
    };
    name.custom_color(color)
}
