//! Terminal output for search results, tags and the tree outline

use crate::query::{MatchedItem, RatioResult};
use crate::tree::Label;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print grouped matches followed by the ratio summary
pub fn print_results(result: &RatioResult, show_numbers: bool, color: bool) -> io::Result<()> {
    write_results(&mut stdout(color), result, show_numbers)
}

/// Print tags, one per line
pub fn print_tags(tags: &[String], color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    for tag in tags {
        if tag.starts_with('#') {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            writeln!(out, "{}", tag)?;
            out.reset()?;
        } else {
            writeln!(out, "{}", tag)?;
        }
    }
    Ok(())
}

/// Print the tree outline
pub fn print_map(outline: &str) -> io::Result<()> {
    let mut out = stdout(false);
    writeln!(out, "{}", outline)
}

pub fn write_results<W: WriteColor>(
    out: &mut W,
    result: &RatioResult,
    show_numbers: bool,
) -> io::Result<()> {
    let search = &result.result;

    for (i, family) in search.families.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        write_family_heading(out, family, &search.aliases)?;

        for item in search.matches.get(family).into_iter().flatten() {
            write_item(out, item, show_numbers)?;
        }
    }

    if !search.families.is_empty() {
        writeln!(out)?;
    }

    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{}", search.nb_matches)?;
    out.reset()?;
    write!(out, " of {} items", result.nb_total)?;
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(out, " ({:.2}%)", result.ratio)?;
    out.reset()?;

    Ok(())
}

/// Family path, then its alias breadcrumb when it differs
fn write_family_heading<W: WriteColor>(
    out: &mut W,
    family: &str,
    aliases: &std::collections::BTreeMap<String, String>,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    write!(out, "{}", if family.is_empty() { "/" } else { family })?;
    out.reset()?;

    let mut prefix = String::new();
    let mut breadcrumb = Vec::new();
    for segment in family.split('/').filter(|s| !s.is_empty()) {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(segment);
        breadcrumb.push(aliases.get(&prefix).map(String::as_str).unwrap_or(segment));
    }

    let breadcrumb = breadcrumb.join(" > ");
    if !breadcrumb.is_empty() && breadcrumb.replace(" > ", "/") != family {
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(out, "  {}", breadcrumb)?;
        out.reset()?;
    }
    writeln!(out)
}

fn write_item<W: WriteColor>(out: &mut W, item: &MatchedItem, show_numbers: bool) -> io::Result<()> {
    write!(out, "  ")?;
    if show_numbers && let Some(id) = item.id {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:>3}: ", id)?;
        out.reset()?;
    }
    write!(out, "{}", item.title)?;

    for label in &item.labels {
        write!(out, " ")?;
        write_label(out, label)?;
    }
    writeln!(out)
}

fn write_label<W: WriteColor>(out: &mut W, label: &Label) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_bg(parse_color(&label.color))
        .set_fg(parse_color(&label.text_color));
    out.set_color(&spec)?;
    write!(out, "[{}]", label.text)?;
    out.reset()
}

/// `#rrggbb` or a basic color name
fn parse_color(color: &str) -> Option<Color> {
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    color.parse().ok()
}
