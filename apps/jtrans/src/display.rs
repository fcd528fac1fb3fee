//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::Style;
use jtrans_rules::{SelectionRule, SignatureRule};
use jtrans_types::{ActionType, TransformReport};
use std::fmt::Display;
use std::io;

/// Marker printed for an empty rule section
const NONE: &str = "[ ** NONE ** ]";

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render the supported input types
    pub fn render_actions(&self) -> io::Result<()> {
        if self.json_output {
            let actions: Vec<_> = ActionType::ALL
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": t.name(),
                        "description": t.description(),
                        "container": t.is_container(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&actions).map_err(io::Error::other)?
            );
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
            Cell::new("Container").add_attribute(Attribute::Bold),
        ]);
        for action_type in ActionType::ALL {
            table.add_row(vec![
                Cell::new(action_type.name()),
                Cell::new(action_type.description()),
                Cell::new(if action_type.is_container() { "yes" } else { "" }),
            ]);
        }
        println!("{table}");
        Ok(())
    }

    /// Print the effective rules, one section per rule map
    pub fn render_rules(&self, selection: &SelectionRule, signature: &SignatureRule) {
        if self.json_output {
            return;
        }

        print_section("Includes", selection.includes().iter());
        print_section("Excludes", selection.excludes().iter());

        let title = if signature.is_inverted() {
            "Package renames (inverted)"
        } else {
            "Package renames"
        };
        print_section(
            title,
            signature
                .renames()
                .iter()
                .map(|(from, to)| format!("{from} ==> {to}")),
        );
        print_section(
            "Package versions",
            signature
                .versions()
                .iter()
                .map(|(package, version)| format!("{package} ==> {version}")),
        );
        print_section(
            "Bundle updates",
            signature
                .bundles()
                .iter()
                .map(|(key, update)| format!("{key} ==> {}", update.to_rule_value())),
        );
        print_section(
            "Direct strings",
            signature
                .direct()
                .iter()
                .map(|(from, to)| format!("{from} ==> {to}")),
        );
    }

    /// Render the result of a transform
    pub fn render_report(&self, report: &TransformReport) -> io::Result<()> {
        if self.json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(report).map_err(io::Error::other)?
            );
            return Ok(());
        }

        if report.has_changes() {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Entry").add_attribute(Attribute::Bold),
                Cell::new("Change").add_attribute(Attribute::Bold),
            ]);
            for change in &report.changes {
                table.add_row(vec![Cell::new(&change.path), Cell::new(&change.kind)]);
            }
            println!("{table}");
        }

        let destination = report.output.as_ref().map_or_else(
            || "dry run, nothing written".to_string(),
            |output| output.display().to_string(),
        );
        let style = if report.has_changes() {
            Style::new().green().bold()
        } else {
            Style::new().dim()
        };
        println!(
            "{} {} [ {} ] -> [ {} ]: {} changes in {} of {} entries ({} ms)",
            style.apply_to("Transformed"),
            report.action,
            report.input.display(),
            destination,
            report.changes.len(),
            report.entries_changed(),
            report.entries_visited,
            report.duration_ms
        );
        Ok(())
    }
}

fn print_section<I, T>(title: &str, items: I)
where
    I: Iterator<Item = T>,
    T: Display,
{
    println!("{}", Style::new().bold().apply_to(title));
    let mut empty = true;
    for item in items {
        println!("  [ {item} ]");
        empty = false;
    }
    if empty {
        println!("  {NONE}");
    }
}
