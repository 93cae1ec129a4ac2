//! `providers` command

use crate::args::ProvidersArgs;
use providers::{ProviderInfo, Registry};
use std::fmt::Write;
use types::utils::truncate_display;

const NAME_WIDTH: usize = 12;
const ALIASES_WIDTH: usize = 24;
const DESCRIPTION_WIDTH: usize = 60;

pub fn run(args: &ProvidersArgs, registry: &Registry) {
    let listed = select(registry, args.filter.as_deref());
    print!("{}", render(&listed, args.details, args.filter.as_deref()));
}

/// Registered providers matching `filter`, sorted by name
pub fn select(registry: &Registry, filter: Option<&str>) -> Vec<ProviderInfo> {
    let needle = filter.map(|f| f.trim().to_lowercase()).filter(|f| !f.is_empty());
    let mut listed: Vec<ProviderInfo> = registry
        .list_providers()
        .into_iter()
        .filter(|info| needle.as_deref().map_or(true, |n| info.matches_filter(n)))
        .collect();
    listed.sort_by(|a, b| a.name.cmp(&b.name));
    listed
}

pub fn render(listed: &[ProviderInfo], details: bool, filter: Option<&str>) -> String {
    if listed.is_empty() {
        return match filter {
            Some(filter) => format!("No providers match filter '{filter}'\n"),
            None => "No providers registered\n".to_string(),
        };
    }

    let mut out = if details {
        render_details(listed)
    } else {
        render_table(listed)
    };
    let _ = writeln!(out, "\nTotal: {} providers", listed.len());
    out
}

fn render_table(listed: &[ProviderInfo]) -> String {
    let mut out = format!("Available providers ({}):\n\n", listed.len());
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:<ALIASES_WIDTH$} DESCRIPTION",
        "PROVIDER", "ALIASES"
    );
    let _ = writeln!(
        out,
        "{} {} {}",
        "-".repeat(NAME_WIDTH),
        "-".repeat(ALIASES_WIDTH),
        "-".repeat(DESCRIPTION_WIDTH)
    );

    for info in listed {
        let aliases = if info.aliases.is_empty() {
            "-".to_string()
        } else {
            info.aliases.join(", ")
        };
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:<ALIASES_WIDTH$} {}",
            info.name,
            aliases,
            truncate_display(&info.description, DESCRIPTION_WIDTH)
        );
    }
    out
}

fn render_details(listed: &[ProviderInfo]) -> String {
    let mut out = String::from("Available providers (detailed view):\n");

    for info in listed {
        let _ = writeln!(out, "\nProvider: {} (priority: {})", info.name, info.priority);
        if !info.aliases.is_empty() {
            let _ = writeln!(out, "  Aliases: {}", info.aliases.join(", "));
        }
        if !info.description.is_empty() {
            let _ = writeln!(out, "  Description: {}", info.description);
        }
        for (title, items) in [
            ("Supported Sources", &info.supported_sources),
            ("Required Configuration", &info.required_config),
            ("Optional Configuration", &info.optional_config),
        ] {
            if items.is_empty() {
                continue;
            }
            let _ = writeln!(out, "  {title}:");
            for item in items {
                let _ = writeln!(out, "    - {item}");
            }
        }
    }
    out
}
