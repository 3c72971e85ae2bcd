//! CLI output: error mapping and text rendering.

use crate::error::LdpError;
use crate::rdf::GraphName;
use crate::resource::Resource;
use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &LdpError) -> String {
    match e {
        LdpError::ConstraintViolations(_) => {
            format!("{} (constrained by: {})", e, e.constrained_by().join(", "))
        }
        _ => e.to_string(),
    }
}

/// Resource header followed by its quads as N-Triples, one block per graph.
pub fn format_dataset(resource: &Resource) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n", resource.identifier));
    out.push_str(&format!("# interaction model: {}\n", resource.interaction_model.iri()));
    out.push_str(&format!(
        "# modified: {}\n",
        resource.modified.to_rfc3339_opts(SecondsFormat::Nanos, true)
    ));
    if let Some(binary) = &resource.binary {
        out.push_str(&format!(
            "# binary: {} ({} bytes, {})\n",
            binary.location,
            binary.size,
            binary.mime_type.as_deref().unwrap_or("application/octet-stream")
        ));
    }

    for name in resource.dataset.graph_names() {
        let Some(graph) = resource.dataset.graph(name) else {
            continue;
        };
        match name {
            GraphName::Default => out.push_str("\n# default graph\n"),
            GraphName::Named(iri) => out.push_str(&format!("\n# graph <{}>\n", iri)),
        }
        for triple in graph {
            out.push_str(&format!("{}\n", triple));
        }
    }
    out
}

/// Memento timestamps as a table, oldest first.
pub fn format_versions(id: &str, times: &[DateTime<Utc>]) -> String {
    if times.is_empty() {
        return format!("No mementos recorded for {}", id);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Memento"]);
    for (idx, time) in times.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            time.to_rfc3339_opts(SecondsFormat::Nanos, true),
        ]);
    }
    format!("Mementos for {}\n\n{}", id, table)
}
