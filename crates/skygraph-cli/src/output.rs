use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use skygraph_lib::analysis::{
    AdjacencyEntry, AdjacencyMatrix, Component, GraphStats, RouteAnalysis,
};
use skygraph_lib::{MstResult, ParetoResult, Route, SearchTrace};

/// Rendering style for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a value either as pretty JSON or through the supplied text renderer.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text()),
    }
    Ok(())
}

pub fn render_route(route: &Route) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{} | ${:.2}, {} min, {:.2} km, {} stop(s)",
        route.path.join(" -> "),
        route.total_price_usd,
        route.total_duration_min,
        route.total_distance_km,
        route.stops
    );
    for leg in &route.legs {
        let _ = writeln!(
            buffer,
            "  {} {} {} -> {} (${:.2}, {} min)",
            leg.airline, leg.flight_no, leg.from, leg.to, leg.price_usd, leg.duration_min
        );
    }
    buffer
}

pub fn render_no_route(source: &str, dest: &str) -> String {
    format!("No route found between {source} and {dest}\n")
}

pub fn render_route_list(routes: &[Route]) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{} route(s) found", routes.len());
    for route in routes {
        buffer.push_str(&render_route(route));
    }
    buffer
}

pub fn render_pareto(result: &ParetoResult) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{} Pareto-optimal route(s) out of {} candidate(s)",
        result.pareto_count, result.total_candidates
    );
    for route in &result.pareto_routes {
        buffer.push_str(&render_route(route));
    }
    buffer
}

pub fn render_mst(result: &MstResult) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "MST ({}): {} edge(s) over {} airport(s), total weight {:.2}, spanning: {}, {} state(s) recorded",
        result.algorithm,
        result.mst_edges.len(),
        result.airports.len(),
        result.total_weight(),
        result.is_spanning(),
        result.states.len()
    );
    for edge in &result.mst_edges {
        let _ = writeln!(buffer, "  {} -- {} (${:.2})", edge.a, edge.b, edge.weight);
    }
    buffer
}

pub fn render_trace(trace: &SearchTrace) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{} state(s) recorded", trace.states.len());
    match &trace.route {
        Some(route) => buffer.push_str(&render_route(route)),
        None => {
            let _ = writeln!(buffer, "No route concluded");
        }
    }
    buffer
}

pub fn render_stats(stats: &GraphStats) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{} airport(s), {} flight leg(s), density {}",
        stats.vertices, stats.edges, stats.density
    );
    for (code, degrees) in &stats.degrees {
        let _ = writeln!(
            buffer,
            "  {code}: in {}, out {}",
            degrees.in_degree, degrees.out_degree
        );
    }
    buffer
}

pub fn render_components(components: &[Component]) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{} component(s)", components.len());
    for (index, component) in components.iter().enumerate() {
        let _ = writeln!(
            buffer,
            "  {}: {} ({} airport(s))",
            index + 1,
            component.members.join(", "),
            component.size
        );
    }
    buffer
}

pub fn render_adjacency(list: &BTreeMap<String, Vec<AdjacencyEntry>>) -> String {
    let mut buffer = String::new();
    for (code, entries) in list {
        let _ = writeln!(buffer, "{code}:");
        for entry in entries {
            let _ = writeln!(
                buffer,
                "  -> {} ({}, ${:.2}, {} min)",
                entry.to, entry.flight_no, entry.price_usd, entry.duration_min
            );
        }
    }
    buffer
}

pub fn render_matrix(view: &AdjacencyMatrix) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", view.airports.join(" "));
    for (code, row) in view.airports.iter().zip(&view.matrix) {
        let cells: Vec<String> = row.iter().map(|price| format!("{price:.0}")).collect();
        let _ = writeln!(buffer, "{code}: {}", cells.join(" "));
    }
    buffer
}

pub fn render_analysis(analysis: &RouteAnalysis) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{} -> {}: {} airport(s), {} leg(s), local density {}",
        analysis.source,
        analysis.dest,
        analysis.subgraph.vertices_count,
        analysis.subgraph.edges_count,
        analysis.local_density
    );
    let _ = writeln!(
        buffer,
        "path options: {} direct, {} one-stop, {} two-stop",
        analysis.path_options.direct, analysis.path_options.one_stop, analysis.path_options.two_stop
    );
    let _ = writeln!(
        buffer,
        "source out-degree {}, dest in-degree {}, connected: {}",
        analysis.source_out_degree, analysis.dest_in_degree, analysis.connected
    );
    buffer
}
