use chrono::{DateTime, Local, Utc};
use clawiq_protocol::prelude::*;
use clawiq_query::filters::{agent_from_session, simplify_status};
use clawiq_query::PageInfo;
use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
}

fn paint(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Plain => text.normal(),
        Tone::Dim => text.dimmed(),
        Tone::Red => text.red(),
        Tone::Green => text.green(),
        Tone::Yellow => text.yellow(),
        Tone::Blue => text.blue(),
        Tone::Cyan => text.cyan(),
    }
}

/// Column-aligned table. Widths are measured on the plain text so colour
/// codes do not skew the layout.
struct Table {
    head: Vec<&'static str>,
    rows: Vec<Vec<(String, Tone)>>,
}

impl Table {
    fn new(head: Vec<&'static str>) -> Self {
        Self {
            head,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<(String, Tone)>) {
        self.rows.push(row);
    }

    fn print(&self) {
        let mut widths: Vec<usize> = self.head.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, (text, _)) in widths.iter_mut().zip(row) {
                *width = (*width).max(text.chars().count());
            }
        }

        let header: Vec<String> = self
            .head
            .iter()
            .zip(&widths)
            .map(|(head, width)| format!("{}", paint(&pad(head, *width), Tone::Dim)))
            .collect();
        println!("{}", header.join("  ").trim_end());

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|((text, tone), width)| format!("{}", paint(&pad(text, *width), *tone)))
                .collect();
            println!("{}", cells.join("  ").trim_end());
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn local_time(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn local_datetime(instant: &DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn status_tone(status: &str) -> Tone {
    if status == "error" {
        Tone::Red
    } else {
        Tone::Green
    }
}

fn severity_tone(severity: &str) -> Tone {
    match severity {
        "error" => Tone::Red,
        "warn" => Tone::Yellow,
        _ => Tone::Blue,
    }
}

fn type_icon(event_type: &str) -> &'static str {
    match event_type {
        "task" => "📋",
        "correction" => "✏️",
        "feedback" => "💬",
        "error" => "❌",
        "handoff" => "🤝",
        "decision" => "⚖️",
        "milestone" => "🏁",
        _ => "•",
    }
}

fn record_agent(agent_id: Option<&str>, session_id: Option<&str>) -> String {
    match (agent_id.filter(|a| !a.is_empty()), session_id) {
        (Some(agent), _) => agent.to_string(),
        (None, Some(session)) => agent_from_session(session).to_string(),
        (None, None) => "-".to_string(),
    }
}

pub fn print_empty(label: &str) {
    println!("{}", format!("No {label} found").dimmed());
}

pub fn print_traces(traces: &[TraceRecord], compact: bool) {
    if compact {
        for trace in traces {
            let status = simplify_status(&trace.status);
            println!(
                "{} {} {} {} {}",
                local_time(&trace.start_time).dimmed(),
                paint(status, status_tone(status)),
                trace.trace_id,
                or_dash(&trace.model).cyan(),
                or_dash(&trace.channel).dimmed()
            );
        }
        return;
    }

    let mut table = Table::new(vec![
        "Time", "Status", "Trace", "Agent", "Channel", "Model", "Tokens", "Duration",
    ]);
    for trace in traces {
        let status = simplify_status(&trace.status);
        table.push(vec![
            (local_datetime(&trace.start_time), Tone::Dim),
            (status.to_string(), status_tone(status)),
            (trace.trace_id.clone(), Tone::Plain),
            (
                record_agent(trace.agent_id.as_deref(), trace.session_id.as_deref()),
                Tone::Plain,
            ),
            (or_dash(&trace.channel).to_string(), Tone::Plain),
            (or_dash(&trace.model).to_string(), Tone::Plain),
            (
                (trace.tokens_input + trace.tokens_output).to_string(),
                Tone::Plain,
            ),
            (format!("{}ms", trace.duration_ms.round()), Tone::Plain),
        ]);
    }
    table.print();
}

pub fn print_errors(errors: &[ErrorRecord], compact: bool) {
    if compact {
        for error in errors {
            println!(
                "{} {} {} {}",
                local_time(&error.timestamp).dimmed(),
                error.error_type.red(),
                error.trace_id,
                or_dash(&error.channel).dimmed()
            );
        }
        return;
    }

    let mut table = Table::new(vec!["Time", "Type", "Trace", "Agent", "Channel", "Message"]);
    for error in errors {
        table.push(vec![
            (local_datetime(&error.timestamp), Tone::Dim),
            (error.error_type.clone(), Tone::Red),
            (error.trace_id.clone(), Tone::Plain),
            (
                record_agent(error.agent_id.as_deref(), error.session_id.as_deref()),
                Tone::Plain,
            ),
            (or_dash(&error.channel).to_string(), Tone::Plain),
            (or_dash(&error.message).to_string(), Tone::Plain),
        ]);
    }
    table.print();
}

pub fn print_span_events(events: &[SpanEvent], compact: bool) {
    if compact {
        for event in events {
            let status = simplify_status(&event.status_code);
            let agent = record_agent(Some(&event.agent_id), Some(&event.session_id));
            println!(
                "{} {} {} {} {}",
                local_time(&event.start_time).dimmed(),
                paint(status, status_tone(status)),
                event.name.cyan(),
                agent.dimmed(),
                or_dash(&event.channel).dimmed()
            );
        }
        return;
    }

    let mut table = Table::new(vec![
        "Time", "Status", "Name", "Agent", "Channel", "Model", "Outcome", "Duration",
    ]);
    for event in events {
        let status = simplify_status(&event.status_code);
        table.push(vec![
            (local_datetime(&event.start_time), Tone::Dim),
            (status.to_string(), status_tone(status)),
            (event.name.clone(), Tone::Cyan),
            (
                record_agent(Some(&event.agent_id), Some(&event.session_id)),
                Tone::Plain,
            ),
            (or_dash(&event.channel).to_string(), Tone::Plain),
            (or_dash(&event.model).to_string(), Tone::Plain),
            (or_dash(&event.outcome).to_string(), Tone::Plain),
            (format!("{}ms", event.duration_ms.round()), Tone::Plain),
        ]);
    }
    table.print();
}

pub fn print_semantic_events(events: &[SemanticEvent], compact: bool) {
    if compact {
        for event in events {
            let agent = event
                .agent_id
                .as_deref()
                .map(|agent| format!(" ({agent})").dimmed().to_string())
                .unwrap_or_default();
            println!(
                "{} {} {} {}{}",
                local_time(&event.timestamp).dimmed(),
                type_icon(&event.event_type),
                paint(&event.severity, severity_tone(&event.severity)),
                event.name.cyan(),
                agent
            );
        }
        return;
    }

    let mut table = Table::new(vec!["Time", "Type", "Name", "Severity", "Agent", "Channel"]);
    for event in events {
        table.push(vec![
            (local_datetime(&event.timestamp), Tone::Dim),
            (
                format!("{} {}", type_icon(&event.event_type), event.event_type),
                Tone::Plain,
            ),
            (event.name.clone(), Tone::Cyan),
            (event.severity.clone(), severity_tone(&event.severity)),
            (
                event.agent_id.clone().unwrap_or_else(|| "-".into()),
                Tone::Plain,
            ),
            (
                event.channel.clone().unwrap_or_else(|| "-".into()),
                Tone::Plain,
            ),
        ]);
    }
    table.print();
}

pub fn print_markers(markers: &[Marker], compact: bool) {
    if compact {
        for marker in markers {
            println!(
                "{} {} {}:{} x{}",
                local_time(&marker.timestamp).dimmed(),
                paint(&marker.severity, severity_tone(&marker.severity)),
                marker.event_type,
                marker.name.cyan(),
                marker.count
            );
        }
        return;
    }

    let mut table = Table::new(vec!["Time", "Type", "Name", "Severity", "Count"]);
    for marker in markers {
        table.push(vec![
            (local_datetime(&marker.timestamp), Tone::Dim),
            (marker.event_type.clone(), Tone::Plain),
            (marker.name.clone(), Tone::Cyan),
            (marker.severity.clone(), severity_tone(&marker.severity)),
            (marker.count.to_string(), Tone::Plain),
        ]);
    }
    table.print();
}

fn kind_tone(kind: TimelineKind) -> Tone {
    match kind {
        TimelineKind::Error => Tone::Red,
        TimelineKind::Marker => Tone::Yellow,
        TimelineKind::Trace => Tone::Blue,
    }
}

pub fn print_timeline(items: &[TimelineItem], compact: bool) {
    if compact {
        for item in items {
            println!(
                "{} {} {} {}",
                local_time(&item.timestamp).dimmed(),
                paint(item.kind.as_str(), kind_tone(item.kind)),
                item.summary,
                item.channel.as_deref().map(or_dash).unwrap_or("-").dimmed()
            );
        }
        return;
    }

    let mut table = Table::new(vec![
        "Time", "Kind", "Summary", "Agent", "Channel", "Model", "Trace",
    ]);
    for item in items {
        let cell = |value: &Option<String>| {
            (
                value.as_deref().map(or_dash).unwrap_or("-").to_string(),
                Tone::Plain,
            )
        };
        table.push(vec![
            (local_datetime(&item.timestamp), Tone::Dim),
            (item.kind.as_str().to_string(), kind_tone(item.kind)),
            (item.summary.clone(), Tone::Plain),
            cell(&item.agent),
            cell(&item.channel),
            cell(&item.model),
            cell(&item.trace_id),
        ]);
    }
    table.print();
}

/// Lines printed under a page of results.
pub fn pagination_footer(label: &str, count: usize, page: &PageInfo, total: Total) -> Vec<String> {
    let position = format!(
        "(page {}, limit {}, offset {})",
        page.page, page.limit, page.offset
    );
    let next = format!("Next page: --offset {}", page.next_offset());

    match total.exact() {
        Some(total) => {
            let mut lines = vec![format!("Showing {count} of {total} {label} {position}")];
            if ((page.offset + count) as u64) < total {
                lines.push(next);
            }
            lines
        }
        None => {
            let mut lines = vec![format!("Showing {count} {label} {position}")];
            if count == page.limit {
                lines.push(next);
            }
            lines
        }
    }
}

pub fn print_pagination_footer(label: &str, count: usize, page: &PageInfo, total: Total) {
    println!();
    for line in pagination_footer(label, count, page, total) {
        println!("{}", line.dimmed());
    }
}
