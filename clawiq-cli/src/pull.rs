use clap::{Args, Subcommand};
use clawiq_core::serde_utils::to_pretty_json;
use clawiq_core::ClientConfig;
use clawiq_protocol::prelude::*;
use clawiq_query::{
    compute_page_info, fetch_error_records, fetch_markers, fetch_semantic_events,
    fetch_span_events, fetch_trace_records, merge_timeline, resolve_time_range, ErrorFilters,
    PageInfo, PageRequest, SemanticFilters, SpanEventFilters, TelemetryClient, TimeRange,
    TimelineFilters, TraceFilters, DEFAULT_PAGE_LIMIT, DEFAULT_SINCE,
};
use colored::*;
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::render::{
    print_empty, print_errors, print_markers, print_pagination_footer, print_semantic_events,
    print_span_events, print_timeline, print_traces,
};

#[derive(Subcommand)]
pub enum PullCommands {
    /// Pull a unified timeline of traces, errors, and markers
    All(AllArgs),
    /// Pull traces from ClawIQ
    Traces(TracesArgs),
    /// Pull error records from ClawIQ
    Errors(ErrorsArgs),
    /// Pull span events from ClawIQ
    Events(EventsArgs),
    /// Pull semantic events from ClawIQ
    Semantic(SemanticArgs),
    /// Pull semantic event markers (aggregated in 5m buckets)
    Markers(MarkersArgs),
}

/// Flags every pull command accepts.
#[derive(Args)]
pub struct CommonArgs {
    /// ClawIQ API key
    #[arg(long)]
    api_key: Option<String>,
    /// Start time (relative like 24h, or ISO)
    #[arg(long, default_value = DEFAULT_SINCE)]
    since: String,
    /// End time (relative or ISO)
    #[arg(long)]
    until: Option<String>,
    /// Results per page
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT, allow_negative_numbers = true)]
    limit: i64,
    /// Pagination offset
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
    /// Pagination page (1-based)
    #[arg(long, allow_negative_numbers = true)]
    page: Option<i64>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Compact output
    #[arg(long)]
    compact: bool,
}

impl CommonArgs {
    fn page_request(&self) -> PageRequest {
        PageRequest {
            limit: Some(self.limit),
            offset: self.offset,
            page: self.page,
        }
    }
}

#[derive(Args)]
pub struct AllArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Filter by channel
    #[arg(long)]
    channel: Option<String>,
    /// Filter by model
    #[arg(long)]
    model: Option<String>,
    /// Trace/event status filter (success|error)
    #[arg(long)]
    status: Option<String>,
    /// Filter errors by trace ID
    #[arg(long)]
    trace: Option<String>,
    /// Filter by session ID
    #[arg(long)]
    session: Option<String>,
    /// Filter by agent (matches session_id)
    #[arg(long)]
    agent: Option<String>,
    /// Search in name/session/model where supported
    #[arg(long)]
    search: Option<String>,
    /// Marker source filter
    #[arg(long)]
    source: Option<String>,
    /// Marker type filter
    #[arg(long = "type")]
    event_type: Option<String>,
    /// Marker severity filter
    #[arg(long)]
    severity: Option<String>,
    /// Marker name filter (contains)
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args)]
pub struct TracesArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Filter by channel
    #[arg(long)]
    channel: Option<String>,
    /// Filter by status (success|error|STATUS_CODE_*)
    #[arg(long)]
    status: Option<String>,
    /// Filter by model
    #[arg(long)]
    model: Option<String>,
    /// Filter by session ID
    #[arg(long)]
    session: Option<String>,
    /// Filter by agent (matches session_id)
    #[arg(long)]
    agent: Option<String>,
    /// Search in name/session/model
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
pub struct ErrorsArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Filter by channel
    #[arg(long)]
    channel: Option<String>,
    /// Filter by error type
    #[arg(long = "type")]
    error_type: Option<String>,
    /// Filter by trace ID
    #[arg(long)]
    trace: Option<String>,
    /// Filter by model
    #[arg(long)]
    model: Option<String>,
    /// Filter by session ID
    #[arg(long)]
    session: Option<String>,
    /// Filter by agent (matches session_id)
    #[arg(long)]
    agent: Option<String>,
    /// Search in name/session/model
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
pub struct EventsArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Filter by channel
    #[arg(long)]
    channel: Option<String>,
    /// Filter by model
    #[arg(long)]
    model: Option<String>,
    /// Filter by status (success|error)
    #[arg(long)]
    status: Option<String>,
    /// Filter by session ID
    #[arg(long)]
    session: Option<String>,
    /// Filter by agent (matches session_id)
    #[arg(long)]
    agent: Option<String>,
    /// Search in name/session/model
    #[arg(long)]
    search: Option<String>,
}

/// Shared by `semantic` and `markers`.
#[derive(Args)]
pub struct SemanticArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Filter by source
    #[arg(long)]
    source: Option<String>,
    /// Filter by event type
    #[arg(long = "type")]
    event_type: Option<String>,
    /// Filter by severity
    #[arg(long)]
    severity: Option<String>,
    /// Filter by agent ID
    #[arg(long)]
    agent: Option<String>,
    /// Filter by event name (contains)
    #[arg(long)]
    name: Option<String>,
}

impl SemanticArgs {
    fn filters(&self) -> SemanticFilters {
        SemanticFilters {
            source: self.source.clone(),
            event_type: self.event_type.clone(),
            severity: self.severity.clone(),
            agent: self.agent.clone(),
            name: self.name.clone(),
        }
    }
}

pub type MarkersArgs = SemanticArgs;

#[derive(Serialize)]
struct Pagination {
    #[serde(flatten)]
    page: PageInfo,
    total: Total,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_more: Option<bool>,
}

impl Pagination {
    fn new(page: PageInfo, total: Total) -> Self {
        Self {
            page,
            total,
            has_more: None,
        }
    }
}

#[derive(Serialize)]
struct Listing<'a, T: Serialize> {
    #[serde(flatten)]
    records: Records<'a, T>,
    pagination: Pagination,
}

/// Serialises as `{"<key>": [...]}`.
struct Records<'a, T> {
    key: &'static str,
    items: &'a [T],
}

impl<T: Serialize> Serialize for Records<'_, T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.items)?;
        map.end()
    }
}

#[derive(Serialize)]
struct TimelineOutput<'a> {
    items: &'a [TimelineItem],
    scanned: ScanCounts,
    pagination: Pagination,
}

/// Everything a pull command needs before it can talk to the service.
struct Prepared {
    client: TelemetryClient,
    page: PageInfo,
    range: TimeRange,
}

fn prepare(common: &CommonArgs, config: &ClientConfig) -> Result<Prepared, CliError> {
    let api_key = config.require_api_key(common.api_key.as_deref())?;
    let client = TelemetryClient::from_config(config, api_key)?;
    let page = compute_page_info(&common.page_request(), DEFAULT_PAGE_LIMIT)?;
    let range = resolve_time_range(Some(&common.since), common.until.as_deref(), DEFAULT_SINCE)?;
    debug!(
        start = %range.start_param(),
        end = %range.end_param(),
        limit = page.limit,
        offset = page.offset,
        "pull prepared"
    );
    Ok(Prepared {
        client,
        page,
        range,
    })
}

fn print_listing<T: Serialize>(
    key: &'static str,
    label: &str,
    items: &[T],
    page: PageInfo,
    total: Total,
    common: &CommonArgs,
    print_items: fn(&[T], bool),
) -> Result<(), CliError> {
    if common.json {
        let listing = Listing {
            records: Records { key, items },
            pagination: Pagination::new(page, total),
        };
        println!("{}", to_pretty_json(&listing)?);
        return Ok(());
    }

    if items.is_empty() {
        print_empty(label);
        return Ok(());
    }

    print_items(items, common.compact);
    print_pagination_footer(label, items.len(), &page, total);
    Ok(())
}

pub async fn run(command: PullCommands, config: &ClientConfig) -> Result<(), CliError> {
    match command {
        PullCommands::All(args) => pull_all(args, config).await,
        PullCommands::Traces(args) => pull_traces(args, config).await,
        PullCommands::Errors(args) => pull_errors(args, config).await,
        PullCommands::Events(args) => pull_events(args, config).await,
        PullCommands::Semantic(args) => pull_semantic(args, config).await,
        PullCommands::Markers(args) => pull_markers(args, config).await,
    }
}

async fn pull_all(args: AllArgs, config: &ClientConfig) -> Result<(), CliError> {
    let Prepared {
        client,
        page,
        range,
    } = prepare(&args.common, config)?;
    let filters = TimelineFilters {
        channel: args.channel,
        model: args.model,
        status: args.status,
        trace_id: args.trace,
        session: args.session,
        agent: args.agent,
        search: args.search,
        source: args.source,
        event_type: args.event_type,
        severity: args.severity,
        name: args.name,
    };

    let timeline = merge_timeline(&client, &filters, &range, &page).await?;

    if args.common.json {
        let output = TimelineOutput {
            items: &timeline.items,
            scanned: timeline.scanned,
            pagination: Pagination {
                page,
                total: timeline.total,
                has_more: Some(timeline.has_more),
            },
        };
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    if timeline.items.is_empty() {
        print_empty("timeline items");
        return Ok(());
    }

    print_timeline(&timeline.items, args.common.compact);
    print_pagination_footer("timeline items", timeline.items.len(), &page, timeline.total);
    // a truncated source can leave a short page that still has successors
    if timeline.total.is_unknown() && timeline.has_more && timeline.items.len() < page.limit {
        println!(
            "{}",
            format!("Next page: --offset {}", page.next_offset()).dimmed()
        );
    }
    Ok(())
}

async fn pull_traces(args: TracesArgs, config: &ClientConfig) -> Result<(), CliError> {
    let Prepared {
        client,
        page,
        range,
    } = prepare(&args.common, config)?;
    let filters = TraceFilters {
        channel: args.channel,
        status: args.status,
        model: args.model,
        session: args.session,
        search: args.search,
        agent: args.agent,
    };

    let result = fetch_trace_records(&client, &filters, &range, page.limit, page.offset).await?;
    print_listing(
        "traces",
        "traces",
        &result.records,
        page,
        result.total,
        &args.common,
        print_traces,
    )
}

async fn pull_errors(args: ErrorsArgs, config: &ClientConfig) -> Result<(), CliError> {
    let Prepared {
        client,
        page,
        range,
    } = prepare(&args.common, config)?;
    let filters = ErrorFilters {
        channel: args.channel,
        error_type: args.error_type,
        trace_id: args.trace,
        model: args.model,
        session: args.session,
        search: args.search,
        agent: args.agent,
    };

    let result = fetch_error_records(&client, &filters, &range, page.limit, page.offset).await?;
    print_listing(
        "errors",
        "errors",
        &result.records,
        page,
        result.total,
        &args.common,
        print_errors,
    )
}

async fn pull_events(args: EventsArgs, config: &ClientConfig) -> Result<(), CliError> {
    let Prepared {
        client,
        page,
        range,
    } = prepare(&args.common, config)?;
    let filters = SpanEventFilters {
        channel: args.channel,
        model: args.model,
        status: args.status,
        session: args.session,
        search: args.search,
        agent: args.agent,
    };

    let result = fetch_span_events(&client, &filters, &range, page.limit, page.offset).await?;
    print_listing(
        "events",
        "events",
        &result.records,
        page,
        result.total,
        &args.common,
        print_span_events,
    )
}

async fn pull_semantic(args: SemanticArgs, config: &ClientConfig) -> Result<(), CliError> {
    let Prepared {
        client,
        page,
        range,
    } = prepare(&args.common, config)?;

    let result =
        fetch_semantic_events(&client, &args.filters(), &range, page.limit, page.offset).await?;
    print_listing(
        "events",
        "semantic events",
        &result.records,
        page,
        result.total,
        &args.common,
        print_semantic_events,
    )
}

async fn pull_markers(args: MarkersArgs, config: &ClientConfig) -> Result<(), CliError> {
    let Prepared {
        client,
        page,
        range,
    } = prepare(&args.common, config)?;

    let markers = fetch_markers(&client, &args.filters(), &range).await?;
    let total = Total::Exact(markers.len() as u64);
    print_listing(
        "markers",
        "markers",
        page.slice(&markers),
        page,
        total,
        &args.common,
        print_markers,
    )
}
