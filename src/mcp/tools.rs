// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tool catalog and dispatch for the MCP surface.
//!
//! Each tool resolves the caller's credentials, makes one Search Console
//! call, and renders a markdown report. Failures come back as error strings
//! in the tool result channel, never as transport faults.

use crate::error::AppError;
use crate::services::search_console::{OrderBy, SearchAnalyticsQuery, SearchConsoleClient};
use crate::services::CredentialService;
use rmcp::model::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Names in the catalog, in listing order.
const TOOL_NAMES: &[&str] = &[
    "list_properties",
    "get_search_analytics",
    "get_performance_overview",
    "find_keyword_opportunities",
    "get_top_pages",
    "get_device_comparison",
    "get_country_breakdown",
    "inspect_url",
    "get_sitemaps",
    "submit_sitemap",
    "request_indexing",
    "export_analytics",
];

/// Identity and clients one tool call runs with.
pub struct ToolContext<'a> {
    pub user_id: &'a str,
    pub credentials: &'a CredentialService,
    pub gsc: &'a SearchConsoleClient,
}

/// Run one tool call for the bound identity. Credentials are resolved
/// per call so freshness and last-used tracking happen on every use.
pub async fn dispatch(
    ctx: ToolContext<'_>,
    name: &str,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<String, AppError> {
    if !TOOL_NAMES.contains(&name) {
        return Err(AppError::BadRequest(format!("Unknown tool: {}", name)));
    }

    let credential = ctx.credentials.resolve(ctx.user_id).await?;
    let token = credential.access_token.as_str();

    match name {
        "list_properties" => list_properties(ctx.gsc, token).await,
        "get_search_analytics" => get_search_analytics(ctx.gsc, token, parse_args(args)?).await,
        "get_performance_overview" => {
            get_performance_overview(ctx.gsc, token, parse_args(args)?).await
        }
        "find_keyword_opportunities" => {
            find_keyword_opportunities(ctx.gsc, token, parse_args(args)?).await
        }
        "get_top_pages" => get_top_pages(ctx.gsc, token, parse_args(args)?).await,
        "get_device_comparison" => get_device_comparison(ctx.gsc, token, parse_args(args)?).await,
        "get_country_breakdown" => get_country_breakdown(ctx.gsc, token, parse_args(args)?).await,
        "inspect_url" => inspect_url(ctx.gsc, token, parse_args(args)?).await,
        "get_sitemaps" => get_sitemaps(ctx.gsc, token, parse_args(args)?).await,
        "submit_sitemap" => submit_sitemap(ctx.gsc, token, parse_args(args)?).await,
        "request_indexing" => request_indexing(ctx.gsc, token, parse_args(args)?).await,
        "export_analytics" => export_analytics(ctx.gsc, token, parse_args(args)?).await,
        other => Err(AppError::BadRequest(format!("Unknown tool: {}", other))),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::Object(args.clone()))
        .map_err(|e| AppError::BadRequest(format!("Invalid arguments: {}", e)))
}

// ─── Tool Arguments ──────────────────────────────────────────────────────────

fn default_days() -> i64 {
    28
}

fn default_dimensions() -> String {
    "query".to_string()
}

#[derive(Debug, Deserialize)]
struct SiteArgs {
    site_url: String,
}

#[derive(Debug, Deserialize)]
struct AnalyticsArgs {
    site_url: String,
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default = "default_dimensions")]
    dimensions: String,
}

#[derive(Debug, Deserialize)]
struct OverviewArgs {
    site_url: String,
    #[serde(default = "default_days")]
    days: i64,
}

#[derive(Debug, Deserialize)]
struct OpportunityArgs {
    site_url: String,
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default = "default_min_impressions")]
    min_impressions: f64,
    #[serde(default = "default_max_position")]
    max_position: f64,
    #[serde(default = "default_min_position")]
    min_position: f64,
}

fn default_min_impressions() -> f64 {
    100.0
}

fn default_max_position() -> f64 {
    20.0
}

fn default_min_position() -> f64 {
    4.0
}

#[derive(Debug, Deserialize)]
struct TopPagesArgs {
    site_url: String,
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default = "default_page_limit")]
    limit: u32,
}

fn default_page_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
struct CountryArgs {
    site_url: String,
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default = "default_country_limit")]
    limit: u32,
}

fn default_country_limit() -> u32 {
    15
}

#[derive(Debug, Deserialize)]
struct InspectArgs {
    site_url: String,
    page_url: String,
}

#[derive(Debug, Deserialize)]
struct SubmitSitemapArgs {
    site_url: String,
    sitemap_url: String,
}

#[derive(Debug, Deserialize)]
struct IndexingArgs {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ExportArgs {
    site_url: String,
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default = "default_dimensions")]
    dimensions: String,
    #[serde(default = "default_export_format")]
    format: String,
    #[serde(default = "default_export_rows")]
    row_limit: u32,
}

fn default_export_format() -> String {
    "csv".to_string()
}

fn default_export_rows() -> u32 {
    500
}

// ─── Tool Implementations ────────────────────────────────────────────────────

async fn list_properties(gsc: &SearchConsoleClient, token: &str) -> Result<String, AppError> {
    let sites = gsc.list_sites(token).await?;
    if sites.is_empty() {
        return Ok("No Search Console properties found.".to_string());
    }

    let mut lines = vec!["# Your Search Console Properties\n".to_string()];
    for site in sites {
        let permission = site.permission_level.as_deref().unwrap_or("Unknown");
        lines.push(format!("- {} ({})", site.site_url, permission));
    }
    Ok(lines.join("\n"))
}

async fn get_search_analytics(
    gsc: &SearchConsoleClient,
    token: &str,
    args: AnalyticsArgs,
) -> Result<String, AppError> {
    let dimensions = split_dimensions(&args.dimensions);
    let (start_date, end_date) = date_range(args.days);
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: dimensions.clone(),
        row_limit: 25,
        order_by: Vec::new(),
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    if rows.is_empty() {
        return Ok(format!(
            "No data found for {} in the last {} days.",
            args.site_url, args.days
        ));
    }

    let mut lines = vec![format!(
        "# Search Analytics: {}\n*Last {} days*\n",
        args.site_url, args.days
    )];

    let mut header: Vec<String> = dimensions.iter().map(|d| capitalize(d)).collect();
    header.extend(["Clicks", "Impr", "CTR", "Pos"].map(String::from));
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!("|{}|", vec!["---"; header.len()].join("|")));

    for row in &rows {
        let mut cells: Vec<String> = row
            .keys
            .iter()
            .map(|k| truncate(k, 50).to_string())
            .collect();
        cells.push(count(row.clicks));
        cells.push(count(row.impressions));
        cells.push(format!("{:.1}%", row.ctr * 100.0));
        cells.push(format!("{:.1}", row.position));
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    Ok(lines.join("\n"))
}

async fn get_performance_overview(
    gsc: &SearchConsoleClient,
    token: &str,
    args: OverviewArgs,
) -> Result<String, AppError> {
    let (start_date, end_date) = date_range(args.days);
    // No dimensions: the API aggregates everything into a single row.
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: Vec::new(),
        row_limit: 1,
        order_by: Vec::new(),
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    let Some(totals) = rows.first() else {
        return Ok(format!("No data found for {}", args.site_url));
    };

    Ok([
        format!("# Performance Overview: {}\n", args.site_url),
        format!("*Last {} days*\n", args.days),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Clicks | {} |", group_digits(totals.clicks.round() as i64)),
        format!(
            "| Impressions | {} |",
            group_digits(totals.impressions.round() as i64)
        ),
        format!("| CTR | {:.2}% |", totals.ctr * 100.0),
        format!("| Avg Position | {:.1} |", totals.position),
    ]
    .join("\n"))
}

struct Opportunity {
    query: String,
    position: f64,
    impressions: f64,
    ctr: f64,
    clicks: f64,
    potential: f64,
}

async fn find_keyword_opportunities(
    gsc: &SearchConsoleClient,
    token: &str,
    args: OpportunityArgs,
) -> Result<String, AppError> {
    let (start_date, end_date) = date_range(args.days);
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: vec!["query".to_string(), "page".to_string()],
        row_limit: 5000,
        order_by: Vec::new(),
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    if rows.is_empty() {
        return Ok(format!("No data found for {}", args.site_url));
    }

    let mut opportunities: Vec<Opportunity> = rows
        .iter()
        .filter(|row| {
            row.position >= args.min_position
                && row.position <= args.max_position
                && row.impressions >= args.min_impressions
        })
        .map(|row| Opportunity {
            query: row.keys.first().cloned().unwrap_or_default(),
            position: row.position,
            impressions: row.impressions,
            ctr: row.ctr,
            clicks: row.clicks,
            potential: opportunity_score(row.impressions, row.ctr, row.position),
        })
        .collect();

    opportunities.sort_by(|a, b| b.potential.total_cmp(&a.potential));

    let mut lines = vec![
        format!("# 🎯 Keyword Opportunities: {}", args.site_url),
        format!(
            "*Last {} days | Position {}-{} | Min {} impressions*\n",
            args.days, args.min_position, args.max_position, args.min_impressions
        ),
    ];

    if opportunities.is_empty() {
        lines.push("No opportunities found. Try adjusting the filters.".to_string());
        return Ok(lines.join("\n"));
    }

    lines.push(format!(
        "Found **{}** opportunities. Top 20:\n",
        opportunities.len()
    ));
    lines.push("| Query | Position | Impressions | CTR | Clicks |".to_string());
    lines.push("|-------|----------|-------------|-----|--------|".to_string());

    for opp in opportunities.iter().take(20) {
        lines.push(format!(
            "| {} | {:.1} | {} | {:.1}% | {} |",
            truncate(&opp.query, 40),
            opp.position,
            group_digits(opp.impressions.round() as i64),
            opp.ctr * 100.0,
            count(opp.clicks),
        ));
    }

    Ok(lines.join("\n"))
}

async fn get_top_pages(
    gsc: &SearchConsoleClient,
    token: &str,
    args: TopPagesArgs,
) -> Result<String, AppError> {
    let (start_date, end_date) = date_range(args.days);
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: vec!["page".to_string()],
        row_limit: args.limit,
        order_by: vec![OrderBy::clicks_descending()],
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    if rows.is_empty() {
        return Ok(format!("No page data found for {}", args.site_url));
    }

    let mut lines = vec![format!(
        "# 📊 Top Pages: {}\n*Last {} days*\n",
        args.site_url, args.days
    )];
    lines.push("| # | Page | Clicks | Impressions | CTR | Position |".to_string());
    lines.push("|---|------|--------|-------------|-----|----------|".to_string());

    let prefix = args.site_url.trim_end_matches('/');
    for (i, row) in rows.iter().enumerate() {
        let page = row.keys.first().map(String::as_str).unwrap_or("");
        let stripped = page.replace(prefix, "");
        let display = if stripped.is_empty() {
            truncate(page, 45)
        } else {
            truncate(&stripped, 45)
        };

        lines.push(format!(
            "| {} | {} | {} | {} | {:.1}% | {:.1} |",
            i + 1,
            display,
            group_digits(row.clicks.round() as i64),
            group_digits(row.impressions.round() as i64),
            row.ctr * 100.0,
            row.position,
        ));
    }

    Ok(lines.join("\n"))
}

async fn get_device_comparison(
    gsc: &SearchConsoleClient,
    token: &str,
    args: OverviewArgs,
) -> Result<String, AppError> {
    let (start_date, end_date) = date_range(args.days);
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: vec!["device".to_string()],
        row_limit: 10,
        order_by: Vec::new(),
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    if rows.is_empty() {
        return Ok(format!("No device data found for {}", args.site_url));
    }

    let total_clicks: f64 = rows.iter().map(|row| row.clicks).sum();

    let mut lines = vec![format!(
        "# 📱 Device Comparison: {}\n*Last {} days*\n",
        args.site_url, args.days
    )];
    lines.push("| Device | Clicks | Share | Impressions | CTR | Position |".to_string());
    lines.push("|--------|--------|-------|-------------|-----|----------|".to_string());

    for row in &rows {
        let device = row.keys.first().map(String::as_str).unwrap_or("Unknown");
        let share = if total_clicks > 0.0 {
            row.clicks / total_clicks * 100.0
        } else {
            0.0
        };
        let icon = match device.to_uppercase().as_str() {
            "MOBILE" => "📱",
            "DESKTOP" => "🖥️",
            "TABLET" => "📲",
            _ => "",
        };

        lines.push(format!(
            "| {} {} | {} | {:.1}% | {} | {:.1}% | {:.1} |",
            icon,
            device,
            group_digits(row.clicks.round() as i64),
            share,
            group_digits(row.impressions.round() as i64),
            row.ctr * 100.0,
            row.position,
        ));
    }

    Ok(lines.join("\n"))
}

async fn get_country_breakdown(
    gsc: &SearchConsoleClient,
    token: &str,
    args: CountryArgs,
) -> Result<String, AppError> {
    let (start_date, end_date) = date_range(args.days);
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: vec!["country".to_string()],
        row_limit: args.limit,
        order_by: vec![OrderBy::clicks_descending()],
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    if rows.is_empty() {
        return Ok(format!("No country data found for {}", args.site_url));
    }

    let total_clicks: f64 = rows.iter().map(|row| row.clicks).sum();

    let mut lines = vec![format!(
        "# 🌍 Country Breakdown: {}\n*Last {} days*\n",
        args.site_url, args.days
    )];
    lines.push("| Country | Clicks | Share | Impressions | CTR | Position |".to_string());
    lines.push("|---------|--------|-------|-------------|-----|----------|".to_string());

    for row in &rows {
        let country = row.keys.first().map(String::as_str).unwrap_or("Unknown");
        let share = if total_clicks > 0.0 {
            row.clicks / total_clicks * 100.0
        } else {
            0.0
        };

        lines.push(format!(
            "| {} | {} | {:.1}% | {} | {:.1}% | {:.1} |",
            country,
            group_digits(row.clicks.round() as i64),
            share,
            group_digits(row.impressions.round() as i64),
            row.ctr * 100.0,
            row.position,
        ));
    }

    Ok(lines.join("\n"))
}

async fn inspect_url(
    gsc: &SearchConsoleClient,
    token: &str,
    args: InspectArgs,
) -> Result<String, AppError> {
    let inspection = gsc
        .inspect_url(token, &args.site_url, &args.page_url)
        .await?;
    let Some(status) = inspection.index_status_result else {
        return Ok(format!("No inspection data for {}", args.page_url));
    };

    let verdict = status.verdict.as_deref().unwrap_or("UNKNOWN");
    let emoji = if verdict == "PASS" { "✅" } else { "❌" };

    let mut lines = vec![
        format!("# URL Inspection: {}\n", args.page_url),
        format!("## Status: {} {}\n", emoji, verdict),
        format!(
            "**Coverage:** {}",
            status.coverage_state.as_deref().unwrap_or("Unknown")
        ),
        format!(
            "**Robots.txt:** {}",
            status.robots_txt_state.as_deref().unwrap_or("Unknown")
        ),
        format!(
            "**Indexing:** {}",
            status.indexing_state.as_deref().unwrap_or("Unknown")
        ),
    ];

    if let Some(last_crawl) = &status.last_crawl_time {
        lines.push(format!("**Last Crawl:** {}", last_crawl));
    }
    if let Some(canonical) = &status.google_canonical {
        lines.push(format!("**Google Canonical:** {}", canonical));
    }

    Ok(lines.join("\n"))
}

async fn get_sitemaps(
    gsc: &SearchConsoleClient,
    token: &str,
    args: SiteArgs,
) -> Result<String, AppError> {
    let sitemaps = gsc.list_sitemaps(token, &args.site_url).await?;
    if sitemaps.is_empty() {
        return Ok(format!("No sitemaps found for {}", args.site_url));
    }

    let mut lines = vec![format!("# Sitemaps: {}\n", args.site_url)];
    lines.push("| Sitemap | URLs | Status |".to_string());
    lines.push("|---------|------|--------|".to_string());

    for sitemap in &sitemaps {
        let name = sitemap.path.rsplit('/').next().unwrap_or(&sitemap.path);
        let status = match sitemap.errors.as_deref().filter(|e| *e != "0") {
            Some(errors) => format!("⚠️ {} errors", errors),
            None => "✅".to_string(),
        };
        let url_count = sitemap
            .contents
            .iter()
            .find(|c| c.content_type.as_deref() == Some("web"))
            .and_then(|c| c.submitted.as_deref())
            .unwrap_or("N/A");

        lines.push(format!(
            "| {} | {} | {} |",
            truncate(name, 35),
            url_count,
            status
        ));
    }

    Ok(lines.join("\n"))
}

async fn submit_sitemap(
    gsc: &SearchConsoleClient,
    token: &str,
    args: SubmitSitemapArgs,
) -> Result<String, AppError> {
    gsc.submit_sitemap(token, &args.site_url, &args.sitemap_url)
        .await?;
    Ok(format!(
        "✅ Sitemap submitted: {}\n\nGoogle will process it shortly.",
        args.sitemap_url
    ))
}

async fn request_indexing(
    gsc: &SearchConsoleClient,
    token: &str,
    args: IndexingArgs,
) -> Result<String, AppError> {
    match gsc.publish_url_notification(token, &args.url).await {
        Ok(()) => Ok([
            "# ✅ Indexing Request Submitted\n".to_string(),
            format!("**URL:** {}", args.url),
            "\n## ⚠️ Note".to_string(),
            "The Indexing API works best for JobPosting and BroadcastEvent pages.".to_string(),
            "For other pages, Google may not immediately act on this request.".to_string(),
        ]
        .join("\n")),
        // Enrollment failures get setup guidance instead of a bare error.
        Err(AppError::GoogleApi(message)) if message.starts_with("HTTP 403") => Ok(
            "❌ **Permission Denied**\n\n\
             The Indexing API requires:\n\
             1. Enable the Indexing API in Google Cloud Console\n\
             2. Verify site ownership in Search Console\n\
             3. Works primarily for JobPosting/BroadcastEvent pages"
                .to_string(),
        ),
        Err(e) => Err(e),
    }
}

async fn export_analytics(
    gsc: &SearchConsoleClient,
    token: &str,
    args: ExportArgs,
) -> Result<String, AppError> {
    let dimensions = split_dimensions(&args.dimensions);
    let (start_date, end_date) = date_range(args.days);
    let query = SearchAnalyticsQuery {
        start_date,
        end_date,
        dimensions: dimensions.clone(),
        row_limit: args.row_limit.min(25_000),
        order_by: Vec::new(),
    };

    let rows = gsc
        .query_search_analytics(token, &args.site_url, &query)
        .await?;
    if rows.is_empty() {
        return Ok(format!("No data to export for {}", args.site_url));
    }

    if args.format.eq_ignore_ascii_case("json") {
        let export: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let mut item = serde_json::Map::new();
                for (i, dim) in dimensions.iter().enumerate() {
                    let key = row.keys.get(i).cloned().unwrap_or_default();
                    item.insert(dim.clone(), json!(key));
                }
                item.insert("clicks".to_string(), json!(row.clicks.round() as i64));
                item.insert(
                    "impressions".to_string(),
                    json!(row.impressions.round() as i64),
                );
                item.insert(
                    "ctr".to_string(),
                    json!((row.ctr * 10_000.0).round() / 100.0),
                );
                item.insert(
                    "position".to_string(),
                    json!((row.position * 10.0).round() / 10.0),
                );
                serde_json::Value::Object(item)
            })
            .collect();

        let payload = serde_json::to_string_pretty(&export).unwrap_or_default();
        return Ok(format!("```json\n{}\n```", payload));
    }

    let mut header: Vec<String> = dimensions.clone();
    header.extend(["clicks", "impressions", "ctr", "position"].map(String::from));
    let mut csv_lines = vec![header.join(",")];

    for row in &rows {
        let mut values: Vec<String> = Vec::with_capacity(header.len());
        for i in 0..dimensions.len() {
            let key = row.keys.get(i).map(String::as_str).unwrap_or("");
            values.push(csv_field(key));
        }
        values.push(count(row.clicks));
        values.push(count(row.impressions));
        values.push(format!("{:.2}", row.ctr * 100.0));
        values.push(format!("{:.1}", row.position));
        csv_lines.push(values.join(","));
    }

    Ok(format!("```csv\n{}\n```", csv_lines.join("\n")))
}

// ─── Formatting Helpers ──────────────────────────────────────────────────────

/// Rank a query by unrealized clicks: high impressions, low CTR, and a
/// position near page one score highest.
pub fn opportunity_score(impressions: f64, ctr: f64, position: f64) -> f64 {
    impressions * (1.0 - ctr) * (1.0 / position)
}

/// Quote a CSV field when it contains a comma or a quote.
pub fn csv_field(value: &str) -> String {
    let escaped = value.replace('"', "\"\"");
    if escaped.contains(',') || escaped.contains('"') {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

/// Render a count with thousands separators ("12,345").
pub fn group_digits(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn count(n: f64) -> String {
    format!("{}", n.round() as i64)
}

/// Truncate to a character count without splitting a multi-byte char.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn split_dimensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Inclusive date window ending today, as YYYY-MM-DD strings.
fn date_range(days: i64) -> (String, String) {
    let end = chrono::Utc::now().date_naive();
    let span = chrono::Duration::try_days(days).unwrap_or_else(chrono::Duration::zero);
    let start = end.checked_sub_signed(span).unwrap_or(end);
    (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Tools advertised to MCP clients.
pub fn catalog() -> Vec<Tool> {
    fn make_schema(value: serde_json::Value) -> Arc<serde_json::Map<String, serde_json::Value>> {
        match value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        }
    }

    fn site_url() -> serde_json::Value {
        json!({
            "type": "string",
            "description": "Property URL as registered in Search Console \
                (https://example.com/ or sc-domain:example.com)"
        })
    }

    fn days() -> serde_json::Value {
        json!({
            "type": "integer",
            "description": "Number of days to look back",
            "default": 28
        })
    }

    vec![
        Tool {
            name: "list_properties".into(),
            title: None,
            description: Some("List all Search Console properties for the authenticated account".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {}
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "get_search_analytics".into(),
            title: None,
            description: Some(
                "Get search analytics for a property, grouped by the requested dimensions".into(),
            ),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days(),
                    "dimensions": {
                        "type": "string",
                        "description": "Comma-separated dimensions: query, page, device, country, date",
                        "default": "query"
                    }
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "get_performance_overview".into(),
            title: None,
            description: Some("Get total clicks, impressions, CTR, and average position".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days()
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "find_keyword_opportunities".into(),
            title: None,
            description: Some(
                "Find queries with high impressions but room for improvement: \
                 ranked outside the top results with a weak CTR"
                    .into(),
            ),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days(),
                    "min_impressions": {
                        "type": "number",
                        "description": "Minimum impressions to consider",
                        "default": 100
                    },
                    "max_position": {
                        "type": "number",
                        "description": "Worst ranking to consider",
                        "default": 20
                    },
                    "min_position": {
                        "type": "number",
                        "description": "Best ranking to consider, excludes queries already on top",
                        "default": 4
                    }
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "get_top_pages".into(),
            title: None,
            description: Some("Get the top performing pages by clicks".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days(),
                    "limit": {
                        "type": "integer",
                        "description": "Number of pages to return",
                        "default": 20
                    }
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "get_device_comparison".into(),
            title: None,
            description: Some("Compare performance across mobile, desktop, and tablet".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days()
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "get_country_breakdown".into(),
            title: None,
            description: Some("Get traffic breakdown by country".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days(),
                    "limit": {
                        "type": "integer",
                        "description": "Number of countries to show",
                        "default": 15
                    }
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "inspect_url".into(),
            title: None,
            description: Some("Inspect the indexing status of a URL".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "page_url": {
                        "type": "string",
                        "description": "The URL to inspect"
                    }
                },
                "required": ["site_url", "page_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "get_sitemaps".into(),
            title: None,
            description: Some("List all sitemaps submitted for a property".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url()
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "submit_sitemap".into(),
            title: None,
            description: Some("Submit a sitemap to Google".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "sitemap_url": {
                        "type": "string",
                        "description": "Full URL of the sitemap file"
                    }
                },
                "required": ["site_url", "sitemap_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "request_indexing".into(),
            title: None,
            description: Some(
                "Ask Google to crawl and index a URL. Works best for JobPosting \
                 and BroadcastEvent pages"
                    .into(),
            ),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to request indexing for"
                    }
                },
                "required": ["url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "export_analytics".into(),
            title: None,
            description: Some("Export search analytics data as CSV or JSON".into()),
            input_schema: make_schema(json!({
                "type": "object",
                "properties": {
                    "site_url": site_url(),
                    "days": days(),
                    "dimensions": {
                        "type": "string",
                        "description": "Comma-separated dimensions: query, page, device, country, date",
                        "default": "query"
                    },
                    "format": {
                        "type": "string",
                        "enum": ["csv", "json"],
                        "description": "Export format",
                        "default": "csv"
                    },
                    "row_limit": {
                        "type": "integer",
                        "description": "Maximum rows to export (capped at 25000)",
                        "default": 500
                    }
                },
                "required": ["site_url"]
            })),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
        },
    ]
}
