use crate::infra::{parse_date, parse_deadline_arg, parse_route};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use immigration_ops::config::{AppConfig, DeadlineConfig, DocumentConfig};
use immigration_ops::error::AppError;
use immigration_ops::storage::InMemorySessionStore;
use immigration_ops::workflows::cases::{
    CaseDashboard, CaseFilter, CaseStoreClient, DEFAULT_PAGE_SIZE,
};
use immigration_ops::workflows::deadlines::{DeadlineBoard, DeadlineEntry, DeadlineTracker};
use immigration_ops::workflows::documents::{
    read_and_admit, AdmissionPolicy, ArtifactUpload, CompletionSummary, RequirementReconciler,
    RequirementStatus, VisaRoute,
};
use immigration_ops::workflows::intake::CaseSession;
use immigration_ops::workflows::rules::rules_affecting;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DeadlineReportArgs {
    /// Deadline as CATEGORY=YYYY-MM-DD (submission, biometrics, decision, appeal)
    #[arg(long = "deadline", value_parser = parse_deadline_arg, required = true)]
    pub(crate) deadlines: Vec<DeadlineEntry>,
    /// Evaluate as of this date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DocumentCheckArgs {
    /// Visa route label, e.g. "Spouse Visa" or "Skilled Worker"
    #[arg(long, value_parser = parse_route)]
    pub(crate) visa_route: VisaRoute,
    /// Override the maximum accepted file size in bytes
    #[arg(long)]
    pub(crate) max_bytes: Option<u64>,
    /// Files to admit
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CaseListArgs {
    /// Substring matched against Case ID, Name, and Email
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Exact status filter
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Exact urgency filter (Normal or Urgent)
    #[arg(long)]
    pub(crate) urgency: Option<String>,
    /// Column header to sort by
    #[arg(long)]
    pub(crate) sort: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub(crate) page_size: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluate deadlines as of this date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn start_of(date: Option<NaiveDate>) -> NaiveDateTime {
    date.unwrap_or_else(|| Local::now().date_naive())
        .and_time(NaiveTime::MIN)
}

pub(crate) fn run_deadline_report(args: DeadlineReportArgs) -> Result<(), AppError> {
    let DeadlineReportArgs { deadlines, today } = args;
    let now = start_of(today);

    let mut tracker = DeadlineTracker::new(
        Arc::new(InMemorySessionStore::new()),
        now,
        DeadlineConfig::default().quiet_window,
    );
    tracker.set_deadlines(&deadlines)?;

    println!("Deadline report as of {}", now.date());
    render_board(&tracker.board(now));
    Ok(())
}

pub(crate) async fn run_document_check(args: DocumentCheckArgs) -> Result<(), AppError> {
    let DocumentCheckArgs {
        visa_route,
        max_bytes,
        files,
    } = args;

    let policy = max_bytes
        .map(AdmissionPolicy::new)
        .unwrap_or_else(|| AdmissionPolicy::from_config(&DocumentConfig::default()));
    let mut reconciler = RequirementReconciler::new(Arc::new(InMemorySessionStore::new()), policy);
    reconciler.set_route(visa_route);

    println!("Document check for {}", visa_route.label());
    for outcome in read_and_admit(&mut reconciler, files).await {
        match outcome.result {
            Ok(receipt) => {
                println!(
                    "- accepted {} ({}, {})",
                    receipt.file_name, receipt.type_label, receipt.size_label
                );
                for advisory in &receipt.advisories {
                    println!("    {advisory}");
                }
            }
            Err(err) => println!("- rejected {}: {}", outcome.path.display(), err),
        }
    }

    render_checklist(&reconciler.checklist(), reconciler.summary());
    Ok(())
}

pub(crate) async fn run_case_list(args: CaseListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = CaseStoreClient::from_config(&config.case_store)?;
    let cases = client.get_cases().await?;

    let mut dashboard = CaseDashboard::new(cases);
    dashboard.set_page_size(args.page_size);
    if let Some(column) = args.sort.as_deref() {
        dashboard.sort_by(column);
    }
    dashboard.apply_filter(CaseFilter {
        search: args.search,
        status: args.status,
        urgency: args.urgency,
    });
    dashboard.go_to_page(args.page);

    let stats = dashboard.stats();
    println!(
        "Cases: {} total | {} urgent | {} pending | {} completed",
        stats.total, stats.urgent, stats.pending, stats.completed
    );

    let page = dashboard.current_page();
    if page.rows.is_empty() {
        println!("No cases match the current filters.");
    }
    for record in &page.rows {
        println!(
            "- {} | {} | {} | {} | docs: {}",
            record.case_id, record.name, record.status, record.urgency, record.docs_received
        );
    }
    println!("{} ({} matching)", page.label(), page.total_matches);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = start_of(args.today);
    let store = Arc::new(InMemorySessionStore::new());
    let mut session = CaseSession::open(
        store.clone(),
        now,
        DeadlineConfig::default(),
        DocumentConfig::default(),
    )?;

    println!("UK immigration intake demo");
    session.set_demo_mode(true)?;
    session.record_consent(true)?;
    if let Some(intake) = session.intake() {
        println!("- Client: {} ({})", intake.client_name, intake.visa_type);
    }

    if let Some(route) = session.reconciler().route() {
        println!("\nRule changes affecting {}", route.label());
        for update in rules_affecting(route) {
            println!("- {} ({})", update.title, update.published_label());
            println!("    {}", update.impact);
        }
    }

    println!("\nDeadlines as of {}", now.date());
    render_board(&session.snapshot(now).deadlines);

    println!("\nUploads");
    let samples = [
        ArtifactUpload::new("passport_scan.pdf", "application/pdf", vec![0; 96 * 1024]),
        ArtifactUpload::new("marriage_cert.jpg", "image/jpeg", vec![0; 240 * 1024]),
        ArtifactUpload::new("wedding_video.mp4", "video/mp4", vec![0; 4 * 1024]),
    ];
    for upload in samples {
        let file_name = upload.file_name.clone();
        match session.admit(upload) {
            Ok(receipt) => {
                println!(
                    "- accepted {} ({}, {})",
                    receipt.file_name, receipt.type_label, receipt.size_label
                );
                for advisory in &receipt.advisories {
                    println!("    {advisory}");
                }
            }
            Err(err) => println!("- rejected {file_name}: {err}"),
        }
    }

    let snapshot = session.snapshot(now);
    render_checklist(&snapshot.checklist, snapshot.summary);

    println!("\nOutreach message");
    println!("{}", session.outreach_message());
    println!("\nWhatsApp link: {}", session.whatsapp_link(""));

    let usage = store.usage()?;
    println!("\nSession storage ({:.1} KB)", usage.total_kilobytes());
    for item in usage.items.iter().filter(|item| item.bytes > 0) {
        println!("  - {}: {} bytes", item.key, item.bytes);
    }

    Ok(())
}

fn render_board(board: &DeadlineBoard) {
    if board.is_empty() {
        println!("  No deadlines set.");
        return;
    }
    for entry in &board.entries {
        println!(
            "- {}: {} | {} [{}]",
            entry.label, entry.due_label, entry.countdown, entry.band_label
        );
        println!("    calendar: {}", entry.calendar_link);
    }
    if let Some(next) = &board.next {
        println!("Next deadline: {} on {}", next.label, next.due_label);
    }
}

fn render_checklist(checklist: &[RequirementStatus], summary: CompletionSummary) {
    println!(
        "\nChecklist: {} of {} documents",
        summary.satisfied, summary.total
    );
    for status in checklist {
        let mark = if status.satisfied { "x" } else { " " };
        println!("  [{mark}] {}", status.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_report_renders_parsed_entries() {
        let args = DeadlineReportArgs {
            deadlines: vec![
                parse_deadline_arg("submission=2025-12-15").expect("valid"),
                parse_deadline_arg("appeal=2026-01-10").expect("valid"),
            ],
            today: NaiveDate::from_ymd_opt(2025, 12, 1),
        };
        run_deadline_report(args).expect("report renders");
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            today: NaiveDate::from_ymd_opt(2025, 12, 1),
        })
        .expect("demo completes");
    }

    #[tokio::test]
    async fn document_check_reports_missing_files_without_failing() {
        let args = DocumentCheckArgs {
            visa_route: VisaRoute::Visit,
            max_bytes: None,
            files: vec![PathBuf::from("/nonexistent/itinerary.pdf")],
        };
        run_document_check(args).await.expect("check completes");
    }
}
