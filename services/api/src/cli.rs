use crate::demo::{
    run_case_list, run_deadline_report, run_demo, run_document_check, CaseListArgs, DemoArgs,
    DeadlineReportArgs, DocumentCheckArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use immigration_ops::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UK Immigration Ops",
    about = "Client intake, deadline tracking, and document checks for UK immigration casework",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect application deadlines
    Deadlines {
        #[command(subcommand)]
        command: DeadlinesCommand,
    },
    /// Check files against a visa route's document checklist
    Documents {
        #[command(subcommand)]
        command: DocumentsCommand,
    },
    /// Browse the remote case list
    Cases {
        #[command(subcommand)]
        command: CasesCommand,
    },
    /// Walk through a sample client from intake to outreach message
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DeadlinesCommand {
    /// Band each deadline by urgency and show countdowns
    Report(DeadlineReportArgs),
}

#[derive(Subcommand, Debug)]
enum DocumentsCommand {
    /// Admit local files and report which requirements they satisfy
    Check(DocumentCheckArgs),
}

#[derive(Subcommand, Debug)]
enum CasesCommand {
    /// Fetch, filter, and page through cases
    List(CaseListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Deadlines {
            command: DeadlinesCommand::Report(args),
        } => run_deadline_report(args),
        Command::Documents {
            command: DocumentsCommand::Check(args),
        } => run_document_check(args).await,
        Command::Cases {
            command: CasesCommand::List(args),
        } => run_case_list(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
