use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use graph_blast::config::SearchConfig;
use graph_blast::graph::NodeTable;
use graph_blast::report::{Report, ReportFormat};
use graph_blast::search::{LoadProgress, SearchSession, Target};

#[derive(Parser, Debug)]
#[command(name = "graph-blast", author, version, about = "BLAST queries against the nodes of a sequence graph", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Show hits of this query only ("all" for every query)
    #[arg(short, long, default_value = "all")]
    target: String,
    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Tsv)]
    format: ReportFormat,
    /// Output path (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a BLAST database from the graph nodes, search the queries and report hits
    Search {
        /// Graph node sequences (FASTA, one record per node)
        #[arg(short, long)]
        graph: PathBuf,
        /// Query sequences (FASTA)
        #[arg(short, long)]
        queries: PathBuf,
        /// Extra parameters passed verbatim to blastn/tblastn
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        params: String,
        /// Directory under which a graph-blast-scratch subdirectory holds the database and query files (temporary if omitted)
        #[arg(long)]
        scratch: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Link an existing tabular BLAST output (-outfmt 6) to graph nodes and queries
    Parse {
        /// Graph node sequences (FASTA, one record per node)
        #[arg(short, long)]
        graph: PathBuf,
        /// Query sequences (FASTA)
        #[arg(short, long)]
        queries: PathBuf,
        /// BLAST tabular output
        hits: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search { graph, queries, params, scratch, output } => {
            run_search(&graph, &queries, &params, scratch, &output)
        }
        Commands::Parse { graph, queries, hits, output } => run_parse(&graph, &queries, &hits, &output),
    }
}

fn log_progress(p: LoadProgress) -> ControlFlow<()> {
    if p.loaded % 100 == 0 || p.loaded == p.total {
        log::debug!("loaded {}/{} queries", p.loaded, p.total);
    }
    ControlFlow::Continue(())
}

fn run_search(
    graph: &Path,
    queries: &Path,
    params: &str,
    scratch: Option<PathBuf>,
    output: &OutputArgs,
) -> Result<()> {
    let nodes = NodeTable::from_fasta(graph)?;

    // 未指定时使用临时目录，需比 session 活得久
    let (scratch_dir, _temp) = match scratch {
        Some(dir) => (dir, None),
        None => {
            let t = tempfile::Builder::new().prefix("graph-blast-").tempdir()?;
            (t.path().to_path_buf(), Some(t))
        }
    };

    let config = SearchConfig::new(queries, scratch_dir).with_parameters(params);
    let mut session = SearchSession::with_system_tools(config);
    let summary = session.run_automatic_search(&nodes, log_progress)?;
    log::info!(
        "{} hits linked across {} queries ({} reverse-strand skipped)",
        summary.appended,
        session.queries().len(),
        summary.skipped_reverse
    );
    emit_report(&mut session, &nodes, output)
}

fn run_parse(graph: &Path, queries: &Path, hits: &Path, output: &OutputArgs) -> Result<()> {
    let nodes = NodeTable::from_fasta(graph)?;
    let raw = std::fs::read_to_string(hits)
        .map_err(|e| anyhow::anyhow!("cannot read BLAST output '{}': {}", hits.display(), e))?;

    let scratch = tempfile::Builder::new().prefix("graph-blast-").tempdir()?;
    let config = SearchConfig::new(queries, scratch.path());
    let mut session = SearchSession::with_system_tools(config);
    session.load_queries(queries, log_progress)?;
    let summary = session.load_output(raw, &nodes)?;
    if summary.stopped_early {
        log::warn!("BLAST output ended with a malformed line; {} hits kept", summary.appended);
    }
    emit_report(&mut session, &nodes, output)
}

fn emit_report(session: &mut SearchSession, nodes: &NodeTable, output: &OutputArgs) -> Result<()> {
    session.select_target(Target::from(output.target.as_str()))?;
    let report = Report::from_session(session, nodes);

    let mut out: Box<dyn Write> = if let Some(p) = &output.out {
        let fh = std::fs::File::create(p)
            .map_err(|e| anyhow::anyhow!("cannot create report '{}': {}", p.display(), e))?;
        Box::new(std::io::BufWriter::new(fh))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };
    report.write(&mut out, output.format)?;
    out.flush()?;
    Ok(())
}
