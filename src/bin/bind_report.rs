use bindscope_rs::analysis::{Analysis, AnalyzerConfig, View, analyze_file};
use bindscope_rs::job::JobLabel;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(
    name = "bind_report",
    about = "Rebuild node/NUMA/NIC topology and MPI/OpenMP affinity from a job launch log"
)]
struct Args {
    /// Job output file containing MPICH / CCE OpenMP affinity diagnostics
    input: Option<PathBuf>,

    /// Enable verbose diagnostic tracing (on stderr)
    #[arg(long, alias = "debug")]
    verbose: bool,

    /// Report view: table, tree or both
    #[arg(long)]
    view: Option<String>,

    /// List every core and logical CPU in the tree view
    #[arg(long)]
    detailed_cpus: bool,

    /// Hyperthread id stride (cpu id >= stride belongs to core id - stride)
    #[arg(long)]
    ht_stride: Option<u32>,

    /// Print a JSON snapshot instead of the text report
    #[arg(long)]
    json: bool,

    /// Analyzer config (JSON); command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_view(raw: Option<&str>, default: View) -> View {
    match raw {
        Some("table") => View::Table,
        Some("tree") => View::Tree,
        Some("both") => View::Both,
        Some(other) => {
            eprintln!("unknown view `{other}`, using {default:?}");
            default
        }
        None => default,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn load_config(args: &Args) -> AnalyzerConfig {
    let mut cfg = match &args.config {
        Some(path) => match AnalyzerConfig::from_json_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("error: {err}");
                process::exit(1);
            }
        },
        None => AnalyzerConfig::default(),
    };
    cfg.verbose |= args.verbose;
    cfg.detailed_cpus |= args.detailed_cpus;
    cfg.view = parse_view(args.view.as_deref(), cfg.view);
    if let Some(stride) = args.ht_stride {
        cfg.ht_stride = stride;
    }
    cfg
}

fn main() {
    let args = Args::parse();
    let Some(input) = args.input.clone() else {
        println!("{}", Args::command().render_usage());
        process::exit(1);
    };

    let cfg = load_config(&args);
    init_tracing(cfg.verbose);

    let (analysis, status) = match analyze_file(&input, &cfg) {
        Ok(analysis) => (analysis, 0),
        Err(err) => {
            eprintln!("Warning: {err}");
            (Analysis::empty(JobLabel::from_path(&input)), 1)
        }
    };

    if args.json {
        match analysis.snapshot(&cfg).to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: cannot serialize report: {err}");
                process::exit(1);
            }
        }
    } else {
        print!("{}", analysis.render(&cfg));
    }

    if status != 0 {
        process::exit(status);
    }
}
