use std::io;

use anyhow::Result;
use log::debug;

use rust_cpn::config::SimConfig;
use rust_cpn::options::{Options, ReportFormat};
use rust_cpn::report::{JsonReporter, Reporter, TextReporter};
use rust_cpn::simulator::Simulator;

fn main() {
    if std::env::var("CPN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("CPN_LOG")
            .write_style("CPN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = Options::parse_from_env_and_args(std::env::args().skip(1))?;
    debug!("cpn options: {:?}", options);

    let mut config = SimConfig::load_from_file(&options.config)?;
    options.apply(&mut config);
    debug!("simulation config: {:?}", config);

    let mut net = options.load_net(&config)?;
    options.report_diagnostics(&net)?;

    let mut source = options.sequence_source(&config);
    let mut reporter: Box<dyn Reporter> = match options.report {
        ReportFormat::Text => Box::new(TextReporter::stdout()),
        ReportFormat::Json => Box::new(JsonReporter::new(io::stdout())),
    };

    Simulator::from_config(&config).run_source(&mut net, source.as_mut(), reporter.as_mut())?;
    Ok(())
}
