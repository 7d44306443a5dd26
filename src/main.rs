use std::process;

use clap::Parser;
use env_logger::Builder;
use log::{error, info, LevelFilter};

use bgpcfg::cli::{run, Args};

fn main() {
    let args = Args::parse();

    let (bgpcfg_level, other_level) = match args.verbose {
        0 => (LevelFilter::Info, LevelFilter::Warn),
        1 => (LevelFilter::Debug, LevelFilter::Warn),
        2 => (LevelFilter::Trace, LevelFilter::Warn),
        _ => (LevelFilter::Trace, LevelFilter::Trace),
    };
    Builder::new()
        .filter(Some("bgpcfg"), bgpcfg_level)
        .filter(None, other_level)
        .init();
    info!("Logging at levels {}/{}", bgpcfg_level, other_level);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Starting runtime: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run(&args)) {
        error!("{}", err);
        process::exit(err.exit_code());
    }
}
