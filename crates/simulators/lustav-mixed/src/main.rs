use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use lustav_mixed::simulation::builder::SimulationBuilder;
use lustav_mixed::simulation::config::ConfigResult;
use lustav_output::terminal::browse_plots;
use lustav_runner::runner::run_study;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: String,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();
    match run(&args) {
        Ok(()) => {
            let elapsed = start.elapsed();
            info!("Study finished in {} ms", elapsed.as_millis());
            println!("Study finished in {} ms.", elapsed.as_millis());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Study failed: {}", e);
            eprintln!("lustav-mixed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> ConfigResult<()> {
    let mut builder = SimulationBuilder::new(&args.config)?;
    let sweep = builder.build()?;
    let outcomes = run_study(sweep, builder.metadata(), builder.renderer(), builder.show_ui())?;
    builder.write_results(&outcomes)?;
    if builder.show_ui() {
        browse_plots(builder.plots(&outcomes))?;
    }
    Ok(())
}
