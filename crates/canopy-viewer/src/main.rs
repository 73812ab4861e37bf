use std::process;

use canopy_viewer::report;
use canopy_viewer::runner::{self, ViewerOptions, USAGE};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match ViewerOptions::parse(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            eprintln!("{USAGE}");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    match runner::run(&options) {
        Ok(run_report) => {
            println!("\n## Canopy Viewer\n");
            println!("{}", report::format_markdown(&run_report));
        }
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    }
}
