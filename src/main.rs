use std::io;
use std::process;

use log::error;
use simplelog::WriteLogger;

use nagios_perfdata::config::Config;
use nagios_perfdata::pipeline;


#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;


fn main() {
    let config = Config::new();
    WriteLogger::init(config.log_level, simplelog::Config::default(), io::stderr())
        .expect("Failed to initialize logging.");
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build_global()
        .expect("Failed to initialize parser threads.");

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let result = pipeline::open_input(&config)
        .and_then(|input| pipeline::run(&config, input, &mut out));

    match result {
        Ok(summary) if summary.failures > 0 => process::exit(1),
        Ok(_) => {},
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        },
    }
}
