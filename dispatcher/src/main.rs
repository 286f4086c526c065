// dispatcher/src/main.rs

use std::io;
use std::path::Path;
use std::process;
use std::time::Duration;
use clap::{App, Arg, ArgMatches, crate_version, value_t};
use log::error;
use mlqd::config::DEFAULT_TICK_MS;
use mlqd::task::SimulatedControl;
use mlqd::timer::{Clock, SleepClock, VirtualClock};
use mlqd::{Dispatcher, JobRecord, Result, SchedParams, Summary, console, loader};

fn main() {
    let default_tick = DEFAULT_TICK_MS.to_string();
    let matches = App::new("mlqd")
        .version(crate_version!())
        .about("Multi-level queue dispatcher with buddy memory allocation")
        .arg(
            Arg::with_name("JOBFILE")
                .help("Job list, one `arrival, service, memory` record per line")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .env("MLQD_TICK_MS")
                .default_value(&default_tick)
                .help("Real milliseconds slept per simulated tick"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more, repeat for more detail"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .conflicts_with("verbose")
                .help("Only log errors"),
        )
        .get_matches();

    console::init(console::level_for(
        matches.occurrences_of("verbose"),
        matches.is_present("quiet"),
    ));

    if let Err(err) = run(&matches) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let tick_ms = value_t!(matches, "tick-ms", u64).unwrap_or_else(|e| e.exit());
    // JOBFILE is required, clap has already rejected a missing one
    let path = Path::new(matches.value_of("JOBFILE").unwrap_or_default());

    let jobs = loader::load_jobs(path)?;
    let params = SchedParams::prompt(&mut io::stdin().lock(), &mut io::stdout().lock())?;

    let summary = if tick_ms == 0 {
        simulate(params, &jobs, VirtualClock::new())?
    } else {
        simulate(params, &jobs, SleepClock::new(Duration::from_millis(tick_ms)))?
    };
    summary.report(&mut io::stdout().lock())?;
    Ok(())
}

fn simulate<K: Clock>(params: SchedParams, jobs: &[JobRecord], clock: K) -> Result<Summary> {
    let mut dispatcher = Dispatcher::new(params, jobs, SimulatedControl::new(), clock, io::stdout());
    dispatcher.run()
}
