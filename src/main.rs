use clap::ArgMatches;
use log::error;

use kvbench::config::{self, SequentialConfig, TimerConfig};
use kvbench::{Result, SystemClock};

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("timer", Some(matches)) => {
            let config = TimerConfig::from_matches(matches)?;
            let mut client = config.target.connect()?;

            let report = config.bench.run(&mut client, SystemClock::default())?;
            client.close()?;

            println!("{}", report);
        }
        ("sequential", Some(matches)) => {
            let config = SequentialConfig::from_matches(matches)?;
            let mut client = config.target.connect()?;

            let report = config.bench.run(&mut client, SystemClock::default())?;
            client.close()?;

            println!("{}", report);
        }
        // SubcommandRequiredElseHelp keeps clap from getting here
        _ => unreachable!(),
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let matches = config::app().get_matches();
    if let Err(err) = run(&matches) {
        error!("{:?}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
