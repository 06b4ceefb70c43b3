use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::io;
use subnet_overlap::{find_overlaps, read_cidrs, sort_by_binary, SortKey};

/// Sort CIDRs read from stdin by address value and report overlapping pairs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Order by the legacy decimal reading of the bit string
    #[arg(long)]
    legacy_order: bool,

    /// Only print the sorted list
    #[arg(long)]
    no_overlaps: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts = Opts::parse();
    init_logging(opts.verbose)?;
    log::info!("#Start main() {:?}", opts);

    let mut list = read_cidrs(io::stdin().lock())?;

    let key = if opts.legacy_order {
        SortKey::LegacyDecimal
    } else {
        SortKey::Binary
    };
    sort_by_binary(&mut list, key);
    for cidr in &list {
        println!("{}", cidr);
    }

    if !opts.no_overlaps {
        for (i, j) in find_overlaps(&list) {
            println!("{} overlaps {}", list[i], list[j]);
        }
    }
    Ok(())
}
