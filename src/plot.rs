use super::VERSION;
use crate::chart::Chart;
use crate::clut::render_cluts;
use crate::stats::SeriesStats;
use crate::{parse_logs, Error};
use clap::{App, Arg, ArgMatches};
use log::{info, warn, LevelFilter};
use std::path::PathBuf;

/// Settings of one `battery_plot` run
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArgs {
    pub files: Vec<PathBuf>,
    pub title: String,
    pub show: bool,
    pub clut: Option<usize>,
    pub log_level: LevelFilter,
}

fn validate_buckets(v: String) -> Result<(), String> {
    match v.parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(format!("'{}' is not a positive integer", v)),
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    let arg_files = Arg::with_name("files")
        .help("data log file(s) to plot")
        .multiple(true)
        .required(true);
    let arg_title = Arg::with_name("title")
        .help("title of the plot, also the name of the svg file")
        .short("t")
        .long("title")
        .takes_value(true);
    let arg_show = Arg::with_name("show")
        .help("show the plot instead of saving it")
        .short("s")
        .long("show")
        .takes_value(false);
    let arg_clut = Arg::with_name("clut")
        .help("print a voltage to state-of-charge lookup table with this many buckets")
        .short("c")
        .long("clut")
        .takes_value(true)
        .validator(validate_buckets);
    let arg_verbose = Arg::with_name("verbose")
        .help("print more information, repeat for even more")
        .short("v")
        .long("verbose")
        .multiple(true)
        .takes_value(false);
    let arg_quiet = Arg::with_name("quiet")
        .help("print errors only")
        .short("q")
        .long("quiet")
        .takes_value(false)
        .conflicts_with("verbose");
    App::new("battery_plot")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to plot battery discharge logs and derive soc lookup tables")
        .arg(arg_files)
        .arg(arg_title)
        .arg(arg_show)
        .arg(arg_clut)
        .arg(arg_verbose)
        .arg(arg_quiet)
}

impl PlotArgs {
    fn from_matches(cli_args: &ArgMatches) -> PlotArgs {
        let files = cli_args
            .values_of("files")
            .map(|v| v.map(PathBuf::from).collect())
            .unwrap_or_default();
        let title = String::from(cli_args.value_of("title").unwrap_or_default());
        let clut = cli_args.value_of("clut").and_then(|v| v.parse::<usize>().ok());
        let log_level = if cli_args.is_present("quiet") {
            LevelFilter::Error
        } else {
            match cli_args.occurrences_of("verbose") {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        PlotArgs {
            files,
            title,
            show: cli_args.is_present("show"),
            clut,
            log_level,
        }
    }

    /// parse an argument list, the first item is the program name
    pub fn from_iter_safe<I, T>(args: I) -> Result<PlotArgs, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli_args = app().get_matches_from_safe(args)?;
        Ok(PlotArgs::from_matches(&cli_args))
    }
}

/// Takes the CLI arguments that control plotting and table generation,
/// exits with the usage message on invalid arguments.
pub fn parse_cli() -> PlotArgs {
    let cli_args = app().get_matches();
    PlotArgs::from_matches(&cli_args)
}

/// Parse the logs, print the lookup tables if requested, then save or show the chart.
/// An empty series collection is `Error::NoData`.
pub fn run(args: &PlotArgs) -> Result<(), Error> {
    let (series, skipped) = parse_logs(&args.files[..])?;
    if !skipped.is_empty() {
        warn!("skipped {} of {} file(s)", skipped.len(), args.files.len());
    }
    if series.is_empty() {
        return Err(Error::NoData);
    }

    for (name, record) in series.iter() {
        match SeriesStats::from_record(name, record) {
            Ok(s) => info!("{}", s),
            Err(e) => warn!("no statistics, {}", e),
        }
    }

    if let Some(buckets) = args.clut {
        let tables = render_cluts(&series, buckets)?;
        print!("{}", tables);
    }

    let chart = Chart::new(&args.title);
    if args.show {
        let fout = chart.show(&series)?;
        info!("showing {}", fout.display());
    } else {
        chart.save(&series, &chart.output_path())?;
    }
    Ok(())
}
