use clap::{ArgGroup, Args, Parser, Subcommand};
use ipasn::asnames;
use ipasn::download::{download_for_dates, download_latest, ArchiveFamily};
use ipasn::dump::{dump_prefixes_to_file, dump_screen};
use ipasn::error::IpasnError;
use ipasn::parser::{parse_rib_dump, ConvertOptions, MrtDumpReader, ParseMode};
use log::{info, warn};
use regex::Regex;
use std::fs;
use std::path::PathBuf;

/// Offline MRT/RIB conversion and IP-to-ASN lookup tooling.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert MRT/RIB archives to IPASN databases.
    Convert(ConvertArgs),
    /// Download MRT/RIB archives from RouteViews.
    Download(DownloadArgs),
    /// Build the AS-names JSON table from the autnums listing.
    Asnames(AsnamesArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("action").required(true).args(["single", "bulk", "dump_screen"])))]
struct ConvertArgs {
    /// Convert a single archive: RIBFILE IPASN.DAT
    #[arg(long, num_args = 2, value_names = ["RIBFILE", "IPASN.DAT"])]
    single: Option<Vec<String>>,

    /// Bulk conversion over a date range (dates are Y-M-D; archives named
    /// rib.YYYYMMDD.*.bz2 are picked up from the current directory).
    #[arg(long, num_args = 2, value_names = ["START-DATE", "END-DATE"])]
    bulk: Option<Vec<String>>,

    /// Parse an archive and dump its records to stdout.
    #[arg(long, value_name = "RIBFILE")]
    dump_screen: Option<PathBuf>,

    /// Don't log conversion progress (with --single).
    #[arg(long)]
    no_progress: bool,

    /// Skip records which fail conversion, instead of stopping (with --single).
    #[arg(long)]
    skip_on_error: bool,

    /// gzip the IPASN output files.
    #[arg(long)]
    compress: bool,

    /// Start dump from record N (with --dump-screen).
    #[arg(long, value_name = "N")]
    record_from: Option<usize>,

    /// End dump at record N (with --dump-screen).
    #[arg(long, value_name = "N")]
    record_to: Option<usize>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["latest4", "latest6", "latest46", "dates_from_file"])
))]
struct DownloadArgs {
    /// Grab the latest IPv4 archive.
    #[arg(long, short = '4')]
    latest4: bool,

    /// Grab the latest IPv6 archive.
    #[arg(long, short = '6')]
    latest6: bool,

    /// Grab the latest combined IPv4/IPv6 archive.
    #[arg(long)]
    latest46: bool,

    /// Grab IPv4 archives for specific dates (one YYYYMMDD per line).
    #[arg(long, short = 'f', value_name = "FILE")]
    dates_from_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AsnamesArgs {
    /// Input html file with AS names (fetched from cidr-report when absent).
    #[arg(short = 'i', long = "html-input", value_name = "HTML")]
    input: Option<PathBuf>,

    /// Output file name (defaults to stdout).
    #[arg(short = 'o', long = "output", value_name = "JSON")]
    output: Option<PathBuf>,

    /// Keep the fetched autnums.html next to the output.
    #[arg(short = 'p', long)]
    persist_html: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Download(args) => run_download(args),
        Command::Asnames(args) => run_asnames(args),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), IpasnError> {
    if let Some(single) = &args.single {
        let (rib_path, out_path) = (&single[0], &single[1]);
        let opts = ConvertOptions {
            show_progress: !args.no_progress,
            skip_on_error: args.skip_on_error,
            ..ConvertOptions::default()
        };
        let reader = MrtDumpReader::open(rib_path)?;
        let prefixes = parse_rib_dump(reader, &opts)?;
        let written = dump_prefixes_to_file(&prefixes, out_path, rib_path, args.compress)?;
        if !args.no_progress {
            let n6 = prefixes.keys().filter(|p| p.addr().is_ipv6()).count();
            info!(
                "IPASN database saved to {written} ({} IPv4 + {n6} IPv6 prefixes)",
                prefixes.len() - n6
            );
        }
        return Ok(());
    }

    if let Some(bulk) = &args.bulk {
        return run_bulk(&bulk[0], &bulk[1], args.compress);
    }

    if let Some(rib_path) = &args.dump_screen {
        let reader = MrtDumpReader::open_with_mode(rib_path, ParseMode::Strict)?;
        let mut stdout = std::io::stdout().lock();
        return dump_screen(reader, &mut stdout, args.record_from, args.record_to);
    }

    unreachable!("clap enforces exactly one action");
}

fn run_bulk(start: &str, end: &str, compress: bool) -> Result<(), IpasnError> {
    let parse_date = |s: &str| {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| IpasnError::ParseError(format!("malformed date '{s}', try YYYY-MM-DD")))
    };
    let mut date = parse_date(start)?;
    let end = parse_date(end)?;

    info!("starting bulk RIB conversion, from {date} to {end}");
    while date <= end {
        let stamp = date.format("%Y%m%d").to_string();
        let pattern =
            Regex::new(&format!(r"^rib\.{stamp}\..{{4}}\.bz2$")).expect("static pattern compiles");
        let mut matches: Vec<String> = fs::read_dir(".")?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| pattern.is_match(name))
            .collect();
        matches.sort();

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };

        let dump_file = match matches.first() {
            Some(first) => {
                if matches.len() > 1 {
                    warn!("multiple archives for {stamp}, only converting {first}");
                }
                first.clone()
            }
            None => continue,
        };

        info!("{dump_file}...");
        let reader = MrtDumpReader::open(&dump_file)?;
        let prefixes = parse_rib_dump(reader, &ConvertOptions::default())?;
        let out_file = format!("ipasn_{stamp}.dat");
        dump_prefixes_to_file(&prefixes, &out_file, &dump_file, compress)?;
    }
    info!("finished!");
    Ok(())
}

fn run_download(args: DownloadArgs) -> Result<(), IpasnError> {
    if let Some(dates_file) = &args.dates_from_file {
        let files = download_for_dates(dates_file)?;
        info!("downloaded {} archive(s)", files.len());
        return Ok(());
    }

    let family = if args.latest6 {
        ArchiveFamily::V6
    } else if args.latest46 {
        ArchiveFamily::V46
    } else {
        ArchiveFamily::V4
    };
    let filename = download_latest(family)?;
    info!("download complete: {filename}");
    Ok(())
}

fn run_asnames(args: AsnamesArgs) -> Result<(), IpasnError> {
    let html = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let html = asnames::fetch_autnums_html()?;
            if args.persist_html {
                fs::write("autnums.html", &html)?;
            }
            html
        }
    };

    let names = asnames::parse_autnums_html(&html);
    let json = asnames::names_to_json(&names)?;
    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
