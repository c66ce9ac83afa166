use anyhow::{Context, Result};
use clap::{Arg, Command};
use env_logger::Env;
use humdrum::util::format_float;
use humdrum::{HumdrumFile, ParseOptions, RationalNumber, recip_to_duration};
use log::info;

fn print_line_timings(file: &HumdrumFile, beat_duration: RationalNumber) {
    println!("dur\tdfs\tdfb\tdtb\tbeat\tbeatf\tline");
    for line in file.lines() {
        let beat = line.beat(beat_duration);
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            line.duration(),
            line.duration_from_start(),
            line.duration_from_barline(),
            line.duration_to_barline(),
            beat.to_mixed_string("+"),
            format_float(beat.to_f64()),
            line.text()
        );
    }
}

fn print_barlines(file: &HumdrumFile) {
    println!("index\tline\tbar\tstyle\tdur\tdfs\tdte");
    for index in 0..file.barline_count() {
        let Some(line) = file.barline(index) else {
            continue;
        };
        let bar = line
            .bar_number()
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let style = line
            .barline_style()
            .map_or_else(|| "pickup".to_string(), |s| s.to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            index,
            line.line_number(),
            bar,
            style,
            file.barline_duration(index).unwrap_or_default(),
            file.barline_duration_from_start(index).unwrap_or_default(),
            file.barline_duration_to_end(index).unwrap_or_default()
        );
    }
}

fn main() -> Result<()> {
    let matches = Command::new("humdrum")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Humdrum spine and rhythm analyzer")
        .arg(
            Arg::new("input")
                .help("Input Humdrum file")
                .required(true)
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .help("Enable debug logging")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("scale")
                .help("Duration units per whole note (e.g. 1 for whole notes, 4 for quarters)")
                .long("scale")
                .value_name("N")
                .default_value("1")
                .value_parser(clap::value_parser!(RationalNumber)),
        )
        .arg(
            Arg::new("no-rhythm")
                .help("Only build the spine graph")
                .long("no-rhythm")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("barlines")
                .help("Print one row per measure instead of one per line")
                .long("barlines")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("beat")
                .help("Rhythm code of one beat (e.g. 4 for quarter-note beats, 4. for dotted quarters)")
                .long("beat")
                .value_name("RECIP")
                .default_value("4"),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    env_logger::Builder::from_env(Env::default().default_filter_or(if verbose {
        "debug"
    } else {
        "info"
    }))
    .init();

    let input_file = matches
        .get_one::<String>("input")
        .context("Missing input file")?;
    let scale = matches
        .get_one::<RationalNumber>("scale")
        .copied()
        .unwrap_or_else(RationalNumber::one);
    let analyze_rhythm = !matches.get_flag("no-rhythm");
    let beat = matches.get_one::<String>("beat").map_or("4", |s| s.as_str());

    let options = ParseOptions::new()
        .with_scale(scale)
        .with_rhythm(analyze_rhythm);
    let beat_duration = recip_to_duration(beat, scale, &options.subtoken_separator)
        .with_context(|| format!("Invalid beat: {}", beat))?;

    let mut file = HumdrumFile::with_options(options);
    file.read_path(input_file)
        .with_context(|| format!("Failed to parse Humdrum file: {}", input_file))?;

    info!(
        "Read {} lines, {} tracks from {}",
        file.line_count(),
        file.max_track(),
        input_file
    );

    if !analyze_rhythm {
        print!("{}", file);
    } else if matches.get_flag("barlines") {
        print_barlines(&file);
    } else {
        print_line_timings(&file, beat_duration);
    }

    Ok(())
}
