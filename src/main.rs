//! ordwin: sliding-window correlation of sorted genomic streams
//!
//! Usage: ordwin <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;

use ordwin::bed::parse_region;
use ordwin::config::{set_strict_query_order, DEFAULT_WINDOW_ALLOWANCE};
use ordwin::error::StreamError;
use ordwin::extractor::{AcceptAll, ExtractStats, RecordFilter, RegionExclusion, VariantExtractor};
use ordwin::streaming::buffers::{output_buffer_size, DEFAULT_INPUT_BUFFER, DEFAULT_LINE_BUFFER};
use ordwin::streaming::parsing::{should_skip_line, trim_line_end};
use ordwin::streaming::{verify_sorted_regions, verify_sorted_variants, RecordWriter};
use ordwin::vcf::{VcfLine, VcfRecord, VcfVariantSource, VcfWriter};
use ordwin::window::OverlapCounter;
use ordwin::{BedRegionSource, RegionOverlapMatcher};

#[derive(Parser)]
#[command(name = "ordwin")]
#[command(version)]
#[command(about = "Sliding-window correlation of sorted genomic streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream a sorted VCF through the variant window, detecting nearby overlaps
    Extract {
        /// Input VCF file (sorted; plain or bgzipped, with optional .tbi/.csi)
        #[arg(short, long)]
        input: PathBuf,

        /// Output VCF file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Window allowance in bases
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_ALLOWANCE)]
        window: u64,

        /// BED file of regions; overlapping variants are dropped
        #[arg(short = 'x', long)]
        exclude: Option<PathBuf>,

        /// Restrict to these contigs (repeatable)
        #[arg(short = 's', long = "seq")]
        sequences: Vec<String>,

        /// Use smaller output buffers
        #[arg(long)]
        low_memory: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Flag each query interval that overlaps a sorted region file
    Overlaps {
        /// Query BED file; starts must not decrease within a chromosome
        #[arg(short, long)]
        queries: PathBuf,

        /// Region BED file (sorted; plain or bgzipped)
        #[arg(short, long)]
        regions: PathBuf,

        /// Accept queries that step backwards (results may miss regions)
        #[arg(long)]
        allow_unordered_queries: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Verify that a BED or VCF file is sorted
    CheckSorted {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value_t = Format::Vcf)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Bed,
    Vcf,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            window,
            exclude,
            sequences,
            low_memory,
            stats,
        } => run_extract(input, output, window, exclude, sequences, low_memory, stats),

        Commands::Overlaps {
            queries,
            regions,
            allow_unordered_queries,
            stats,
        } => run_overlaps(queries, regions, allow_unordered_queries, stats),

        Commands::CheckSorted { input, format } => run_check_sorted(input, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_extract(
    input: PathBuf,
    output: Option<PathBuf>,
    window: u64,
    exclude: Option<PathBuf>,
    mut sequences: Vec<String>,
    low_memory: bool,
    stats: bool,
) -> Result<(), StreamError> {
    let source = VcfVariantSource::from_path(&input)?;

    // Visit requested contigs in file order so rids never go backwards.
    // Names absent from the file are kept and simply yield nothing.
    let file_order: Vec<&String> = source.sequences().collect();
    sequences.sort_by_key(|s| {
        file_order
            .iter()
            .position(|f| *f == s)
            .unwrap_or(usize::MAX)
    });
    sequences.dedup();

    let mut header = source.header().clone();
    header.push_meta(format!("##ordwin_window_allowance={}", window));

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = VcfWriter::with_capacity(output_buffer_size(low_memory), out, &header)?;

    let extractor = VariantExtractor::new(source)
        .window_allowance(window)
        .sequences(sequences)
        .source_name(input.display().to_string());

    let result = match exclude {
        Some(path) => {
            let mut extractor =
                extractor.with_filter(RegionExclusion::new(BedRegionSource::from_path(&path)?));
            let result = run_pipeline(&mut extractor, &mut writer);
            if stats {
                eprintln!(
                    "Excluded variants: {}, Region matcher: {}",
                    extractor.filter().excluded(),
                    extractor.filter().matcher_stats()
                );
            }
            result
        }
        None => run_pipeline(&mut extractor.with_filter(AcceptAll), &mut writer),
    };

    // Whatever was flushed before a failure is kept
    writer.flush()?;
    let result = result?;

    if stats {
        eprintln!("Extract stats: {}", result);
    }
    Ok(())
}

fn run_pipeline<F, W>(
    extractor: &mut VariantExtractor<VcfVariantSource, F>,
    writer: &mut VcfWriter<W>,
) -> Result<ExtractStats, StreamError>
where
    F: RecordFilter<VcfRecord>,
    W: Write,
{
    extractor.run::<VcfLine, _, _>(writer, OverlapCounter::default())
}

fn run_overlaps(
    queries: PathBuf,
    regions: PathBuf,
    allow_unordered_queries: bool,
    stats: bool,
) -> Result<(), StreamError> {
    if allow_unordered_queries {
        set_strict_query_order(false);
    }

    let mut matcher = RegionOverlapMatcher::new(BedRegionSource::from_path(&regions)?);
    let mut reader = BufReader::with_capacity(DEFAULT_INPUT_BUFFER, File::open(&queries)?);
    let stdout = io::stdout();
    let mut out = RecordWriter::new(stdout.lock());

    let mut line = Vec::with_capacity(DEFAULT_LINE_BUFFER);
    let mut line_num = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_num += 1;
        if should_skip_line(&line) {
            continue;
        }

        let line = trim_line_end(&line);
        let query = parse_region(line, line_num)?;
        let hit = matcher.overlaps(query.chrom(), query.start1(), query.end1())?;

        out.write_flagged(line, hit)?;
    }
    out.flush()?;

    if stats {
        eprintln!("Overlap stats: {}", matcher.stats());
    }
    Ok(())
}

fn run_check_sorted(input: PathBuf, format: Format) -> Result<(), StreamError> {
    let count = match format {
        Format::Bed => verify_sorted_regions(&input)?,
        Format::Vcf => {
            let mut source = VcfVariantSource::from_path(&input)?;
            let name = input.display().to_string();
            verify_sorted_variants(&mut source, &name)?
        }
    };
    eprintln!("{}: sorted ({} records)", input.display(), count);
    Ok(())
}
