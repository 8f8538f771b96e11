use std::{
    fs,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use asm4380::Assembler;
use clap::Parser;
use tracing::Level;

const USAGE: &str = "USAGE: asm4380 inputfile.asm";

#[derive(Parser)]
#[command(version, about = "Assembler for the 4380 virtual machine", long_about = None)]
struct Args {
    /// Assembly source file, must end in .asm
    source: PathBuf,

    /// Output file (default: source with a .bin extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the assembler state after a successful run
    #[arg(long)]
    dump: bool,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[arg(short, long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn is_asm(path: &Path) -> bool {
    let stem = path.file_stem().is_some_and(|s| !s.is_empty());
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("asm"));
    stem && ext
}

fn bin_path(source: &Path) -> PathBuf {
    source.with_extension("bin")
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        },
    };

    if !is_asm(&args.source) {
        eprintln!("{}", USAGE);
        return ExitCode::from(1);
    }

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    let input = match fs::read_to_string(&args.source) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("cant read {}: {}", args.source.display(), e);
            return ExitCode::from(3);
        },
    };

    let mut asm = Assembler::new(&input);
    tracing::trace!(source = %args.source.display(), "assembling");
    if let Err(e) = asm.run() {
        eprintln!("{}", e);
        eprintln!("{}", asm.dump());
        return ExitCode::from(2);
    }

    let output = args.output.clone().unwrap_or_else(|| bin_path(&args.source));
    if let Err(e) = fs::write(&output, asm.bytes()) {
        eprintln!("cant write {}: {}", output.display(), e);
        return ExitCode::from(3);
    }
    tracing::debug!(output = %output.display(), bytes = asm.bytes().len(), "written");

    if args.dump {
        println!("{}", asm.dump());
    }
    ExitCode::SUCCESS
}
