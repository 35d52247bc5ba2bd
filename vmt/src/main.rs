use clap::Parser;
use color_print::cprintln;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use vmt::error::{Diag, Error};
use vmt::Translator;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input: .vm files, or a single directory of .vm files
    #[clap(required = true)]
    input: Vec<String>,

    /// Output file (defaults to the input name with .asm)
    #[clap(short, long)]
    output: Option<String>,

    /// Print the generated assembly
    #[clap(short, long)]
    dump: bool,

    /// Annotate output with instruction indices and source echoes
    #[clap(short, long)]
    annotate: bool,

    /// Skip the SP=256 / call Sys.init bootstrap prefix
    #[clap(long)]
    no_bootstrap: bool,
}

fn main() {
    let args = Args::parse();

    let (files, output) = match expand(&args) {
        Ok(ok) => ok,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            std::process::exit(1);
        }
    };

    println!("1. Translate Units");
    let mut translator = Translator::new(!args.no_bootstrap, args.annotate);
    let mut failed = false;
    for path in &files {
        println!("  < {}", path.display());
        if let Err(diags) = translate_file(&mut translator, path) {
            for diag in &diags {
                diag.print();
            }
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }

    println!("2. Write Assembly");
    println!("  > {}", output.display());
    let lines = translator.into_lines();
    if args.dump {
        for line in &lines {
            println!("{}", line);
        }
    }
    if let Err(err) = write_asm(&output, &lines) {
        cprintln!("<red,bold>error</>: {}", err);
        std::process::exit(1);
    }
}

/// Expand the CLI inputs into source files plus the output path. A
/// single directory argument means every .vm file inside it, sorted by
/// name so the output is deterministic.
fn expand(args: &Args) -> Result<(Vec<PathBuf>, PathBuf), Error> {
    let inputs: Vec<PathBuf> = args.input.iter().map(PathBuf::from).collect();

    if let [dir] = inputs.as_slice() {
        if dir.is_dir() {
            let entries = std::fs::read_dir(dir)
                .map_err(|e| Error::FileOpen(dir.display().to_string(), e))?;
            let mut files = vec![];
            for entry in entries {
                let entry = entry.map_err(|e| Error::FileOpen(dir.display().to_string(), e))?;
                let path = entry.path();
                if path.extension().map_or(false, |ext| ext == "vm") {
                    files.push(path);
                }
            }
            files.sort();
            let name = dir.file_name().and_then(|s| s.to_str()).unwrap_or("out");
            let output = match &args.output {
                Some(out) => PathBuf::from(out),
                None => dir.join(format!("{}.asm", name)),
            };
            return Ok((files, output));
        }
    }

    let output = match &args.output {
        Some(out) => PathBuf::from(out),
        None => match inputs.first() {
            Some(first) => first.with_extension("asm"),
            None => PathBuf::from("out.asm"),
        },
    };
    Ok((inputs, output))
}

fn translate_file(translator: &mut Translator, path: &Path) -> Result<(), Vec<Diag>> {
    let unit = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Main")
        .to_string();
    let text = read_source(path).map_err(|err| vec![Diag::new(err, &unit, 0, "")])?;
    translator.translate(&unit, text.lines().map(String::from))
}

fn read_source(path: &Path) -> Result<String, Error> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| Error::FileOpen(path.display().to_string(), e))?;
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| Error::FileRead(path.display().to_string(), e))?;
    Ok(text)
}

fn write_asm(path: &Path, lines: &[String]) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)
        .map_err(|e| Error::FileCreate(path.display().to_string(), e))?;
    for line in lines {
        writeln!(file, "{}", line).map_err(|e| Error::FileWrite(path.display().to_string(), e))?;
    }
    Ok(())
}
