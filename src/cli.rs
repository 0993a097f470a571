//! Command line: gen (rich → plain source) and explain (one tag).
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command as Process, Stdio};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use quote::ToTokens;
use rayon::prelude::*;

use und::Constraint;
use und::codegen::{self, GenError};
use und::plain::{self, Kind};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate plain structs from structs tagged with `#[und("..")]` constraints
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// debug logging (RUST_LOG still applies)
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// rewrite every tagged struct of the input files
    Gen(GenOut),
    /// show what a single tag turns a field into
    Explain(ExplainOut),
}

#[derive(Args, Debug, Clone)]
struct GenOut {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// write outputs here instead of next to each input
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// appended to the input file stem
    #[arg(long, default_value = "_plain")]
    suffix: String,

    /// skip rustfmt
    #[arg(long, default_value_t = false)]
    no_fmt: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum KindArg {
    Option,
    Und,
    Elastic,
}

#[derive(Args, Debug, Clone)]
struct ExplainOut {
    /// container kind of the field
    #[arg(long, value_enum, default_value_t = KindArg::Elastic)]
    kind: KindArg,

    /// element type used in the output
    #[arg(long, default_value = "T")]
    elem: String,

    /// the tag, e.g. "required,len==2"
    tag: String,
}

/// What happened to one input file.
enum Outcome {
    Written { output: PathBuf, structs: Vec<String>, errors: Vec<GenError> },
    Nothing { errors: Vec<GenError> },
    Skipped,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Gen(target) => target.run(),
            Command::Explain(target) => target.run(),
        }
    }
}

impl From<KindArg> for Kind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Option => Kind::Option,
            KindArg::Und => Kind::Und,
            KindArg::Elastic => Kind::Elastic,
        }
    }
}

impl GenOut {
    fn run(&self) -> anyhow::Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        if let Some(dir) = &self.out_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let results: Vec<(PathBuf, anyhow::Result<Outcome>)> = source_paths
            .into_par_iter()
            .map(|path| {
                let outcome = self.process(&path);
                (path, outcome)
            })
            .collect();

        let mut failed = 0usize;
        for (path, result) in results {
            let shown = path.display();
            match result {
                Ok(Outcome::Written { output, structs, errors }) => {
                    println!("{} {shown} → {} ({})", "ok".green(), output.display(), structs.join(", "));
                    failed += report(&shown.to_string(), &errors);
                }
                Ok(Outcome::Nothing { errors }) => {
                    if errors.is_empty() {
                        println!("{} {shown}: no tagged structs", "--".dimmed());
                    }
                    failed += report(&shown.to_string(), &errors);
                }
                Ok(Outcome::Skipped) => {
                    tracing::warn!(path = %shown, "generated file, skipped");
                }
                Err(error) => {
                    println!("{} {shown}: {error:#}", "error".red());
                    failed += 1;
                }
            }
        }
        if failed > 0 {
            bail!("{failed} error(s)");
        }
        Ok(())
    }

    fn process(&self, path: &Path) -> anyhow::Result<Outcome> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file {}", path.display()))?;
        let generated = codegen::generate_file(&source)?;
        if generated.skipped {
            return Ok(Outcome::Skipped);
        }
        if generated.is_empty() {
            return Ok(Outcome::Nothing { errors: generated.errors });
        }

        let mut rust_src = generated.render();
        if !self.no_fmt {
            rust_src = rustfmt(&rust_src).unwrap_or_else(|error| {
                tracing::warn!(error = %error, "rustfmt unavailable, writing unformatted output");
                rust_src
            });
        }

        let output = self.output_path(path);
        std::fs::write(&output, &rust_src)
            .with_context(|| format!("failed to write {}", output.display()))?;
        Ok(Outcome::Written { output, structs: generated.structs, errors: generated.errors })
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let name = format!("{stem}{}.rs", self.suffix);
        match &self.out_dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }
}

impl ExplainOut {
    fn run(&self) -> anyhow::Result<()> {
        let kind = Kind::from(self.kind);
        let constraint = Constraint::parse(&self.tag)?;
        let elem: syn::Type = syn::parse_str(&self.elem)
            .with_context(|| format!("not a type: {}", self.elem))?;
        let elem = elem.to_token_stream();

        println!("{}  {constraint}", "tag".bold());
        println!("{}  {kind}<{}>", "kind".bold(), self.elem);
        match plain::select(kind, &constraint)? {
            None => println!("{}  unchanged", "plain".bold()),
            Some(conv) => {
                let steps: Vec<String> = conv.steps.iter().map(ToString::to_string).collect();
                println!("{}  {}", "plain".bold(), conv.plain_ty().render(&self.elem).green());
                println!("{}  {} | {}", "steps".bold(), steps.join(" → "), conv.wrap);
                println!("{}  {}", "forward".bold(), conv.forward(quote::quote!(rich), &elem));
                println!("{}  {}", "backward".bold(), conv.backward(quote::quote!(plain), &elem));
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn report(path: &str, errors: &[GenError]) -> usize {
    for error in errors {
        println!("{} {path}: {error}", "error".red());
    }
    errors.len()
}

fn rustfmt(src: &str) -> anyhow::Result<String> {
    let mut child = Process::new("rustfmt")
        .args(["--edition", "2024", "--emit", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to start rustfmt")?;
    child
        .stdin
        .take()
        .context("rustfmt stdin")?
        .write_all(src.as_bytes())?;
    let output = child.wait_with_output()?;
    if !output.status.success() {
        bail!("rustfmt exited with {}", output.status);
    }
    Ok(String::from_utf8(output.stdout)?)
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
