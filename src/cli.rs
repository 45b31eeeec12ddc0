//! Minimal CLI: resolve pointers/references in JSON documents, check constraints.
use std::path::PathBuf;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::constraint::{CountConstraint, NumberConstraint, PatternConstraint, RangeOptions};
use crate::number::UniversalNumber;
use crate::pointer::{JsonPointer, JsonPointerEvaluationOptions};
use crate::reference::Reference;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// resolve JSON Pointers / references against documents and validate schema constraints
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// evaluate a pointer or reference URI against each input document
    Resolve(ResolveArgs),
    /// validate the node a pointer selects against range/pattern constraints
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON Pointer to evaluate (e.g. /components/schemas/Pet)
    #[arg(long, conflicts_with = "reference")]
    json_pointer: Option<String>,

    /// Reference URI; any URL part is ignored, the fragment supplies the pointer
    /// (e.g. 'pets.json#/components/schemas/Pet')
    #[arg(long)]
    reference: Option<String>,

    /// missing object keys resolve to null instead of failing
    #[arg(long)]
    missing_null: bool,

    /// indexing into scalars resolves to null instead of failing
    #[arg(long)]
    primitive_null: bool,

    /// object-style keys on arrays resolve to null instead of failing
    #[arg(long)]
    array_member_null: bool,

    /// out-of-range, '-', or malformed array indices resolve to null
    #[arg(long)]
    invalid_index_null: bool,

    /// once any step is null, the rest of the path collapses to null
    #[arg(long)]
    null_coalescing: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON Pointer selecting the subject node (whole document if omitted)
    #[arg(long)]
    json_pointer: Option<String>,

    /// lower bound (inclusive unless --exclusive-min)
    #[arg(long)]
    min: Option<String>,

    /// upper bound (inclusive unless --exclusive-max)
    #[arg(long)]
    max: Option<String>,

    #[arg(long)]
    exclusive_min: bool,

    #[arg(long)]
    exclusive_max: bool,

    /// subject must be an exact multiple of this
    #[arg(long)]
    multiple_of: Option<String>,

    /// minimum count (array items / string chars / object properties), inclusive
    #[arg(long)]
    min_count: Option<u32>,

    /// maximum count (array items / string chars / object properties), inclusive
    #[arg(long)]
    max_count: Option<u32>,

    /// exact count; shorthand for equal --min-count/--max-count
    #[arg(long, conflicts_with_all = ["min_count", "max_count"])]
    exact_count: Option<u32>,

    /// regex the subject string must fully match (case-insensitive)
    #[arg(long)]
    pattern: Option<String>,

    /// an absent subject is itself a failure (pattern checks only)
    #[arg(long)]
    required: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> anyhow::Result<Vec<(PathBuf, serde_json::Value)>> {
        let source_paths =
            resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut out = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let document = crate::path_de::load_document(&source_path)?;
            out.push((source_path, document));
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Resolve(target) => run_resolve(target),
            Command::Check(target) => run_check(target),
        }
    }
}

fn run_resolve(target: &ResolveArgs) -> anyhow::Result<()> {
    let pointer = match (&target.json_pointer, &target.reference) {
        (Some(text), None) => JsonPointer::parse(text)?,
        (None, Some(uri)) => Reference::parse_url(uri)?.pointer().clone(),
        (None, None) => bail!("pass --json-pointer or --reference"),
        (Some(_), Some(_)) => unreachable!("clap enforces the conflict"),
    };

    let mut options = JsonPointerEvaluationOptions::empty();
    if target.missing_null {
        options |= JsonPointerEvaluationOptions::MISSING_MEMBERS_ARE_NULL;
    }
    if target.primitive_null {
        options |= JsonPointerEvaluationOptions::PRIMITIVE_MEMBERS_AND_INDICIES_ARE_NULL;
    }
    if target.array_member_null {
        options |= JsonPointerEvaluationOptions::ARRAY_MEMBERS_ARE_NULL;
    }
    if target.invalid_index_null {
        options |= JsonPointerEvaluationOptions::INVALID_INDICIES_ARE_NULL;
    }
    if target.null_coalescing {
        options |= JsonPointerEvaluationOptions::NULL_COALESCING;
    }

    let mut results = Vec::new();
    for (source_path, document) in target.input_settings.load_documents()? {
        let node = pointer
            .evaluate(&document, options)
            .map_err(|e| anyhow!("{}: {e}", source_path.display()))?;
        results.push(node.cloned().unwrap_or(serde_json::Value::Null));
    }

    // One document in, one node out; otherwise an array of nodes.
    let output = if results.len() == 1 {
        results.into_iter().next().unwrap()
    } else {
        serde_json::Value::Array(results)
    };
    let output_src = serde_json::to_string_pretty(&output)?;
    match target.out.as_ref() {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &output_src)?;
        }
        None => println!("{output_src}"),
    }
    Ok(())
}

fn run_check(target: &CheckArgs) -> anyhow::Result<()> {
    let pointer = match &target.json_pointer {
        Some(text) => JsonPointer::parse(text)?,
        None => JsonPointer::root(),
    };

    let mut options = RangeOptions::INCLUSIVE;
    if target.exclusive_min {
        options.remove(RangeOptions::MINIMUM_INCLUSIVE);
    }
    if target.exclusive_max {
        options.remove(RangeOptions::MAXIMUM_INCLUSIVE);
    }
    let mut range = NumberConstraint::new(
        target.min.as_deref().map(parse_number_arg).transpose()?,
        target.max.as_deref().map(parse_number_arg).transpose()?,
        options,
    );
    if let Some(raw) = target.multiple_of.as_deref() {
        range = range.with_multiple_of(parse_number_arg(raw)?);
    }
    let count = match (target.exact_count, target.min_count, target.max_count) {
        (Some(n), _, _) => Some(CountConstraint::exact(n)),
        (None, None, None) => None,
        (None, min, max) => Some(CountConstraint::new(min, max, RangeOptions::INCLUSIVE)),
    };
    let pattern = target
        .pattern
        .as_deref()
        .map(|p| PatternConstraint::new(p, target.required))
        .transpose()?;

    // An unresolvable subject is "absent", which constraints tolerate.
    let tolerant = JsonPointerEvaluationOptions::all();

    let mut failures = 0usize;
    for (source_path, document) in target.input_settings.load_documents()? {
        let node = pointer
            .evaluate(&document, tolerant)
            .map_err(|e| anyhow!("{}: {e}", source_path.display()))?;

        let ok = check_node(node, &range, count.as_ref(), pattern.as_ref());

        let label = source_path.display();
        if ok {
            eprintln!("{} {label}", "ok".green());
        } else {
            eprintln!("{} {label}", "FAIL".red().bold());
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} document(s) failed validation");
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Count of a countable node: array items, string chars, object properties.
/// Scalars have no count and validate as an absent subject.
fn count_of(node: &serde_json::Value) -> Option<u32> {
    match node {
        serde_json::Value::Array(items) => Some(items.len() as u32),
        serde_json::Value::String(s) => Some(s.chars().count() as u32),
        serde_json::Value::Object(map) => Some(map.len() as u32),
        _ => None,
    }
}

fn check_node(
    node: Option<&serde_json::Value>,
    range: &NumberConstraint,
    count: Option<&CountConstraint>,
    pattern: Option<&PatternConstraint>,
) -> bool {
    let subject_number = node
        .and_then(|n| n.as_number())
        .map(UniversalNumber::from_json_number);
    let mut ok = range.is_valid(subject_number.as_ref());
    if let Some(count) = count {
        ok &= count.is_valid(node.and_then(count_of));
    }
    if let Some(pattern) = pattern {
        ok &= pattern.is_valid(node.and_then(|n| n.as_str()));
    }
    ok
}

/// Classify a numeric CLI argument the way a JSON reader would: i64, then
/// u64, then f64.
fn parse_number_arg(raw: &str) -> anyhow::Result<UniversalNumber> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(UniversalNumber::Int64(i));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Ok(UniversalNumber::UInt64(u));
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Ok(UniversalNumber::Float64(f));
    }
    bail!("not a numeric literal: {raw:?}")
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
