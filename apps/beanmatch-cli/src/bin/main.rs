use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use beanmatch_core::config::{Config, Settings};
use beanmatch_core::documents::DocumentLoader;
use beanmatch_core::flavor::{Axis, FlavorVector, SliderPreferences};
use beanmatch_core::types::{ExclusionSpec, FilterSpec, RankedResult};
use beanmatch_embed::get_default_embedder;
use beanmatch_flavor::{EmbeddingProvider, FlavorProfiler};
use beanmatch_hybrid::{FusionWeights, HybridRetriever, SearchOrchestrator};
use beanmatch_text::TantivyIndexer;
use beanmatch_vector::LanceVectorIndex;

const USAGE: &str = "Usage: beanmatch <command> [args...]

  ingest [path] [--limit N]               load JSONL beans, embed and index them
  query \"<text>\" [options]                hybrid search
  prefs --<left>_<right> <w>... [options]  slider search, w in [-1, 1]
  analyze \"<text>\" [--json]               flavor profile of a description

options:
  --filter key=value   exact (case-insensitive) metadata match, repeatable
  --avoid a,b          flavor notes to exclude
  --flavors            attach a flavor profile to each result
  --json               print JSON instead of text";

#[derive(Debug, Default, PartialEq)]
struct SearchArgs {
    text: Option<String>,
    filters: FilterSpec,
    avoid: ExclusionSpec,
    sliders: SliderPreferences,
    flavors: bool,
    json: bool,
    limit: Option<usize>,
}

fn value_after<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1).map(String::as_str).ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn parse_args(args: &[String]) -> Result<SearchArgs> {
    let mut out = SearchArgs::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--filter" => {
                let pair = value_after(args, i, arg)?;
                let (k, v) = pair.split_once('=').ok_or_else(|| anyhow!("--filter expects key=value, got '{pair}'"))?;
                out.filters.insert(k.trim().to_string(), v.trim().to_string());
                i += 1;
            }
            "--avoid" => {
                let list = value_after(args, i, arg)?;
                out.avoid.extend(list.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from));
                i += 1;
            }
            "--limit" => {
                let n = value_after(args, i, arg)?;
                out.limit = Some(n.parse().with_context(|| format!("--limit requires a number, got '{n}'"))?);
                i += 1;
            }
            "--flavors" => out.flavors = true,
            "--json" => out.json = true,
            _ if arg.starts_with("--") => {
                let label = &arg[2..];
                let axis = Axis::from_label(label).ok_or_else(|| anyhow!("unknown option '{arg}'"))?;
                let w = value_after(args, i, arg)?;
                let weight: f32 = w.parse().with_context(|| format!("{arg} requires a number, got '{w}'"))?;
                out.sliders.set(axis.label(), weight);
                i += 1;
            }
            _ if out.text.is_none() => out.text = Some(arg.to_string()),
            _ => bail!("unexpected argument '{arg}'"),
        }
        i += 1;
    }
    Ok(out)
}

fn provider(settings: &Settings) -> Result<Arc<EmbeddingProvider>> {
    let embedder = Arc::from(get_default_embedder(&settings.embedding)?);
    Ok(Arc::new(EmbeddingProvider::new(embedder)?))
}

fn build_retriever(settings: &Settings, base: &Path, provider: Arc<EmbeddingProvider>, fresh: bool) -> Result<HybridRetriever> {
    let data = &settings.data;
    let (tantivy_dir, lancedb_dir) = (data.tantivy_path(base), data.lancedb_path(base));
    let (text, vector) = if fresh {
        (TantivyIndexer::create(&tantivy_dir)?, LanceVectorIndex::create(&lancedb_dir, &data.table, provider.dim())?)
    } else {
        (TantivyIndexer::open(&tantivy_dir)?, LanceVectorIndex::open(&lancedb_dir, &data.table, provider.dim())?)
    };
    let weights = FusionWeights::try_from(&settings.retrieval)?;
    Ok(HybridRetriever::new(provider, Arc::new(vector), Arc::new(text), weights))
}

fn ingest(settings: &Settings, base: &Path, args: &[String]) -> Result<()> {
    let parsed = parse_args(args)?;
    let path = parsed.text.map(PathBuf::from).unwrap_or_else(|| settings.data.documents_path(base));
    let loader = parsed.limit.map(DocumentLoader::with_limit).unwrap_or_default();
    let docs = loader.load(&path)?;
    if docs.is_empty() {
        bail!("no documents found under {}", path.display());
    }
    let retriever = build_retriever(settings, base, provider(settings)?, true)?;
    retriever.index(&docs)?;
    println!("Indexed {} beans from {}", docs.len(), path.display());
    Ok(())
}

fn search(settings: &Settings, base: &Path, args: &[String], by_sliders: bool) -> Result<()> {
    let parsed = parse_args(args)?;
    let provider = provider(settings)?;
    let retriever = build_retriever(settings, base, provider.clone(), false)?;
    let orchestrator = SearchOrchestrator::new(Arc::new(retriever), provider, settings)?;

    let mut results = if by_sliders {
        orchestrator.search_by_flavor_preferences(&parsed.sliders, &parsed.filters, &parsed.avoid)?
    } else {
        let text = parsed.text.as_deref().ok_or_else(|| anyhow!("query requires a search text\n\n{USAGE}"))?;
        orchestrator.search(text, &parsed.filters, &parsed.avoid)?
    };
    if parsed.flavors {
        orchestrator.annotate(&mut results)?;
    }
    info!(results = results.len(), "search finished");
    if parsed.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

fn analyze(settings: &Settings, args: &[String]) -> Result<()> {
    let parsed = parse_args(args)?;
    let text = parsed.text.ok_or_else(|| anyhow!("analyze requires a description\n\n{USAGE}"))?;
    let profile = FlavorProfiler::new(provider(settings)?, &settings.flavor).profile(&text)?;
    if parsed.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile, "");
    }
    Ok(())
}

fn print_profile(profile: &FlavorVector, indent: &str) {
    for (term, score) in profile.iter() {
        let bar = "#".repeat((score * 20.0).round() as usize);
        println!("{indent}{:<10} {:.3} {bar}", term.as_str(), score);
    }
}

fn print_results(results: &[RankedResult]) {
    if results.is_empty() {
        println!("No beans matched.");
        return;
    }
    for r in results {
        let penalty = r.rejection_penalty.map(|p| format!("  penalty={p:.3}")).unwrap_or_default();
        println!("{:>2}. {}  score={:.4}{}", r.rank, r.document.id, r.score, penalty);
        println!("    {}", r.document.text);
        if !r.document.metadata.is_empty() {
            let mut meta: Vec<String> = r.document.metadata.iter().map(|(k, v)| format!("{k}={v}")).collect();
            meta.sort();
            println!("    [{}]", meta.join(", "));
        }
        if let Some(profile) = &r.flavor_profile {
            print_profile(profile, "      ");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    let base = env::current_dir()?;

    match cmd.as_str() {
        "ingest" => ingest(&settings, &base, &args),
        "query" => search(&settings, &base, &args, false),
        "prefs" => search(&settings, &base, &args, true),
        "analyze" => analyze(&settings, &args),
        "-h" | "--help" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {cmd}\n\n{USAGE}");
            std::process::exit(1);
        }
    }
}
