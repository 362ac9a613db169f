//! Scenario runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios                          # every scenario
//!   cargo run --bin test-scenarios -- collision/             # one category
//!   cargo run --bin test-scenarios -- scoring/player_scores  # one scenario
//!   cargo run --bin test-scenarios -- --list                 # list ids only
//!   cargo run --bin test-scenarios -- --dir other/scenarios  # another root
//!   cargo run --bin test-scenarios -- --verbose              # expected/actual on failure

use std::path::{Path, PathBuf};

use soccer::testing::{
    SCENARIOS_DIR, ScenarioCounts, ScenarioOutcome, ScenarioSummary, TestResult, discover_scenarios,
};

struct CliArgs {
    dir: PathBuf,
    filter: Option<String>,
    verbose: bool,
    list: bool,
}

impl CliArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut parsed = Self {
            dir: PathBuf::from(SCENARIOS_DIR),
            filter: None,
            verbose: false,
            list: false,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--verbose" | "-v" => parsed.verbose = true,
                "--list" | "-l" => parsed.list = true,
                "--dir" => {
                    if let Some(dir) = args.get(i + 1) {
                        parsed.dir = PathBuf::from(dir);
                    }
                    i += 1;
                }
                other if other.starts_with('-') => eprintln!("Warning: unknown flag '{}'", other),
                filter => parsed.filter = Some(filter.to_string()),
            }
            i += 1;
        }
        parsed
    }
}

fn main() {
    let args = CliArgs::from_args();

    if !args.dir.is_dir() {
        eprintln!("Scenario directory {} not found", args.dir.display());
        std::process::exit(1);
    }

    if args.list {
        list_scenarios(&args.dir, args.filter.as_deref());
        return;
    }

    let summary = ScenarioSummary::run(&args.dir, args.filter.as_deref());
    if summary.outcomes.is_empty() {
        match &args.filter {
            Some(f) => eprintln!("No scenarios match '{}'", f),
            None => eprintln!("No scenarios in {}", args.dir.display()),
        }
        std::process::exit(1);
    }

    let mut category = None;
    for outcome in &summary.outcomes {
        if category != Some(outcome.category.as_str()) {
            category = Some(outcome.category.as_str());
            println!("[{}]", display_category(&outcome.category));
        }
        print_outcome(outcome, args.verbose);
    }

    println!();
    print_table(&summary);

    if !summary.is_success() {
        std::process::exit(1);
    }
}

fn list_scenarios(dir: &Path, filter: Option<&str>) {
    for path in discover_scenarios(dir, filter) {
        let relative = path.strip_prefix(dir).unwrap_or(&path).with_extension("");
        println!("{}", relative.display());
    }
}

fn display_category(category: &str) -> &str {
    if category.is_empty() { "." } else { category }
}

fn print_outcome(outcome: &ScenarioOutcome, verbose: bool) {
    match &outcome.result {
        TestResult::Pass { steps } => {
            println!("  ok     {:<36} {} steps", outcome.name, steps);
        }
        TestResult::Fail { error } => {
            println!("  FAIL   {}", outcome.name);
            if let Some(description) = &outcome.description {
                println!("         {}", description);
            }
            if verbose {
                println!("         {}", error);
            } else {
                println!("         {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  ERROR  {}", outcome.name);
            println!("         {}", message);
            if verbose {
                println!("         ({})", outcome.path.display());
            }
        }
    }
}

fn print_table(summary: &ScenarioSummary) {
    println!("{:<16} {:>6} {:>6} {:>6}", "category", "pass", "fail", "error");
    for (category, counts) in summary.by_category() {
        print_row(display_category(category), &counts);
    }
    println!("{}", "-".repeat(37));
    print_row("total", &summary.totals());
}

fn print_row(label: &str, counts: &ScenarioCounts) {
    println!(
        "{:<16} {:>6} {:>6} {:>6}",
        label, counts.passed, counts.failed, counts.errors
    );
}
