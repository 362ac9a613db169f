//! Running a directory of scenarios and tallying the outcomes

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::parser::parse_scenario_file;
use super::runner::{TestResult, run_scenario};

/// One scenario file and how it went
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub path: PathBuf,
    /// Directory under the scenarios root, empty for top-level files
    pub category: String,
    /// File stem
    pub name: String,
    pub description: Option<String>,
    pub result: TestResult,
}

impl ScenarioOutcome {
    /// `category/name`, the form matched by scenario filters
    pub fn id(&self) -> String {
        if self.category.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.category, self.name)
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.result, TestResult::Pass { .. })
    }
}

/// Pass, fail and error counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioCounts {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl ScenarioCounts {
    fn record(&mut self, result: &TestResult) {
        match result {
            TestResult::Pass { .. } => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }
}

/// Every scenario found under a directory, run in path order
#[derive(Debug, Default)]
pub struct ScenarioSummary {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl ScenarioSummary {
    pub fn run(base: &Path, filter: Option<&str>) -> Self {
        let outcomes = discover_scenarios(base, filter)
            .into_iter()
            .map(|path| run_file(base, path))
            .collect();
        Self { outcomes }
    }

    pub fn totals(&self) -> ScenarioCounts {
        let mut counts = ScenarioCounts::default();
        for outcome in &self.outcomes {
            counts.record(&outcome.result);
        }
        counts
    }

    pub fn by_category(&self) -> BTreeMap<&str, ScenarioCounts> {
        let mut categories: BTreeMap<&str, ScenarioCounts> = BTreeMap::new();
        for outcome in &self.outcomes {
            categories
                .entry(outcome.category.as_str())
                .or_default()
                .record(&outcome.result);
        }
        categories
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.is_pass())
    }

    /// At least one scenario ran and none failed
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty() && self.failures().next().is_none()
    }
}

fn run_file(base: &Path, path: PathBuf) -> ScenarioOutcome {
    let id = scenario_id(base, &path);
    let (category, name) = match id.rsplit_once('/') {
        Some((category, name)) => (category.to_string(), name.to_string()),
        None => (String::new(), id),
    };

    let (description, result) = match parse_scenario_file(&path) {
        Ok(def) => {
            let result = run_scenario(&def);
            (def.description, result)
        }
        Err(message) => (None, TestResult::Error { message }),
    };

    ScenarioOutcome {
        path,
        category,
        name,
        description,
        result,
    }
}

/// Path relative to `base` without the extension, `/`-separated
fn scenario_id(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scenario files under `base`, sorted, keeping ids that contain `filter`
pub fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![base.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "toml")
                && filter.is_none_or(|f| scenario_id(base, &path).contains(f))
            {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}
