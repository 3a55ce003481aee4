use crate::collect::ExtensionSet;
use crate::constants::{DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use crate::error::{BenchError, Result};
use crate::strategy::{StrategyConfig, StrategyId};
use std::path::PathBuf;

/// A registry strategy together with its effective parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedStrategy {
    pub id: StrategyId,
    pub config: StrategyConfig,
}

impl SelectedStrategy {
    pub fn new(id: StrategyId) -> Self {
        Self {
            id,
            config: id.defaults(),
        }
    }
}

/// Everything a benchmark run needs, assembled once at the entry point.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// File, directory or glob pattern.
    pub input: String,
    pub output_dir: PathBuf,
    pub extensions: ExtensionSet,
    pub strategies: Vec<SelectedStrategy>,
    pub recursive: bool,
    /// Worker threads; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extensions: ExtensionSet::default(),
            strategies: StrategyId::ALL.iter().copied().map(SelectedStrategy::new).collect(),
            recursive: false,
            threads: None,
        }
    }
}

impl BenchConfig {
    pub fn new(input: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Restricts the run to `names`, in the given order. An empty list keeps
    /// every registered strategy.
    pub fn with_strategies<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        let mut selected: Vec<SelectedStrategy> = Vec::with_capacity(names.len());
        for name in names {
            let id = name.as_ref().parse::<StrategyId>()?;
            if !selected.iter().any(|s| s.id == id) {
                selected.push(SelectedStrategy::new(id));
            }
        }
        self.strategies = selected;
        Ok(self)
    }

    /// Applies `STRATEGY.KEY=VALUE` overrides to the selected strategies.
    pub fn with_params<S: AsRef<str>>(mut self, params: &[S]) -> Result<Self> {
        for param in params {
            let (id, key, value) = parse_param(param.as_ref())?;
            let selected = self
                .strategies
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| {
                    BenchError::InvalidParameter(
                        param.as_ref().to_string(),
                        format!("strategy {} is not selected for this run", id),
                    )
                })?;
            id.apply_param(&mut selected.config, &key, &value)?;
        }
        Ok(self)
    }

    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Result<Self> {
        if extensions.is_empty() {
            return Ok(self);
        }
        let set = ExtensionSet::new(extensions);
        if set.is_empty() {
            return Err(BenchError::InvalidParameter(
                "ext".to_string(),
                "at least one extension is required".to_string(),
            ));
        }
        self.extensions = set;
        Ok(self)
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for selected in &self.strategies {
            selected.config.validate()?;
        }
        Ok(())
    }
}

/// Splits `STRATEGY.KEY=VALUE` into its parts.
pub fn parse_param(spec: &str) -> Result<(StrategyId, String, String)> {
    let invalid = || {
        BenchError::InvalidParameter(
            spec.to_string(),
            "expected STRATEGY.KEY=VALUE, e.g. resize-90pct.quality=80".to_string(),
        )
    };

    let (target, value) = spec.split_once('=').ok_or_else(invalid)?;
    let (strategy, key) = target.rsplit_once('.').ok_or_else(invalid)?;
    if key.trim().is_empty() || value.trim().is_empty() {
        return Err(invalid());
    }

    let id = strategy.parse::<StrategyId>()?;
    Ok((id, key.trim().to_string(), value.trim().to_string()))
}
