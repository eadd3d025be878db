//! Specification evaluation.
//!
//! The [`Evaluator`] walks a fixed sequence of [`Stage`]s, each of which reads
//! one concern of the specification and forwards it to the
//! [`QuerySource`]. The default pipeline is:
//!
//! 1. [`FilterStage`]: criteria, if any.
//! 2. [`OrderStage`]: the sort chain, if any.
//! 3. [`IncludeStage`]: eager-load paths, for [`Intent::Fetch`] only.
//! 4. [`PaginationStage`]: skip, then take.
//!
//! Backends that need their own translation pass their stages to
//! [`Evaluator::with_stages`]; there is no global registry.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::source::QuerySource;
use crate::spec::Specification;

/// What the caller will do with the evaluated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Materialize entities.
    Fetch,
    /// Count matches.
    Count,
    /// Check whether anything matches.
    Exists,
}

impl Intent {
    /// Returns `true` if entities (and so their relations) will be loaded.
    pub fn materializes(self) -> bool {
        matches!(self, Intent::Fetch)
    }
}

/// Evaluator settings.
///
/// ```
/// use quarry::EvaluatorConfig;
///
/// let config: EvaluatorConfig = serde_json::from_str(r#"{ "max_take": 100 }"#).unwrap();
/// assert!(config.warn_unordered_paging);
/// assert_eq!(config.max_take, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Log a warning when a window is applied without a sort chain.
    pub warn_unordered_paging: bool,
    /// Upper bound on any `take` the pagination stage applies.
    pub max_take: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            warn_unordered_paging: true,
            max_take: None,
        }
    }
}

/// Everything a stage may read.
pub struct StageContext<'s, T> {
    pub spec: &'s Specification<T>,
    pub intent: Intent,
    pub config: &'s EvaluatorConfig,
}

/// One step of the evaluation pipeline.
pub trait Stage<S: QuerySource>: Send + Sync {
    /// Name used in log events.
    fn name(&self) -> &'static str;

    fn apply(&self, source: S, ctx: &StageContext<'_, S::Item>) -> S;
}

/// Forwards the criteria to [`QuerySource::filter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterStage;

impl<S: QuerySource> Stage<S> for FilterStage {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn apply(&self, source: S, ctx: &StageContext<'_, S::Item>) -> S {
        match ctx.spec.criteria() {
            Some(criteria) => source.filter(ctx.spec.var(), criteria),
            None => source,
        }
    }
}

/// Forwards the sort chain to [`QuerySource::order_by`].
///
/// Skipped for count and exists intents when no window is set, since order
/// cannot change the result then.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderStage;

impl<S: QuerySource> Stage<S> for OrderStage {
    fn name(&self) -> &'static str {
        "order"
    }

    fn apply(&self, source: S, ctx: &StageContext<'_, S::Item>) -> S {
        let sorts = ctx.spec.sorts();
        if sorts.is_empty() {
            return source;
        }
        if !ctx.intent.materializes() && ctx.spec.window().is_unbounded() {
            trace!(intent = ?ctx.intent, "ordering has no effect without a window");
            return source;
        }
        source.order_by(sorts.descriptors())
    }
}

/// Forwards each eager-load path to [`QuerySource::include`] when fetching.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeStage;

impl<S: QuerySource> Stage<S> for IncludeStage {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, source: S, ctx: &StageContext<'_, S::Item>) -> S {
        if !ctx.intent.materializes() {
            return source;
        }
        ctx.spec
            .includes()
            .iter()
            .fold(source, |source, path| source.include(path))
    }
}

/// Applies skip, then take.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationStage;

impl<S: QuerySource> Stage<S> for PaginationStage {
    fn name(&self) -> &'static str {
        "pagination"
    }

    fn apply(&self, source: S, ctx: &StageContext<'_, S::Item>) -> S {
        let window = ctx.spec.window();
        if window.is_unbounded() {
            return source;
        }
        if ctx.spec.sorts().is_empty() && ctx.config.warn_unordered_paging {
            warn!(
                skip = ?window.skip(),
                take = ?window.take(),
                "paging without a sort chain; the window is not stable"
            );
        }

        let source = match window.skip() {
            Some(skip) => source.skip(skip),
            None => source,
        };
        let take = match (window.take(), ctx.config.max_take) {
            (Some(take), Some(max)) if take > max => {
                debug!(take, max, "capping take");
                Some(max)
            }
            (take, _) => take,
        };
        match take {
            Some(take) => source.take(take),
            None => source,
        }
    }
}

/// Runs specifications against a [`QuerySource`] through a stage pipeline.
///
/// ```
/// use quarry::{Clause, Entity, Evaluator, MemorySource, Specification, Value};
///
/// struct Task(bool);
///
/// impl Entity for Task {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "done" => Value::from(self.0),
///             _ => Value::None,
///         }
///     }
/// }
///
/// # fn main() -> quarry::Result<()> {
/// let tasks = [Task(true), Task(false), Task(true)];
/// let open = Specification::<Task>::builder()
///     .where_(Clause::eq("done", false))?
///     .build();
///
/// let evaluator = Evaluator::default();
/// assert_eq!(evaluator.apply_for_count(MemorySource::new(&tasks), &open).len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Evaluator<S: QuerySource> {
    stages: Vec<Box<dyn Stage<S>>>,
    config: EvaluatorConfig,
}

impl<S: QuerySource> Evaluator<S> {
    /// An evaluator running the default pipeline.
    pub fn new(config: EvaluatorConfig) -> Self {
        Evaluator::with_stages(config, Self::default_stages())
    }

    /// An evaluator running `stages` in order instead of the default pipeline.
    pub fn with_stages(config: EvaluatorConfig, stages: Vec<Box<dyn Stage<S>>>) -> Self {
        Evaluator { stages, config }
    }

    /// Filter, order, include, pagination.
    pub fn default_stages() -> Vec<Box<dyn Stage<S>>> {
        vec![
            Box::new(FilterStage) as Box<dyn Stage<S>>,
            Box::new(OrderStage),
            Box::new(IncludeStage),
            Box::new(PaginationStage),
        ]
    }

    /// Returns the evaluator configuration.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Names of the stages, in the order they run.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Evaluates `spec` for fetching entities.
    pub fn apply(&self, source: S, spec: &Specification<S::Item>) -> S {
        self.run(source, spec, Intent::Fetch)
    }

    /// Evaluates `spec` for counting. Includes are not requested.
    pub fn apply_for_count(&self, source: S, spec: &Specification<S::Item>) -> S {
        self.run(source, spec, Intent::Count)
    }

    /// Evaluates `spec` for an existence check. Includes are not requested.
    pub fn apply_for_exists(&self, source: S, spec: &Specification<S::Item>) -> S {
        self.run(source, spec, Intent::Exists)
    }

    fn run(&self, source: S, spec: &Specification<S::Item>, intent: Intent) -> S {
        debug!(?intent, %spec, stages = self.stages.len(), "evaluating specification");
        let ctx = StageContext {
            spec,
            intent,
            config: &self.config,
        };
        self.stages.iter().fold(source, |source, stage| {
            debug!(stage = stage.name(), ?intent, "applying stage");
            stage.apply(source, &ctx)
        })
    }
}

impl<S: QuerySource> Default for Evaluator<S> {
    fn default() -> Self {
        Evaluator::new(EvaluatorConfig::default())
    }
}
