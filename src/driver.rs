//! Benchmark driver.
//!
//! Runs every registered [`Counter`] against one shared, immutable input,
//! times repeated calls, and reports per-variant statistics. A variant that
//! errors, panics, returns unstable results or exceeds the timeout is recorded
//! as failed and the remaining variants still run. Disagreement between the
//! successful variants is reported separately as a [`ResultMismatch`].

use std::cell::Cell;
use std::fmt;
use std::hint::black_box;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{CountError, Counter};
use crate::error::ConfigError;
use crate::fixture::{generate_input, InputConfig};

/// Repeated-measurement protocol for a single variant.
///
/// In JSON the durations are given in milliseconds (`min_duration_ms`,
/// `timeout_ms`); missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasureConfig {
    /// Calls made before timing starts; their durations are discarded.
    pub warmup_iters: usize,
    /// Minimum number of timed samples.
    pub min_iters: usize,
    /// Keep sampling until at least this much time has been measured.
    #[serde(rename = "min_duration_ms", deserialize_with = "from_millis")]
    pub min_duration: Duration,
    /// Hard cap on timed samples, even if `min_duration` is not reached.
    pub max_iters: usize,
    /// A single call slower than this fails the variant.
    #[serde(rename = "timeout_ms", deserialize_with = "from_opt_millis")]
    pub timeout: Option<Duration>,
}

fn from_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

fn from_opt_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
    Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
}

impl Default for MeasureConfig {
    fn default() -> Self {
        MeasureConfig {
            warmup_iters: 3,
            min_iters: 10,
            min_duration: Duration::from_secs(1),
            max_iters: 10_000,
            timeout: None,
        }
    }
}

impl MeasureConfig {
    /// A protocol short enough for tests: no duration floor.
    pub fn quick(iters: usize) -> MeasureConfig {
        MeasureConfig {
            warmup_iters: 1,
            min_iters: iters,
            min_duration: Duration::ZERO,
            max_iters: iters,
            timeout: None,
        }
    }
}

/// Everything a comparison run needs, as read from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub input: InputConfig,
    pub measure: MeasureConfig,
}

impl RunConfig {
    pub fn from_json(text: &str) -> Result<RunConfig, ConfigError> {
        let cfg: RunConfig = serde_json::from_str(text)?;
        cfg.input.validate()?;
        Ok(cfg)
    }
}

/// Why a variant was reported as failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error(transparent)]
    Count(#[from] CountError),
    #[error("panicked: {0}")]
    Panicked(String),
    #[error("call took {elapsed:?}, limit is {limit:?}")]
    Timeout { elapsed: Duration, limit: Duration },
    #[error("returned {first} then {later} for the same input")]
    Unstable { first: usize, later: usize },
}

/// Summary statistics over the timed samples of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    #[serde(rename = "mean_time_ns", serialize_with = "as_nanos")]
    pub mean: Duration,
    #[serde(rename = "stddev_ns", serialize_with = "as_nanos")]
    pub stddev: Duration,
    #[serde(rename = "min_ns", serialize_with = "as_nanos")]
    pub min: Duration,
    #[serde(rename = "max_ns", serialize_with = "as_nanos")]
    pub max: Duration,
    pub samples: usize,
}

impl Stats {
    /// Mean, sample standard deviation (n - 1), min and max.
    /// Returns `None` for an empty sample set.
    pub fn from_samples(samples: &[Duration]) -> Option<Stats> {
        let min = *samples.iter().min()?;
        let max = *samples.iter().max()?;
        let n = samples.len();

        let nanos: Vec<f64> = samples.iter().map(|d| d.as_nanos() as f64).collect();
        let mean = nanos.iter().sum::<f64>() / n as f64;
        let stddev = if n > 1 {
            let var = nanos.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Some(Stats {
            mean: Duration::from_nanos(mean.round() as u64),
            stddev: Duration::from_nanos(stddev.round() as u64),
            min,
            max,
            samples: n,
        })
    }
}

fn as_nanos<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
}

fn as_display<S: Serializer, T: fmt::Display>(v: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => s.collect_str(v),
        None => s.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// One record per variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub name: String,
    pub status: Status,
    pub result: Option<usize>,
    #[serde(flatten)]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "as_display")]
    pub error: Option<VariantError>,
}

impl VariantReport {
    fn ok(name: &str, result: usize, stats: Stats) -> VariantReport {
        VariantReport {
            name: name.to_string(),
            status: Status::Ok,
            result: Some(result),
            stats: Some(stats),
            error: None,
        }
    }

    fn failed(name: &str, error: VariantError) -> VariantReport {
        VariantReport {
            name: name.to_string(),
            status: Status::Error,
            result: None,
            stats: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Variants sharing one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchGroup {
    pub result: usize,
    pub variants: Vec<String>,
}

/// Successful variants disagreed on the count. This is a correctness defect,
/// reported apart from timings and from per-variant failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("variants disagree: {}", describe_groups(.groups))]
pub struct ResultMismatch {
    /// Sorted by result.
    pub groups: Vec<MismatchGroup>,
}

fn describe_groups(groups: &[MismatchGroup]) -> String {
    groups
        .iter()
        .map(|g| format!("{} => [{}]", g.result, g.variants.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Compare the results of all successful variants.
pub fn check_agreement(reports: &[VariantReport]) -> Option<ResultMismatch> {
    let mut by_result: AHashMap<usize, SmallVec<[&str; 4]>> = AHashMap::new();
    for r in reports {
        if let (Status::Ok, Some(result)) = (r.status, r.result) {
            by_result.entry(result).or_default().push(r.name.as_str());
        }
    }
    if by_result.len() <= 1 {
        return None;
    }

    let mut groups: Vec<MismatchGroup> = by_result
        .into_iter()
        .map(|(result, names)| MismatchGroup {
            result,
            variants: names.iter().map(|n| n.to_string()).collect(),
        })
        .collect();
    groups.sort_by_key(|g| g.result);
    Some(ResultMismatch { groups })
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

thread_local! {
    // Set while this thread is inside a guarded variant call.
    static IN_VARIANT_CALL: Cell<bool> = const { Cell::new(false) };
}

static PANIC_HOOK: Once = Once::new();

/// Wrap the process panic hook once: panics raised inside a variant call are
/// logged at debug level and surface as `VariantError::Panicked`, everything
/// else still goes to the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_VARIANT_CALL.with(|c| c.get()) {
                debug!(%info, "variant panicked");
            } else {
                prev(info);
            }
        }));
    });
}

/// One guarded, timed call.
fn timed_call(
    counter: &dyn Counter,
    input: &str,
    timeout: Option<Duration>,
) -> Result<(usize, Duration), VariantError> {
    install_panic_hook();
    IN_VARIANT_CALL.with(|c| c.set(true));
    let t0 = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| counter.count(black_box(input))));
    let elapsed = t0.elapsed();
    IN_VARIANT_CALL.with(|c| c.set(false));

    let result = match outcome {
        Ok(r) => black_box(r?),
        Err(payload) => return Err(VariantError::Panicked(panic_message(payload))),
    };
    if let Some(limit) = timeout {
        if elapsed > limit {
            return Err(VariantError::Timeout { elapsed, limit });
        }
    }
    Ok((result, elapsed))
}

/// Run the measurement protocol for one variant.
///
/// Returns the (stable) count and statistics over the timed samples.
pub fn measure(
    counter: &dyn Counter,
    input: &str,
    cfg: &MeasureConfig,
) -> Result<(usize, Stats), VariantError> {
    let min_iters = cfg.min_iters.max(1);
    let max_iters = cfg.max_iters.max(min_iters);

    let mut expected: Option<usize> = None;
    let mut check = |result: usize| match expected {
        None => {
            expected = Some(result);
            Ok(())
        }
        Some(first) if first != result => Err(VariantError::Unstable { first, later: result }),
        Some(_) => Ok(()),
    };

    for _ in 0..cfg.warmup_iters {
        let (result, _) = timed_call(counter, input, cfg.timeout)?;
        check(result)?;
    }

    let mut samples: Vec<Duration> = Vec::with_capacity(min_iters);
    let mut total = Duration::ZERO;
    while samples.len() < max_iters && (samples.len() < min_iters || total < cfg.min_duration) {
        let (result, elapsed) = timed_call(counter, input, cfg.timeout)?;
        check(result)?;
        samples.push(elapsed);
        total += elapsed;
    }

    let result = match expected {
        Some(r) => r,
        None => return Err(VariantError::Panicked("no calls were made".to_string())),
    };
    let stats = match Stats::from_samples(&samples) {
        Some(s) => s,
        None => return Err(VariantError::Panicked("no samples were recorded".to_string())),
    };
    Ok((result, stats))
}

fn measure_report(counter: &dyn Counter, input: &str, cfg: &MeasureConfig) -> VariantReport {
    let name = counter.name();
    debug!(variant = name, "measuring");
    match measure(counter, input, cfg) {
        Ok((result, stats)) => {
            info!(
                variant = name,
                result,
                mean = ?stats.mean,
                stddev = ?stats.stddev,
                samples = stats.samples,
                "variant measured"
            );
            VariantReport::ok(name, result, stats)
        }
        Err(e) => {
            warn!(variant = name, error = %e, "variant failed");
            VariantReport::failed(name, e)
        }
    }
}

/// What the comparison was run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    pub length: usize,
    pub alphabet_size: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub input: InputSummary,
    pub variants: Vec<VariantReport>,
    pub mismatch: Option<ResultMismatch>,
}

impl ComparisonReport {
    pub fn has_failures(&self) -> bool {
        self.variants.iter().any(|v| !v.is_ok())
    }

    pub fn fastest(&self) -> Option<&VariantReport> {
        self.variants
            .iter()
            .filter_map(|v| v.stats.map(|s| (v, s.mean)))
            .min_by_key(|(_, mean)| *mean)
            .map(|(v, _)| v)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "input: length={} alphabet={} seed={}",
            self.input.length, self.input.alphabet_size, self.input.seed
        )?;
        writeln!(
            f,
            "{:<10} {:>6} {:>10} {:>12} {:>12} {:>12} {:>12} {:>8}",
            "variant", "status", "result", "mean", "stddev", "min", "max", "rel"
        )?;

        let best = self.fastest().and_then(|v| v.stats).map(|s| s.mean);
        for v in &self.variants {
            match (&v.stats, v.result) {
                (Some(s), Some(result)) => {
                    let rel = match best {
                        Some(b) if !b.is_zero() => {
                            format!("{:.2}x", s.mean.as_secs_f64() / b.as_secs_f64())
                        }
                        _ => "-".to_string(),
                    };
                    writeln!(
                        f,
                        "{:<10} {:>6} {:>10} {:>12} {:>12} {:>12} {:>12} {:>8}",
                        v.name,
                        "ok",
                        result,
                        format!("{:.2?}", s.mean),
                        format!("{:.2?}", s.stddev),
                        format!("{:.2?}", s.min),
                        format!("{:.2?}", s.max),
                        rel
                    )?;
                }
                _ => {
                    let err = v.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
                    writeln!(f, "{:<10} {:>6}  {}", v.name, "error", err)?;
                }
            }
        }

        if let Some(m) = &self.mismatch {
            writeln!(f, "MISMATCH: {m}")?;
        }
        Ok(())
    }
}

/// Holds the registered variants and the measurement protocol.
pub struct Driver {
    counters: Vec<Box<dyn Counter>>,
    measure: MeasureConfig,
    parallel: bool,
}

impl Driver {
    pub fn new(measure: MeasureConfig) -> Driver {
        Driver {
            counters: Vec::new(),
            measure,
            parallel: false,
        }
    }

    /// Driver with every built-in variant registered.
    pub fn with_default_counters(measure: MeasureConfig) -> Result<Driver, CountError> {
        let mut d = Driver::new(measure);
        d.counters = crate::all_counters()?;
        Ok(d)
    }

    pub fn register(&mut self, counter: Box<dyn Counter>) -> &mut Driver {
        self.counters.push(counter);
        self
    }

    /// Measure each variant on its own thread. Timings are noisier.
    pub fn parallel(mut self, parallel: bool) -> Driver {
        self.parallel = parallel;
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.counters.iter().map(|c| c.name()).collect()
    }

    /// Keep only the named variants, in registration order.
    pub fn retain(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        let known = self.names();
        if let Some(unknown) = names.iter().find(|n| !known.contains(&n.as_str())) {
            return Err(ConfigError::UnknownVariant(unknown.clone()));
        }
        self.counters.retain(|c| names.iter().any(|n| n == c.name()));
        Ok(())
    }

    /// Measure every variant on `input` and cross-check the results.
    pub fn run(&self, input: &str) -> (Vec<VariantReport>, Option<ResultMismatch>) {
        let reports: Vec<VariantReport> = if self.parallel {
            std::thread::scope(|scope| {
                let handles: Vec<_> = self
                    .counters
                    .iter()
                    .map(|c| {
                        let counter: &dyn Counter = c.as_ref();
                        let cfg = &self.measure;
                        (counter.name(), scope.spawn(move || measure_report(counter, input, cfg)))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(name, h)| {
                        h.join().unwrap_or_else(|payload| {
                            let err = VariantError::Panicked(panic_message(payload));
                            VariantReport::failed(name, err)
                        })
                    })
                    .collect()
            })
        } else {
            self.counters
                .iter()
                .map(|c| measure_report(c.as_ref(), input, &self.measure))
                .collect()
        };

        let mismatch = check_agreement(&reports);
        if let Some(m) = &mismatch {
            warn!(%m, "result mismatch");
        }
        (reports, mismatch)
    }

    /// Generate the input described by `cfg` and run the comparison on it.
    pub fn compare(&self, cfg: &InputConfig) -> Result<ComparisonReport, ConfigError> {
        cfg.validate()?;
        let (input, seed) = generate_input(cfg);
        info!(length = cfg.length, seed, variants = self.counters.len(), "starting comparison");

        let (variants, mismatch) = self.run(&input);
        Ok(ComparisonReport {
            input: InputSummary {
                length: cfg.length,
                alphabet_size: cfg.alphabet.len(),
                seed,
            },
            variants,
            mismatch,
        })
    }
}
