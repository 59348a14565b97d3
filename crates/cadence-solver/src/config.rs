//! Solver configuration.

/// Options passed through to a backend for a single solve.
///
/// Every field is optional; `None` leaves the backend default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock limit in seconds.
    pub time_limit: Option<f64>,
    /// Simplex iteration limit.
    pub iteration_limit: Option<u64>,
    /// Relative MIP gap at which branch-and-bound stops.
    pub mip_gap: Option<f64>,
    pub verbosity: Option<u32>,
    pub presolve: Option<bool>,
    pub threads: Option<u32>,
    /// Primal and dual feasibility tolerance.
    pub tolerance: Option<f64>,
    pub log_to_console: Option<bool>,
    /// Solve the continuous relaxation: integer columns are passed as
    /// continuous with their bounds unchanged.
    pub relax_integrality: bool,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_iteration_limit(mut self, iterations: u64) -> Self {
        self.iteration_limit = Some(iterations);
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    pub fn with_relax_integrality(mut self, relax: bool) -> Self {
        self.relax_integrality = relax;
        self
    }

    /// True when nothing deviates from the backend defaults.
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.iteration_limit.is_none()
            && self.mip_gap.is_none()
            && self.verbosity.is_none()
            && self.presolve.is_none()
            && self.threads.is_none()
            && self.tolerance.is_none()
            && self.log_to_console.is_none()
            && !self.relax_integrality
    }
}
