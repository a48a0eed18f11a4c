//! Dependency filtering
//!
//! A [`DependencySet`] selects a subset of the candidates by file path and by
//! module name. The decision for one candidate follows a fixed precedence:
//!
//! 1. No set configured: everything is included except the project output
//!    directory, which is added to the module path by other means.
//! 2. An automatic module is excluded when the set asks for it, whatever the
//!    patterns say.
//! 3. The output directory is included only if the set asks for it.
//! 4. Otherwise a candidate must match the include patterns (path OR name,
//!    missing lists match everything) and must not match the exclude patterns
//!    (path OR name, missing lists match nothing).
//!
//! Several sets are evaluated independently and their selections unioned.

use crate::debug::{dependency_debug_info, dependency_set_debug_info};
use crate::module::Candidate;
use crate::pattern::{
    compile_name_patterns, compile_path_patterns, name_matches, path_matches, NamePattern,
    PathPattern, PatternError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, enabled, info, warn, Level};

/// User-declared filter over the project dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySet {
    /// Accept the project output directory
    pub include_output: bool,

    /// Reject every automatic module
    pub exclude_automatic: bool,

    /// Path patterns (`glob:`/`regex:` prefixed, glob when unprefixed)
    pub includes: Vec<String>,

    /// Module name regexes
    pub include_names: Vec<String>,

    pub excludes: Vec<String>,

    pub exclude_names: Vec<String>,
}

/// A [`DependencySet`] with all of its patterns compiled
#[derive(Debug, Clone)]
pub struct DependencyFilter {
    set: DependencySet,
    includes: Vec<PathPattern>,
    include_names: Vec<NamePattern>,
    excludes: Vec<PathPattern>,
    exclude_names: Vec<NamePattern>,
}

impl DependencyFilter {
    pub fn compile(set: &DependencySet) -> Result<Self, PatternError> {
        Ok(Self {
            includes: compile_path_patterns(&set.includes)?,
            include_names: compile_name_patterns(&set.include_names)?,
            excludes: compile_path_patterns(&set.excludes)?,
            exclude_names: compile_name_patterns(&set.exclude_names)?,
            set: set.clone(),
        })
    }

    pub fn set(&self) -> &DependencySet {
        &self.set
    }

    fn matches_includes(&self, candidate: &Candidate) -> Result<bool, PatternError> {
        matches_either(&self.includes, &self.include_names, candidate, true)
    }

    fn matches_excludes(&self, candidate: &Candidate) -> Result<bool, PatternError> {
        matches_either(&self.excludes, &self.exclude_names, candidate, false)
    }
}

/// Path OR name match; `when_empty` applies when both lists are empty.
fn matches_either(
    paths: &[PathPattern],
    names: &[NamePattern],
    candidate: &Candidate,
    when_empty: bool,
) -> Result<bool, PatternError> {
    match (paths.is_empty(), names.is_empty()) {
        (true, true) => Ok(when_empty),
        (false, true) => path_matches(paths, candidate.path()),
        (true, false) => name_matches(names, candidate.module_name()),
        (false, false) => Ok(path_matches(paths, candidate.path())?
            || name_matches(names, candidate.module_name())?),
    }
}

/// Why a candidate was accepted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    IncludedByDefault,
    OutputExcludedByDefault,
    AutomaticExcluded,
    OutputIncluded,
    OutputExcluded,
    MatchedIncludes,
    NotMatchedByIncludes,
    MatchedByExcludes,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::IncludedByDefault => "included by default",
            Reason::OutputExcludedByDefault => "output module excluded by default",
            Reason::AutomaticExcluded => "automatic module excluded",
            Reason::OutputIncluded => "output module included",
            Reason::OutputExcluded => "output module excluded",
            Reason::MatchedIncludes => "matched includes",
            Reason::NotMatchedByIncludes => "not matched by includes",
            Reason::MatchedByExcludes => "matched by excludes",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub included: bool,
    pub reason: Reason,
}

impl Verdict {
    fn include(reason: Reason) -> Self {
        Self {
            included: true,
            reason,
        }
    }

    fn exclude(reason: Reason) -> Self {
        Self {
            included: false,
            reason,
        }
    }
}

/// Decides whether `candidate` passes `filter` (`None` when no set is configured).
pub fn evaluate(
    filter: Option<&DependencyFilter>,
    candidate: &Candidate,
) -> Result<Verdict, PatternError> {
    let Some(filter) = filter else {
        return Ok(if candidate.is_output() {
            Verdict::exclude(Reason::OutputExcludedByDefault)
        } else {
            Verdict::include(Reason::IncludedByDefault)
        });
    };

    if filter.set.exclude_automatic && candidate.is_automatic() {
        return Ok(Verdict::exclude(Reason::AutomaticExcluded));
    }

    if candidate.is_output() {
        return Ok(if filter.set.include_output {
            Verdict::include(Reason::OutputIncluded)
        } else {
            Verdict::exclude(Reason::OutputExcluded)
        });
    }

    if !filter.matches_includes(candidate)? {
        return Ok(Verdict::exclude(Reason::NotMatchedByIncludes));
    }
    if filter.matches_excludes(candidate)? {
        return Ok(Verdict::exclude(Reason::MatchedByExcludes));
    }
    Ok(Verdict::include(Reason::MatchedIncludes))
}

pub fn included(
    filter: Option<&DependencyFilter>,
    candidate: &Candidate,
) -> Result<bool, PatternError> {
    evaluate(filter, candidate).map(|v| v.included)
}

/// Outcome of the dependency sets for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub automatic: bool,
    pub included: bool,
    /// One verdict per configured set, or the single default verdict
    pub verdicts: Vec<Verdict>,
}

impl Decision {
    /// Reason of the first accepting set, or of the first set when none accepted.
    pub fn reason(&self) -> Option<Reason> {
        self.verdicts
            .iter()
            .find(|v| v.included == self.included)
            .map(|v| v.reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencySelection {
    pub selected: Vec<PathBuf>,
    pub decisions: Vec<Decision>,
}

/// Compiles every set up front so a bad pattern fails before any filtering.
pub fn compile_filters(sets: &[DependencySet]) -> Result<Vec<DependencyFilter>, PatternError> {
    sets.iter().map(DependencyFilter::compile).collect()
}

fn log_candidate(candidate: &Candidate) {
    match &candidate.descriptor {
        None => warn!("Missing module descriptor: {}", candidate.path.display()),
        Some(d) if d.is_automatic() => {
            info!("Found automatic module: {}", candidate.path.display())
        }
        Some(_) => {}
    }
}

fn log_verdict(candidate: &Candidate, verdict: &Verdict) {
    match verdict.reason {
        Reason::IncludedByDefault if candidate.is_automatic() => {
            info!("Included automatic module: {}", candidate.path.display())
        }
        Reason::AutomaticExcluded => {
            info!("Excluded automatic module: {}", candidate.path.display())
        }
        Reason::OutputIncluded => info!("Included output module: {}", candidate.path.display()),
        Reason::OutputExcluded | Reason::OutputExcludedByDefault => {
            info!("Excluded output module: {}", candidate.path.display())
        }
        _ => {}
    }
}

/// Runs every filter over the full candidate set and unions the accepted
/// candidates, preserving candidate order. An empty filter list applies the
/// default policy.
pub fn select_dependencies(
    filters: &[DependencyFilter],
    candidates: &[Candidate],
) -> Result<DependencySelection, PatternError> {
    let mut per_set: Vec<Vec<Verdict>> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        log_candidate(candidate);
        let verdicts = if filters.is_empty() {
            vec![evaluate(None, candidate)?]
        } else {
            filters
                .iter()
                .map(|f| evaluate(Some(f), candidate))
                .collect::<Result<Vec<_>, _>>()?
        };
        for verdict in &verdicts {
            log_verdict(candidate, verdict);
        }
        per_set.push(verdicts);
    }

    if enabled!(Level::DEBUG) {
        for (index, filter) in filters.iter().enumerate() {
            let data = candidates
                .iter()
                .zip(&per_set)
                .filter(|(_, v)| v[index].included)
                .map(|(c, _)| c.path.display().to_string())
                .collect::<Vec<_>>()
                .join(crate::path::PATH_SEPARATOR);
            debug!("{}", dependency_set_debug_info("DEPENDENCYSET", filter.set(), &data));
        }
    }

    let mut selection = DependencySelection::default();
    for (candidate, verdicts) in candidates.iter().zip(per_set) {
        let included = verdicts.iter().any(|v| v.included);
        debug!("{}", dependency_debug_info(candidate, included));
        if included {
            selection.selected.push(candidate.path.clone());
        }
        selection.decisions.push(Decision {
            path: candidate.path.clone(),
            module: candidate.descriptor.as_ref().map(|d| d.name.clone()),
            automatic: candidate.is_automatic(),
            included,
            verdicts,
        });
    }

    Ok(selection)
}
