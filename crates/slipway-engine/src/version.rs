//! Branch-kind classification and the emitted-version policy.
//!
//! The policy is a pure function of `(branch kind, raw version)`. It is
//! total (unrecognized kinds pass the version through unchanged) and
//! idempotent: applying it twice yields the same result as applying it
//! once.

/// Snapshot suffix stripped on release, hotfix and trunk branches.
const SNAPSHOT: &str = "-SNAPSHOT";
/// Release-candidate suffix appended on release branches.
const RC: &str = "-RC";
/// Fix suffix stripped on the trunk.
const FIX: &str = "-FIX";

/// The kind of branch a pattern refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// Short-lived feature branch
    Feature,
    /// The develop integration branch
    Develop,
    /// A release stabilization branch
    Release,
    /// A hotfix branch
    Hotfix,
    /// The main trunk (master/main)
    Master,
    /// Anything not matching a known convention
    Unknown,
}

impl BranchKind {
    /// Classify a raw branch pattern.
    ///
    /// Only the leading path segment matters; glob suffixes are ignored.
    #[must_use]
    pub fn from_pattern(pattern: &str) -> Self {
        let head = pattern
            .trim()
            .split(['/', '-'])
            .next()
            .unwrap_or("")
            .trim_end_matches('*');

        match head {
            "feature" => Self::Feature,
            "develop" => Self::Develop,
            "release" => Self::Release,
            "hotfix" => Self::Hotfix,
            "master" | "main" => Self::Master,
            _ => Self::Unknown,
        }
    }
}

/// Compute the version string a document should carry for a branch kind.
///
/// - feature/develop: unchanged
/// - release: strip `-SNAPSHOT`, append `-RC`
/// - hotfix: strip `-SNAPSHOT`
/// - master: strip all of `-SNAPSHOT`, `-RC`, `-FIX`
/// - unknown: unchanged
#[must_use]
pub fn emitted_version(kind: BranchKind, raw: &str) -> String {
    match kind {
        BranchKind::Feature | BranchKind::Develop | BranchKind::Unknown => raw.to_string(),
        BranchKind::Release => {
            let stripped = raw.strip_suffix(SNAPSHOT).unwrap_or(raw);
            if stripped.ends_with(RC) {
                stripped.to_string()
            } else {
                format!("{stripped}{RC}")
            }
        }
        BranchKind::Hotfix => raw.strip_suffix(SNAPSHOT).unwrap_or(raw).to_string(),
        BranchKind::Master => {
            let mut version = raw;
            loop {
                let next = [SNAPSHOT, RC, FIX]
                    .iter()
                    .find_map(|suffix| version.strip_suffix(suffix));
                match next {
                    Some(stripped) => version = stripped,
                    None => break version.to_string(),
                }
            }
        }
    }
}
