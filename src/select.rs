//! Include/exclude decision for repository packages.
//!
//! The exclude list always wins. An empty include list imposes no
//! constraint, a populated one admits only what it matches.

use std::collections::BTreeSet;

use crate::patterns::PatternList;

/// Why a package ended up where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Install,
    /// Matched a pattern in the exclude list.
    Excluded,
    /// The include list is populated and nothing in it matched.
    NotIncluded,
}

impl Decision {
    pub fn is_install(self) -> bool {
        self == Decision::Install
    }
}

/// Decide a single package name.
pub fn decide(name: &str, include: &PatternList, exclude: &PatternList) -> Decision {
    if exclude.matches(name) {
        Decision::Excluded
    } else if include.is_populated() && !include.matches(name) {
        Decision::NotIncluded
    } else {
        Decision::Install
    }
}

/// Installed/excluded partition of a package listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub installed: BTreeSet<String>,
    pub excluded: BTreeSet<String>,
}

impl Selection {
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(name)
    }
}

/// Partition `candidates` by their [`Decision`].
pub fn select<I, S>(candidates: I, include: &PatternList, exclude: &PatternList) -> Selection
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut selection = Selection::default();
    for candidate in candidates {
        let name = candidate.as_ref();
        let decision = decide(name, include, exclude);
        tracing::debug!("{}: {:?}", name, decision);
        if decision.is_install() {
            selection.installed.insert(name.to_string());
        } else {
            selection.excluded.insert(name.to_string());
        }
    }
    selection
}
