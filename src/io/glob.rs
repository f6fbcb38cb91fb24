// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functions to glob files.

use std::path::PathBuf;

use glob::glob;
use thiserror::Error;

/// Given a glob pattern, get all of the matches from the filesystem, in the
/// order the glob crate yields them (alphabetical).
pub fn get_all_matches_from_glob(g: &str) -> Result<Vec<PathBuf>, GlobError> {
    glob(g)?
        .map(|entry| entry.map_err(GlobError::from))
        .collect()
}

/// The same as [`get_all_matches_from_glob`], but exactly one match is
/// expected.
pub fn get_single_match_from_glob(g: &str) -> Result<PathBuf, GlobError> {
    let entries = get_all_matches_from_glob(g)?;
    match entries.as_slice() {
        [] => Err(GlobError::NoMatches {
            glob: g.to_string(),
        }),
        [e] => Ok(e.clone()),
        _ => Err(GlobError::MoreThanOneMatch {
            glob: g.to_string(),
            count: entries.len(),
        }),
    }
}

/// Error type associated with glob helper functions.
#[derive(Error, Debug)]
pub enum GlobError {
    #[error("No glob matches were found for {glob}")]
    NoMatches { glob: String },

    #[error("{count} glob matches were found for {glob}; exactly one is required")]
    MoreThanOneMatch { glob: String, count: usize },

    #[error(transparent)]
    GlobCrate(#[from] glob::GlobError),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}
