/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Errors surfaced by the playoff bracket.
//!
//! Construction errors (`InvalidBracket`, `DuplicateMatchup`,
//! `DuplicateMatch`) indicate a broken template and abort building the
//! bracket.  The rest are reported to the command that triggered them; any
//! store writes made before the failure point are kept.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayoffError {
    #[error("invalid playoff type: {0}")]
    InvalidPlayoffType(String),

    #[error("{playoff_type} bracket {requirement}")]
    InvalidAllianceCount {
        playoff_type: &'static str,
        requirement: &'static str,
        num_alliances: u32,
    },

    /// The template graph cannot be resolved.
    #[error("invalid bracket: {0}")]
    InvalidBracket(String),

    #[error("match group with ID \"{0}\" defined more than once")]
    DuplicateMatchup(String),

    /// Two specs share a `field` that must be unique across the bracket.
    #[error("match with {field} \"{value}\" defined more than once")]
    DuplicateMatch { field: &'static str, value: String },

    #[error("unknown matchup \"{id}\"")]
    UnknownMatchup { id: String },

    #[error("cannot create playoff matches; {count} matches already exist")]
    AlreadyMaterialized { count: usize },

    #[error("cannot update playoff matches; no matches exist")]
    NoMatches,

    #[error("no playoff match exists with order {order}")]
    MissingMatch { order: u32 },

    #[error("alliance {id} does not exist")]
    UnknownAlliance { id: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
