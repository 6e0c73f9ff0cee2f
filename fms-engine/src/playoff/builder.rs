/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Turns a set of matchup templates into the arena of live [`Matchup`]s.
//!
//! Templates name their children by id.  Building starts at the final and
//! recurses down, dropping every node that no longer has two real alliances
//! once seeds above `num_alliances` are removed:
//!
//! | Sides after pruning | Winner edge | Loser edge |
//! |---|---|---|
//! | two | real matchup | real matchup |
//! | one | bye: forwards that side | pruned |
//! | none | pruned | pruned |

use std::collections::{BTreeMap, BTreeSet};

use super::error::PlayoffError;
use super::matchup::{AllianceSource, MatchSpec, Matchup, FINAL_MATCHUP_ID};

// ── Templates ─────────────────────────────────────────────────────────────────

/// One side of a matchup template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceTemplate {
    Selection(u32),
    Winner(String),
    Loser(String),
}

#[derive(Debug, Clone)]
pub(crate) struct MatchupTemplate {
    pub id: String,
    pub num_wins_to_advance: u32,
    pub red: SourceTemplate,
    pub blue: SourceTemplate,
    pub specs: Vec<MatchSpec>,
}

/// Result of resolving one template under a given edge.
#[derive(Debug, Clone, Copy)]
enum Resolved {
    /// Nothing real feeds this edge.
    Pruned,
    /// The edge carries an alliance without playing this matchup.
    Forward(AllianceSource),
    /// A real matchup at this arena index.
    Matchup(usize),
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Output of a successful build.
#[derive(Debug)]
pub(crate) struct Bracket {
    pub matchups: Vec<Matchup>,
    pub final_index: usize,
}

pub(crate) fn build_bracket(
    templates: Vec<MatchupTemplate>,
    num_alliances: u32,
) -> Result<Bracket, PlayoffError> {
    let mut by_id = BTreeMap::new();
    for template in templates {
        if by_id.contains_key(&template.id) {
            return Err(PlayoffError::DuplicateMatchup(template.id));
        }
        by_id.insert(template.id.clone(), template);
    }

    let mut builder = Builder {
        templates: by_id,
        num_alliances,
        matchups: Vec::new(),
        built: BTreeMap::new(),
    };
    let final_index = match builder.resolve(FINAL_MATCHUP_ID, true)? {
        Resolved::Matchup(index) => index,
        _ => {
            return Err(PlayoffError::InvalidBracket(
                "the final has fewer than two alliances".to_string(),
            ))
        }
    };

    let bracket = Bracket {
        matchups: builder.matchups,
        final_index,
    };
    validate(&bracket)?;
    Ok(bracket)
}

struct Builder {
    templates: BTreeMap<String, MatchupTemplate>,
    num_alliances: u32,
    matchups: Vec<Matchup>,
    /// Template id → arena index, so shared children are built once.
    built: BTreeMap<String, usize>,
}

impl Builder {
    fn resolve(&mut self, id: &str, use_winner: bool) -> Result<Resolved, PlayoffError> {
        if let Some(&index) = self.built.get(id) {
            return Ok(Resolved::Matchup(index));
        }
        let template = self
            .templates
            .get(id)
            .cloned()
            .ok_or_else(|| PlayoffError::InvalidBracket(format!("could not find template for matchup \"{}\"", id)))?;

        let both_selection = matches!(
            (&template.red, &template.blue),
            (SourceTemplate::Selection(_), SourceTemplate::Selection(_))
        );
        if both_selection
            && (template.red == SourceTemplate::Selection(0) || template.blue == SourceTemplate::Selection(0))
        {
            return Err(PlayoffError::InvalidBracket(format!(
                "matchup \"{}\": both alliances must be populated either from selection or a lower round",
                id
            )));
        }

        let red = self.resolve_side(&template.red)?;
        let blue = self.resolve_side(&template.blue)?;

        match (red, blue) {
            (Some(red_source), Some(blue_source)) => {
                let index = self.matchups.len();
                self.matchups.push(Matchup {
                    id: template.id.clone(),
                    num_wins_to_advance: template.num_wins_to_advance,
                    red_source,
                    blue_source,
                    specs: template
                        .specs
                        .iter()
                        .cloned()
                        .map(|mut spec| {
                            spec.match_group_id = template.id.clone();
                            spec.is_hidden = spec.hidden_by_default;
                            spec
                        })
                        .collect(),
                    red_alliance_id: 0,
                    blue_alliance_id: 0,
                    red_alliance_wins: 0,
                    blue_alliance_wins: 0,
                    num_matches_played: 0,
                    winning_destination: None,
                    losing_destination: None,
                });
                for source in [red_source, blue_source] {
                    if let AllianceSource::Matchup { index: child, use_winner } = source {
                        if use_winner {
                            self.matchups[child].winning_destination = Some(index);
                        } else {
                            self.matchups[child].losing_destination = Some(index);
                        }
                    }
                }
                self.built.insert(template.id, index);
                Ok(Resolved::Matchup(index))
            }
            (Some(only), None) | (None, Some(only)) if use_winner => Ok(Resolved::Forward(only)),
            _ => Ok(Resolved::Pruned),
        }
    }

    fn resolve_side(&mut self, side: &SourceTemplate) -> Result<Option<AllianceSource>, PlayoffError> {
        let (id, use_winner) = match side {
            SourceTemplate::Selection(seed) => {
                return Ok((*seed > 0 && *seed <= self.num_alliances).then_some(AllianceSource::Selection(*seed)))
            }
            SourceTemplate::Winner(id) => (id, true),
            SourceTemplate::Loser(id) => (id, false),
        };
        Ok(match self.resolve(id, use_winner)? {
            Resolved::Pruned => None,
            Resolved::Forward(source) => Some(source),
            Resolved::Matchup(index) => Some(AllianceSource::Matchup { index, use_winner }),
        })
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Visits the final and everything reachable from it through winner edges,
/// parent before children.
pub(crate) fn traverse(matchups: &[Matchup], index: usize, visit: &mut dyn FnMut(usize)) {
    visit(index);
    let m = &matchups[index];
    for source in [m.red_source, m.blue_source] {
        if let Some(child) = source.traversal_child() {
            traverse(matchups, child, visit);
        }
    }
}

fn validate(bracket: &Bracket) -> Result<(), PlayoffError> {
    let mut order = Vec::new();
    traverse(&bracket.matchups, bracket.final_index, &mut |i| order.push(i));

    let mut ids = BTreeSet::new();
    let mut long_names = BTreeSet::new();
    let mut short_names = BTreeSet::new();
    let mut orders = BTreeSet::new();
    let mut tba_keys = BTreeSet::new();
    for index in order {
        let m = &bracket.matchups[index];
        if !ids.insert(m.id.clone()) {
            return Err(PlayoffError::DuplicateMatchup(m.id.clone()));
        }
        for spec in &m.specs {
            if !long_names.insert(spec.long_name.clone()) {
                return Err(PlayoffError::DuplicateMatch {
                    field: "long name",
                    value: spec.long_name.clone(),
                });
            }
            if !short_names.insert(spec.short_name.clone()) {
                return Err(PlayoffError::DuplicateMatch {
                    field: "short name",
                    value: spec.short_name.clone(),
                });
            }
            if !orders.insert(spec.order) {
                return Err(PlayoffError::DuplicateMatch {
                    field: "order",
                    value: spec.order.to_string(),
                });
            }
            if !tba_keys.insert(spec.tba_match_key.clone()) {
                return Err(PlayoffError::DuplicateMatch {
                    field: "TBA key",
                    value: format!(
                        "{}{}m{}",
                        spec.tba_match_key.comp_level, spec.tba_match_key.set_number, spec.tba_match_key.match_number
                    ),
                });
            }
        }
    }
    Ok(())
}
