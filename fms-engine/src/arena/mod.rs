/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Supervisor of one running event.
//!
//! The [`Arena`] owns the long-lived pieces of the engine and their
//! lifetimes:
//!
//! | Order | Component | Task |
//! |---|---|---|
//! | 1 | [`Store`] | – |
//! | 2 | [`PlayoffTournament`] behind an async mutex | – |
//! | 3 | [`Plc`] | Modbus loop, or the scripted simulation |
//! | 4 | red / blue hub [`SacnController`] | one lighting loop each |
//! | 5 | [`AccessPoint`] | status poller |
//! | 6 | score consumer | reacts to [`ScoreCommitted`] |
//!
//! Startup runs top to bottom.  [`Arena::shutdown`] flips a shared `watch`
//! flag and joins the tasks bottom to top.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::EventSettings;
use crate::game::{determine_match_status, MatchStatus};
use crate::model::{MatchResult, MatchType, Team};
use crate::network::{AccessPoint, AccessPointError, SccSwitch, ShellConnector};
use crate::notifier::Notifier;
use crate::playoff::{PlayoffError, PlayoffTournament};
use crate::plc::modbus::TcpConnector;
use crate::plc::Plc;
use crate::sacn::SacnController;
use crate::store::{Store, StoreError};
use crate::tournament::{calculate_rankings, calculate_team_cards};

const SCORE_QUEUE_DEPTH: usize = 64;

// ── Errors / events ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("match {id} does not exist")]
    UnknownMatch { id: u64 },

    #[error("arena has shut down")]
    Stopped,

    #[error(transparent)]
    Playoff(#[from] PlayoffError),

    #[error(transparent)]
    AccessPoint(#[from] AccessPointError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A match result was persisted and the match status set from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCommitted {
    pub match_id: u64,
    pub match_type: MatchType,
    pub status: MatchStatus,
}

// ── Arena ─────────────────────────────────────────────────────────────────────

pub struct Arena {
    settings: EventSettings,
    store: Arc<dyn Store>,
    playoff: Arc<Mutex<PlayoffTournament>>,
    plc: Arc<Plc>,
    red_hub: Arc<SacnController>,
    blue_hub: Arc<SacnController>,
    access_point: Arc<AccessPoint>,

    score_tx: mpsc::Sender<ScoreCommitted>,
    score_rx: Option<mpsc::Receiver<ScoreCommitted>>,
    scores_processed: Notifier<ScoreCommitted>,

    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Arena {
    /// Builds the bracket and the peripherals.  Nothing runs until
    /// [`start`](Self::start).
    pub fn new(settings: EventSettings, store: Arc<dyn Store>) -> Result<Self, ArenaError> {
        info!(event = %settings.name, "=== Arena::new() ===");
        let playoff = PlayoffTournament::new(settings.playoff_type, settings.num_playoff_alliances)?;

        let plc = Arc::new(Plc::new(settings.plc_address.clone()));
        let red_hub = Arc::new(SacnController::new(
            settings.red_hub.host.clone(),
            settings.red_hub.universe,
            settings.red_hub.start_channel,
        ));
        let blue_hub = Arc::new(SacnController::new(
            settings.blue_hub.host.clone(),
            settings.blue_hub.universe,
            settings.blue_hub.start_channel,
        ));
        let ap = &settings.access_point;
        let access_point = Arc::new(AccessPoint::new(
            &ap.address,
            ap.password.clone(),
            ap.channel,
            ap.network_security_enabled,
        ));

        let (score_tx, score_rx) = mpsc::channel(SCORE_QUEUE_DEPTH);
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            settings,
            store,
            playoff: Arc::new(Mutex::new(playoff)),
            plc,
            red_hub,
            blue_hub,
            access_point,
            score_tx,
            score_rx: Some(score_rx),
            scores_processed: Notifier::new("scores_processed", 16),
            shutdown_tx,
            tasks: Vec::new(),
        })
    }

    pub fn settings(&self) -> &EventSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn playoff(&self) -> &Arc<Mutex<PlayoffTournament>> {
        &self.playoff
    }

    pub fn plc(&self) -> &Arc<Plc> {
        &self.plc
    }

    pub fn red_hub(&self) -> &Arc<SacnController> {
        &self.red_hub
    }

    pub fn blue_hub(&self) -> &Arc<SacnController> {
        &self.blue_hub
    }

    pub fn access_point(&self) -> &Arc<AccessPoint> {
        &self.access_point
    }

    /// Fires once each committed score has been folded into the bracket or
    /// the rankings.
    pub fn scores_processed(&self) -> &Notifier<ScoreCommitted> {
        &self.scores_processed
    }

    /// Spawns the peripheral loops and the score consumer.  With
    /// `simulate_plc` the PLC image follows the scripted simulation instead
    /// of a Modbus connection.
    pub fn start(&mut self, simulate_plc: bool) {
        let Some(score_rx) = self.score_rx.take() else {
            warn!("Arena already started");
            return;
        };
        info!(simulate_plc, "=== Arena::start() ===");

        if simulate_plc {
            let task = self.plc.clone().run_simulation(self.shutdown_tx.subscribe());
            self.tasks.push(("plc-simulation", tokio::spawn(task)));
        } else if self.plc.is_enabled() {
            let task = self.plc.clone().run(TcpConnector, self.shutdown_tx.subscribe());
            self.tasks.push(("plc", tokio::spawn(task)));
        } else {
            debug!("no PLC configured");
        }

        let red = self.red_hub.clone().run(self.shutdown_tx.subscribe());
        self.tasks.push(("sacn-red", tokio::spawn(red)));
        let blue = self.blue_hub.clone().run(self.shutdown_tx.subscribe());
        self.tasks.push(("sacn-blue", tokio::spawn(blue)));

        let ap = self.access_point.clone().run(self.shutdown_tx.subscribe());
        self.tasks.push(("access-point", tokio::spawn(ap)));

        let consumer = consume_scores(
            self.store.clone(),
            self.playoff.clone(),
            score_rx,
            self.scores_processed.clone(),
            self.shutdown_tx.subscribe(),
        );
        self.tasks.push(("score-consumer", tokio::spawn(consumer)));

        info!(tasks = self.tasks.len(), "✓ Arena running");
    }

    /// Signals every loop to stop and waits for them in reverse start order.
    pub async fn shutdown(mut self) {
        info!("=== Arena::shutdown() ===");
        self.shutdown_tx.send_replace(true);
        while let Some((name, handle)) = self.tasks.pop() {
            match handle.await {
                Ok(()) => debug!(task = name, "task joined"),
                Err(e) => error!(task = name, error = %e, "task ended abnormally"),
            }
        }
        info!("✓ Arena stopped");
    }

    /// Materializes the playoff matches and breaks from `start_time`.
    pub async fn create_playoff_matches(&self, start_time: DateTime<Utc>) -> Result<(), ArenaError> {
        let mut playoff = self.playoff.lock().await;
        playoff.create_matches_and_breaks(self.store.as_ref(), start_time)?;
        Ok(())
    }

    /// Persists `result`, decides the match from it and queues a
    /// [`ScoreCommitted`] for the consumer.  A `play_number` of zero is
    /// replaced with the next play of the match.
    pub async fn commit_match_result(&self, mut result: MatchResult) -> Result<MatchStatus, ArenaError> {
        let mut m = self
            .store
            .get_match_by_id(result.match_id)?
            .ok_or(ArenaError::UnknownMatch { id: result.match_id })?;

        result.match_type = m.match_type;
        if result.play_number == 0 {
            let previous = self.store.get_match_result_for_match(m.id)?;
            result.play_number = previous.map_or(1, |r| r.play_number + 1);
        }
        self.store.create_match_result(&mut result)?;

        let apply_playoff_tiebreakers = m.match_type == MatchType::Playoff && m.use_tiebreak_criteria;
        m.status = determine_match_status(&result.red_summary, &result.blue_summary, apply_playoff_tiebreakers);
        self.store.update_match(&m)?;
        info!(
            match_id = m.id,
            name = %m.short_name,
            play = result.play_number,
            status = %m.status,
            "Match result committed"
        );

        let event = ScoreCommitted {
            match_id: m.id,
            match_type: m.match_type,
            status: m.status,
        };
        self.score_tx.send(event).await.map_err(|_| ArenaError::Stopped)?;
        Ok(m.status)
    }

    /// Provisions the access point for the six teams of a match.
    pub async fn configure_team_wifi_for_match(&self, match_id: u64) -> Result<(), ArenaError> {
        let m = self
            .store
            .get_match_by_id(match_id)?
            .ok_or(ArenaError::UnknownMatch { id: match_id })?;

        let mut teams: [Option<Team>; 6] = Default::default();
        for (slot, team_id) in m.red.iter().chain(m.blue.iter()).enumerate() {
            if *team_id != 0 {
                teams[slot] = self.store.get_team_by_id(*team_id)?;
            }
        }
        self.access_point.configure_team_wifi(teams).await?;
        Ok(())
    }

    /// Red and blue SCC switches from the event settings.
    pub fn build_scc_switches<C: ShellConnector + Clone>(&self, connector: C) -> [SccSwitch<C>; 2] {
        [
            SccSwitch::new("red", self.settings.scc_red.clone(), connector.clone()),
            SccSwitch::new("blue", self.settings.scc_blue.clone(), connector),
        ]
    }
}

// ── Score consumer ────────────────────────────────────────────────────────────

async fn consume_scores(
    store: Arc<dyn Store>,
    playoff: Arc<Mutex<PlayoffTournament>>,
    mut score_rx: mpsc::Receiver<ScoreCommitted>,
    processed: Notifier<ScoreCommitted>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("=== score consumer started ===");
    loop {
        let event = tokio::select! {
            event = score_rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = shutdown.changed() => break,
        };
        handle_score_committed(store.as_ref(), &playoff, &event).await;
        processed.notify(event);
    }
    info!("score consumer stopped");
}

async fn handle_score_committed(store: &dyn Store, playoff: &Mutex<PlayoffTournament>, event: &ScoreCommitted) {
    debug!(match_id = event.match_id, match_type = %event.match_type, "handling committed score");
    if event.match_type == MatchType::Practice {
        return;
    }

    if let Err(e) = calculate_team_cards(store, event.match_type) {
        error!(match_type = %event.match_type, error = %e, "Failed to update team cards");
    }

    match event.match_type {
        MatchType::Playoff => {
            let mut bracket = playoff.lock().await;
            if let Err(e) = bracket.update_matches(store) {
                error!(match_id = event.match_id, error = %e, "Failed to update playoff matches");
            }
        }
        MatchType::Qualification => {
            if let Err(e) = calculate_rankings(store, false) {
                error!(match_id = event.match_id, error = %e, "Failed to calculate rankings");
            }
        }
        MatchType::Practice => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::EventSettings;
    use crate::model::Match;
    use crate::network::{SccSettings, ShellSession, SwitchStatus};
    use crate::playoff::PlayoffType;
    use crate::store::MemoryStore;
    use crate::test_helpers::{build_test_match_result, create_test_alliances};

    fn quiet_settings() -> EventSettings {
        EventSettings::default()
    }

    async fn next_processed(rx: &mut tokio::sync::broadcast::Receiver<ScoreCommitted>) -> ScoreCommitted {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("score not processed in time")
            .unwrap()
    }

    fn qualification_match(store: &dyn Store) -> Match {
        for id in 1..=6 {
            store.create_team(&Team::new(id)).unwrap();
        }
        let mut m = Match {
            match_type: MatchType::Qualification,
            type_order: 1,
            short_name: "Q1".into(),
            red: [1, 2, 3],
            blue: [4, 5, 6],
            ..Default::default()
        };
        store.create_match(&mut m).unwrap();
        m
    }

    // ── commit ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn qualification_commit_recomputes_rankings() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let m = qualification_match(store.as_ref());
        let mut arena = Arena::new(quiet_settings(), store.clone()).unwrap();
        let mut processed = arena.scores_processed().subscribe();
        arena.start(false);

        let status = arena.commit_match_result(build_test_match_result(m.id, 0)).await.unwrap();
        assert_eq!(status, MatchStatus::BlueWon);
        let event = next_processed(&mut processed).await;
        assert_eq!(event.match_id, m.id);

        let rankings = store.get_all_rankings().unwrap();
        assert_eq!(rankings.len(), 6);
        assert!([4, 5, 6].contains(&rankings[0].team_id));
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(store.get_match_by_id(m.id).unwrap().unwrap().status, MatchStatus::BlueWon);
        assert_eq!(store.get_match_result_for_match(m.id).unwrap().unwrap().play_number, 1);

        arena.commit_match_result(build_test_match_result(m.id, 0)).await.unwrap();
        next_processed(&mut processed).await;
        assert_eq!(store.get_match_result_for_match(m.id).unwrap().unwrap().play_number, 2);

        arena.shutdown().await;
    }

    #[tokio::test]
    async fn playoff_commits_advance_the_bracket() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        create_test_alliances(store.as_ref(), 2);
        let settings = EventSettings {
            playoff_type: PlayoffType::SingleElimination,
            num_playoff_alliances: 2,
            ..quiet_settings()
        };
        let mut arena = Arena::new(settings, store.clone()).unwrap();
        arena.create_playoff_matches(Utc::now()).await.unwrap();
        let mut processed = arena.scores_processed().subscribe();
        arena.start(false);

        let finals = store.get_matches_by_type(MatchType::Playoff, false).unwrap();
        for m in finals.iter().take(2) {
            let mut result = build_test_match_result(m.id, 0);
            result.match_type = MatchType::Playoff;
            arena.commit_match_result(result).await.unwrap();
            next_processed(&mut processed).await;
        }

        {
            let bracket = arena.playoff().lock().await;
            assert!(bracket.is_complete());
            assert_eq!(bracket.winning_alliance_id(), 2);
            assert_eq!(bracket.finalist_alliance_id(), 1);
        }
        arena.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_match_is_rejected() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let arena = Arena::new(quiet_settings(), store).unwrap();
        let err = arena.commit_match_result(build_test_match_result(42, 1)).await.unwrap_err();
        assert!(matches!(err, ArenaError::UnknownMatch { id: 42 }));
        let err = arena.configure_team_wifi_for_match(42).await.unwrap_err();
        assert!(matches!(err, ArenaError::UnknownMatch { id: 42 }));
    }

    #[test]
    fn invalid_bracket_settings_fail_construction() {
        let settings = EventSettings {
            playoff_type: PlayoffType::SingleElimination,
            num_playoff_alliances: 1,
            ..quiet_settings()
        };
        let result = Arena::new(settings, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(ArenaError::Playoff(PlayoffError::InvalidAllianceCount { .. }))));
    }

    // ── lifecycle ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn simulated_plc_runs_until_shutdown() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut arena = Arena::new(quiet_settings(), store).unwrap();
        arena.start(true);
        arena.start(true);
        assert_eq!(arena.tasks.len(), 5);
        assert_eq!(arena.tasks[0].0, "plc-simulation");

        tokio::time::timeout(Duration::from_secs(5), arena.shutdown())
            .await
            .expect("arena did not stop");
    }

    #[tokio::test]
    async fn disabled_network_security_skips_wifi_configuration() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let m = qualification_match(store.as_ref());
        let arena = Arena::new(quiet_settings(), store).unwrap();
        arena.configure_team_wifi_for_match(m.id).await.unwrap();
    }

    // ── SCC switches ──────────────────────────────────────────────────────────

    #[derive(Clone)]
    struct EchoConnector;

    struct EchoSession;

    impl ShellSession for EchoSession {
        async fn send_line(&mut self, _line: &str) -> std::io::Result<()> {
            Ok(())
        }

        async fn wait(self) -> std::io::Result<String> {
            Ok(String::new())
        }
    }

    impl ShellConnector for EchoConnector {
        type Session = EchoSession;

        async fn connect(&self, _target: &crate::network::scc_switch::ShellTarget) -> std::io::Result<EchoSession> {
            Ok(EchoSession)
        }
    }

    #[tokio::test]
    async fn scc_switches_follow_settings() {
        let settings = EventSettings {
            scc_red: SccSettings {
                address: "10.0.100.48".into(),
                up_commands: vec!["no shutdown".into()],
                ..Default::default()
            },
            ..quiet_settings()
        };
        let arena = Arena::new(settings, Arc::new(MemoryStore::new())).unwrap();
        let [red, blue] = arena.build_scc_switches(EchoConnector);
        assert_eq!(red.name(), "red");
        assert_eq!(blue.name(), "blue");

        let red = red.with_pacing(Duration::ZERO);
        red.set_team_ethernet_enabled(true).await.unwrap();
        assert_eq!(red.status(), SwitchStatus::Active);
        assert_eq!(blue.status(), SwitchStatus::Unknown);
    }
}
