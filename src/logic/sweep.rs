//! Orphan reconciliation sweep.
//!
//! The store has no foreign keys, so deleting a user or team leaves dangling ids behind.
//! The sweep finds those and cascades deletes or trims reference lists, then applies the
//! age-based retention rules. Steps run in a fixed order since later ones rely on the
//! cascades of earlier ones:
//!
//! 1. teams without a live owner, or without any live member
//! 2. scrims whose posting team is gone; request lists trimmed to live teams
//! 3. tournaments whose organizer is gone; referees trimmed; expired completed tournaments
//! 4. matches whose tournament is gone
//! 5. scrims past the retention window
//! 6. chats and notifications that point at no live scrim
//!
//! A dry run reports the same changes without writing anything. There is no transaction:
//! if a step fails, what was already done stays done.

use crate::events::{Event, EventBus};
use crate::models::{Scrim, ScrimId, TeamId, Tournament, TournamentId, TournamentStatus};
use crate::store::{Collection, Document, Store, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Age limits for the retention steps.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Retention {
    /// Scrims older than this are deleted whatever their state.
    pub scrim_days: i64,
    /// Completed tournaments older than this are deleted.
    pub tournament_days: i64,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            scrim_days: 90,
            tournament_days: 365,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SweepOptions {
    pub dry_run: bool,
    /// Log each change at info and list it in `SweepReport::details`.
    pub verbose: bool,
    pub retention: Retention,
}

/// What a sweep changed, or would change in a dry run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SweepReport {
    pub dry_run: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub teams_deleted: Vec<TeamId>,
    /// Users whose team list lost a deleted team.
    pub user_team_refs_removed: usize,
    pub scrims_deleted: Vec<ScrimId>,
    pub scrim_requests_trimmed: Vec<ScrimId>,
    pub tournaments_deleted: Vec<TournamentId>,
    pub referees_trimmed: Vec<TournamentId>,
    pub matches_deleted: usize,
    pub chats_deleted: usize,
    pub notifications_deleted: usize,
    /// One line per change; only filled in verbose mode.
    pub details: Vec<String>,
    pub errors: Vec<String>,
}

impl SweepReport {
    pub fn total_changes(&self) -> usize {
        self.teams_deleted.len()
            + self.user_team_refs_removed
            + self.scrims_deleted.len()
            + self.scrim_requests_trimmed.len()
            + self.tournaments_deleted.len()
            + self.referees_trimmed.len()
            + self.matches_deleted
            + self.chats_deleted
            + self.notifications_deleted
    }

    /// True when the sweep found nothing to repair.
    pub fn is_noop(&self) -> bool {
        self.total_changes() == 0 && self.errors.is_empty()
    }
}

/// The sweep stopped part way. `report` holds what was done before the failure.
#[derive(Debug, Error)]
#[error("cleanup sweep aborted: {source}")]
pub struct SweepError {
    pub source: StoreError,
    pub report: Box<SweepReport>,
}

/// Run all sweep steps against `store`.
pub async fn run_sweep(
    store: &Store,
    events: &EventBus,
    options: &SweepOptions,
) -> Result<SweepReport, SweepError> {
    let mut sweep = Sweep::new(store, events, options);
    log::info!(
        "Starting {} cleanup sweep",
        if options.dry_run { "dry-run" } else { "live" }
    );
    let outcome = sweep.run_steps().await;
    let mut report = sweep.report;
    report.finished_at = Some(Utc::now());
    match outcome {
        Ok(()) => {
            log::info!(
                "Cleanup sweep finished{}: {} team(s), {} scrim(s), {} tournament(s), {} match(es), {} chat(s), {} notification(s) removed; {} change(s) total",
                if options.dry_run { " (dry run)" } else { "" },
                report.teams_deleted.len(),
                report.scrims_deleted.len(),
                report.tournaments_deleted.len(),
                report.matches_deleted,
                report.chats_deleted,
                report.notifications_deleted,
                report.total_changes()
            );
            Ok(report)
        }
        Err(source) => Err(abort(report, source)),
    }
}

/// Close out a failed sweep. What was already done is kept in the report.
fn abort(mut report: SweepReport, source: StoreError) -> SweepError {
    log::error!(
        "Cleanup sweep aborted after {} change(s): {}",
        report.total_changes(),
        source
    );
    report.finished_at.get_or_insert_with(Utc::now);
    report.errors.push(source.to_string());
    SweepError {
        source,
        report: Box::new(report),
    }
}

/// State of one sweep run. `removed` holds every id deleted so far (or that would be,
/// in a dry run), so later steps see the store as the earlier steps left it.
struct Sweep<'a> {
    store: &'a Store,
    events: &'a EventBus,
    options: &'a SweepOptions,
    now: DateTime<Utc>,
    removed: HashSet<Uuid>,
    report: SweepReport,
}

impl<'a> Sweep<'a> {
    fn new(store: &'a Store, events: &'a EventBus, options: &'a SweepOptions) -> Self {
        let now = Utc::now();
        Self {
            store,
            events,
            options,
            now,
            removed: HashSet::new(),
            report: SweepReport {
                dry_run: options.dry_run,
                started_at: Some(now),
                ..SweepReport::default()
            },
        }
    }

    fn live(&self) -> bool {
        !self.options.dry_run
    }

    fn note(&mut self, line: String) {
        if self.options.verbose {
            log::info!("sweep: {}", line);
            self.report.details.push(line);
        } else {
            log::debug!("sweep: {}", line);
        }
    }

    /// Ids in `collection` not yet removed by this sweep.
    async fn live_ids<T: Document>(&self, collection: &Collection<T>) -> HashSet<Uuid> {
        collection
            .ids()
            .await
            .into_iter()
            .filter(|id| !self.removed.contains(id))
            .collect()
    }

    async fn run_steps(&mut self) -> Result<(), StoreError> {
        self.sweep_teams().await?;
        self.sweep_scrims().await?;
        self.sweep_tournaments().await?;
        self.sweep_matches().await?;
        self.expire_scrims().await?;
        self.sweep_scrim_leftovers().await?;
        Ok(())
    }

    /// Delete a scrim after its chats and notifications.
    async fn delete_scrim(&mut self, scrim: &Scrim, reason: &str) {
        let id = scrim.id;
        let chats: Vec<Uuid> = self
            .store
            .chats
            .find(|c| c.scrim == Some(id))
            .await
            .into_iter()
            .map(|c| c.id)
            .filter(|c| !self.removed.contains(c))
            .collect();
        let notifications: Vec<Uuid> = self
            .store
            .notifications
            .find(|n| n.scrim == Some(id))
            .await
            .into_iter()
            .map(|n| n.id)
            .filter(|n| !self.removed.contains(n))
            .collect();
        if self.live() {
            self.store.chats.delete_many(|c| c.scrim == Some(id)).await;
            self.store
                .notifications
                .delete_many(|n| n.scrim == Some(id))
                .await;
            self.store.scrims.delete(id).await;
            self.events.publish(Event::ScrimDeleted { scrim: id });
        }
        self.report.chats_deleted += chats.len();
        self.report.notifications_deleted += notifications.len();
        self.removed.extend(chats);
        self.removed.extend(notifications);
        self.removed.insert(id);
        self.report.scrims_deleted.push(id);
        self.note(format!("scrim {} deleted ({})", id, reason));
    }

    /// Delete a tournament after its matches.
    async fn delete_tournament(&mut self, tournament: &Tournament, reason: &str) {
        let id = tournament.id;
        let matches: Vec<Uuid> = self
            .store
            .matches
            .find(|m| m.tournament == id)
            .await
            .into_iter()
            .map(|m| m.id)
            .filter(|m| !self.removed.contains(m))
            .collect();
        if self.live() {
            self.store.matches.delete_many(|m| m.tournament == id).await;
            self.store.tournaments.delete(id).await;
        }
        self.report.matches_deleted += matches.len();
        self.removed.extend(matches);
        self.removed.insert(id);
        self.report.tournaments_deleted.push(id);
        self.note(format!("tournament {} deleted ({})", id, reason));
    }

    fn mark_requests_trimmed(&mut self, scrim: ScrimId) {
        if !self.report.scrim_requests_trimmed.contains(&scrim) {
            self.report.scrim_requests_trimmed.push(scrim);
        }
    }

    /// Step 1.
    async fn sweep_teams(&mut self) -> Result<(), StoreError> {
        let users = self.store.users.ids().await;
        let orphans = self
            .store
            .teams
            .find(|t| !users.contains(&t.owner) || !t.members.iter().any(|m| users.contains(m)))
            .await;

        for team in orphans {
            let id = team.id;
            let reason = if users.contains(&team.owner) {
                "no live members"
            } else {
                "owner deleted"
            };

            let referencing_users = self.store.users.find(|u| u.teams.contains(&id)).await.len();
            if self.live() {
                self.store
                    .users
                    .update_many(|u| u.teams.contains(&id), |u| u.teams.retain(|&t| t != id))
                    .await;
            }
            self.report.user_team_refs_removed += referencing_users;

            let posted = self.store.scrims.find(|s| s.team_a == id).await;
            for scrim in posted {
                if !self.removed.contains(&scrim.id) {
                    self.delete_scrim(&scrim, "posting team deleted").await;
                }
            }

            let requested = self.store.scrims.find(|s| s.requests.contains(&id)).await;
            for scrim in requested {
                if self.removed.contains(&scrim.id) {
                    continue;
                }
                if self.live() {
                    self.store
                        .scrims
                        .update(scrim.id, |s| s.requests.retain(|&t| t != id))
                        .await?;
                }
                self.mark_requests_trimmed(scrim.id);
            }

            if self.live() {
                self.store.teams.delete(id).await;
            }
            self.removed.insert(id);
            self.report.teams_deleted.push(id);
            self.note(format!("team {} ({}) deleted ({})", id, team.name, reason));
        }
        Ok(())
    }

    /// Step 2.
    async fn sweep_scrims(&mut self) -> Result<(), StoreError> {
        let teams = self.live_ids(&self.store.teams).await;
        let scrims = self.store.scrims.all().await;
        for scrim in scrims {
            if self.removed.contains(&scrim.id) {
                continue;
            }
            if !teams.contains(&scrim.team_a) {
                self.delete_scrim(&scrim, "posting team missing").await;
                continue;
            }
            let kept: Vec<TeamId> = scrim
                .requests
                .iter()
                .copied()
                .filter(|t| teams.contains(t))
                .collect();
            if kept.len() != scrim.requests.len() {
                if self.live() {
                    self.store
                        .scrims
                        .update(scrim.id, |s| s.requests = kept)
                        .await?;
                }
                self.mark_requests_trimmed(scrim.id);
                self.note(format!("scrim {} request list trimmed", scrim.id));
            }
        }
        Ok(())
    }

    /// Step 3.
    async fn sweep_tournaments(&mut self) -> Result<(), StoreError> {
        let users = self.store.users.ids().await;
        let tournaments = self.store.tournaments.all().await;
        for tournament in &tournaments {
            if !users.contains(&tournament.organizer) {
                self.delete_tournament(tournament, "organizer deleted").await;
                continue;
            }
            let kept: Vec<Uuid> = tournament
                .referees
                .iter()
                .copied()
                .filter(|r| users.contains(r))
                .collect();
            if kept.len() != tournament.referees.len() {
                if self.live() {
                    self.store
                        .tournaments
                        .update(tournament.id, |t| t.referees = kept)
                        .await?;
                }
                self.report.referees_trimmed.push(tournament.id);
                self.note(format!("tournament {} referee list trimmed", tournament.id));
            }
        }

        let cutoff = self.now - Duration::days(self.options.retention.tournament_days);
        for tournament in &tournaments {
            if self.removed.contains(&tournament.id) {
                continue;
            }
            if tournament.status == TournamentStatus::Complete && tournament.created_at < cutoff {
                self.delete_tournament(tournament, "completed and past retention")
                    .await;
            }
        }
        Ok(())
    }

    /// Step 4. Only finds anything if an earlier cascade was interrupted.
    async fn sweep_matches(&mut self) -> Result<(), StoreError> {
        let tournaments = self.live_ids(&self.store.tournaments).await;
        let orphans: Vec<Uuid> = self
            .store
            .matches
            .find(|m| !tournaments.contains(&m.tournament))
            .await
            .into_iter()
            .map(|m| m.id)
            .filter(|id| !self.removed.contains(id))
            .collect();
        for id in orphans {
            if self.live() {
                self.store.matches.delete(id).await;
            }
            self.removed.insert(id);
            self.report.matches_deleted += 1;
            self.note(format!("match {} deleted (tournament missing)", id));
        }
        Ok(())
    }

    /// Step 5.
    async fn expire_scrims(&mut self) -> Result<(), StoreError> {
        let cutoff = self.now - Duration::days(self.options.retention.scrim_days);
        let expired = self.store.scrims.find(|s| s.created_at < cutoff).await;
        for scrim in expired {
            if !self.removed.contains(&scrim.id) {
                self.delete_scrim(&scrim, "past retention").await;
            }
        }
        Ok(())
    }

    /// Step 6. Catches records that never had a scrim reference or missed a cascade.
    async fn sweep_scrim_leftovers(&mut self) -> Result<(), StoreError> {
        let scrims = self.live_ids(&self.store.scrims).await;
        let dangling = |scrim: Option<ScrimId>| scrim.map_or(true, |s| !scrims.contains(&s));

        let chats: Vec<Uuid> = self
            .store
            .chats
            .find(|c| dangling(c.scrim))
            .await
            .into_iter()
            .map(|c| c.id)
            .filter(|id| !self.removed.contains(id))
            .collect();
        let notifications: Vec<Uuid> = self
            .store
            .notifications
            .find(|n| dangling(n.scrim))
            .await
            .into_iter()
            .map(|n| n.id)
            .filter(|id| !self.removed.contains(id))
            .collect();

        if self.live() {
            for &id in &chats {
                self.store.chats.delete(id).await;
            }
            for &id in &notifications {
                self.store.notifications.delete(id).await;
            }
        }
        if !chats.is_empty() || !notifications.is_empty() {
            self.note(format!(
                "{} chat(s) and {} notification(s) without a scrim deleted",
                chats.len(),
                notifications.len()
            ));
        }
        self.report.chats_deleted += chats.len();
        self.report.notifications_deleted += notifications.len();
        self.removed.extend(chats);
        self.removed.extend(notifications);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_keeps_partial_report() {
        let team = Uuid::new_v4();
        let report = SweepReport {
            started_at: Some(Utc::now()),
            teams_deleted: vec![team],
            chats_deleted: 2,
            ..SweepReport::default()
        };
        let scrim = Uuid::new_v4();
        let err = abort(
            report,
            StoreError::NotFound {
                collection: "scrims",
                id: scrim,
            },
        );

        assert!(matches!(err.source, StoreError::NotFound { id, .. } if id == scrim));
        assert_eq!(err.report.errors.len(), 1);
        assert!(err.report.errors[0].contains(&scrim.to_string()));
        assert!(err.report.finished_at.is_some());
        assert_eq!(err.report.teams_deleted, vec![team]);
        assert_eq!(err.report.chats_deleted, 2);
        assert_eq!(err.report.total_changes(), 3);
        assert!(!err.report.is_noop());
        assert!(err.to_string().starts_with("cleanup sweep aborted"));
    }
}
