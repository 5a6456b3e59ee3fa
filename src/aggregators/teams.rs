// Team aggregator
// Walks every team's rotation summary and derives per-rotation staffing,
// phone reachability and the system-wide understaffed/unreachable rollups
//
// Numan Thabit 2025 Nov

use super::{Aggregator, AggregatorFuture};
use crate::errors::ExporterError;
use crate::metrics::ExporterMetrics;
use crate::model::{has_phone, Slot, TeamSummary};
use crate::transport::OncallClient;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStaffing {
    pub slot: Slot,
    pub staff: usize,
    pub unreachable: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStaffing {
    pub slots: Vec<SlotStaffing>,
    /// Some scheduled slot has fewer than two people on call.
    pub understaffed: bool,
    /// Some scheduled slot has nobody reachable by phone.
    pub unreachable_by_phone: bool,
}

/// Staffing figures for one team.
///
/// A slot with nothing scheduled reports zero staff and never flags the team.
/// A scheduled event with an empty roster does flag it on both counts: fewer
/// than two people, and all of them (none) lack a phone.
pub fn team_staffing(summary: &TeamSummary) -> TeamStaffing {
    let mut staffing = TeamStaffing {
        slots: Vec::with_capacity(Slot::ALL.len()),
        understaffed: false,
        unreachable_by_phone: false,
    };

    for slot in Slot::ALL {
        let Some(event) = summary.event(slot) else {
            staffing.slots.push(SlotStaffing {
                slot,
                staff: 0,
                unreachable: 0,
            });
            continue;
        };

        let (staff, unreachable) = event.members().fold((0, 0), |(staff, unreachable), m| {
            let missing = usize::from(!has_phone(&m.user_contacts));
            (staff + 1, unreachable + missing)
        });

        staffing.understaffed |= staff < 2;
        staffing.unreachable_by_phone |= unreachable == staff;
        staffing.slots.push(SlotStaffing {
            slot,
            staff,
            unreachable,
        });
    }
    staffing
}

pub struct TeamAggregator {
    client: OncallClient,
    metrics: Arc<ExporterMetrics>,
}

impl TeamAggregator {
    pub fn new(client: OncallClient, metrics: Arc<ExporterMetrics>) -> Self {
        Self { client, metrics }
    }

    fn record(&self, team: &str, staffing: &TeamStaffing) {
        for s in &staffing.slots {
            let labels = [team, s.slot.as_str()];
            self.metrics
                .team_rotation_staff_count
                .with_label_values(&labels)
                .set(s.staff as i64);
            self.metrics
                .team_unreachable_by_phone_count
                .with_label_values(&labels)
                .set(s.unreachable as i64);
        }
    }
}

impl Aggregator for TeamAggregator {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn run(&self) -> AggregatorFuture<'_> {
        Box::pin(async move {
            let Some(teams) = self.client.teams().await? else {
                return Ok(());
            };
            debug!(count = teams.len(), "got teams");
            self.metrics.teams_total.set(teams.len() as i64);

            let mut understaffed = 0;
            let mut unreachable = 0;
            for team in &teams {
                let summary = match self.client.team_summary(team).await {
                    Ok(Some(summary)) => summary,
                    Ok(None) => continue,
                    Err(err @ ExporterError::Transport { .. }) => {
                        warn!(team = %team, error = %err, "skipping team");
                        continue;
                    }
                    Err(err) => return Err(err),
                };

                let staffing = team_staffing(&summary);
                self.record(team, &staffing);
                if staffing.understaffed {
                    debug!(team = %team, "team is understaffed");
                    understaffed += 1;
                }
                if staffing.unreachable_by_phone {
                    debug!(team = %team, "team is unreachable by phone");
                    unreachable += 1;
                }
            }

            self.metrics.teams_understaffed.set(understaffed);
            self.metrics.teams_unreachable_by_phone.set(unreachable);
            Ok(())
        })
    }
}
