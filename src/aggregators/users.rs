// User aggregator
// Counts registered users and the ones that cannot be contacted,
// or cannot be contacted by phone
//
// Numan Thabit 2025 Nov

use super::{Aggregator, AggregatorFuture};
use crate::metrics::ExporterMetrics;
use crate::model::{has_phone, User};
use crate::transport::OncallClient;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total: usize,
    pub without_contacts: usize,
    pub without_phone: usize,
}

/// Classify every user. The two "without" counts are independent: a user with
/// no contacts at all lands in both.
pub fn user_stats(users: &[User]) -> UserStats {
    let mut stats = UserStats {
        total: users.len(),
        ..Default::default()
    };
    for user in users {
        if user.contacts.is_empty() {
            debug!(user = %user.name, "user has no contacts");
            stats.without_contacts += 1;
        }
        if !has_phone(&user.contacts) {
            debug!(user = %user.name, "user has no phone number");
            stats.without_phone += 1;
        }
    }
    stats
}

pub struct UserAggregator {
    client: OncallClient,
    metrics: Arc<ExporterMetrics>,
}

impl UserAggregator {
    pub fn new(client: OncallClient, metrics: Arc<ExporterMetrics>) -> Self {
        Self { client, metrics }
    }
}

impl Aggregator for UserAggregator {
    fn name(&self) -> &'static str {
        "users"
    }

    fn run(&self) -> AggregatorFuture<'_> {
        Box::pin(async move {
            let Some(users) = self.client.users().await? else {
                return Ok(());
            };
            debug!(count = users.len(), "got users");

            let stats = user_stats(&users);
            self.metrics.users_total.set(stats.total as i64);
            self.metrics
                .users_without_contacts
                .set(stats.without_contacts as i64);
            self.metrics.users_without_phone.set(stats.without_phone as i64);
            Ok(())
        })
    }
}
