//! [`SubscriptionService`], the single entry point transports call into.
//!
//! The service owns no state of its own. It validates date ranges, delegates
//! to the store, and folds backend failures and absent records into
//! [`crate::Error`].

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result, billing,
  store::{Page, PeriodQuery, SubscriptionFilter, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};

/// Create/read/update/delete/list plus cost aggregation over any
/// [`SubscriptionStore`].
///
/// Cloning is cheap; the store is shared behind an [`Arc`].
pub struct SubscriptionService<S> {
  store: Arc<S>,
}

impl<S> Clone for SubscriptionService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: SubscriptionStore> SubscriptionService<S> {
  pub fn new(store: S) -> Self { Self { store: Arc::new(store) } }

  pub async fn create(&self, input: NewSubscription) -> Result<Subscription> {
    input.validate()?;
    let sub = self.store.create(input).await.map_err(Error::storage)?;
    info!(subscription_id = %sub.id, user_id = %sub.user_id, "created subscription");
    Ok(sub)
  }

  pub async fn get(&self, id: Uuid) -> Result<Subscription> {
    self
      .store
      .get(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::SubscriptionNotFound(id))
  }

  pub async fn update(&self, id: Uuid, input: NewSubscription) -> Result<Subscription> {
    input.validate()?;
    let sub = self
      .store
      .update(id, input)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::SubscriptionNotFound(id))?;
    info!(subscription_id = %sub.id, user_id = %sub.user_id, "updated subscription");
    Ok(sub)
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    if !self.store.delete(id).await.map_err(Error::storage)? {
      return Err(Error::SubscriptionNotFound(id));
    }
    info!(subscription_id = %id, "deleted subscription");
    Ok(())
  }

  pub async fn list(
    &self,
    filter: &SubscriptionFilter,
    limit: i64,
    offset: i64,
  ) -> Result<Vec<Subscription>> {
    self
      .store
      .list(filter, Page::new(limit, offset))
      .await
      .map_err(Error::storage)
  }

  /// Total cost of every subscription overlapping the query period, billed
  /// per touched calendar month. Zero when nothing matches.
  pub async fn aggregate_total_cost(&self, query: &PeriodQuery) -> Result<i64> {
    let candidates = self
      .store
      .scan_overlapping(query)
      .await
      .map_err(Error::storage)?;

    let total = billing::total_cost(&candidates, query.period_start, query.period_end);
    debug!(
      from = %query.period_start,
      to = %query.period_end,
      candidates = candidates.len(),
      total,
      "aggregated subscription cost"
    );
    Ok(total)
  }
}
