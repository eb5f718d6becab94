use std::{collections::HashMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{Credits, NewOrderRecord, Product, UserId},
    events::{EventProducers, OrderFailedEvent, OrderPlacedEvent},
    helpers::{parse_order, ParsedItem},
    rse_api::{
        errors::OrderFlowError,
        order_objects::{Charge, OrderOutcome, OrderReceipt, PricedItem, RefundPolicy},
    },
    traits::{
        AccountManagement,
        CatalogManagement,
        DebitResult,
        FulfillmentProvider,
        OrderManagement,
        RemoteBalance,
        RemoteOrderStatus,
    },
};

/// `OrderFlowApi` turns an order command into fulfillment requests: parse, price, charge, dispatch.
///
/// Charging is all-or-nothing per request. The whole total is checked and deducted in one conditional update before
/// anything is sent to the fulfillment panel. Dispatch, on the other hand, is best effort: every line item gets its
/// own fulfillment call and its own order record, and one failure never stops the others.
pub struct OrderFlowApi<B, F> {
    db: B,
    fulfillment: F,
    producers: EventProducers,
    operator: UserId,
    refund_policy: RefundPolicy,
}

impl<B, F> Debug for OrderFlowApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi (operator: {}, refunds: {})", self.operator, self.refund_policy)
    }
}

impl<B, F> OrderFlowApi<B, F> {
    pub fn new(db: B, fulfillment: F, producers: EventProducers, operator: UserId) -> Self {
        Self { db, fulfillment, producers, operator, refund_policy: RefundPolicy::default() }
    }

    pub fn with_refund_policy(mut self, policy: RefundPolicy) -> Self {
        self.refund_policy = policy;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn fulfillment(&self) -> &F {
        &self.fulfillment
    }

    pub fn refund_policy(&self) -> RefundPolicy {
        self.refund_policy
    }
}

/// Attaches catalog data and costs to parsed items. Products without a price cost nothing.
fn price_against(items: &[ParsedItem], catalog: &HashMap<String, Product>) -> Result<Vec<PricedItem>, OrderFlowError> {
    items
        .iter()
        .map(|item| {
            let product =
                catalog.get(&item.product_key).ok_or_else(|| OrderFlowError::UnknownProduct(item.product_key.clone()))?;
            Ok(PricedItem {
                product_key: item.product_key.clone(),
                display_name: item.display_name.clone(),
                quantity: item.quantity,
                service_id: product.is_fulfillable().then(|| product.service_id.clone()).flatten(),
                cost: product.quote(item.quantity),
            })
        })
        .collect()
}

impl<B, F> OrderFlowApi<B, F>
where
    B: CatalogManagement + AccountManagement + OrderManagement,
    F: FulfillmentProvider,
{
    /// The full ordering pipeline for one command body: `<link> <name> <qty> [<name> <qty> ...]`.
    ///
    /// Nothing is charged or dispatched unless the body parses to at least one item and the party can pay for all of
    /// them.
    pub async fn place_order(&self, user: UserId, body: &str) -> Result<OrderReceipt, OrderFlowError> {
        self.db.fetch_or_create_account(user).await?;
        let catalog = self
            .db
            .fetch_products()
            .await?
            .into_iter()
            .map(|p| (p.key.clone(), p))
            .collect::<HashMap<String, Product>>();
        let keys = catalog.keys().cloned().collect::<Vec<String>>();
        let parsed = parse_order(body, &keys)?;
        debug!("🔄️📦️ Order from user {user} parsed into {} items for {}", parsed.items.len(), parsed.destination_link);
        let priced = price_against(&parsed.items, &catalog)?;
        let charge = self.charge_request(user, priced).await?;
        let outcomes = self.dispatch(&charge, &parsed.destination_link).await;
        let refunded = outcomes.iter().filter(|o| o.refunded).map(|o| o.item.cost).sum();
        let balance_after = match charge.debited {
            true => match self.db.fetch_account(user).await {
                Ok(account) => account.map(|a| a.balance),
                Err(e) => {
                    warn!("🔄️💰️ Could not read the balance of user {user} after their order. {e}");
                    None
                },
            },
            false => None,
        };
        let receipt = OrderReceipt {
            link: parsed.destination_link,
            outcomes,
            total: charge.total,
            refunded,
            balance_after,
        };
        info!(
            "🔄️📦️ Order for user {user} complete. {} placed, {} failed, {} charged",
            receipt.placed_count(),
            receipt.failed_count(),
            receipt.total
        );
        Ok(receipt)
    }

    /// Prices parsed items against the current catalog.
    pub async fn price_items(&self, items: &[ParsedItem]) -> Result<Vec<PricedItem>, OrderFlowError> {
        let mut catalog = HashMap::with_capacity(items.len());
        for item in items {
            if catalog.contains_key(&item.product_key) {
                continue;
            }
            let product = self
                .db
                .fetch_product(&item.product_key)
                .await?
                .ok_or_else(|| OrderFlowError::UnknownProduct(item.product_key.clone()))?;
            catalog.insert(item.product_key.clone(), product);
        }
        price_against(items, &catalog)
    }

    /// Charges the party for all the items at once.
    ///
    /// The operator is never charged. Everyone else must hold at least the total, otherwise
    /// [`OrderFlowError::InsufficientBalance`] is returned and the ledger is left untouched. A total that cannot be
    /// represented is refused outright with [`OrderFlowError::TotalOutOfRange`].
    pub async fn charge_request(&self, user: UserId, items: Vec<PricedItem>) -> Result<Charge, OrderFlowError> {
        let total = Credits::checked_sum(items.iter().map(|i| i.cost)).ok_or(OrderFlowError::TotalOutOfRange)?;
        if total.is_negative() {
            return Err(OrderFlowError::TotalOutOfRange);
        }
        if user == self.operator {
            trace!("🔄️💰️ The operator is not charged for orders");
            return Ok(Charge { user, items, total, debited: false });
        }
        if total == Credits::zero() {
            return Ok(Charge { user, items, total, debited: false });
        }
        match self.db.try_debit(user, total).await? {
            DebitResult::Debited(account) => {
                debug!("🔄️💰️ Charged user {user} {total}. Remaining balance: {}", account.balance);
                Ok(Charge { user, items, total, debited: true })
            },
            DebitResult::Insufficient { available } => {
                info!("🔄️💰️ User {user} cannot afford an order of {total}. Balance: {available}");
                Err(OrderFlowError::InsufficientBalance { required: total, available })
            },
        }
    }

    /// Sends every charged item to the fulfillment panel and records the outcome.
    ///
    /// Once the charge has gone through, every item is attempted. A refund or an order record that cannot be written
    /// is logged as an error against that item and does not stop the rest.
    pub async fn dispatch(&self, charge: &Charge, link: &str) -> Vec<OrderOutcome> {
        let mut outcomes = Vec::with_capacity(charge.items.len());
        for item in &charge.items {
            let placed = match &item.service_id {
                Some(service_id) => {
                    self.fulfillment.place_order(service_id, link, item.quantity).await.map_err(|e| e.to_string())
                },
                None => Err(format!("Product '{}' has no service id", item.product_key)),
            };
            let refund_due = placed.is_err() &&
                charge.debited &&
                self.refund_policy == RefundPolicy::FailedItems &&
                item.cost > Credits::zero();
            let refunded = refund_due && self.refund(charge.user, item).await;
            let (remote_order_id, failure) = match placed {
                Ok(id) => (Some(id), None),
                Err(reason) => (None, Some(reason)),
            };
            let new_record = NewOrderRecord {
                user_id: charge.user,
                product_key: item.product_key.clone(),
                quantity: item.quantity,
                cost: item.cost,
                link: link.to_string(),
                remote_order_id: remote_order_id.clone(),
                refunded,
            };
            let record = match self.db.insert_order(new_record).await {
                Ok(record) => Some(record),
                Err(e) => {
                    error!(
                        "🔄️📦️ Could not save the order record for item '{}' of user {} (remote order {:?}, refunded: \
                         {refunded}). {e}",
                        item.product_key, charge.user, remote_order_id
                    );
                    None
                },
            };
            match (&failure, &record) {
                (None, Some(record)) => {
                    debug!("🔄️📦️ Item '{}' placed as remote order {:?}", item.product_key, record.remote_order_id);
                    self.call_order_placed_hook(OrderPlacedEvent::new(record.clone())).await;
                },
                (Some(reason), Some(record)) => {
                    warn!("🔄️📦️ Item '{}' for user {} could not be placed. {reason}", item.product_key, charge.user);
                    self.call_order_failed_hook(OrderFailedEvent::new(record.clone(), reason.clone())).await;
                },
                (Some(reason), None) => {
                    warn!("🔄️📦️ Item '{}' for user {} could not be placed. {reason}", item.product_key, charge.user);
                },
                (None, None) => {},
            }
            outcomes.push(OrderOutcome { item: item.clone(), remote_order_id, refunded, record, failure });
        }
        outcomes
    }

    /// Credits the cost of a failed item back. Returns `false` if the ledger could not be updated.
    async fn refund(&self, user: UserId, item: &PricedItem) -> bool {
        match self.db.credit(user, item.cost).await {
            Ok(_) => {
                debug!("🔄️💰️ Refunded {} to user {user} for failed item '{}'", item.cost, item.product_key);
                true
            },
            Err(e) => {
                error!("🔄️💰️ Could not refund {} to user {user} for failed item '{}'. {e}", item.cost, item.product_key);
                false
            },
        }
    }

    pub async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus, OrderFlowError> {
        self.fulfillment
            .order_status(remote_order_id.trim())
            .await
            .map_err(|e| OrderFlowError::FulfillmentUnavailable(e.to_string()))
    }

    /// The reseller's balance on the fulfillment panel. This is never reconciled with the local ledger.
    pub async fn remote_balance(&self) -> Result<RemoteBalance, OrderFlowError> {
        self.fulfillment.account_balance().await.map_err(|e| OrderFlowError::FulfillmentUnavailable(e.to_string()))
    }

    async fn call_order_placed_hook(&self, event: OrderPlacedEvent) {
        for emitter in &self.producers.order_placed_producer {
            trace!("🔄️📦️ Notifying order placed hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    async fn call_order_failed_hook(&self, event: OrderFailedEvent) {
        for emitter in &self.producers.order_failed_producer {
            trace!("🔄️📦️ Notifying order failed hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }
}
