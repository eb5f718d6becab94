//! Chat message texts.
use reseller_engine::{
    db_types::{Credits, LedgerSummary, Product, RechargeRequest, ReviewStatus},
    events::OrderFailedEvent,
    order_objects::OrderReceipt,
    traits::{RemoteBalance, RemoteOrderStatus},
};

use crate::config::DisplayCurrency;

pub const ORDER_USAGE: &str = "Usage: /order <link> <product> <quantity> [<product> <quantity> ...]
Example: /order https://t.me/somechannel view 10000 like 500";
pub const PRICE_USAGE: &str = "Usage: /price <product>";
pub const STATUS_USAGE: &str = "Usage: /status <order id>";
pub const SET_SERVICE_USAGE: &str = "Usage: /setservice <product> <service id>";
pub const SET_PRICE_USAGE: &str = "Usage: /setprice <product> <price per 1000>";
pub const ADD_BALANCE_USAGE: &str = "Usage: /addbalance <user id> <amount>\nUse a negative amount to deduct.";
pub const USER_USAGE: &str = "Usage: /<command> <user id>";
pub const NOT_AUTHORIZED: &str = "You are not allowed to do that.";
pub const TRY_AGAIN_LATER: &str = "Something went wrong on our side. Please try again later.";
pub const NO_RECHARGE: &str = "There is no recharge in progress. Send /recharge to start one.";
pub const RECHARGE_CANCELLED: &str = "Recharge cancelled.";
pub const PROOF_REQUIRED: &str = "Please send a photo or screenshot of your payment receipt, or /cancel.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help to see what I can do.";

const HELP: &str = "Welcome! Here is what I can do:
/products - list products and prices
/price <product> - show one product
/balance - show your balance
/recharge - top up your balance
/cancel - cancel a recharge in progress
/order <link> <product> <quantity> ... - place an order";

const OPERATOR_HELP: &str = "
Operator commands:
/setservice <product> <service id>
/setprice <product> <price per 1000>
/addbalance <user id> <amount>
/addadmin <user id>, /deladmin <user id>
/whitelist <user id>, /unwhitelist <user id>
/status <order id>";

/// How amounts are shown in chat.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub currency_symbol: String,
    pub display_currency: Option<DisplayCurrency>,
}

impl Presentation {
    pub fn new(currency_symbol: &str, display_currency: Option<DisplayCurrency>) -> Self {
        Self { currency_symbol: currency_symbol.to_string(), display_currency }
    }

    pub fn money(&self, amount: Credits) -> String {
        if self.currency_symbol.is_empty() {
            amount.to_string()
        } else {
            format!("{amount} {}", self.currency_symbol)
        }
    }

    /// The amount, followed by its value in the display currency if one is configured.
    pub fn money_with_equivalent(&self, amount: Credits) -> String {
        match &self.display_currency {
            Some(dc) => format!("{} (≈ {:.2} {})", self.money(amount), amount.to_f64_at_rate(dc.rate), dc.code),
            None => self.money(amount),
        }
    }

    pub fn help(&self, is_operator: bool) -> String {
        if is_operator {
            format!("{HELP}\n{OPERATOR_HELP}")
        } else {
            HELP.to_string()
        }
    }

    pub fn product(&self, product: &Product) -> String {
        let availability = if product.is_fulfillable() { "" } else { " (unavailable)" };
        format!("{}: {} per 1000{availability}", product.key, self.money(product.price_per_1000))
    }

    pub fn products(&self, products: &[Product]) -> String {
        if products.is_empty() {
            return "The catalog is empty.".to_string();
        }
        let lines = products.iter().map(|p| self.product(p)).collect::<Vec<_>>().join("\n");
        format!("Products:\n{lines}")
    }

    pub fn receipt(&self, receipt: &OrderReceipt) -> String {
        let mut lines = vec![format!("Order for {}", receipt.link)];
        for outcome in &receipt.outcomes {
            let item = &outcome.item;
            let line = match (&outcome.remote_order_id, &outcome.failure) {
                (Some(id), _) => {
                    format!("✅ {} x{}: {} (order #{id})", item.display_name, item.quantity, self.money(item.cost))
                },
                (None, reason) => format!(
                    "❌ {} x{}: {} failed{}",
                    item.display_name,
                    item.quantity,
                    self.money(item.cost),
                    reason.as_ref().map(|r| format!(" ({r})")).unwrap_or_default()
                ),
            };
            lines.push(line);
        }
        lines.push(format!("Total: {}", self.money(receipt.total)));
        if receipt.refunded > Credits::zero() {
            lines.push(format!("Refunded: {}", self.money(receipt.refunded)));
        }
        if let Some(balance) = receipt.balance_after {
            lines.push(format!("Balance: {}", self.money(balance)));
        }
        if receipt.unrecorded_count() > 0 {
            lines.push("⚠️ Some items could not be recorded. Please quote this receipt to the operator.".to_string());
        }
        lines.join("\n")
    }

    pub fn insufficient_balance(&self, required: Credits, available: Credits) -> String {
        format!(
            "Insufficient balance. This order costs {}, but your balance is {}. Send /recharge to top up.",
            self.money(required),
            self.money(available)
        )
    }

    pub fn balance(&self, balance: Credits) -> String {
        format!("Your balance: {}", self.money_with_equivalent(balance))
    }

    /// The operator's and admins' view: the remote panel balance and local ledger totals.
    pub fn privileged_balance(&self, summary: &LedgerSummary, remote: Result<RemoteBalance, String>) -> String {
        let remote = match remote {
            Ok(b) => format!("Panel balance: {} {}", b.balance, b.currency).trim_end().to_string(),
            Err(e) => format!("Panel balance: unavailable ({e})"),
        };
        format!(
            "{remote}\nAccounts: {}\nTotal of all balances: {}",
            summary.accounts,
            self.money(summary.total_balance)
        )
    }

    pub fn order_status(&self, remote_order_id: &str, status: &RemoteOrderStatus) -> String {
        let na = || "n/a".to_string();
        let charge = status.charge.clone().unwrap_or_else(na);
        let currency = status.currency.as_deref().map(|c| format!(" {c}")).unwrap_or_default();
        format!(
            "Order #{remote_order_id}: {}\nCharge: {charge}{currency}\nStart count: {}\nRemains: {}",
            status.status,
            status.start_count.clone().unwrap_or_else(na),
            status.remains.clone().unwrap_or_else(na)
        )
    }

    pub fn amount_prompt(&self, denominations: &[u64]) -> String {
        let amounts = denominations.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ");
        format!("How much would you like to recharge? Choose or type one of: {amounts}")
    }

    pub fn proof_prompt(&self, amount: Credits, instructions: &str) -> String {
        format!(
            "Recharge of {}.\n{instructions}\nSend a photo of your payment receipt when you are done, or /cancel.",
            self.money(amount)
        )
    }

    pub fn request_submitted(&self, request: &RechargeRequest) -> String {
        format!(
            "Thanks! Your recharge request #{} for {} is waiting for review.",
            request.id,
            self.money(request.amount)
        )
    }

    pub fn review_caption(&self, request: &RechargeRequest) -> String {
        format!(
            "Recharge request #{}\nUser: {}\nAmount: {}",
            request.id,
            request.user_id,
            self.money(request.amount)
        )
    }

    /// Sent to the party once a reviewer has decided.
    pub fn decision_notice(&self, request: &RechargeRequest, balance: Option<Credits>) -> String {
        match request.status {
            ReviewStatus::Approved => {
                let balance = balance.map(|b| format!(" Your balance is now {}.", self.money(b))).unwrap_or_default();
                format!("Your recharge #{} of {} was approved.{balance}", request.id, self.money(request.amount))
            },
            ReviewStatus::Rejected => format!(
                "Your recharge #{} of {} was rejected. Contact the operator if you think this is a mistake.",
                request.id,
                self.money(request.amount)
            ),
            ReviewStatus::Pending => format!("Your recharge #{} is still waiting for review.", request.id),
        }
    }

    /// The note the reviewer sees once a request is closed.
    pub fn decision_summary(&self, request: &RechargeRequest) -> String {
        let decided_by = request.decided_by.map(|u| format!(" by {u}")).unwrap_or_default();
        format!("Recharge request #{} {}{decided_by}", request.id, request.status.to_string().to_lowercase())
    }

    pub fn order_failed_alert(&self, event: &OrderFailedEvent) -> String {
        let order = &event.order;
        let refund = if event.refunded() { "The cost was refunded." } else { "The cost was NOT refunded." };
        format!(
            "⚠️ Order line #{} for user {} failed: {} x{} to {} ({}).\n{}\nReason: {}",
            order.id,
            order.user_id,
            order.product_key,
            order.quantity,
            order.link,
            self.money(order.cost),
            refund,
            event.reason
        )
    }
}
