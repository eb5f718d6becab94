use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;
use reseller_engine::RechargeDecision;

/// A slash command and its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Products,
    Price(String),
    Balance,
    Recharge,
    Cancel,
    Order(String),
    Status(String),
    SetService(String),
    SetPrice(String),
    AddBalance(String),
    AddAdmin(String),
    DelAdmin(String),
    Whitelist(String),
    Unwhitelist(String),
    Unknown(String),
}

// `/name`, optionally addressed to a bot as `/name@SomeBot`, then the rest of the message
static COMMAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^/([A-Za-z0-9_]+)(?:@[A-Za-z0-9_]+)?(?:\s+(.*))?$").expect("command pattern is a valid regex")
});

impl Command {
    /// Returns `None` if `text` is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = COMMAND_PATTERN.captures(text.trim())?;
        let name = caps.get(1).map(|m| m.as_str().to_ascii_lowercase()).unwrap_or_default();
        let args = caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
        let command = match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "products" => Self::Products,
            "price" => Self::Price(args),
            "balance" => Self::Balance,
            "recharge" => Self::Recharge,
            "cancel" => Self::Cancel,
            "order" => Self::Order(args),
            "status" => Self::Status(args),
            "setservice" => Self::SetService(args),
            "setprice" => Self::SetPrice(args),
            "addbalance" => Self::AddBalance(args),
            "addadmin" => Self::AddAdmin(args),
            "deladmin" => Self::DelAdmin(args),
            "whitelist" => Self::Whitelist(args),
            "unwhitelist" => Self::Unwhitelist(args),
            _ => Self::Unknown(name),
        };
        Some(command)
    }
}

/// The payload of an inline button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// A recharge amount was picked
    Amount(u64),
    /// The party cancelled their recharge
    Cancel,
    /// A reviewer decided a recharge request
    Decide { request_id: i64, decision: RechargeDecision },
}

impl ButtonAction {
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        if parts.next()? != "rc" {
            return None;
        }
        let action = match (parts.next()?, parts.next()) {
            ("amt", Some(amount)) => Self::Amount(amount.parse().ok()?),
            ("cancel", None) => Self::Cancel,
            ("approve", Some(id)) => Self::Decide { request_id: id.parse().ok()?, decision: RechargeDecision::Approve },
            ("reject", Some(id)) => Self::Decide { request_id: id.parse().ok()?, decision: RechargeDecision::Reject },
            _ => return None,
        };
        parts.next().is_none().then_some(action)
    }
}

impl Display for ButtonAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount(amount) => write!(f, "rc:amt:{amount}"),
            Self::Cancel => write!(f, "rc:cancel"),
            Self::Decide { request_id, decision: RechargeDecision::Approve } => write!(f, "rc:approve:{request_id}"),
            Self::Decide { request_id, decision: RechargeDecision::Reject } => write!(f, "rc:reject:{request_id}"),
        }
    }
}

/// Splits `<name...> <value>`: the last word is the value and everything before it is the name.
pub fn split_name_and_value(args: &str) -> Option<(&str, &str)> {
    let (name, value) = args.trim().rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    (!name.is_empty()).then_some((name, value))
}

/// Splits `<first> <rest...>`.
pub fn split_first(args: &str) -> Option<(&str, &str)> {
    let (first, rest) = args.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some((first, rest))
}
