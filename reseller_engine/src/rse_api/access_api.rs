use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ChatContext, ChatKind, Role, UserId},
    rse_api::errors::AccessError,
    traits::{AccountManagement, ChatAuthority, RoleManagement},
};

/// Things a party may try to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// `/order`
    PlaceOrder,
    /// `/status`
    CheckStatus,
    /// Catalog, ledger and role edits
    ManageStore,
    /// Approving or rejecting recharge requests
    DecideRecharge,
    /// The extended `/balance` view with panel and ledger totals
    PrivilegedView,
}

impl Permission {
    /// The access policy.
    pub fn allows(&self, role: Role, kind: ChatKind) -> bool {
        use ChatKind::*;
        use Role::*;
        match (self, kind) {
            (Permission::PlaceOrder, Group) => matches!(role, Operator | GroupAuthority),
            (Permission::PlaceOrder, Private) => matches!(role, Operator | Admin | Whitelisted),
            (Permission::CheckStatus, Group) => matches!(role, Operator | GroupAuthority),
            (Permission::CheckStatus, Private) => role == Operator,
            (Permission::ManageStore, Private) => role == Operator,
            (Permission::ManageStore, Group) => false,
            (Permission::DecideRecharge, _) => matches!(role, Operator | Admin),
            (Permission::PrivilegedView, Private) => matches!(role, Operator | Admin),
            (Permission::PrivilegedView, Group) => false,
        }
    }

    fn denial(&self, kind: ChatKind) -> AccessError {
        match (self, kind) {
            (Permission::PlaceOrder, ChatKind::Private) => AccessError::NotWhitelisted,
            _ => AccessError::NotAuthorized,
        }
    }
}

/// `AccessApi` works out who a party is in a given chat.
///
/// Roles are checked in a fixed order: operator, group authority (group chats only), admin, whitelisted. Group
/// authority is asked of the chat transport on every call and never cached, so a change of group ownership takes
/// effect immediately.
pub struct AccessApi<B, A> {
    db: B,
    authority: A,
    operator: UserId,
}

impl<B, A> Debug for AccessApi<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessApi (operator: {})", self.operator)
    }
}

impl<B, A> AccessApi<B, A>
where
    B: AccountManagement + RoleManagement,
    A: ChatAuthority,
{
    pub fn new(db: B, authority: A, operator: UserId) -> Self {
        Self { db, authority, operator }
    }

    pub fn operator(&self) -> UserId {
        self.operator
    }

    pub fn is_operator(&self, user: UserId) -> bool {
        user == self.operator
    }

    pub async fn resolve_role(&self, user: UserId, chat: &ChatContext) -> Result<Role, AccessError> {
        self.resolve(user, chat, true).await
    }

    /// Resolves the party's role and checks it against `permission`. Returns the role if access is granted.
    pub async fn authorize(
        &self,
        user: UserId,
        chat: &ChatContext,
        permission: Permission,
    ) -> Result<Role, AccessError> {
        // Group authority only matters where it could grant something; otherwise it would shadow the admin role
        let consult_group = permission.allows(Role::GroupAuthority, chat.kind);
        let role = self.resolve(user, chat, consult_group).await?;
        if permission.allows(role, chat.kind) {
            Ok(role)
        } else {
            debug!("🔐️ {role} {user} denied {permission:?} in chat {}", chat.id);
            Err(permission.denial(chat.kind))
        }
    }

    async fn resolve(&self, user: UserId, chat: &ChatContext, consult_group: bool) -> Result<Role, AccessError> {
        if self.is_operator(user) {
            return Ok(Role::Operator);
        }
        if consult_group && chat.is_group() && self.is_group_creator(user, chat).await {
            return Ok(Role::GroupAuthority);
        }
        if self.db.is_admin(user).await? {
            return Ok(Role::Admin);
        }
        let whitelisted = self.db.fetch_account(user).await?.is_some_and(|a| a.whitelisted);
        Ok(if whitelisted { Role::Whitelisted } else { Role::Unprivileged })
    }

    /// A failed lookup counts as "not the creator".
    async fn is_group_creator(&self, user: UserId, chat: &ChatContext) -> bool {
        match self.authority.list_chat_admins(chat.id).await {
            Ok(members) => members.iter().any(|m| m.user_id == user && m.is_creator()),
            Err(e) => {
                warn!("🔐️ {e}. Treating user {user} as not having group authority");
                false
            },
        }
    }
}
