//! Grant-table authorizer for local runs and tests.

use super::{AuthAction, AuthError, Authorizer};
use crate::context::RequestContext;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Authorizer answering from an explicit per-user grant table
#[derive(Debug, Default)]
pub struct StaticAuthorizer {
    allow_all: bool,
    grants: RwLock<HashMap<String, HashSet<(AuthAction, i64)>>>,
}

impl StaticAuthorizer {
    /// Authorizer that denies everything until grants are added
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorizer that allows every request
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            grants: RwLock::default(),
        }
    }

    pub fn grant(&self, user: &str, action: AuthAction, ids: impl IntoIterator<Item = i64>) {
        let mut grants = self.grants.write();
        let entry = grants.entry(user.to_string()).or_default();
        entry.extend(ids.into_iter().map(|id| (action, id)));
    }

    pub fn revoke(&self, user: &str, action: AuthAction, ids: impl IntoIterator<Item = i64>) {
        if let Some(entry) = self.grants.write().get_mut(user) {
            for id in ids {
                entry.remove(&(action, id));
            }
        }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize_by_service_template_id(
        &self,
        ctx: &RequestContext,
        action: AuthAction,
        service_template_ids: &[i64],
    ) -> Result<(), AuthError> {
        if self.allow_all {
            return Ok(());
        }

        let denied_ids: Vec<i64> = {
            let grants = self.grants.read();
            let granted = grants.get(&ctx.user);
            service_template_ids
                .iter()
                .copied()
                .filter(|id| !granted.is_some_and(|set| set.contains(&(action, *id))))
                .collect()
        };

        if denied_ids.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Denied {
                principal: ctx.user.clone(),
                action,
                denied_ids,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_id_set_is_allowed() {
        let authorizer = StaticAuthorizer::new();
        let ctx = RequestContext::for_business("bob", 1);
        assert!(authorizer
            .authorize_by_service_template_id(&ctx, AuthAction::Update, &[])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_grants_are_per_user_and_id() {
        let authorizer = StaticAuthorizer::new();
        authorizer.grant("bob", AuthAction::Update, [1]);
        let bob = RequestContext::for_business("bob", 1);
        let eve = RequestContext::for_business("eve", 1);

        assert!(authorizer
            .authorize_by_service_template_id(&bob, AuthAction::Update, &[1])
            .await
            .is_ok());
        assert!(authorizer
            .authorize_by_service_template_id(&bob, AuthAction::Update, &[1, 2])
            .await
            .is_err());
        assert!(authorizer
            .authorize_by_service_template_id(&eve, AuthAction::Update, &[1])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_revoke_removes_grant() {
        let authorizer = StaticAuthorizer::new();
        authorizer.grant("bob", AuthAction::Update, [1, 2]);
        authorizer.revoke("bob", AuthAction::Update, [2]);
        let ctx = RequestContext::for_business("bob", 1);

        let err = authorizer
            .authorize_by_service_template_id(&ctx, AuthAction::Update, &[1, 2])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AuthError::Denied {
                principal: "bob".to_string(),
                action: AuthAction::Update,
                denied_ids: vec![2],
            }
        );
    }
}
