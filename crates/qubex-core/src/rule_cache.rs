// ── Rule cache ──
//
// Read-through map from rule key to rule metadata. One cache lives for
// exactly one issue fetch; nothing is shared between fetches.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::UserCredentials;
use crate::error::CoreError;
use crate::model::Rule;
use crate::server::IssueServer;

#[derive(Debug, Default)]
pub struct RuleCache {
    rules: HashMap<String, Arc<Rule>>,
    lookups: usize,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rule, or one remote lookup on a miss.
    pub async fn resolve<S: IssueServer>(
        &mut self,
        server: &S,
        credentials: Option<&UserCredentials>,
        rule_key: &str,
    ) -> Result<Arc<Rule>, CoreError> {
        if let Some(rule) = self.rules.get(rule_key) {
            return Ok(Arc::clone(rule));
        }

        self.lookups += 1;
        debug!(rule_key, lookups = self.lookups, "rule cache miss");
        let rule = server
            .lookup_rule(credentials, rule_key)
            .await?
            .ok_or_else(|| CoreError::RuleNotFound {
                key: rule_key.to_owned(),
            })?;

        let rule = Arc::new(rule);
        self.rules.insert(rule_key.to_owned(), Arc::clone(&rule));
        Ok(rule)
    }

    /// Remote lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::StubServer;

    #[test]
    fn second_resolve_is_served_locally() {
        let server = StubServer::with_project("demo").rule("java:S1481");
        let mut cache = RuleCache::new();

        let (first, second) = tokio_test::block_on(async {
            let first = cache.resolve(&server, None, "java:S1481").await.unwrap();
            let second = cache.resolve(&server, None, "java:S1481").await.unwrap();
            (first, second)
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.lookups(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(server.calls().rule_lookups, vec!["java:S1481"]);
    }

    #[test]
    fn unknown_rule_fails() {
        let server = StubServer::with_project("demo");
        let mut cache = RuleCache::new();

        let err = tokio_test::block_on(cache.resolve(&server, None, "java:S0")).unwrap_err();

        assert!(matches!(err, CoreError::RuleNotFound { ref key } if key == "java:S0"));
        assert!(cache.is_empty());
    }
}
