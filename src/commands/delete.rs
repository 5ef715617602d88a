//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::model::RecordId;
use crate::{Config, Result};

/// Deletes one of the configured user's charges.
///
/// # Errors
/// - If the charge does not exist or belongs to another user.
pub async fn delete(config: Config, args: &DeleteArgs) -> Result<Out<RecordId>> {
    let id = args.id();
    config.db().delete_record(config.user(), id).await?;
    Ok(Out::new(format!("Deleted charge {id}"), id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete_success() {
        let env = TestEnv::new().await;
        let keep = env.insert("2024-01-01", "10", "5", "100").await;
        let id = env.insert("2024-01-02", "10", "5", "200").await;

        let out = delete(env.config(), &DeleteArgs::new(id)).await.unwrap();
        assert_eq!(out.message(), format!("Deleted charge {id}"));
        assert_eq!(out.structure(), Some(&id));

        let remaining: Vec<_> = env.records().await.into_iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec![Some(keep)]);
    }

    #[tokio::test]
    async fn test_delete_twice_fails() {
        let env = TestEnv::new().await;
        let id = env.insert("2024-01-01", "10", "5", "100").await;
        delete(env.config(), &DeleteArgs::new(id)).await.unwrap();
        let err = delete(env.config(), &DeleteArgs::new(id)).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_delete_other_users_record() {
        let env = TestEnv::new().await;
        let id = env.insert("2024-01-01", "10", "5", "100").await;
        let other = env.config().with_user(Some("someone-else")).unwrap();
        assert!(delete(other, &DeleteArgs::new(id)).await.is_err());
        assert_eq!(env.records().await.len(), 1);
    }
}
