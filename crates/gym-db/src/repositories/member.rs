//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use gym_core::entities::Member;
use gym_core::error::DomainError;
use gym_core::traits::{MemberRepository, RepoResult};
use gym_core::value_objects::Snowflake;

use crate::mappers::MemberInsert;
use crate::models::MemberModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Member>> {
        sqlx::query_as::<_, MemberModel>(
            r#"
            SELECT id, member_code, first_name, last_name, email, phone,
                   plan_id, plan_name, plan_enrolled_at, status,
                   total_freeze_days_used, created_at, updated_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Member::try_from)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, member_code: &str) -> RepoResult<Option<Member>> {
        sqlx::query_as::<_, MemberModel>(
            r#"
            SELECT id, member_code, first_name, last_name, email, phone,
                   plan_id, plan_name, plan_enrolled_at, status,
                   total_freeze_days_used, created_at, updated_at
            FROM members
            WHERE member_code = $1
            "#,
        )
        .bind(member_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Member::try_from)
        .transpose()
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn create(&self, member: &Member) -> RepoResult<()> {
        let insert = MemberInsert::new(member);

        sqlx::query(
            r#"
            INSERT INTO members (
                id, member_code, first_name, last_name, email, phone,
                plan_id, plan_name, plan_enrolled_at, status,
                total_freeze_days_used, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(insert.id)
        .bind(insert.member_code)
        .bind(insert.first_name)
        .bind(insert.last_name)
        .bind(insert.email)
        .bind(insert.phone)
        .bind(insert.plan_id)
        .bind(insert.plan_name)
        .bind(insert.plan_enrolled_at)
        .bind(insert.status)
        .bind(insert.total_freeze_days_used)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::MemberCodeExists(member.member_code.clone()))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMemberRepository>();
    }
}
