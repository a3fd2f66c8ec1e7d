//! Member service
//!
//! Enrollment and the member-side read paths: profile with derived status,
//! service list and freeze history.

use chrono::Utc;
use gym_core::entities::{CurrentPlan, Member};
use gym_core::events::MemberEnrolledEvent;
use gym_core::{DomainError, DomainEvent, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{EnrollMemberRequest, FreezeRecordResponse, MemberResponse, ServiceResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    /// Create a new MemberService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Enroll a new member with an untouched freeze budget
    #[instrument(skip(self, request), fields(member_code = %request.member_code))]
    pub async fn enroll(&self, request: EnrollMemberRequest) -> ServiceResult<MemberResponse> {
        let now = Utc::now();
        let mut member = Member::new(
            self.ctx.generate_id(),
            request.member_code,
            request.first_name,
            request.last_name,
        );
        member.email = request.email;
        member.phone = request.phone;
        member.status = request.status;
        if let Some(plan) = request.plan {
            member = member.with_plan(CurrentPlan {
                plan_id: plan.plan_id,
                plan_name: plan.plan_name,
                enrolled_at: plan.enrolled_at.unwrap_or(now),
            });
        }

        self.ctx.member_repo().create(&member).await?;

        info!(member_id = %member.id, "Member enrolled");

        let event = DomainEvent::MemberEnrolled(MemberEnrolledEvent::new(
            member.id,
            member.member_code.clone(),
        ));
        if let Err(e) = self.ctx.events().publish(&event).await {
            warn!(error = %e, "Failed to publish MEMBER_ENROLLED");
        }

        Ok(MemberResponse::build(&member, &[], now))
    }

    /// Member profile with the status derived from their services
    #[instrument(skip(self))]
    pub async fn get_member(&self, member_id: Snowflake) -> ServiceResult<MemberResponse> {
        let member = self.find_member(member_id).await?;
        let invoices = self.ctx.invoice_repo().find_by_member(member_id).await?;
        Ok(MemberResponse::build(&member, &invoices, Utc::now()))
    }

    /// Every invoice item of the member with its live status
    #[instrument(skip(self))]
    pub async fn list_services(&self, member_id: Snowflake) -> ServiceResult<Vec<ServiceResponse>> {
        self.find_member(member_id).await?;
        let invoices = self.ctx.invoice_repo().find_by_member(member_id).await?;
        Ok(ServiceResponse::list(&invoices, Utc::now()))
    }

    /// Freeze history, newest first
    #[instrument(skip(self))]
    pub async fn list_freezes(
        &self,
        member_id: Snowflake,
    ) -> ServiceResult<Vec<FreezeRecordResponse>> {
        self.find_member(member_id).await?;
        let freezes = self.ctx.ledger_repo().find_freezes_by_member(member_id).await?;
        Ok(freezes.into_iter().map(FreezeRecordResponse::from).collect())
    }

    async fn find_member(&self, member_id: Snowflake) -> ServiceResult<Member> {
        Ok(self
            .ctx
            .member_repo()
            .find_by_id(member_id)
            .await?
            .ok_or(DomainError::MemberNotFound(member_id))?)
    }
}
