//! Member entity <-> model mapper

use gym_core::entities::{CurrentPlan, Member, MembershipStatus};
use gym_core::error::DomainError;
use gym_core::value_objects::{FreezeBudget, Snowflake};

use super::corrupt;
use crate::models::MemberModel;

impl TryFrom<MemberModel> for Member {
    type Error = DomainError;

    fn try_from(model: MemberModel) -> Result<Self, Self::Error> {
        let status = model
            .status
            .as_deref()
            .map(MembershipStatus::parse)
            .transpose()
            .map_err(|_| corrupt("members.status", model.status.as_deref().unwrap_or_default()))?;

        let used = u32::try_from(model.total_freeze_days_used)
            .map_err(|_| corrupt("members.total_freeze_days_used", model.total_freeze_days_used))?;

        // A plan needs all three columns
        let current_plan = match (model.plan_id, model.plan_name, model.plan_enrolled_at) {
            (Some(plan_id), Some(plan_name), Some(enrolled_at)) => Some(CurrentPlan {
                plan_id,
                plan_name,
                enrolled_at,
            }),
            _ => None,
        };

        Ok(Member {
            id: Snowflake::new(model.id),
            member_code: model.member_code,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            current_plan,
            status,
            freeze_budget: FreezeBudget::with_used(used),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Member entity prepared for insertion
pub struct MemberInsert<'a> {
    pub id: i64,
    pub member_code: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub plan_id: Option<&'a str>,
    pub plan_name: Option<&'a str>,
    pub plan_enrolled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: Option<&'static str>,
    pub total_freeze_days_used: i32,
}

impl<'a> MemberInsert<'a> {
    pub fn new(member: &'a Member) -> Self {
        let plan = member.current_plan.as_ref();
        Self {
            id: member.id.into_inner(),
            member_code: &member.member_code,
            first_name: &member.first_name,
            last_name: &member.last_name,
            email: member.email.as_deref(),
            phone: member.phone.as_deref(),
            plan_id: plan.map(|p| p.plan_id.as_str()),
            plan_name: plan.map(|p| p.plan_name.as_str()),
            plan_enrolled_at: plan.map(|p| p.enrolled_at),
            status: member.status.as_ref().map(MembershipStatus::as_str),
            total_freeze_days_used: member.total_freeze_days_used() as i32,
        }
    }
}
