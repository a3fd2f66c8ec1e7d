//! Freeze record <-> model mapper

use gym_core::entities::FreezeRecord;
use gym_core::error::DomainError;
use gym_core::value_objects::Snowflake;

use super::corrupt;
use crate::models::FreezeModel;

impl TryFrom<FreezeModel> for FreezeRecord {
    type Error = DomainError;

    fn try_from(model: FreezeModel) -> Result<Self, Self::Error> {
        Ok(FreezeRecord {
            id: Snowflake::new(model.id),
            member_id: Snowflake::new(model.member_id),
            invoice_id: Snowflake::new(model.invoice_id),
            item_index: usize::try_from(model.item_index)
                .map_err(|_| corrupt("service_freezes.item_index", model.item_index))?,
            start_date: model.start_date,
            end_date: model.end_date,
            days: u32::try_from(model.days)
                .map_err(|_| corrupt("service_freezes.days", model.days))?,
            reason: model.reason,
            actor: model.actor,
            previous_expiry_date: model.previous_expiry_date,
            new_expiry_date: model.new_expiry_date,
            created_at: model.created_at,
        })
    }
}

/// Freeze record prepared for insertion; integer columns narrowed, the rest
/// bound straight from `record`
pub struct FreezeInsert<'a> {
    pub id: i64,
    pub member_id: i64,
    pub invoice_id: i64,
    pub item_index: i32,
    pub days: i32,
    pub record: &'a FreezeRecord,
}

impl<'a> FreezeInsert<'a> {
    pub fn new(record: &'a FreezeRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            member_id: record.member_id.into_inner(),
            invoice_id: record.invoice_id.into_inner(),
            item_index: record.item_index as i32,
            days: record.days as i32,
            record,
        }
    }
}
