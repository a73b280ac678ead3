//! Per-stage deal bucketing for the kanban view, plus deal list
//! filters.

use serde::Serialize;

use super::matches_query;
use crate::types::{Deal, DealStage, DealStatus};

/// Open deals currently at one stage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBucket {
    pub stage: DealStage,
    pub deals: Vec<Deal>,
}

/// Bucket deals by stage, in the given stage order.
///
/// Only Open deals appear: a deal marked Won or Lost vanishes from the
/// pipeline even if its stage field still says e.g. Negotiation. A
/// deal whose stage is not in `stages` appears in no bucket — there is
/// no fallback bucket.
pub fn bucket_by_stage(deals: &[Deal], stages: &[DealStage]) -> Vec<StageBucket> {
    stages
        .iter()
        .map(|&stage| StageBucket {
            stage,
            deals: deals
                .iter()
                .filter(|d| d.stage == stage && d.status == DealStatus::Open)
                .cloned()
                .collect(),
        })
        .collect()
}

/// Active filters on the deal list. Facets compose with AND.
#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    /// `None` means every status.
    pub status: Option<DealStatus>,
    /// Substring match on the title, case-insensitive.
    pub search: String,
}

impl DealFilter {
    pub fn matches(&self, deal: &Deal) -> bool {
        self.status.map_or(true, |s| deal.status == s)
            && matches_query(&deal.title, self.search.trim())
    }
}

pub fn filter_deals(deals: &[Deal], filter: &DealFilter) -> Vec<Deal> {
    deals.iter().filter(|d| filter.matches(d)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(id: &str, stage: DealStage, status: DealStatus) -> Deal {
        Deal {
            id: id.to_string(),
            title: format!("Deal {id}"),
            value: 0.0,
            stage,
            probability: 50,
            status,
            contact_id: None,
            expected_close_date: None,
            created_at: None,
        }
    }

    #[test]
    fn won_status_deal_appears_in_no_bucket() {
        let deals = vec![deal("1", DealStage::Won, DealStatus::Won)];
        let buckets = bucket_by_stage(&deals, &DealStage::ALL);
        assert!(buckets.iter().all(|b| b.deals.is_empty()));
    }

    #[test]
    fn closed_deal_vanishes_even_with_a_mid_pipeline_stage() {
        let deals = vec![deal("1", DealStage::Negotiation, DealStatus::Lost)];
        let buckets = bucket_by_stage(&deals, &DealStage::ALL);
        assert!(buckets.iter().all(|b| b.deals.is_empty()));
    }

    #[test]
    fn open_deal_lands_only_in_its_own_stage() {
        let deals = vec![deal("1", DealStage::Negotiation, DealStatus::Open)];
        let buckets = bucket_by_stage(&deals, &DealStage::ALL);
        for bucket in &buckets {
            if bucket.stage == DealStage::Negotiation {
                assert_eq!(bucket.deals.len(), 1);
            } else {
                assert!(bucket.deals.is_empty());
            }
        }
    }

    #[test]
    fn stage_outside_the_requested_set_is_dropped() {
        let deals = vec![
            deal("1", DealStage::Lead, DealStatus::Open),
            deal("2", DealStage::Won, DealStatus::Open),
        ];
        let stages = [DealStage::Lead, DealStage::Qualified];
        let buckets = bucket_by_stage(&deals, &stages);
        assert_eq!(buckets.len(), 2);
        let total: usize = buckets.iter().map(|b| b.deals.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn buckets_follow_the_given_stage_order() {
        let buckets = bucket_by_stage(&[], &DealStage::ALL);
        let order: Vec<DealStage> = buckets.iter().map(|b| b.stage).collect();
        assert_eq!(order, DealStage::ALL.to_vec());
    }

    #[test]
    fn deal_filters_compose_with_and() {
        let mut open = deal("1", DealStage::Lead, DealStatus::Open);
        open.title = "Pilot rollout".to_string();
        let mut won = deal("2", DealStage::Won, DealStatus::Won);
        won.title = "Pilot expansion".to_string();

        let filter = DealFilter {
            status: Some(DealStatus::Open),
            search: "pilot".to_string(),
        };
        let filtered = filter_deals(&[open, won], &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }
}
