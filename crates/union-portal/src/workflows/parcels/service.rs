use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    describe_unit, AddressMatch, MemberId, MemberMatchRow, MemberRecord, MemberStatus, Pnu,
    PropertyUnitClaim,
};
use super::matcher::AddressMatcher;
use super::normalizer::normalize_unit_label;
use super::repository::{MemberRepository, ParcelDirectory};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

static MEMBER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_member_id() -> MemberId {
    let id = MEMBER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MemberId(format!("member-{id:06}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationOutcome {
    pub member: MemberRecord,
    pub address_match: Option<AddressMatch>,
    /// False when the member row was written but the property-unit row was not.
    pub property_unit_saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub row: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub registered: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub incomplete_units: usize,
    pub rejected: Vec<RowRejection>,
}

/// Spreadsheet-driven member pre-registration backed by the address matcher.
pub struct MemberMatchingService<P, M> {
    matcher: AddressMatcher<P>,
    members: Arc<M>,
    batch_size: usize,
}

impl<P, M> MemberMatchingService<P, M>
where
    P: ParcelDirectory + 'static,
    M: MemberRepository + 'static,
{
    pub fn new(parcels: Arc<P>, members: Arc<M>, batch_size: usize) -> Self {
        Self {
            matcher: AddressMatcher::new(parcels),
            members,
            batch_size: batch_size.max(1),
        }
    }

    pub fn match_address(
        &self,
        union_id: &UnionId,
        address: &str,
    ) -> Result<Option<AddressMatch>, MatchingError> {
        Ok(self.matcher.match_address(union_id, address)?)
    }

    /// Reject the unit when another active member of the union already holds
    /// the same parcel, building and unit.
    pub fn ensure_unclaimed(
        &self,
        union_id: &UnionId,
        pnu: &Pnu,
        dong: Option<&str>,
        ho: Option<&str>,
    ) -> Result<(), MatchingError> {
        let dong_key = normalize_unit_label(dong);
        let ho_key = normalize_unit_label(ho);

        let holder = self
            .members
            .claims_on_parcel(union_id, pnu)?
            .into_iter()
            .filter(|existing| !existing.holder_status.is_excluded())
            .find(|existing| {
                normalize_unit_label(existing.claim.dong.as_deref()) == dong_key
                    && normalize_unit_label(existing.claim.ho.as_deref()) == ho_key
            });

        match holder {
            Some(existing) => Err(MatchingError::DuplicateClaim {
                owner_name: existing.holder_name,
                pnu: pnu.clone(),
                unit: describe_unit(dong, ho),
            }),
            None => Ok(()),
        }
    }

    /// Match one row and pre-register it. Unmatched rows are still written,
    /// flagged for manual resolution.
    pub fn register(
        &self,
        union_id: &UnionId,
        row: MemberMatchRow,
    ) -> Result<RegistrationOutcome, MatchingError> {
        if row.name.trim().is_empty() {
            return Err(MatchingError::MissingField("name"));
        }
        if row.property_address.trim().is_empty() {
            return Err(MatchingError::MissingField("property_address"));
        }

        let address_match = self.matcher.match_address(union_id, &row.property_address)?;
        if let Some(found) = &address_match {
            self.ensure_unclaimed(
                union_id,
                &found.pnu,
                row.dong.as_deref(),
                row.ho.as_deref(),
            )?;
        }

        let member = self.members.insert_member(MemberRecord {
            id: next_member_id(),
            union_id: union_id.clone(),
            name: row.name.trim().to_string(),
            phone: row.phone.clone(),
            birth_date: row.birth_date.clone(),
            status: MemberStatus::PreRegistered,
            created_at: Utc::now(),
        })?;

        let claim = PropertyUnitClaim {
            union_id: union_id.clone(),
            member_id: member.id.clone(),
            pnu: address_match.as_ref().map(|found| found.pnu.clone()),
            property_address: row.property_address,
            dong: row.dong,
            ho: row.ho,
            matched: address_match.is_some(),
        };

        let property_unit_saved = match self.members.insert_claim(claim) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    union = %union_id,
                    member = %member.id,
                    error = %err,
                    "member saved without property unit"
                );
                false
            }
        };

        Ok(RegistrationOutcome {
            member,
            address_match,
            property_unit_saved,
        })
    }

    /// Register every row in fixed-size chunks, reporting progress after each
    /// chunk. A failing row is recorded and the import moves on.
    pub fn import(
        &self,
        union_id: &UnionId,
        rows: Vec<MemberMatchRow>,
        mut progress: impl FnMut(ImportProgress),
    ) -> ImportReport {
        let mut report = ImportReport {
            total: rows.len(),
            ..ImportReport::default()
        };
        let mut processed = 0;

        for chunk in rows.chunks(self.batch_size) {
            for row in chunk {
                let index = processed;
                processed += 1;

                match self.register(union_id, row.clone()) {
                    Ok(outcome) => {
                        report.registered += 1;
                        if outcome.address_match.is_some() {
                            report.matched += 1;
                        } else {
                            report.unmatched += 1;
                        }
                        if !outcome.property_unit_saved {
                            report.incomplete_units += 1;
                        }
                    }
                    Err(err) => report.rejected.push(RowRejection {
                        row: index,
                        name: row.name.clone(),
                        reason: err.to_string(),
                    }),
                }
            }

            progress(ImportProgress {
                processed,
                total: report.total,
            });
        }

        info!(
            union = %union_id,
            total = report.total,
            registered = report.registered,
            unmatched = report.unmatched,
            rejected = report.rejected.len(),
            "member import finished"
        );

        report
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("parcel {pnu} ({unit}) is already registered to {owner_name}")]
    DuplicateClaim {
        owner_name: String,
        pnu: Pnu,
        unit: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
