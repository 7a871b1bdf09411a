use std::sync::Arc;

use tracing::debug;

use super::domain::{AddressMatch, MatchKind, ParcelRecord};
use super::normalizer::{contains_lot_number, lot_number, normalize_address};
use super::repository::ParcelDirectory;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// Resolves free-text addresses to parcels of one union.
pub struct AddressMatcher<P> {
    directory: Arc<P>,
}

impl<P> AddressMatcher<P>
where
    P: ParcelDirectory,
{
    pub fn new(directory: Arc<P>) -> Self {
        Self { directory }
    }

    /// Exact pass over both address columns first, then a lot-number pass.
    /// `None` means the caller should keep the row flagged as unmatched.
    pub fn match_address(
        &self,
        union_id: &UnionId,
        address: &str,
    ) -> Result<Option<AddressMatch>, StoreError> {
        let needle = normalize_address(address);
        if needle.is_empty() {
            return Ok(None);
        }

        let parcels = self.directory.parcels(union_id)?;

        if let Some(found) = find_parcel(&parcels, |column| column.contains(&needle)) {
            debug!(union = %union_id, pnu = %found.0.pnu, "exact address match");
            return Ok(Some(to_match(found, MatchKind::Exact)));
        }

        let Some(token) = lot_number(&needle) else {
            debug!(union = %union_id, address = %needle, "no lot number to retry with");
            return Ok(None);
        };

        let found = find_parcel(&parcels, |column| contains_lot_number(column, token));
        if let Some(found) = &found {
            debug!(union = %union_id, pnu = %found.0.pnu, token, "partial address match");
        }
        Ok(found.map(|found| to_match(found, MatchKind::Partial)))
    }
}

fn find_parcel<'a>(
    parcels: &'a [ParcelRecord],
    predicate: impl Fn(&str) -> bool,
) -> Option<(&'a ParcelRecord, &'a str)> {
    parcels.iter().find_map(|parcel| {
        std::iter::once(parcel.lot_address.as_str())
            .chain(parcel.road_address.as_deref())
            .find(|column| predicate(&normalize_address(column)))
            .map(|column| (parcel, column))
    })
}

fn to_match((parcel, column): (&ParcelRecord, &str), kind: MatchKind) -> AddressMatch {
    AddressMatch {
        pnu: parcel.pnu.clone(),
        matched_address: column.to_string(),
        kind,
    }
}
