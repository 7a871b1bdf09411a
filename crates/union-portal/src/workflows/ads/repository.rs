use super::domain::{Ad, AdId};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub trait AdRepository: Send + Sync {
    fn ads(&self, union_id: &UnionId) -> Result<Vec<Ad>, StoreError>;
    fn insert(&self, ad: Ad) -> Result<Ad, StoreError>;
    /// `StoreError::NotFound` when no ad with that id exists in the union.
    fn update(&self, ad: Ad) -> Result<Ad, StoreError>;
    fn delete(&self, union_id: &UnionId, id: &AdId) -> Result<(), StoreError>;
}
