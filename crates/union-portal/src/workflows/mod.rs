pub mod ads;
pub mod cache;
pub mod invites;
pub mod notifications;
pub mod ownership;
pub mod parcels;
pub mod store;
pub mod tenancy;
