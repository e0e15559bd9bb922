//! Core identifier types shared by the webhook, engine and GitHub layers.

pub mod ids;

pub use ids::{DeliveryId, InstallationId, PrNumber, RepoId, Sha};
