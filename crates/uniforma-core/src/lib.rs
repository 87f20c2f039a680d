//! Business rules for the uniform catalog.
//!
//! Two subsystems, both pure async logic over a [`sea_orm::DatabaseConnection`]
//! with no HTTP concerns:
//!
//! - [`linkage`]: the template linkage engine. Base pricing CRUD, edit
//!   propagation to linked instances, detach/cascade deletion, pricing CRUD
//!   and read-side variant resolution.
//! - [`catalog`]: school/uniform CRUD orchestration, including ordered
//!   cascade deletes and best-effort cleanup of external image assets via
//!   the [`assets::AssetStore`] collaborator.

pub mod assets;
pub mod catalog;
pub mod error;
pub mod linkage;

pub use assets::{AssetStore, AssetStoreError, HttpAssetStore, NoopAssetStore};
pub use error::{CoreError, CoreResult};
