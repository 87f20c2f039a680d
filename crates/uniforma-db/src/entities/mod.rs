//! Database entities

pub mod base_pricing;
pub mod pricing;
pub mod school;
pub mod uniform;

pub use base_pricing::Entity as BasePricing;
pub use pricing::Entity as Pricing;
pub use school::Entity as School;
pub use uniform::Entity as Uniform;

pub mod prelude {
    pub use super::base_pricing::Entity as BasePricing;
    pub use super::pricing::Entity as Pricing;
    pub use super::school::Entity as School;
    pub use super::uniform::Entity as Uniform;
}
