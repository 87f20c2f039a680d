//! Initial schema: schools, uniforms, base pricing templates, pricing
//! instances.
//!
//! `pricings.base_pricing_id` intentionally has no foreign key: it is a
//! weak back reference resolved by the linkage engine, and a template
//! delete must choose between detaching and cascading its instances.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create schools table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(School::Table)
                    .if_not_exists()
                    .col(uuid(School::Id).primary_key())
                    .col(string_len(School::Name, 255).not_null())
                    .col(string_len(School::NameKey, 255).not_null().unique_key())
                    .col(string(School::Location).not_null().default(""))
                    .col(string_null(School::BannerImage))
                    .col(
                        timestamp_with_time_zone(School::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(School::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_schools_name_key")
                    .table(School::Table)
                    .col(School::NameKey)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create uniforms table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Uniform::Table)
                    .if_not_exists()
                    .col(uuid(Uniform::Id).primary_key())
                    .col(uuid(Uniform::SchoolId).not_null())
                    .col(string_len(Uniform::Category, 255).not_null())
                    .col(string_len(Uniform::Season, 16).not_null().default("All"))
                    .col(
                        string_len(Uniform::Kind, 32)
                            .not_null()
                            .default("Normal Dress"),
                    )
                    .col(integer(Uniform::ClassStart).not_null())
                    .col(integer(Uniform::ClassEnd).not_null())
                    .col(text_null(Uniform::ExtraInfo))
                    .col(string_null(Uniform::ImageUrl))
                    .col(
                        timestamp_with_time_zone(Uniform::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Uniform::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_uniforms_school_id")
                            .from(Uniform::Table, Uniform::SchoolId)
                            .to(School::Table, School::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_uniforms_school_id")
                    .table(Uniform::Table)
                    .col(Uniform::SchoolId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create base_pricings table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BasePricing::Table)
                    .if_not_exists()
                    .col(uuid(BasePricing::Id).primary_key())
                    .col(string_len(BasePricing::Category, 255).not_null())
                    .col(json(BasePricing::Tags).not_null())
                    .col(json(BasePricing::PriceData).not_null())
                    .col(
                        timestamp_with_time_zone(BasePricing::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(BasePricing::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_base_pricings_category")
                    .table(BasePricing::Table)
                    .col(BasePricing::Category)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create pricings table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Pricing::Table)
                    .if_not_exists()
                    .col(uuid(Pricing::Id).primary_key())
                    .col(uuid(Pricing::UniformId).not_null())
                    .col(json(Pricing::Tags).not_null())
                    .col(json(Pricing::PriceData).not_null())
                    .col(uuid_null(Pricing::BasePricingId))
                    .col(
                        timestamp_with_time_zone(Pricing::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Pricing::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pricings_uniform_id")
                            .from(Pricing::Table, Pricing::UniformId)
                            .to(Uniform::Table, Uniform::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pricings_uniform_id")
                    .table(Pricing::Table)
                    .col(Pricing::UniformId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pricings_base_pricing_id")
                    .table(Pricing::Table)
                    .col(Pricing::BasePricingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(Pricing::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BasePricing::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Uniform::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(School::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum School {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
    Name,
    NameKey,
    Location,
    BannerImage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Uniform {
    #[sea_orm(iden = "uniforms")]
    Table,
    Id,
    SchoolId,
    Category,
    Season,
    Kind,
    ClassStart,
    ClassEnd,
    ExtraInfo,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BasePricing {
    #[sea_orm(iden = "base_pricings")]
    Table,
    Id,
    Category,
    Tags,
    PriceData,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Pricing {
    #[sea_orm(iden = "pricings")]
    Table,
    Id,
    UniformId,
    Tags,
    PriceData,
    BasePricingId,
    CreatedAt,
    UpdatedAt,
}
