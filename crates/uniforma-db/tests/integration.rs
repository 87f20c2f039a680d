//! Integration tests for uniforma-db
//!
//! Tests schema and entity operations with a real SQLite in-memory database

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use uniforma_db::entities::{base_pricing, pricing, school, uniform};
use uniforma_db::types::{PriceList, PriceRow, TagSet};
use uniforma_db::{connect, migrate};
use uuid::Uuid;

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

fn new_school(name: &str) -> school::ActiveModel {
    school::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        name_key: Set(school::name_key(name)),
        location: Set(String::new()),
        banner_image: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
}

fn new_uniform(school_id: Uuid) -> uniform::ActiveModel {
    uniform::ActiveModel {
        id: Set(Uuid::new_v4()),
        school_id: Set(school_id),
        category: Set("Shirt".to_string()),
        season: Set(uniform::Season::All),
        kind: Set(uniform::UniformKind::NormalDress),
        class_start: Set(1),
        class_end: Set(12),
        extra_info: Set(None),
        image_url: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_and_read_school() {
    let db = setup_test_db().await;

    let inserted = new_school("St. Mary's High")
        .insert(&db)
        .await
        .expect("Failed to insert school");

    let found = school::Entity::find_by_id(inserted.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("School not found");

    assert_eq!(found.name, "St. Mary's High");
    assert_eq!(found.name_key, "st. mary's high");
    assert_eq!(found.location, "");
    assert!(found.banner_image.is_none());
}

#[tokio::test]
async fn test_school_name_key_is_unique() {
    let db = setup_test_db().await;

    new_school("Greenwood Academy")
        .insert(&db)
        .await
        .expect("Failed to insert school");

    // Same name with different casing maps to the same name_key
    let duplicate = new_school("GREENWOOD ACADEMY").insert(&db).await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_json_columns_round_trip() {
    let db = setup_test_db().await;

    let template = base_pricing::ActiveModel {
        id: Set(Uuid::new_v4()),
        category: Set("Shirt".to_string()),
        tags: Set(TagSet(vec!["Premium".into(), "Cotton".into()])),
        price_data: Set(PriceList(vec![
            PriceRow {
                size: "32".into(),
                price: 400.0,
            },
            PriceRow {
                size: "Free Size".into(),
                price: 520.5,
            },
        ])),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    let inserted = template.insert(&db).await.expect("Failed to insert");

    let found = base_pricing::Entity::find_by_id(inserted.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Template not found");

    assert_eq!(found.tags.0, vec!["Premium".to_string(), "Cotton".to_string()]);
    assert_eq!(found.price_data.rows().len(), 2);
    assert_eq!(found.price_data.rows()[1].size, "Free Size");
    assert_eq!(found.price_data.rows()[1].price, 520.5);
}

#[tokio::test]
async fn test_pricing_weak_reference_is_nullable() {
    let db = setup_test_db().await;

    let school = new_school("Hillside School")
        .insert(&db)
        .await
        .expect("Failed to insert school");
    let uniform = new_uniform(school.id)
        .insert(&db)
        .await
        .expect("Failed to insert uniform");

    let detached = pricing::ActiveModel {
        id: Set(Uuid::new_v4()),
        uniform_id: Set(uniform.id),
        tags: Set(TagSet::default()),
        price_data: Set(PriceList(vec![PriceRow {
            size: "30".into(),
            price: 350.0,
        }])),
        base_pricing_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    let inserted = detached.insert(&db).await.expect("Failed to insert");
    assert!(!inserted.is_linked());

    // Linking is just a column write; no FK constrains the reference
    let mut active: pricing::ActiveModel = inserted.into();
    let template_id = Uuid::new_v4();
    active.base_pricing_id = Set(Some(template_id));
    let updated = active.update(&db).await.expect("Failed to update");

    assert!(updated.is_linked());
    assert_eq!(updated.base_pricing_id, Some(template_id));
}

#[tokio::test]
async fn test_query_pricings_by_uniform() {
    let db = setup_test_db().await;

    let school = new_school("Lakeside School")
        .insert(&db)
        .await
        .expect("Failed to insert school");
    let uniform_a = new_uniform(school.id)
        .insert(&db)
        .await
        .expect("Failed to insert uniform");
    let uniform_b = new_uniform(school.id)
        .insert(&db)
        .await
        .expect("Failed to insert uniform");

    for (uniform_id, count) in [(uniform_a.id, 3), (uniform_b.id, 1)] {
        for _ in 0..count {
            pricing::ActiveModel {
                id: Set(Uuid::new_v4()),
                uniform_id: Set(uniform_id),
                tags: Set(TagSet::default()),
                price_data: Set(PriceList(vec![PriceRow {
                    size: "M".into(),
                    price: 100.0,
                }])),
                base_pricing_id: Set(None),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            }
            .insert(&db)
            .await
            .expect("Failed to insert pricing");
        }
    }

    let for_a = pricing::Entity::find()
        .filter(pricing::Column::UniformId.eq(uniform_a.id))
        .all(&db)
        .await
        .expect("Failed to query");

    assert_eq!(for_a.len(), 3);
    assert!(for_a.iter().all(|p| p.uniform_id == uniform_a.id));
}

#[tokio::test]
async fn test_delete_school_model() {
    let db = setup_test_db().await;

    let school = new_school("Riverbend School")
        .insert(&db)
        .await
        .expect("Failed to insert school");

    school
        .clone()
        .delete(&db)
        .await
        .expect("Failed to delete school");

    let found = school::Entity::find_by_id(school.id)
        .one(&db)
        .await
        .expect("Failed to query");

    assert!(found.is_none());
}
