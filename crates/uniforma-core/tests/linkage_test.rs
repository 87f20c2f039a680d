//! Integration tests for the template linkage engine, against a real
//! in-memory SQLite database.

use sea_orm::DatabaseConnection;
use uniforma_core::catalog::{self, UniformInput};
use uniforma_core::error::CoreError;
use uniforma_core::linkage::{self, PricingInput, TemplateInput};
use uniforma_db::entities::uniform::{Season, UniformKind};
use uniforma_db::types::PriceRow;
use uniforma_db::{connect, migrate};
use uuid::Uuid;

async fn setup_test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    migrate(&db).await.expect("Failed to run migrations");
    db
}

fn rows(prices: &[(&str, f64)]) -> Vec<PriceRow> {
    prices
        .iter()
        .map(|(size, price)| PriceRow {
            size: size.to_string(),
            price: *price,
        })
        .collect()
}

fn shirt_template(price: f64) -> TemplateInput {
    TemplateInput {
        category: "Shirt".to_string(),
        tags: vec!["Premium".to_string()],
        price_data: rows(&[("32", price)]),
    }
}

async fn seed_uniform(db: &DatabaseConnection) -> Uuid {
    let (uniform, _) = catalog::create_uniform(
        db,
        UniformInput {
            school_name: "Greenwood Academy".to_string(),
            category: "Shirt".to_string(),
            season: Season::All,
            kind: UniformKind::NormalDress,
            class_start: 1,
            class_end: 12,
            extra_info: None,
            image_url: None,
        },
    )
    .await
    .expect("Failed to create uniform");
    uniform.id
}

async fn linked_pricing(db: &DatabaseConnection, uniform_id: Uuid, template_id: Uuid) -> Uuid {
    linkage::create_pricing(
        db,
        PricingInput {
            uniform_id,
            tags: vec!["Premium".to_string()],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: Some(template_id),
        },
    )
    .await
    .expect("Failed to create linked pricing")
    .id
}

// ============================================================
// Template CRUD
// ============================================================

#[tokio::test]
async fn create_template_rejects_empty_category() {
    let db = setup_test_db().await;

    let result = linkage::create_template(
        &db,
        TemplateInput {
            category: "   ".to_string(),
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(CoreError::Validation { field: "category", .. })
    ));
}

#[tokio::test]
async fn create_template_rejects_empty_price_data() {
    let db = setup_test_db().await;

    let result = linkage::create_template(
        &db,
        TemplateInput {
            category: "Shirt".to_string(),
            tags: vec![],
            price_data: vec![],
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(CoreError::Validation { field: "price_data", .. })
    ));
}

#[tokio::test]
async fn create_template_rejects_negative_price() {
    let db = setup_test_db().await;

    let result = linkage::create_template(
        &db,
        TemplateInput {
            category: "Shirt".to_string(),
            tags: vec![],
            price_data: rows(&[("32", -1.0)]),
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(CoreError::Validation { field: "price", .. })
    ));
}

#[tokio::test]
async fn get_template_not_found() {
    let db = setup_test_db().await;

    let result = linkage::get_template(&db, Uuid::new_v4()).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn list_templates_by_category_matches_exactly() {
    let db = setup_test_db().await;

    linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    linkage::create_template(
        &db,
        TemplateInput {
            category: "Pant".to_string(),
            tags: vec![],
            price_data: rows(&[("30", 500.0)]),
        },
    )
    .await
    .unwrap();

    let shirts = linkage::list_templates_by_category(&db, "Shirt")
        .await
        .unwrap();
    assert_eq!(shirts.len(), 1);
    assert_eq!(shirts[0].category, "Shirt");

    // Exact match only; no case folding on the read path
    let lowercase = linkage::list_templates_by_category(&db, "shirt")
        .await
        .unwrap();
    assert!(lowercase.is_empty());

    let all = linkage::list_templates(&db).await.unwrap();
    assert_eq!(all.len(), 2);
}

// ============================================================
// Propagation fidelity
// ============================================================

#[tokio::test]
async fn template_update_propagates_to_all_linked_instances() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let first = linked_pricing(&db, uniform_id, template.id).await;
    let second = linked_pricing(&db, uniform_id, template.id).await;

    let (updated, propagated) = linkage::update_template(
        &db,
        template.id,
        TemplateInput {
            category: "Shirt".to_string(),
            tags: vec!["Premium".to_string(), "Cotton".to_string()],
            price_data: rows(&[("32", 450.0)]),
        },
    )
    .await
    .unwrap();

    assert_eq!(propagated, 2);
    assert_eq!(updated.price_data.rows()[0].price, 450.0);

    for id in [first, second] {
        let instance = linkage::get_pricing(&db, id).await.unwrap();
        assert_eq!(instance.tags, updated.tags);
        assert_eq!(instance.price_data, updated.price_data);
        assert_eq!(instance.base_pricing_id, Some(template.id));
    }
}

#[tokio::test]
async fn template_update_leaves_detached_instances_alone() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let detached = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec!["Custom".to_string()],
            price_data: rows(&[("34", 999.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();

    let (_, propagated) = linkage::update_template(&db, template.id, shirt_template(450.0))
        .await
        .unwrap();

    assert_eq!(propagated, 0);

    let unchanged = linkage::get_pricing(&db, detached.id).await.unwrap();
    assert_eq!(unchanged.price_data.rows()[0].price, 999.0);
    assert!(unchanged.base_pricing_id.is_none());
}

#[tokio::test]
async fn update_template_not_found() {
    let db = setup_test_db().await;

    let result = linkage::update_template(&db, Uuid::new_v4(), shirt_template(450.0)).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

// ============================================================
// Detach on edit, no automatic re-link
// ============================================================

#[tokio::test]
async fn editing_with_null_template_detaches_and_stops_propagation() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let pricing_id = linked_pricing(&db, uniform_id, template.id).await;

    // Detach with an edited price
    let detached = linkage::update_pricing(
        &db,
        pricing_id,
        PricingInput {
            uniform_id,
            tags: vec!["Premium".to_string()],
            price_data: rows(&[("32", 380.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();
    assert!(detached.base_pricing_id.is_none());

    // A later template update must not reach it
    linkage::update_template(&db, template.id, shirt_template(500.0))
        .await
        .unwrap();

    let after = linkage::get_pricing(&db, pricing_id).await.unwrap();
    assert!(after.base_pricing_id.is_none());
    assert_eq!(after.price_data.rows()[0].price, 380.0);
}

#[tokio::test]
async fn detached_instance_relinks_only_by_explicit_update() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let detached = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();

    // Template operations never re-link
    linkage::update_template(&db, template.id, shirt_template(410.0))
        .await
        .unwrap();
    let still_detached = linkage::get_pricing(&db, detached.id).await.unwrap();
    assert!(still_detached.base_pricing_id.is_none());

    // An explicit update supplying the template id does
    let relinked = linkage::update_pricing(
        &db,
        detached.id,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: Some(template.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(relinked.base_pricing_id, Some(template.id));
}

// ============================================================
// Deletion conservation
// ============================================================

#[tokio::test]
async fn detach_delete_preserves_instances_as_independent() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let mut linked = Vec::new();
    for _ in 0..3 {
        linked.push(linked_pricing(&db, uniform_id, template.id).await);
    }
    let unrelated = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("36", 250.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();

    let detached_count = linkage::detach_delete_template(&db, template.id)
        .await
        .unwrap();
    assert_eq!(detached_count, 3);

    // Template gone
    assert!(matches!(
        linkage::get_template(&db, template.id).await,
        Err(CoreError::NotFound { .. })
    ));

    // Instances survive with their last propagated data, link cleared
    for id in linked {
        let instance = linkage::get_pricing(&db, id).await.unwrap();
        assert!(instance.base_pricing_id.is_none());
        assert_eq!(instance.price_data.rows()[0].price, 400.0);
    }

    // Unrelated instance untouched
    let other = linkage::get_pricing(&db, unrelated.id).await.unwrap();
    assert_eq!(other.price_data.rows()[0].price, 250.0);
}

#[tokio::test]
async fn cascade_delete_removes_exactly_the_linked_instances() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let doomed_a = linked_pricing(&db, uniform_id, template.id).await;
    let doomed_b = linked_pricing(&db, uniform_id, template.id).await;
    let survivor = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("36", 250.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();

    let deleted = linkage::cascade_delete_template(&db, template.id)
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    assert!(matches!(
        linkage::get_template(&db, template.id).await,
        Err(CoreError::NotFound { .. })
    ));
    for id in [doomed_a, doomed_b] {
        assert!(matches!(
            linkage::get_pricing(&db, id).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    let remaining = linkage::list_pricings_for_uniform(&db, uniform_id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, survivor.id);
}

#[tokio::test]
async fn both_delete_modes_require_an_existing_template() {
    let db = setup_test_db().await;

    assert!(matches!(
        linkage::detach_delete_template(&db, Uuid::new_v4()).await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        linkage::cascade_delete_template(&db, Uuid::new_v4()).await,
        Err(CoreError::NotFound { .. })
    ));
}

// ============================================================
// Pricing CRUD and referential checks
// ============================================================

#[tokio::test]
async fn create_pricing_requires_existing_uniform() {
    let db = setup_test_db().await;

    let result = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id: Uuid::new_v4(),
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: None,
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(CoreError::NotFound { entity: "uniform", .. })
    ));
}

#[tokio::test]
async fn create_pricing_rejects_unknown_template_reference() {
    // Eager validation: an unknown template id is rejected instead of being
    // stored as an orphaned link.
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let result = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: Some(Uuid::new_v4()),
        },
    )
    .await;

    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn update_pricing_rejects_unknown_template_reference() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let pricing = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();

    let result = linkage::update_pricing(
        &db,
        pricing.id,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
            base_pricing_id: Some(Uuid::new_v4()),
        },
    )
    .await;

    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn delete_pricing_leaves_template_alone() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    let pricing_id = linked_pricing(&db, uniform_id, template.id).await;

    let deleted_id = linkage::delete_pricing(&db, pricing_id).await.unwrap();
    assert_eq!(deleted_id, pricing_id);

    assert!(matches!(
        linkage::get_pricing(&db, pricing_id).await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(linkage::get_template(&db, template.id).await.is_ok());
}

#[tokio::test]
async fn delete_pricing_not_found() {
    let db = setup_test_db().await;

    let result = linkage::delete_pricing(&db, Uuid::new_v4()).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

// ============================================================
// Variant resolution
// ============================================================

#[tokio::test]
async fn variant_resolution_prefers_fewest_tags_among_supersets() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let mut by_tags = std::collections::HashMap::new();
    for tags in [vec!["A"], vec!["A", "B"], vec!["A", "B", "C"]] {
        let pricing = linkage::create_pricing(
            &db,
            PricingInput {
                uniform_id,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                price_data: rows(&[("32", 100.0 * tags.len() as f64)]),
                base_pricing_id: None,
            },
        )
        .await
        .unwrap();
        by_tags.insert(tags.len(), pricing.id);
    }

    // {A} qualifies all three; the fewest-tags instance wins
    let chosen = linkage::resolve_variant(&db, uniform_id, &["A".to_string()])
        .await
        .unwrap()
        .expect("Expected a match");
    assert_eq!(chosen.id, by_tags[&1]);

    // {A, B} narrows it to the two larger sets
    let chosen = linkage::resolve_variant(&db, uniform_id, &["A".to_string(), "B".to_string()])
        .await
        .unwrap()
        .expect("Expected a match");
    assert_eq!(chosen.id, by_tags[&2]);

    // No superset of {A, B, C, D} exists
    let none = linkage::resolve_variant(
        &db,
        uniform_id,
        &["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
    )
    .await
    .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn variant_resolution_with_empty_selection_matches_everything() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let plain = linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec![],
            price_data: rows(&[("32", 300.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();
    linkage::create_pricing(
        &db,
        PricingInput {
            uniform_id,
            tags: vec!["Premium".to_string()],
            price_data: rows(&[("32", 500.0)]),
            base_pricing_id: None,
        },
    )
    .await
    .unwrap();

    let chosen = linkage::resolve_variant(&db, uniform_id, &[])
        .await
        .unwrap()
        .expect("Expected a match");
    assert_eq!(chosen.id, plain.id);
}

#[tokio::test]
async fn variant_resolution_tie_breaks_on_smallest_id() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let pricing = linkage::create_pricing(
            &db,
            PricingInput {
                uniform_id,
                tags: vec!["A".to_string()],
                price_data: rows(&[("32", 100.0)]),
                base_pricing_id: None,
            },
        )
        .await
        .unwrap();
        ids.push(pricing.id);
    }
    ids.sort();

    let chosen = linkage::resolve_variant(&db, uniform_id, &["A".to_string()])
        .await
        .unwrap()
        .expect("Expected a match");
    assert_eq!(chosen.id, ids[0]);
}

#[tokio::test]
async fn variant_resolution_for_uniform_without_pricing_is_none() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let none = linkage::resolve_variant(&db, uniform_id, &[]).await.unwrap();
    assert!(none.is_none());
}

// ============================================================
// End-to-end scenarios
// ============================================================

#[tokio::test]
async fn scenario_template_price_change_reaches_both_instances() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(
        &db,
        TemplateInput {
            category: "Shirt".to_string(),
            tags: vec![],
            price_data: rows(&[("32", 400.0)]),
        },
    )
    .await
    .unwrap();

    let first = linked_pricing(&db, uniform_id, template.id).await;
    let second = linked_pricing(&db, uniform_id, template.id).await;

    linkage::update_template(
        &db,
        template.id,
        TemplateInput {
            category: "Shirt".to_string(),
            tags: vec![],
            price_data: rows(&[("32", 450.0)]),
        },
    )
    .await
    .unwrap();

    for id in [first, second] {
        let instance = linkage::get_pricing(&db, id).await.unwrap();
        assert_eq!(instance.price_data.rows()[0].price, 450.0);
    }
}

#[tokio::test]
async fn scenario_detach_delete_with_three_linked_instances() {
    let db = setup_test_db().await;
    let uniform_id = seed_uniform(&db).await;

    let template = linkage::create_template(&db, shirt_template(400.0))
        .await
        .unwrap();
    for _ in 0..3 {
        linked_pricing(&db, uniform_id, template.id).await;
    }

    let detached = linkage::detach_delete_template(&db, template.id)
        .await
        .unwrap();
    assert_eq!(detached, 3);

    let survivors = linkage::list_pricings_for_uniform(&db, uniform_id)
        .await
        .unwrap();
    assert_eq!(survivors.len(), 3);
    assert!(survivors.iter().all(|p| p.base_pricing_id.is_none()));
}
