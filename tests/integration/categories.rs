use anyhow::Result;
use mediabase::MediaError;

use super::{image_upload, IntegrationHarness};

#[test]
fn create_rename_delete_lifecycle() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let categories = library.categories();

    let id = categories.create_category("F1!", "Formula 1")?;
    assert_eq!(id, "f1");
    assert!(harness.workspace_path().join("thumbnails/f1").is_dir());

    let listed = categories.list_categories();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "f1");
    assert_eq!(listed[0].name, "Formula 1");
    assert_eq!(listed[0].thumbnail_count, 0);

    categories.rename_category("f1", "Formula One")?;
    assert_eq!(categories.list_categories()[0].name, "Formula One");

    categories.delete_category("f1")?;
    assert!(categories.list_categories().is_empty());
    assert!(!harness.workspace_path().join("thumbnails/f1").exists());
    Ok(())
}

#[test]
fn duplicate_create_leaves_original_untouched() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let categories = library.categories();

    categories.create_category("f1", "Formula 1")?;
    let err = categories.create_category("f1", "Other").unwrap_err();
    assert!(matches!(err, MediaError::AlreadyExists(_)));
    assert_eq!(categories.list_categories()[0].name, "Formula 1");
    Ok(())
}

#[test]
fn reserved_and_invalid_ids_are_rejected() {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let categories = library.categories();

    assert!(matches!(
        categories.create_category("Metadata", "Meta"),
        Err(MediaError::Reserved(_))
    ));
    assert!(matches!(
        categories.create_category("!!!", "Nothing left"),
        Err(MediaError::InvalidInput(_))
    ));
    assert!(matches!(
        categories.rename_category("ghost", "New"),
        Err(MediaError::NotFound(_))
    ));
    assert!(matches!(
        categories.delete_category("ghost"),
        Err(MediaError::NotFound(_))
    ));
}

#[test]
fn subcategory_lifecycle() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let categories = library.categories();

    categories.create_category("f1", "Formula 1")?;
    let sub = categories.create_subcategory("f1", "Race Day", "Race Day")?;
    assert_eq!(sub, "raceday");
    assert!(harness
        .workspace_path()
        .join("thumbnails/f1/raceday")
        .is_dir());

    let err = categories
        .create_subcategory("f1", "raceday", "Again")
        .unwrap_err();
    assert!(matches!(err, MediaError::AlreadyExists(_)));

    categories.rename_subcategory("f1", "raceday", "Race Sunday")?;
    let listed = categories.list_categories();
    assert_eq!(listed[0].subcategories[0].name, "Race Sunday");
    Ok(())
}

#[test]
fn deleting_a_subcategory_orphans_its_thumbnails_to_the_root() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let categories = library.categories();

    categories.create_category("f1", "Formula 1")?;
    categories.create_subcategory("f1", "qualifying", "Qualifying")?;
    let thumb = categories.upload_thumbnail("f1", "qualifying", image_upload("pole.jpg", b"abc"))?;
    assert_eq!(thumb.path, "/thumbnails/f1/qualifying/pole.jpg");

    categories.delete_subcategory("f1", "qualifying")?;

    let listed = categories.list_thumbnails(&Default::default());
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].thumbnail.subcategory, "");
    assert_eq!(listed[0].thumbnail.path, "/thumbnails/f1/pole.jpg");
    assert!(harness
        .workspace_path()
        .join("thumbnails/f1/pole.jpg")
        .is_file());
    assert!(!harness
        .workspace_path()
        .join("thumbnails/f1/qualifying")
        .exists());

    let remaining = categories.list_categories();
    assert!(remaining[0].subcategories.is_empty());
    Ok(())
}

#[test]
fn listing_is_idempotent() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let categories = library.categories();

    categories.create_category("f1", "Formula 1")?;
    categories.create_category("wec", "Endurance")?;

    let first: Vec<String> = categories
        .list_categories()
        .into_iter()
        .map(|c| format!("{}:{}", c.id, c.name))
        .collect();
    let second: Vec<String> = categories
        .list_categories()
        .into_iter()
        .map(|c| format!("{}:{}", c.id, c.name))
        .collect();
    assert_eq!(first, second);
    Ok(())
}
