use anyhow::Result;
use mediabase::library::layout::parse_asset_path;
use mediabase::MediaError;

use super::{upload, IntegrationHarness};

fn pdf(name: &str) -> mediabase::UploadedFile {
    upload(name, "application/pdf", b"%PDF-")
}

#[test]
fn upload_to_root_and_nested_folder() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    let root_asset = assets.upload_asset("", pdf("brief.pdf"))?;
    assert_eq!(root_asset.folder, "");
    assert_eq!(root_asset.path, "/assets/brief.pdf");

    let nested = assets.upload_asset("docs/2024", pdf("notes.pdf"))?;
    assert_eq!(nested.folder, "docs/2024");
    assert_eq!(nested.path, "/assets/docs/2024/notes.pdf");
    assert!(harness
        .workspace_path()
        .join("assets/docs/2024/notes.pdf")
        .is_file());

    assert_eq!(
        parse_asset_path(&nested.path),
        Some((nested.folder.clone(), nested.filename.clone()))
    );
    Ok(())
}

#[test]
fn same_name_uploads_never_overwrite() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    let first = assets.upload_asset("", pdf("report.pdf"))?;
    let second = assets.upload_asset("", pdf("report.pdf"))?;
    assert_eq!(first.filename, "report.pdf");
    assert_eq!(second.filename, "report-1.pdf");
    assert_eq!(assets.list_assets("").len(), 2);
    Ok(())
}

#[test]
fn listing_matches_folders_exactly_not_by_prefix() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    assets.upload_asset("docs", pdf("top.pdf"))?;
    assets.upload_asset("docs/archive", pdf("deep.pdf"))?;

    let docs = assets.list_assets("docs");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].filename, "top.pdf");
    assert!(assets.list_assets("").is_empty());
    Ok(())
}

#[test]
fn rename_preserves_extension_and_rejects_collisions() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    let a = assets.upload_asset("", pdf("draft.pdf"))?;
    assets.upload_asset("", pdf("final.pdf"))?;

    let renamed = assets.rename_asset(&a.id, "submitted")?;
    assert_eq!(renamed.filename, "submitted.pdf");
    assert_eq!(renamed.path, "/assets/submitted.pdf");
    assert!(harness.workspace_path().join("assets/submitted.pdf").is_file());
    assert!(!harness.workspace_path().join("assets/draft.pdf").exists());

    assert!(matches!(
        assets.rename_asset(&renamed.id, "final.pdf"),
        Err(MediaError::AlreadyExists(_))
    ));
    assert!(matches!(
        assets.rename_asset("000000", "whatever"),
        Err(MediaError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn move_creates_the_target_directory() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    let a = assets.upload_asset("", pdf("mobile.pdf"))?;
    let moved = assets.move_asset(&a.id, "archive/2024")?;
    assert_eq!(moved.folder, "archive/2024");
    assert_eq!(moved.path, "/assets/archive/2024/mobile.pdf");
    assert!(harness
        .workspace_path()
        .join("assets/archive/2024/mobile.pdf")
        .is_file());

    // A same-named file at the destination blocks the move.
    let other = assets.upload_asset("", pdf("mobile.pdf"))?;
    assert!(matches!(
        assets.move_asset(&other.id, "archive/2024"),
        Err(MediaError::AlreadyExists(_))
    ));
    Ok(())
}

#[test]
fn delete_tolerates_an_already_missing_file() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    let a = assets.upload_asset("", pdf("flaky.pdf"))?;
    std::fs::remove_file(harness.workspace_path().join("assets/flaky.pdf"))?;

    assets.delete_asset(&a.id)?;
    assert!(assets.list_assets("").is_empty());
    assert!(matches!(
        assets.delete_asset(&a.id),
        Err(MediaError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn oversized_uploads_are_rejected_before_writing() {
    let harness = IntegrationHarness::new();
    let mut config = mediabase::AppConfig::default();
    config.uploads.max_asset_bytes = 4;
    let library = harness.library_with_config(config);
    let assets = library.assets();

    assert!(matches!(
        assets.upload_asset("", pdf("big.pdf")),
        Err(MediaError::InvalidInput(_))
    ));
    assert!(!harness.workspace_path().join("assets/big.pdf").exists());
}

#[test]
fn traversal_attempts_never_reach_the_disk() {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let assets = library.assets();

    assert!(matches!(
        assets.upload_asset("../../etc", pdf("passwd.pdf")),
        Err(MediaError::PathTraversal(_))
    ));
    assert!(matches!(
        library.resolve_public("../secrets.toml"),
        Err(MediaError::PathTraversal(_))
    ));
}
