use anyhow::Result;
use mediabase::MediaError;

use super::{image_upload, upload, IntegrationHarness};

fn html(body: &str) -> mediabase::UploadedFile {
    upload("content.html", "text/html", body.as_bytes())
}

#[test]
fn create_writes_content_and_images_under_the_slug() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let posts = library.posts();

    let post = posts.create_post(
        "Race Weekend Recap!",
        html("<h1>Recap</h1>"),
        vec![
            image_upload("lap1.jpg", b"one"),
            image_upload("lap1.jpg", b"two"),
        ],
    )?;
    assert_eq!(post.slug, "race-weekend-recap");
    assert_eq!(
        post.html_path,
        "/uploads/posts/race-weekend-recap/content.html"
    );
    assert_eq!(
        post.images,
        vec![
            "/uploads/posts/race-weekend-recap/images/lap1.jpg".to_string(),
            "/uploads/posts/race-weekend-recap/images/lap1-1.jpg".to_string(),
        ]
    );

    let post_dir = harness
        .workspace_path()
        .join("uploads/posts/race-weekend-recap");
    assert!(post_dir.join("content.html").is_file());
    assert!(post_dir.join("images/lap1.jpg").is_file());
    assert!(post_dir.join("images/lap1-1.jpg").is_file());

    let (entry, body) = posts.get_post("race-weekend-recap")?;
    assert_eq!(entry.id, post.id);
    assert_eq!(body, "<h1>Recap</h1>");
    Ok(())
}

#[test]
fn titles_must_be_unique_by_slug() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let posts = library.posts();

    posts.create_post("Hello World", html("<p>first</p>"), Vec::new())?;
    assert!(matches!(
        posts.create_post("hello   world", html("<p>second</p>"), Vec::new()),
        Err(MediaError::AlreadyExists(_))
    ));
    Ok(())
}

#[test]
fn invalid_inputs_are_rejected_without_side_effects() {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let posts = library.posts();

    assert!(matches!(
        posts.create_post("  ", html("<p></p>"), Vec::new()),
        Err(MediaError::InvalidInput(_))
    ));
    assert!(matches!(
        posts.create_post("Title", upload("notes.txt", "text/plain", b"x"), Vec::new()),
        Err(MediaError::InvalidInput(_))
    ));
    assert!(matches!(
        posts.create_post(
            "Pictures",
            html("<p></p>"),
            vec![upload("clip.mp4", "video/mp4", b"x")]
        ),
        Err(MediaError::InvalidInput(_))
    ));
    assert!(matches!(
        posts.create_post("!!!", html("<p></p>"), Vec::new()),
        Err(MediaError::InvalidInput(_))
    ));
    assert!(posts.list_posts().is_empty());
    assert_eq!(
        std::fs::read_dir(harness.workspace_path().join("uploads/posts"))
            .unwrap()
            .count(),
        0
    );
}

#[test]
fn listing_is_newest_first_with_image_counts() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let posts = library.posts();

    posts.create_post("First", html("<p>1</p>"), Vec::new())?;
    posts.create_post(
        "Second",
        html("<p>2</p>"),
        vec![image_upload("a.jpg", b"x")],
    )?;

    let listed = posts.list_posts();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].upload_date >= listed[1].upload_date);
    let second = listed.iter().find(|p| p.slug == "second").unwrap();
    assert_eq!(second.image_count, 1);
    Ok(())
}

#[test]
fn delete_removes_the_directory_tree_and_entry() -> Result<()> {
    let harness = IntegrationHarness::new();
    let library = harness.library();
    let posts = library.posts();

    let post = posts.create_post("Gone Soon", html("<p>bye</p>"), Vec::new())?;
    posts.delete_post(&post.id)?;

    assert!(!harness
        .workspace_path()
        .join("uploads/posts/gone-soon")
        .exists());
    assert!(posts.list_posts().is_empty());
    assert!(matches!(
        posts.get_post("gone-soon"),
        Err(MediaError::NotFound(_))
    ));
    assert!(matches!(
        posts.delete_post(&post.id),
        Err(MediaError::NotFound(_))
    ));
    Ok(())
}
