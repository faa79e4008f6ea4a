use bytes::Bytes;
use cloud_file_storage::{
    create_in_memory_app, ports::storage::UploadStream, AppServices, ByteRange, ContentStatus,
    StorageError, UserId,
};
use futures::{stream, StreamExt, TryStreamExt};
use std::io::{Cursor, Read};

fn body(data: &[u8]) -> UploadStream<'static> {
    stream::iter(vec![Ok(Bytes::copy_from_slice(data))]).boxed()
}

async fn app() -> AppServices {
    create_in_memory_app().await.unwrap()
}

#[tokio::test]
async fn folder_lifecycle_through_explorer() {
    let app = app().await;
    let user = UserId::new(3);

    app.explorer.create_directory(user, "", "Projects").await.unwrap();
    app.explorer
        .create_directory(user, "Projects/", "Rust")
        .await
        .unwrap();
    app.explorer
        .upload_file(user, "Projects/Rust/", "notes.txt", body(b"borrowck"), Some(8), None)
        .await
        .unwrap();

    let listing = app.explorer.list_directory(user, "Projects/").await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "Rust");
    assert_eq!(listing[0].size(), 1);

    let renamed = app
        .explorer
        .rename_folder(user, "Projects/Rust/", "Crates")
        .await
        .unwrap();
    assert_eq!(renamed.as_str(), "Projects/Crates/");
    assert!(matches!(
        app.explorer.list_directory(user, "Projects/Rust/").await,
        Err(StorageError::NotFound { .. })
    ));

    app.explorer
        .delete_folder(user, "Projects/Crates/")
        .await
        .unwrap();
    let listing = app.explorer.list_directory(user, "Projects/").await.unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn rename_folder_into_existing_name_conflicts() {
    let app = app().await;
    let user = UserId::new(1);

    app.explorer.create_directory(user, "", "a").await.unwrap();
    app.explorer.create_directory(user, "", "b").await.unwrap();

    let result = app.explorer.rename_folder(user, "a/", "b").await;
    assert!(matches!(
        result,
        Err(StorageError::ObjectAlreadyExists { .. })
    ));
    assert!(app.file_storage.is_exist(user, "a/").await.unwrap());
}

#[tokio::test]
async fn search_folds_hits_to_segments() {
    let app = app().await;
    let user = UserId::new(1);

    app.file_storage.create_path(user, "File/").await.unwrap();
    app.file_storage
        .create_path(user, "NotContain/FolderName/")
        .await
        .unwrap();
    for name in ["firstFile.txt", "secondFile.txt"] {
        app.file_storage
            .save_object(user, "root/folder/", name, body(b"x"), None, None)
            .await
            .unwrap();
    }
    app.file_storage
        .save_object(user, "Profiles/", "a.txt", body(b"a"), None, None)
        .await
        .unwrap();
    app.file_storage
        .save_object(user, "Profiles/", "b.txt", body(b"b"), None, None)
        .await
        .unwrap();

    let found = app.search.search(user, "File").await.unwrap();
    let summary: Vec<(&str, bool)> = found
        .iter()
        .map(|e| (e.path.as_str(), e.is_directory()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("File/", true),
            ("Profiles/", true),
            ("root/folder/firstFile.txt", false),
            ("root/folder/secondFile.txt", false),
        ]
    );

    let profiles = found.iter().find(|e| e.path == "Profiles/").unwrap();
    assert_eq!(profiles.size(), 2);

    assert!(app.search.search(user, "   ").await.unwrap().is_empty());
    assert!(app.search.search(UserId::new(2), "File").await.unwrap().is_empty());
}

#[tokio::test]
async fn range_stream_over_app_services() {
    let app = app().await;
    let user = UserId::new(1);
    let content: Vec<u8> = (0..100_000u32).map(|i| (i % 256) as u8).collect();

    app.explorer
        .upload_file(user, "media/", "track.mp3", body(&content), None, Some("audio/mpeg"))
        .await
        .unwrap();

    let response = app
        .range_streamer
        .open(user, "media/track.mp3", Some(ByteRange::new(10, 70_009)))
        .await
        .unwrap();
    assert_eq!(response.status, ContentStatus::Partial);
    assert_eq!(response.content_length(), 70_000);

    let chunks: Vec<Bytes> = response.into_body().try_collect().await.unwrap();
    let joined: Vec<u8> = chunks.concat();
    assert_eq!(joined, content[10..70_010].to_vec());
}

#[tokio::test]
async fn archive_of_nested_folder() {
    let app = app().await;
    let user = UserId::new(1);

    app.explorer
        .upload_folder_file(user, "", "trip/day1/a.jpg", body(b"a"), None, None)
        .await
        .unwrap();
    app.explorer
        .upload_folder_file(user, "", "trip/b.jpg", body(b"bb"), None, None)
        .await
        .unwrap();

    let mut out = Vec::new();
    let summary = app
        .archive_streamer
        .write_zip(user, "trip/", &mut out)
        .await
        .unwrap();
    assert!(summary.completed);
    assert_eq!(summary.entries, 2);

    let mut archive = zip::ZipArchive::new(Cursor::new(out)).unwrap();
    let mut content = Vec::new();
    archive
        .by_name("day1/a.jpg")
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    assert_eq!(content, b"a");
}
