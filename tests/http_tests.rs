use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use bytes::Bytes;
use cloud_file_storage::{
    adapters::inbound::http::router::create_router, create_in_memory_app,
};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use std::io::{Cursor, Read};

const USER: HeaderName = HeaderName::from_static("x-user-id");

async fn setup_test_server() -> TestServer {
    let services = create_in_memory_app().await.unwrap();
    TestServer::new(create_router(services.into())).unwrap()
}

fn alice() -> HeaderValue {
    HeaderValue::from_static("1")
}

async fn upload(server: &TestServer, dir: &str, name: &str, data: &'static [u8]) {
    upload_owned(server, dir, name, Bytes::from_static(data)).await;
}

async fn upload_owned(server: &TestServer, dir: &str, name: &str, data: Bytes) {
    let response = server
        .put("/api/files")
        .add_header(USER, alice())
        .add_query_param("path", dir)
        .add_query_param("name", name)
        .bytes(data)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

fn png(width: u32, height: u32) -> Bytes {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 90, 200])));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

#[tokio::test]
async fn test_folder_and_file_operations() {
    let server = setup_test_server().await;

    let create = server
        .post("/api/folders")
        .add_header(USER, alice())
        .json(&json!({ "parent": "", "name": "docs" }))
        .await;
    assert_eq!(create.status_code(), StatusCode::CREATED);
    let created: serde_json::Value = create.json();
    assert_eq!(created["data"]["path"], "docs/");

    let duplicate = server
        .post("/api/folders")
        .add_header(USER, alice())
        .json(&json!({ "parent": "", "name": "docs" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    let error: serde_json::Value = duplicate.json();
    assert_eq!(error["error"], "ObjectAlreadyExists");

    upload(&server, "docs/", "a.txt", b"alpha").await;

    let rename = server
        .patch("/api/files")
        .add_header(USER, alice())
        .json(&json!({ "parent": "docs/", "current_name": "a.txt", "new_name": "b.txt" }))
        .await;
    assert_eq!(rename.status_code(), StatusCode::OK);

    let list = server
        .get("/api/entries")
        .add_header(USER, alice())
        .add_query_param("path", "docs/")
        .await;
    assert_eq!(list.status_code(), StatusCode::OK);
    let listing: serde_json::Value = list.json();
    assert_eq!(listing["total_count"], 1);
    assert_eq!(listing["entries"][0]["name"], "b.txt");
    assert_eq!(listing["entries"][0]["size"], 5);
    assert_eq!(listing["entries"][0]["file_type"], "UNKNOWN_FILE");

    let delete = server
        .delete("/api/files")
        .add_header(USER, alice())
        .add_query_param("parent", "docs/")
        .add_query_param("name", "b.txt")
        .await;
    assert_eq!(delete.status_code(), StatusCode::OK);

    // the emptied folder is still there
    let list = server
        .get("/api/entries")
        .add_header(USER, alice())
        .add_query_param("path", "docs/")
        .await;
    assert_eq!(list.status_code(), StatusCode::OK);

    let rename_folder = server
        .patch("/api/folders")
        .add_header(USER, alice())
        .json(&json!({ "path": "docs/", "new_name": "papers" }))
        .await;
    assert_eq!(rename_folder.status_code(), StatusCode::OK);

    let delete_folder = server
        .delete("/api/folders")
        .add_header(USER, alice())
        .add_query_param("path", "papers/")
        .await;
    assert_eq!(delete_folder.status_code(), StatusCode::OK);

    let root: serde_json::Value = server
        .get("/api/entries")
        .add_header(USER, alice())
        .await
        .json();
    assert_eq!(root["total_count"], 0);
}

#[tokio::test]
async fn test_error_statuses() {
    let server = setup_test_server().await;

    let missing = server
        .get("/api/entries")
        .add_header(USER, alice())
        .add_query_param("path", "ghost/")
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let invalid = server
        .get("/api/entries")
        .add_header(USER, alice())
        .add_query_param("path", "../")
        .await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = invalid.json();
    assert_eq!(body["error"], "InvalidPath");

    let anonymous = server.get("/api/search").add_query_param("query", "a").await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_download_sets_attachment_name() {
    let server = setup_test_server().await;
    upload(&server, "", "my report.txt", b"quarterly").await;

    let response = server
        .get("/api/download")
        .add_header(USER, alice())
        .add_query_param("path", "my report.txt")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "quarterly");

    let disposition = response.header(header::CONTENT_DISPOSITION);
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("my%20report.txt"));
}

#[tokio::test]
async fn test_stream_honors_range_header() {
    let server = setup_test_server().await;
    upload(&server, "music/", "song.mp3", b"0123456789").await;

    let partial = server
        .get("/api/stream")
        .add_header(USER, alice())
        .add_header(header::RANGE, HeaderValue::from_static("bytes=2-5"))
        .add_query_param("path", "music/song.mp3")
        .await;
    assert_eq!(partial.status_code(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(partial.text(), "2345");
    assert_eq!(partial.header(header::CONTENT_RANGE), "bytes 2-5/10");
    assert_eq!(partial.header(header::CONTENT_TYPE), "audio/mpeg");

    let full = server
        .get("/api/stream")
        .add_header(USER, alice())
        .add_query_param("path", "music/song.mp3")
        .await;
    assert_eq!(full.status_code(), StatusCode::OK);
    assert_eq!(full.text(), "0123456789");

    let outside = server
        .get("/api/stream")
        .add_header(USER, alice())
        .add_header(header::RANGE, HeaderValue::from_static("bytes=50-60"))
        .add_query_param("path", "music/song.mp3")
        .await;
    assert_eq!(outside.status_code(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(outside.header(header::CONTENT_RANGE), "bytes */10");
}

#[tokio::test]
async fn test_folder_upload_and_zip_download() {
    let server = setup_test_server().await;

    let form = MultipartForm::new()
        .add_part(
            "files",
            Part::bytes(b"first".as_slice()).file_name("album/one.jpg"),
        )
        .add_part(
            "files",
            Part::bytes(b"second".as_slice()).file_name("album/nested/two.jpg"),
        );
    let response = server
        .post("/api/upload")
        .add_header(USER, alice())
        .add_query_param("path", "")
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let again = MultipartForm::new().add_part(
        "files",
        Part::bytes(b"third".as_slice()).file_name("album/three.jpg"),
    );
    let conflict = server
        .post("/api/upload")
        .add_header(USER, alice())
        .multipart(again)
        .await;
    assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

    let download = server
        .get("/api/download-folder")
        .add_header(USER, alice())
        .add_query_param("path", "album/")
        .await;
    assert_eq!(download.status_code(), StatusCode::OK);
    assert_eq!(download.header(header::CONTENT_TYPE), "application/zip");
    assert!(download
        .header(header::CONTENT_DISPOSITION)
        .to_str()
        .unwrap()
        .contains("album.zip"));

    let mut archive = zip::ZipArchive::new(Cursor::new(download.as_bytes().to_vec())).unwrap();
    assert_eq!(archive.len(), 2);
    let mut content = String::new();
    archive
        .by_name("nested/two.jpg")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "second");
}

#[tokio::test]
async fn test_search_endpoint() {
    let server = setup_test_server().await;
    upload(&server, "Reports/", "q1.txt", b"1").await;
    upload(&server, "", "report-draft.txt", b"2").await;

    let response = server
        .get("/api/search")
        .add_header(USER, alice())
        .add_query_param("query", "report")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["entries"][0]["path"], "Reports/");
    assert_eq!(body["entries"][0]["child_count"], 1);
    assert_eq!(body["entries"][1]["path"], "report-draft.txt");
}

#[tokio::test]
async fn test_users_are_isolated() {
    let server = setup_test_server().await;
    upload(&server, "", "secret.txt", b"mine").await;

    let other = server
        .get("/api/download")
        .add_header(USER, HeaderValue::from_static("2"))
        .add_query_param("path", "secret.txt")
        .await;
    assert_eq!(other.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_preview_is_scaled_down() {
    let server = setup_test_server().await;
    upload_owned(&server, "photos/", "beach.png", png(1600, 900)).await;

    let response = server
        .get("/api/preview/image")
        .add_header(USER, alice())
        .add_query_param("path", "photos/beach.png")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=\"beach.png\""
    );

    let preview = image::load_from_memory(response.as_bytes()).unwrap();
    assert_eq!(preview.dimensions(), (800, 450));

    let not_an_image = server
        .get("/api/preview/image")
        .add_header(USER, alice())
        .add_query_param("path", "photos/notes.txt")
        .await;
    assert_eq!(not_an_image.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_music_preview_is_inline() {
    let server = setup_test_server().await;
    upload(&server, "music/", "night drive.mp3", b"ID3-bytes").await;

    let response = server
        .get("/api/preview/music")
        .add_header(USER, alice())
        .add_query_param("path", "music/night drive.mp3")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "audio/mpeg");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=\"night%20drive.mp3\""
    );
    assert_eq!(response.as_bytes().as_ref(), b"ID3-bytes");

    let missing = server
        .get("/api/preview/music")
        .add_header(USER, alice())
        .add_query_param("path", "music/ghost.mp3")
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}
