// SPDX-License-Identifier: MPL-2.0
mod common;

use std::sync::atomic::Ordering;

use common::{write_png, FakeDialog, Harness};
use serde_json::json;
use tempfile::tempdir;
use zenconvert::app::persisted_state::AppState;
use zenconvert::bridge::Request;
use zenconvert::config::{self, Config, Theme};
use zenconvert::domain::navigation::ToolType;

#[tokio::test]
async fn session_state_survives_a_restart() {
    let data_dir = tempdir().expect("Failed to create temporary directory");
    let media_dir = tempdir().expect("Failed to create temporary directory");
    let png = write_png(media_dir.path(), "cover.png");

    // First session: pick a file, switch tools, maximize.
    let first = Harness::builder()
        .dialog(FakeDialog::picking(vec![png]))
        .build();
    let picked = first
        .dispatcher
        .call("dialog:open", Request::new(json!({ "title": "Open", "multiple": false })))
        .await;
    assert!(picked.is_success());
    first.client.set_tool(ToolType::VideoConverter).await;
    first.client.maximize_window().await;

    let saved = first
        .dispatcher
        .context()
        .persisted_state(first.window.snapshot());
    assert_eq!(saved.save_to(Some(data_dir.path().to_path_buf())), None);

    // Second session starts from what was saved.
    let (restored, warning) = AppState::load_from(Some(data_dir.path().to_path_buf()));
    assert_eq!(warning, None);
    assert_eq!(restored, saved);

    let second = Harness::builder().state(restored).build();
    assert!(second.client.window_state().await.unwrap().is_maximized);
    let nav = second.client.current_tool().await.unwrap();
    assert_eq!(nav.current_tool, ToolType::VideoConverter);
    assert_eq!(nav.previous_tool, Some(ToolType::ImageConverter));

    let _ = second
        .dispatcher
        .call("dialog:open", Request::new(json!({ "title": "Open", "multiple": true })))
        .await;
    let request = second.dialog.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.directory.as_deref(), Some(media_dir.path()));
}

#[test]
fn corrupt_state_file_falls_back_to_defaults_with_a_warning() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let state = AppState::default();
    assert_eq!(state.save_to(Some(dir.path().to_path_buf())), None);

    // Overwrite whatever was written with garbage.
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        std::fs::write(entry.unwrap().path(), b"\xff\xff not cbor").unwrap();
    }

    let (loaded, warning) = AppState::load_from(Some(dir.path().to_path_buf()));
    assert_eq!(loaded, AppState::default());
    assert_eq!(warning, Some("state-parse-error"));
}

#[tokio::test]
async fn settings_file_drives_conversion_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let settings = dir.path().join("settings.toml");
    let downloads = dir.path().join("downloads");

    let written = Config {
        language: Some("fr".to_string()),
        theme: Theme::Dark,
        default_image_quality: Some(42),
        download_directory: Some(downloads.clone()),
        ffmpeg_path: None,
        ytdlp_path: None,
    };
    config::save_to_path(&written, &settings).expect("Failed to write config file");
    let loaded = config::load_from_path(&settings).expect("Failed to load config file");
    assert_eq!(loaded, written);

    let h = Harness::builder().config(loaded).build();

    let converted = h
        .dispatcher
        .call(
            "image:convert",
            Request::new(json!({ "filePath": "/in/a.png", "options": { "format": "jpeg" } })),
        )
        .await;
    assert!(converted.is_success());
    let quality = h.images.jobs.lock().unwrap()[0].options.quality.map(|q| q.value());
    assert_eq!(quality, Some(42));

    let downloaded = h
        .dispatcher
        .call(
            "youtube:download",
            Request::new(json!({ "url": "https://youtu.be/abc", "format": "mp4" })),
        )
        .await
        .into_result()
        .unwrap();
    let path = std::path::PathBuf::from(downloaded["filePath"].as_str().unwrap());
    assert_eq!(path.parent(), Some(downloads.as_path()));
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn malformed_settings_fall_back_to_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let settings = dir.path().join("settings.toml");
    std::fs::write(&settings, "default_image_quality = \"very high\"\n[[[").unwrap();

    let loaded = config::load_from_path(&settings).expect("Malformed settings are not an error");
    assert_eq!(loaded, Config::default());
}
