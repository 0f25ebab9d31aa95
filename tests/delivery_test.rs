mod common;

use common::{MockTransport, Sent, setup_test_db, staged, test_state};
use rust_filestore_bot::config::BotConfig;
use rust_filestore_bot::entities::files::MediaKind;
use rust_filestore_bot::services::delivery::{DeliveryOutcome, DeliveryRequest};
use rust_filestore_bot::services::file_service::StagedFile;
use rust_filestore_bot::services::link_service::LinkTarget;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

const OWNER: i64 = 300;
const CHAT: i64 = 4242;
const REQUEST_ID: i32 = 17;

fn request() -> DeliveryRequest {
    DeliveryRequest {
        chat_id: CHAT,
        request_message_id: REQUEST_ID,
    }
}

fn config() -> BotConfig {
    BotConfig {
        custom_caption: "t.me/example".to_string(),
        ..BotConfig::development()
    }
}

#[tokio::test]
async fn test_single_file_delivery_batches_request_and_file() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("report.pdf", 10)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::File(batch.files[0].id))
        .await
        .unwrap();

    let outcome = state.delivery.deliver(request(), &code).await;
    let delivered = match outcome {
        DeliveryOutcome::Single(delivered) => delivered,
        other => panic!("expected single delivery, got {:?}", other),
    };

    let media = transport.media();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].0, "ref-report.pdf");
    // Single deliveries carry no serial tag
    assert_eq!(media[0].1.as_deref(), Some("report.pdf\n\nt.me/example"));

    assert_eq!(delivered.chat_id, CHAT);
    assert_eq!(delivered.message_ids.len(), 2);
    assert_eq!(delivered.message_ids[0], REQUEST_ID);
}

#[tokio::test]
async fn test_single_file_transport_failure_emits_no_batch() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("broken.pdf", 10)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::File(batch.files[0].id))
        .await
        .unwrap();
    transport.fail_ref("ref-broken.pdf");

    let outcome = state.delivery.deliver(request(), &code).await;
    assert!(matches!(outcome, DeliveryOutcome::Failed));
    assert_eq!(transport.texts(), vec!["Error forwarding file. 😔".to_string()]);
}

#[tokio::test]
async fn test_group_delivery_isolates_failures() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let files: Vec<StagedFile> = (1..=8).map(|i| staged(&format!("part{}.mkv", i), 10)).collect();
    let batch = state.files.commit_batch(OWNER, "Series", &files).await.unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::Group(batch.group.id))
        .await
        .unwrap();

    for i in [2, 3, 5, 6, 7, 8] {
        transport.fail_ref(&format!("ref-part{}.mkv", i));
    }

    let outcome = state.delivery.deliver(request(), &code).await;
    let report = match outcome {
        DeliveryOutcome::Group(report) => report,
        other => panic!("expected group delivery, got {:?}", other),
    };

    assert_eq!(report.total, 8);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed.len(), 6);
    assert_eq!(report.failed[0], "part2.mkv");

    // Request, status message, then the two delivered files
    assert_eq!(report.batch.message_ids.len(), 4);
    assert_eq!(report.batch.message_ids[0], REQUEST_ID);

    let texts = transport.texts();
    assert!(texts[0].starts_with("Forwarding 8 files from 'Series' 📦"));
    let summary = texts.last().unwrap();
    assert!(summary.contains("- part2.mkv"));
    assert!(summary.contains("- part7.mkv"));
    assert!(!summary.contains("- part8.mkv"));
    assert!(summary.ends_with("...and 1 more."));
}

#[tokio::test]
async fn test_group_delivery_sends_in_serial_order_with_serial_captions() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("a", 1), staged("b", 1), staged("c", 1)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::Group(batch.group.id))
        .await
        .unwrap();

    state.delivery.deliver(request(), &code).await;

    let media = transport.media();
    let refs: Vec<_> = media.iter().map(|(r, _)| r.as_str()).collect();
    assert_eq!(refs, vec!["ref-a", "ref-b", "ref-c"]);
    assert_eq!(media[1].1.as_deref(), Some("#002 b\n\nt.me/example"));
    assert_eq!(
        transport.texts().last().unwrap(),
        "All 3 files from group 'Docs' forwarded successfully! ✅"
    );
}

#[tokio::test]
async fn test_empty_group_schedules_status_only() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Temp", &[staged("gone", 1)])
        .await
        .unwrap();
    state.files.delete_file(OWNER, "Temp", 1).await.unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::Group(batch.group.id))
        .await
        .unwrap();

    let outcome = state.delivery.deliver(request(), &code).await;
    let report = match outcome {
        DeliveryOutcome::Group(report) => report,
        other => panic!("expected group delivery, got {:?}", other),
    };

    assert_eq!(report.total, 0);
    assert_eq!(report.batch.message_ids.len(), 1);
    assert!(!report.batch.message_ids.contains(&REQUEST_ID));
    assert_eq!(
        transport.texts(),
        vec!["Group 'Temp' is empty or files are unavailable. 🤷‍♂️".to_string()]
    );
    assert!(transport.media().is_empty());
}

#[tokio::test]
async fn test_unknown_and_revoked_codes_are_denied_alike() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("a", 1)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::Group(batch.group.id))
        .await
        .unwrap();
    state.links.revoke(&code, OWNER).await.unwrap();

    assert!(matches!(
        state.delivery.deliver(request(), &code).await,
        DeliveryOutcome::NotFound
    ));
    assert!(matches!(
        state.delivery.deliver(request(), "nosuchcode00").await,
        DeliveryOutcome::NotFound
    ));
    assert_eq!(
        transport.texts(),
        vec![
            "Invalid or Expired Link 🚫".to_string(),
            "Invalid or Expired Link 🚫".to_string()
        ]
    );
}

#[tokio::test]
async fn test_failed_status_message_aborts_group_delivery() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("a", 1)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::Group(batch.group.id))
        .await
        .unwrap();
    transport.fail_text_sends();

    let outcome = state.delivery.deliver(request(), &code).await;
    assert!(matches!(outcome, DeliveryOutcome::Failed));
    assert!(transport.media().is_empty());
}

#[tokio::test]
async fn test_video_note_is_sent_without_caption() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let note = StagedFile {
        kind: MediaKind::VideoNote,
        ..staged("videonote_abc.mp4", 5)
    };
    let batch = state.files.commit_batch(OWNER, "Notes", &[note]).await.unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::File(batch.files[0].id))
        .await
        .unwrap();

    state.delivery.deliver(request(), &code).await;

    let sent = transport.sent.lock().unwrap().clone();
    assert!(matches!(
        &sent[0],
        Sent::Media { kind: MediaKind::VideoNote, caption: None, .. }
    ));
}

#[tokio::test]
async fn test_uploader_caption_preferences() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    state.auth.add_user(OWNER, None, None, 1).await.unwrap();
    state
        .settings
        .set_user_caption_disabled(OWNER, true)
        .await
        .unwrap();

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("plain.pdf", 1)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::File(batch.files[0].id))
        .await
        .unwrap();

    state.delivery.deliver(request(), &code).await;
    assert_eq!(transport.media()[0].1.as_deref(), Some("plain.pdf"));

    // Admin uploads keep captions regardless of their own row
    let admin_batch = state
        .files
        .commit_batch(1, "Admin", &[staged("boss.pdf", 1)])
        .await
        .unwrap();
    let admin_code = state
        .links
        .get_or_create(1, LinkTarget::File(admin_batch.files[0].id))
        .await
        .unwrap();
    state.delivery.deliver(request(), &admin_code).await;
    assert_eq!(
        transport.media()[1].1.as_deref(),
        Some("boss.pdf\n\nt.me/example")
    );

    // Global off wins for everyone
    state.settings.set_caption_enabled(false).await.unwrap();
    state.delivery.deliver(request(), &admin_code).await;
    assert_eq!(transport.media()[2].1.as_deref(), Some("boss.pdf"));
}

#[tokio::test]
async fn test_delivery_counts_clicks() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db, transport.clone(), config());

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("a", 1)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::File(batch.files[0].id))
        .await
        .unwrap();

    state.delivery.deliver(request(), &code).await;
    state.delivery.deliver(request(), &code).await;

    let status = state.links.link_status(&code, OWNER).await.unwrap();
    match status {
        rust_filestore_bot::services::link_service::LinkStatus::Active(link) => {
            assert_eq!(link.clicks, 2)
        }
        other => panic!("expected active link, got {:?}", other),
    }
}

#[tokio::test]
async fn test_caption_falls_back_to_defaults_when_settings_unreadable() {
    let db = setup_test_db().await;
    let transport = Arc::new(MockTransport::new());
    let (state, _shutdown) = test_state(db.clone(), transport.clone(), config());

    state.auth.add_user(OWNER, None, None, 1).await.unwrap();
    state
        .settings
        .set_user_caption_disabled(OWNER, true)
        .await
        .unwrap();
    state.settings.set_caption_enabled(false).await.unwrap();

    let batch = state
        .files
        .commit_batch(OWNER, "Docs", &[staged("a.pdf", 1)])
        .await
        .unwrap();
    let code = state
        .links
        .get_or_create(OWNER, LinkTarget::File(batch.files[0].id))
        .await
        .unwrap();

    db.execute_unprepared("DROP TABLE bot_settings").await.unwrap();
    db.execute_unprepared("DROP TABLE authorized_users").await.unwrap();

    let outcome = state.delivery.deliver(request(), &code).await;
    assert!(matches!(outcome, DeliveryOutcome::Single(_)));
    assert_eq!(
        transport.media(),
        vec![("ref-a.pdf".to_string(), Some("a.pdf\n\nt.me/example".to_string()))]
    );
}
