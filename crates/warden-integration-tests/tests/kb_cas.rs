//! Knowledge-base compare-and-swap through the kernel surface.

mod common;

use common::KernelTestHarness;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use warden_kb::KbScope;
use warden_kernel::api::{
    KbListRequest, KbReadRequest, KbWriteApplyRequest, KbWritePreviewRequest,
};
use warden_kernel::error::{CODE_INVALID_PARAMS, CODE_KB_CONFLICT};

fn preview_request(scope: &KbScope, path: &str, text: &str) -> KbWritePreviewRequest {
    KbWritePreviewRequest {
        scope: scope.clone(),
        path: path.to_string(),
        text: text.to_string(),
    }
}

fn apply_request(scope: &KbScope, path: &str, text: &str, token: &str) -> KbWriteApplyRequest {
    KbWriteApplyRequest {
        scope: scope.clone(),
        path: path.to_string(),
        text: text.to_string(),
        expected_sha256_current: token.to_string(),
    }
}

#[tokio::test]
async fn test_cas_round_trip() {
    let harness = KernelTestHarness::new();
    let scope = KbScope::act("act-1").unwrap();

    let preview = harness
        .kernel
        .kb_write_preview(&preview_request(&scope, "kb.md", "hello"))
        .await
        .unwrap();
    assert!(!preview.exists);
    assert_eq!(
        preview.sha256_current,
        hex::encode(Sha256::digest(b""))
    );
    assert!(preview.diff.contains("+hello"));

    let applied = harness
        .kernel
        .kb_write_apply(&apply_request(
            &scope,
            "kb.md",
            "hello",
            &preview.expected_sha256_current,
        ))
        .await
        .unwrap();
    assert_eq!(applied.sha256_current, hex::encode(Sha256::digest(b"hello")));

    // The stale token from before the write no longer opens the door.
    let err = harness
        .kernel
        .kb_write_apply(&apply_request(
            &scope,
            "kb.md",
            "hello again",
            &preview.expected_sha256_current,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code(), CODE_KB_CONFLICT);

    // A fresh preview hands out a working token.
    let fresh = harness
        .kernel
        .kb_write_preview(&preview_request(&scope, "kb.md", "hello again"))
        .await
        .unwrap();
    assert!(fresh.exists);
    harness
        .kernel
        .kb_write_apply(&apply_request(
            &scope,
            "kb.md",
            "hello again",
            &fresh.expected_sha256_current,
        ))
        .await
        .unwrap();

    let read = harness
        .kernel
        .kb_read(&KbReadRequest {
            scope,
            path: "kb.md".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(read.text, "hello again");
}

#[tokio::test]
async fn test_concurrent_writers_have_exactly_one_winner() {
    let harness = Arc::new(KernelTestHarness::new());
    let scope = KbScope::act("act-1").unwrap();

    let preview = harness
        .kernel
        .kb_write_preview(&preview_request(&scope, "kb.md", "placeholder"))
        .await
        .unwrap();
    let token = preview.expected_sha256_current;

    let a = {
        let harness = Arc::clone(&harness);
        let request = apply_request(&scope, "kb.md", "writer a's text\n", &token);
        tokio::spawn(async move { harness.kernel.kb_write_apply(&request).await })
    };
    let b = {
        let harness = Arc::clone(&harness);
        let request = apply_request(&scope, "kb.md", "writer b's text\n", &token);
        tokio::spawn(async move { harness.kernel.kb_write_apply(&request).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert_eq!(loser.as_ref().unwrap_err().code(), CODE_KB_CONFLICT);

    // The surviving content is exactly one writer's text, no interleaving.
    let read = harness
        .kernel
        .kb_read(&KbReadRequest {
            scope,
            path: "kb.md".to_string(),
        })
        .await
        .unwrap();
    assert!(read.text == "writer a's text\n" || read.text == "writer b's text\n");
}

#[tokio::test]
async fn test_fresh_scope_lists_its_default_document() {
    let harness = KernelTestHarness::new();
    let scope = KbScope::beat("act-1", "scene-1", "beat-1").unwrap();

    let listing = harness
        .kernel
        .kb_list(&KbListRequest {
            scope: scope.clone(),
        })
        .await
        .unwrap();
    assert_eq!(listing.files, vec!["kb.md"]);

    let read = harness
        .kernel
        .kb_read(&KbReadRequest {
            scope,
            path: "kb.md".to_string(),
        })
        .await
        .unwrap();
    assert!(read.text.starts_with("# KB"));
}

#[tokio::test]
async fn test_escaping_paths_are_invalid_params() {
    let harness = KernelTestHarness::new();
    let scope = KbScope::act("act-1").unwrap();

    for bad in ["../outside.md", "/etc/passwd", ""] {
        let err = harness
            .kernel
            .kb_write_preview(&preview_request(&scope, bad, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), CODE_INVALID_PARAMS, "path {bad:?}");
    }
}
