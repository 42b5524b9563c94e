//! Saved code-set tests
//!
//! Covers the materialization threshold, owner-scoped load and delete, and
//! the lazy rebuild contract for anchor-only sets.

mod support;

use lexis::config::EngineConfig;
use lexis::models::{BuildParams, BuildType, CodeSetPayload, SourceType};
use lexis::Error;
use support::{condition_store, engine, engine_with};

#[tokio::test]
async fn small_sets_materialize_their_rows() -> anyhow::Result<()> {
    let engine = engine(condition_store()).await;

    let rows = engine
        .build_code_set(&[300], BuildType::Hierarchical, &BuildParams::default())
        .await?;
    let total = rows.len();

    let id = engine
        .save_code_set(
            "alice",
            "Asthma set",
            Some("asthma and descendants"),
            SourceType::Hierarchy,
            rows.clone(),
            vec![300],
            BuildType::Hierarchical,
            &BuildParams::default(),
        )
        .await?;

    let saved = engine.load_code_set("alice", id).await?;
    assert!(saved.is_materialized);
    assert_eq!(saved.total_concepts, total);
    match &saved.payload {
        CodeSetPayload::Materialized { rows: stored } => assert_eq!(stored, &rows),
        CodeSetPayload::AnchorOnly { .. } => panic!("expected materialized payload"),
    }

    Ok(())
}

#[tokio::test]
async fn large_sets_save_anchor_only() -> anyhow::Result<()> {
    let config = EngineConfig {
        materialization_threshold: 2,
        ..EngineConfig::default()
    };
    let engine = engine_with(condition_store(), config).await;

    let rows = engine
        .build_code_set(&[300], BuildType::Hierarchical, &BuildParams::default())
        .await?;
    assert!(rows.len() >= 2);
    let total = rows.len();

    let id = engine
        .save_code_set(
            "alice",
            "Big asthma set",
            None,
            SourceType::Hierarchy,
            rows,
            vec![300],
            BuildType::Hierarchical,
            &BuildParams::default(),
        )
        .await?;

    let saved = engine.load_code_set("alice", id).await?;
    assert!(!saved.is_materialized);
    // The true row count is stored even though the rows are not.
    assert_eq!(saved.total_concepts, total);
    match &saved.payload {
        CodeSetPayload::AnchorOnly { anchor_ids, .. } => assert_eq!(anchor_ids, &vec![300]),
        CodeSetPayload::Materialized { .. } => panic!("expected anchor-only payload"),
    }

    Ok(())
}

#[tokio::test]
async fn rebuilding_an_anchor_only_hierarchy_set_reproduces_the_rows() -> anyhow::Result<()> {
    let config = EngineConfig {
        materialization_threshold: 2,
        ..EngineConfig::default()
    };
    let engine = engine_with(condition_store(), config).await;

    let mut original = engine
        .build_code_set(&[300], BuildType::Hierarchical, &BuildParams::default())
        .await?;

    let id = engine
        .save_code_set(
            "alice",
            "Big asthma set",
            None,
            SourceType::Hierarchy,
            original.clone(),
            vec![300],
            BuildType::Hierarchical,
            &BuildParams::default(),
        )
        .await?;

    let saved = engine.load_code_set("alice", id).await?;
    let mut rebuilt = engine.rebuild_code_set(&saved).await?;

    original.sort_by_key(|r| r.child_concept_id);
    rebuilt.sort_by_key(|r| r.child_concept_id);
    assert_eq!(original, rebuilt);

    Ok(())
}

#[tokio::test]
async fn rebuild_refuses_sources_without_anchors() -> anyhow::Result<()> {
    let config = EngineConfig {
        materialization_threshold: 2,
        ..EngineConfig::default()
    };
    let engine = engine_with(condition_store(), config).await;

    let rows = engine
        .build_code_set(&[300], BuildType::Hierarchical, &BuildParams::default())
        .await?;

    let id = engine
        .save_code_set(
            "alice",
            "Imported set",
            None,
            SourceType::Search,
            rows,
            vec![300],
            BuildType::Hierarchical,
            &BuildParams::default(),
        )
        .await?;

    let saved = engine.load_code_set("alice", id).await?;
    assert!(!saved.is_rebuildable());

    let err = engine.rebuild_code_set(&saved).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    Ok(())
}

#[tokio::test]
async fn loading_someone_elses_set_is_not_found() -> anyhow::Result<()> {
    let engine = engine(condition_store()).await;

    let rows = engine
        .build_code_set(&[300], BuildType::Direct, &BuildParams::default())
        .await?;
    let id = engine
        .save_code_set(
            "alice",
            "Private set",
            None,
            SourceType::Hierarchy,
            rows,
            vec![300],
            BuildType::Direct,
            &BuildParams::default(),
        )
        .await?;

    let err = engine.load_code_set("mallory", id).await.unwrap_err();
    assert!(matches!(err, Error::CodeSetNotFound { .. }));

    Ok(())
}

#[tokio::test]
async fn list_returns_only_the_owners_sets() -> anyhow::Result<()> {
    let engine = engine(condition_store()).await;
    let rows = engine
        .build_code_set(&[300], BuildType::Direct, &BuildParams::default())
        .await?;

    engine
        .save_code_set(
            "alice",
            "Alice's set",
            None,
            SourceType::Hierarchy,
            rows.clone(),
            vec![300],
            BuildType::Direct,
            &BuildParams::default(),
        )
        .await?;
    engine
        .save_code_set(
            "bob",
            "Bob's set",
            None,
            SourceType::Hierarchy,
            rows,
            vec![300],
            BuildType::Direct,
            &BuildParams::default(),
        )
        .await?;

    let sets = engine.list_code_sets("alice").await?;
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].name, "Alice's set");

    Ok(())
}

#[tokio::test]
async fn delete_removes_once_and_respects_ownership() -> anyhow::Result<()> {
    let engine = engine(condition_store()).await;
    let rows = engine
        .build_code_set(&[300], BuildType::Direct, &BuildParams::default())
        .await?;

    let id = engine
        .save_code_set(
            "alice",
            "Disposable set",
            None,
            SourceType::Hierarchy,
            rows,
            vec![300],
            BuildType::Direct,
            &BuildParams::default(),
        )
        .await?;

    // Someone else's delete is a no-op.
    assert!(!engine.delete_code_set("mallory", id).await?);
    assert!(engine.delete_code_set("alice", id).await?);
    assert!(!engine.delete_code_set("alice", id).await?);

    Ok(())
}
