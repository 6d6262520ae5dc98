//! Revision chains over stored documents.

use md_core::AttributeMapExt;
use md_model::{EntityType, LifecycleState};
use md_revision::RevisionError;
use md_storage::MetaDataStore;
use serde_json::json;

use crate::common::{clock, TestEnv, ADMIN, SP_XML};

#[tokio::test]
async fn edits_build_a_revision_chain() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let imported = env.import(SP_XML, EntityType::SamlSp)?;
    let created = env.revisions.create(EntityType::SamlSp, imported, ADMIN).await?;
    let id = created.id.clone();

    for (n, name) in ["First", "Second", "Third"].into_iter().enumerate() {
        let latest = env
            .revisions
            .merge(&id, EntityType::SamlSp, [("metaDataFields.name:en", json!(name))], "editor")
            .await?;
        assert_eq!(latest.revision_number(), Some(n as u64 + 1));
    }

    let latest = env.revisions.load(&id, EntityType::SamlSp).await?;
    let revision = latest.revision.as_ref().expect("revision");
    assert_eq!(revision.number, 3);
    assert_eq!(revision.parent_id, None);
    assert_eq!(revision.created, clock());
    assert_eq!(latest.lifecycle_state(), LifecycleState::Latest);
    assert_eq!(latest.data.field("name:en"), Some("Third"));

    let history = env.revisions.history(&id, EntityType::SamlSp).await?;
    let numbers: Vec<_> = history.iter().filter_map(|doc| doc.revision_number()).collect();
    assert_eq!(numbers, [2, 1, 0]);
    assert!(history.iter().all(|doc| doc.entity_type == "saml20_sp_revision"));
    assert!(history
        .iter()
        .all(|doc| doc.revision.as_ref().and_then(|r| r.parent_id.as_deref()) == Some(id.as_str())));
    assert_eq!(history[2].data.field("name:en"), Some("Example SP"));
    Ok(())
}

#[tokio::test]
async fn restoring_an_old_revision_keeps_the_chain() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let imported = env.import(SP_XML, EntityType::SamlSp)?;
    let created = env.revisions.create(EntityType::SamlSp, imported, ADMIN).await?;
    env.revisions
        .merge(&created.id, EntityType::SamlSp, [("state", json!("prodaccepted"))], "editor")
        .await?;

    let original = env.revisions.history(&created.id, EntityType::SamlSp).await?[0].clone();
    let restored = env.revisions.restore(&original.id, EntityType::SamlSp, ADMIN).await?;

    assert_eq!(restored.id, created.id);
    assert_eq!(restored.revision_number(), Some(2));
    assert_eq!(restored.data, original.data);
    assert_eq!(restored.revision.as_ref().map(|r| r.updated_by.as_str()), Some(ADMIN));
    assert_eq!(env.revisions.history(&created.id, EntityType::SamlSp).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_editors_get_a_version_conflict() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let imported = env.import(SP_XML, EntityType::SamlSp)?;
    let created = env.revisions.create(EntityType::SamlSp, imported, ADMIN).await?;

    let alice = env.revisions.load(&created.id, EntityType::SamlSp).await?;
    let bob = env.revisions.load(&created.id, EntityType::SamlSp).await?;

    let mut alice_data = alice.data.clone();
    alice_data.insert("notes".into(), json!("alice"));
    env.revisions.update(alice, alice_data, "alice").await?;

    let mut bob_data = bob.data.clone();
    bob_data.insert("notes".into(), json!("bob"));
    let err = env.revisions.update(bob, bob_data, "bob").await.unwrap_err();
    assert!(err.is_version_conflict());

    let stored = env
        .store
        .find_by_id(&created.id, "saml20_sp")
        .await?
        .expect("stored document");
    assert_eq!(stored.data.str_value("notes"), Some("alice"));
    assert_eq!(env.revisions.history(&created.id, EntityType::SamlSp).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn bad_merge_paths_write_nothing() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let imported = env.import(SP_XML, EntityType::SamlSp)?;
    let created = env.revisions.create(EntityType::SamlSp, imported, ADMIN).await?;

    let err = env
        .revisions
        .merge(
            &created.id,
            EntityType::SamlSp,
            [("metaDataFields.name:en", json!("Renamed")), ("entityid.nested", json!(1))],
            "editor",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RevisionError::InvalidPath { ref segment, .. } if segment == "entityid"));

    let unchanged = env.revisions.load(&created.id, EntityType::SamlSp).await?;
    assert_eq!(unchanged.version, created.version);
    assert_eq!(unchanged.data.field("name:en"), Some("Example SP"));
    Ok(())
}
