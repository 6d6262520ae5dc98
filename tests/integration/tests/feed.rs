//! Aggregate feed import into the store.

use md_model::{EntityType, LifecycleState};
use md_storage::MetaDataStore;

use crate::common::{TestEnv, ADMIN, BROKEN_FEED_XML, FEED_XML};

#[tokio::test]
async fn feed_entities_are_stored_and_failures_skipped() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let mut feed = env.importer.import_feed(FEED_XML.as_bytes())?;

    let mut created = Vec::new();
    for entity in &mut feed {
        created.push(env.revisions.create(EntityType::SamlSp, entity?, ADMIN).await?);
    }

    assert_eq!(created.len(), 2);
    assert_eq!(feed.summary().imported, 2);
    assert_eq!(feed.summary().skipped, 3);
    assert!(feed.summary().is_complete());

    let stored = env
        .store
        .find_by_entity_id("https://last.example.org", "saml20_sp")
        .await?
        .expect("stored entity");
    assert_eq!(stored.lifecycle_state(), LifecycleState::Draft);
    assert_eq!(env.store.list("saml20_sp").await?.len(), 2);
    assert!(env
        .store
        .find_by_entity_id("https://idp-only.example.org", "saml20_sp")
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn reimporting_a_feed_hits_unique_entity_ids() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    for entity in env.importer.import_feed(FEED_XML.as_bytes())? {
        env.revisions.create(EntityType::SamlSp, entity?, ADMIN).await?;
    }

    let mut duplicates = 0;
    for entity in env.importer.import_feed(FEED_XML.as_bytes())? {
        let err = env
            .revisions
            .create(EntityType::SamlSp, entity?, ADMIN)
            .await
            .expect_err("entity id already taken");
        assert!(!err.is_version_conflict());
        duplicates += 1;
    }
    assert_eq!(duplicates, 2);
    assert_eq!(env.store.document_count(), 2);
    Ok(())
}

#[tokio::test]
async fn malformed_entity_does_not_fail_the_feed() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let mut feed = env.importer.import_feed(BROKEN_FEED_XML.as_bytes())?;

    for entity in &mut feed {
        env.revisions.create(EntityType::SamlSp, entity?, ADMIN).await?;
    }

    assert_eq!(feed.summary().imported, 2);
    assert_eq!(feed.summary().skipped, 1);
    assert!(feed.summary().is_complete());
    assert!(env
        .store
        .find_by_entity_id("https://third.example.org", "saml20_sp")
        .await?
        .is_some());
    assert!(env
        .store
        .find_by_entity_id("https://second.example.org", "saml20_sp")
        .await?
        .is_none());
    Ok(())
}
