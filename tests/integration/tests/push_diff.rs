//! Change detection around a push of stored documents.

use std::sync::Arc;

use md_core::Value;
use md_model::EntityType;
use md_push::{CollectingSink, NotificationSink, PushDiffer, PushSnapshot};
use md_storage::MetaDataStore;
use serde_json::json;

use crate::common::{TestEnv, ADMIN, IDP_XML, SP_XML};

async fn snapshot(env: &TestEnv) -> anyhow::Result<PushSnapshot> {
    let mut docs = env.store.list("saml20_sp").await?;
    docs.extend(env.store.list("saml20_idp").await?);
    Ok(PushSnapshot::from_documents(&env.exporter, &docs)?)
}

#[tokio::test]
async fn push_reports_exactly_the_edited_attributes() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let sp = env
        .revisions
        .create(EntityType::SamlSp, env.import(SP_XML, EntityType::SamlSp)?, ADMIN)
        .await?;
    env.revisions
        .create(EntityType::SamlIdp, env.import(IDP_XML, EntityType::SamlIdp)?, ADMIN)
        .await?;

    let sink = Arc::new(CollectingSink::new());
    let differ = PushDiffer::new(Arc::clone(&sink) as Arc<dyn NotificationSink>);

    let pre = snapshot(&env).await?;
    assert_eq!(pre.len(), 2);
    assert!(differ.push(&pre, &pre).await?.is_empty());
    assert!(sink.batches().is_empty());

    env.revisions
        .merge(
            &sp.id,
            EntityType::SamlSp,
            [
                ("metaDataFields.name:en", json!("Renamed SP")),
                ("metaDataFields.name:nl", Value::Null),
            ],
            "editor",
        )
        .await?;
    let post = snapshot(&env).await?;

    let deltas = differ.push(&pre, &post).await?;
    let changed: Vec<(&str, &str)> = deltas
        .iter()
        .map(|delta| (delta.entity_id.as_str(), delta.attribute.as_str()))
        .collect();
    assert_eq!(
        changed,
        [
            ("https://sp.example.org/metadata", "metaDataFields.name:en"),
            ("https://sp.example.org/metadata", "metaDataFields.name:nl"),
        ]
    );

    let renamed = deltas.first().expect("delta");
    assert_eq!(renamed.pre_push_value, json!("Example SP"));
    assert_eq!(renamed.post_push_value, json!("Renamed SP"));
    let removed = deltas.last().expect("delta");
    assert_eq!(removed.pre_push_value, json!("Voorbeeld SP"));
    assert_eq!(removed.post_push_value, Value::Null);

    assert_eq!(sink.batches().len(), 1);
    Ok(())
}

#[tokio::test]
async fn whitespace_only_edits_are_not_pushed() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let sp = env
        .revisions
        .create(EntityType::SamlSp, env.import(SP_XML, EntityType::SamlSp)?, ADMIN)
        .await?;
    let pre = snapshot(&env).await?;

    env.revisions
        .merge(&sp.id, EntityType::SamlSp, [("metaDataFields.name:en", json!("  Example SP \n"))], "editor")
        .await?;
    let post = snapshot(&env).await?;

    assert_ne!(pre, post);
    assert!(PushDiffer::compare(&pre, &post).is_empty());
    Ok(())
}

#[tokio::test]
async fn deleted_entities_show_up_with_empty_post_values() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let idp = env
        .revisions
        .create(EntityType::SamlIdp, env.import(IDP_XML, EntityType::SamlIdp)?, ADMIN)
        .await?;
    let pre = snapshot(&env).await?;

    env.revisions.delete(&idp.id, EntityType::SamlIdp, ADMIN).await?;
    let post = snapshot(&env).await?;

    let deltas = PushDiffer::compare(&pre, &post);
    assert_eq!(deltas.len(), pre.records()[0].attributes.len());
    assert!(deltas.iter().all(|delta| delta.post_push_value.is_null()));
    assert!(deltas.iter().all(|delta| delta.entity_id == "https://idp.example.org/saml"));
    Ok(())
}
