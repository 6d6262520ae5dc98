//! Export/import round trips.

use md_codec::MetadataExporter;
use md_core::config::ExportConfig;
use md_core::{AttributeMapExt, Value};
use md_model::{EntityType, MetaDataDocument};

use crate::common::{clock, TestEnv, IDP_XML, SP_XML};

#[test]
fn service_provider_survives_xml_round_trip() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let imported = env.import(SP_XML, EntityType::SamlSp)?;
    let doc = MetaDataDocument::new(EntityType::SamlSp, imported.clone());

    let xml = env.exporter.export_to_xml(&doc, clock())?;
    let again = env.importer.import_xml(xml.as_bytes(), EntityType::SamlSp, Some("https://sp.example.org/metadata"))?;

    assert_eq!(again, imported);
    Ok(())
}

#[test]
fn identity_provider_survives_xml_and_json_round_trips() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let imported = env.import(IDP_XML, EntityType::SamlIdp)?;

    let xml = env
        .exporter
        .export_to_xml(&MetaDataDocument::new(EntityType::SamlIdp, imported.clone()), clock())?;
    assert_eq!(env.import(&xml, EntityType::SamlIdp)?, imported);

    let complete = env.importer.with_defaults(EntityType::SamlIdp, imported)?;
    let doc = MetaDataDocument::new(EntityType::SamlIdp, complete.clone());
    let nested = env.exporter.export_to_map(&doc, false)?;
    assert_eq!(nested.str_value("type"), Some("saml20_idp"));

    let reimported = env.importer.import_json(EntityType::SamlIdp, &Value::Object(nested))?;
    assert_eq!(reimported, complete);
    Ok(())
}

#[test]
fn freshness_window_comes_from_configuration() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let doc = MetaDataDocument::new(EntityType::SamlSp, env.import(SP_XML, EntityType::SamlSp)?);
    let exporter = MetadataExporter::from_config(&ExportConfig {
        validity_days: 3,
        publisher: None,
    });

    let xml = exporter.export_to_xml(&doc, clock())?;
    assert!(xml.contains("validUntil=\"2026-10-19T09:30:00Z\""));
    Ok(())
}

#[test]
fn multi_entity_export_reads_back_as_feed() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let sp = MetaDataDocument::new(EntityType::SamlSp, env.import(SP_XML, EntityType::SamlSp)?);
    let idp = MetaDataDocument::new(EntityType::SamlIdp, env.import(IDP_XML, EntityType::SamlIdp)?);

    let feed = env.exporter.export_feed(&[sp.clone(), idp.clone()], clock())?;

    let idps: Vec<_> = env
        .importer
        .import_feed_of(feed.as_bytes(), EntityType::SamlIdp)?
        .collect::<Result<_, _>>()?;
    assert_eq!(idps.len(), 1);
    assert_eq!(idps[0], idp.data);

    let sp_again = env
        .importer
        .import_xml(feed.as_bytes(), EntityType::SamlSp, Some("https://sp.example.org/metadata"))?;
    assert_eq!(sp_again, sp.data);
    Ok(())
}
