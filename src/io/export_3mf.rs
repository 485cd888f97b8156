// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3MF (3D Manufacturing Format) exporter

use super::merge::merge_by_kind;
use super::{archive_options, ensure_not_empty};
use crate::error::{FastenerError, Result};
use crate::geometry::Mesh;
use crate::layout::KitLayout;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use tracing::info;
use zip::ZipWriter;

const FORMAT: &str = "3mf";

pub const MODEL_PATH: &str = "3D/3dmodel.model";
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
pub const RELS_PATH: &str = "_rels/.rels";

const CORE_NAMESPACE: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

fn xml_error(err: impl ToString) -> FastenerError {
    FastenerError::serialization(FORMAT, err)
}

/// Export the batch as a 3MF package: one object per physical part and one
/// build item per part carrying its layout offset
pub fn export_3mf(layout: &KitLayout) -> Result<Vec<u8>> {
    export_3mf_at(layout, Utc::now())
}

/// Same as [`export_3mf`] with an explicit creation date
pub fn export_3mf_at(layout: &KitLayout, created: DateTime<Utc>) -> Result<Vec<u8>> {
    let model_xml = generate_3dmodel_xml(layout, created)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let entries = [
        (CONTENT_TYPES_PATH, CONTENT_TYPES_XML.as_bytes()),
        (RELS_PATH, RELS_XML.as_bytes()),
        (MODEL_PATH, model_xml.as_slice()),
    ];
    for (path, content) in entries {
        zip.start_file(path, archive_options()).map_err(xml_error)?;
        zip.write_all(content).map_err(xml_error)?;
    }
    let archive = zip.finish().map_err(xml_error)?.into_inner();

    info!(objects = layout.parts.len(), bytes = archive.len(), "3MF package written");
    Ok(archive)
}

struct ModelWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl ModelWriter {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn metadata(&mut self, name: &str, value: &str) -> Result<()> {
        let mut element = BytesStart::new("metadata");
        element.push_attribute(("name", name));
        self.event(Event::Start(element))?;
        self.event(Event::Text(BytesText::new(value)))?;
        self.end("metadata")
    }

    fn mesh(&mut self, mesh: &Mesh) -> Result<()> {
        self.start("mesh")?;

        self.start("vertices")?;
        for vertex in &mesh.vertices {
            let p = vertex.position;
            let mut v = BytesStart::new("vertex");
            v.push_attribute(("x", (p.x as f32).to_string().as_str()));
            v.push_attribute(("y", (p.y as f32).to_string().as_str()));
            v.push_attribute(("z", (p.z as f32).to_string().as_str()));
            self.event(Event::Empty(v))?;
        }
        self.end("vertices")?;

        self.start("triangles")?;
        for triangle in &mesh.triangles {
            let mut t = BytesStart::new("triangle");
            t.push_attribute(("v1", triangle.indices[0].to_string().as_str()));
            t.push_attribute(("v2", triangle.indices[1].to_string().as_str()));
            t.push_attribute(("v3", triangle.indices[2].to_string().as_str()));
            self.event(Event::Empty(t))?;
        }
        self.end("triangles")?;

        self.end("mesh")
    }
}

fn generate_3dmodel_xml(layout: &KitLayout, created: DateTime<Utc>) -> Result<Vec<u8>> {
    let meshes = merge_by_kind(layout)?;
    let mut out = ModelWriter {
        writer: Writer::new(Cursor::new(Vec::new())),
    };

    out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("unit", "millimeter"));
    model.push_attribute(("xml:lang", "en-US"));
    model.push_attribute(("xmlns", CORE_NAMESPACE));
    out.event(Event::Start(model))?;

    out.metadata("Application", concat!("boltforge ", env!("CARGO_PKG_VERSION")))?;
    out.metadata("CreationDate", &created.format("%Y-%m-%d").to_string())?;
    out.metadata("Fingerprint", &layout.fingerprint)?;

    out.start("resources")?;
    for (index, part) in layout.parts.iter().enumerate() {
        let mesh = meshes
            .get(&part.kind)
            .ok_or_else(|| FastenerError::empty(part.name(), "3mf export"))?;
        ensure_not_empty(mesh, &part.name(), "3mf export")?;

        let mut object = BytesStart::new("object");
        object.push_attribute(("id", (index + 1).to_string().as_str()));
        object.push_attribute(("name", part.name().as_str()));
        object.push_attribute(("type", "model"));
        out.event(Event::Start(object))?;
        out.mesh(mesh)?;
        out.end("object")?;
    }
    out.end("resources")?;

    out.start("build")?;
    for (index, part) in layout.parts.iter().enumerate() {
        let o = part.offset;
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", (index + 1).to_string().as_str()));
        item.push_attribute((
            "transform",
            format!("1 0 0 0 1 0 0 0 1 {} {} {}", o.x as f32, o.y as f32, o.z as f32).as_str(),
        ));
        out.event(Event::Empty(item))?;
    }
    out.end("build")?;

    out.end("model")?;
    Ok(out.writer.into_inner().into_inner())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshQuality;
    use crate::layout::layout;
    use crate::params::FastenerParams;
    use std::io::Read;

    fn read_model(archive: Vec<u8>) -> String {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut model = String::new();
        zip.by_name(MODEL_PATH).unwrap().read_to_string(&mut model).unwrap();
        model
    }

    #[test]
    fn test_package_entries() {
        let batch = layout(&FastenerParams::default(), &MeshQuality::default()).unwrap();
        let archive = export_3mf(&batch).unwrap();

        let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["3D/3dmodel.model", "[Content_Types].xml", "_rels/.rels"]);
    }

    #[test]
    fn test_object_and_item_per_part() {
        let params = FastenerParams {
            quantity: 2,
            has_nut: true,
            ..Default::default()
        };
        let batch = layout(&params, &MeshQuality::default()).unwrap();
        let created = DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z").unwrap().with_timezone(&Utc);
        let model = read_model(export_3mf_at(&batch, created).unwrap());

        assert_eq!(model.matches("<object ").count(), 4);
        assert_eq!(model.matches("<item ").count(), 4);
        assert!(model.contains(r#"name="Bolt_1""#));
        assert!(model.contains(r#"name="Nut_2""#));
        assert!(model.contains("2025-03-01"));
        assert!(model.contains(&batch.fingerprint));
        assert!(model.contains(r#"transform="1 0 0 0 1 0 0 0 1 "#));
    }
}
