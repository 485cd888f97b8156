// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! glTF 2.0 scene exporter (embedded JSON and binary GLB)
//!
//! The scene has a root `Batch` node, one `Kit_{n}` node per kit and one
//! node per part carrying its translation. Parts of the same kind share a
//! mesh.

use super::ensure_not_empty;
use super::merge::merge_by_kind;
use crate::error::{FastenerError, Result};
use crate::geometry::Mesh;
use crate::layout::KitLayout;
use crate::parts::PartKind;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::info;

const FORMAT: &str = "gltf";

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const TRIANGLES: u32 = 4;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

/// Scene JSON with the geometry embedded as a base64 data URI
pub fn export_gltf(layout: &KitLayout) -> Result<Vec<u8>> {
    let (mut gltf, buffer) = create_gltf_json(layout)?;
    gltf["buffers"] = json!([{
        "byteLength": buffer.len(),
        "uri": format!("data:application/octet-stream;base64,{}", STANDARD.encode(&buffer))
    }]);

    let bytes = serde_json::to_vec_pretty(&gltf).map_err(|e| FastenerError::serialization(FORMAT, e))?;
    info!(nodes = node_count(&gltf), bytes = bytes.len(), "glTF scene written");
    Ok(bytes)
}

/// Binary glTF: 12-byte header, JSON chunk, BIN chunk
pub fn export_glb(layout: &KitLayout) -> Result<Vec<u8>> {
    let (mut gltf, mut buffer) = create_gltf_json(layout)?;
    pad_to_four(&mut buffer, 0);
    gltf["buffers"] = json!([{ "byteLength": buffer.len() }]);

    let mut json_bytes = serde_json::to_vec(&gltf).map_err(|e| FastenerError::serialization("glb", e))?;
    pad_to_four(&mut json_bytes, b' ');

    let total_length = 12 + 8 + json_bytes.len() + 8 + buffer.len();
    let total_length =
        u32::try_from(total_length).map_err(|_| FastenerError::serialization("glb", "scene exceeds 4 GiB"))?;

    let mut glb = Vec::with_capacity(total_length as usize);
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_length.to_le_bytes());

    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    glb.extend_from_slice(&(buffer.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(&buffer);

    info!(nodes = node_count(&gltf), bytes = glb.len(), "GLB scene written");
    Ok(glb)
}

fn node_count(gltf: &Value) -> usize {
    gltf["nodes"].as_array().map_or(0, Vec::len)
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

fn push_f32(buffer: &mut Vec<u8>, values: [f64; 3]) {
    for value in values {
        buffer.extend_from_slice(&(value as f32).to_le_bytes());
    }
}

/// Append one mesh to the buffer; returns the glTF mesh plus its accessors
/// and buffer views
fn write_mesh(
    name: &str,
    mesh: &Mesh,
    buffer: &mut Vec<u8>,
    accessors: &mut Vec<Value>,
    views: &mut Vec<Value>,
) -> Value {
    let bbox = mesh.bounding_box();
    let first_accessor = accessors.len();

    let position_offset = buffer.len();
    for vertex in &mesh.vertices {
        push_f32(buffer, [vertex.position.x, vertex.position.y, vertex.position.z]);
    }
    let normal_offset = buffer.len();
    for vertex in &mesh.vertices {
        push_f32(buffer, [vertex.normal.x, vertex.normal.y, vertex.normal.z]);
    }
    let indices_offset = buffer.len();
    for triangle in &mesh.triangles {
        for index in triangle.indices {
            buffer.extend_from_slice(&(index as u32).to_le_bytes());
        }
    }
    let end = buffer.len();

    let view = views.len();
    views.push(json!({ "buffer": 0, "byteOffset": position_offset, "byteLength": normal_offset - position_offset, "target": ARRAY_BUFFER }));
    views.push(json!({ "buffer": 0, "byteOffset": normal_offset, "byteLength": indices_offset - normal_offset, "target": ARRAY_BUFFER }));
    views.push(json!({ "buffer": 0, "byteOffset": indices_offset, "byteLength": end - indices_offset, "target": ELEMENT_ARRAY_BUFFER }));

    accessors.push(json!({
        "bufferView": view,
        "componentType": FLOAT,
        "count": mesh.vertex_count(),
        "type": "VEC3",
        "min": [bbox.min.x as f32, bbox.min.y as f32, bbox.min.z as f32],
        "max": [bbox.max.x as f32, bbox.max.y as f32, bbox.max.z as f32]
    }));
    accessors.push(json!({
        "bufferView": view + 1,
        "componentType": FLOAT,
        "count": mesh.vertex_count(),
        "type": "VEC3"
    }));
    accessors.push(json!({
        "bufferView": view + 2,
        "componentType": UNSIGNED_INT,
        "count": mesh.triangle_count() * 3,
        "type": "SCALAR"
    }));

    json!({
        "name": name,
        "primitives": [{
            "attributes": { "POSITION": first_accessor, "NORMAL": first_accessor + 1 },
            "indices": first_accessor + 2,
            "mode": TRIANGLES
        }]
    })
}

/// Scene document without `buffers`, plus the little-endian buffer contents
fn create_gltf_json(layout: &KitLayout) -> Result<(Value, Vec<u8>)> {
    let merged = merge_by_kind(layout)?;

    let mut buffer = Vec::new();
    let mut accessors = Vec::new();
    let mut views = Vec::new();
    let mut meshes = Vec::new();
    let mut mesh_index: BTreeMap<PartKind, usize> = BTreeMap::new();

    for (kind, mesh) in &merged {
        ensure_not_empty(mesh, kind.label(), "gltf export")?;
        mesh_index.insert(*kind, meshes.len());
        meshes.push(write_mesh(kind.display_name(), mesh, &mut buffer, &mut accessors, &mut views));
    }

    let mut nodes = vec![Value::Null];
    let mut kit_nodes = Vec::new();
    for kit_index in 1..=layout.quantity {
        let kit_node = nodes.len();
        nodes.push(Value::Null);
        kit_nodes.push(kit_node);

        let mut children = Vec::new();
        for part in layout.kit(kit_index) {
            let mesh = mesh_index
                .get(&part.kind)
                .copied()
                .ok_or_else(|| FastenerError::empty(part.name(), "gltf export"))?;
            children.push(nodes.len());
            nodes.push(json!({
                "name": part.name(),
                "mesh": mesh,
                "translation": [part.offset.x as f32, part.offset.y as f32, part.offset.z as f32]
            }));
        }
        nodes[kit_node] = json!({ "name": format!("Kit_{}", kit_index), "children": children });
    }
    nodes[0] = json!({ "name": "Batch", "children": kit_nodes });

    let gltf = json!({
        "asset": {
            "generator": concat!("boltforge ", env!("CARGO_PKG_VERSION")),
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": nodes,
        "meshes": meshes,
        "accessors": accessors,
        "bufferViews": views
    });

    Ok((gltf, buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshQuality;
    use crate::layout::layout;
    use crate::params::FastenerParams;

    fn batch() -> KitLayout {
        let params = FastenerParams {
            quantity: 2,
            has_washer: true,
            ..Default::default()
        };
        layout(&params, &MeshQuality::default()).unwrap()
    }

    #[test]
    fn test_scene_hierarchy() {
        let bytes = export_gltf(&batch()).unwrap();
        let gltf: Value = serde_json::from_slice(&bytes).unwrap();

        let nodes = gltf["nodes"].as_array().unwrap();
        // Batch, 2 kits, 4 parts
        assert_eq!(nodes.len(), 7);
        assert_eq!(nodes[0]["name"], "Batch");
        assert_eq!(nodes[0]["children"], json!([1, 4]));
        assert_eq!(nodes[1]["name"], "Kit_1");
        assert_eq!(nodes[1]["children"], json!([2, 3]));
        assert_eq!(nodes[3]["name"], "Washer_1");
        assert_eq!(gltf["meshes"].as_array().unwrap().len(), 2);

        let uri = gltf["buffers"][0]["uri"].as_str().unwrap();
        assert!(uri.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_embedded_buffer_matches_length() {
        let bytes = export_gltf(&batch()).unwrap();
        let gltf: Value = serde_json::from_slice(&bytes).unwrap();

        let uri = gltf["buffers"][0]["uri"].as_str().unwrap();
        let data = STANDARD.decode(uri.split_once(',').unwrap().1).unwrap();
        assert_eq!(data.len() as u64, gltf["buffers"][0]["byteLength"].as_u64().unwrap());

        // Positions are 32-bit floats
        let vertices = gltf["accessors"][0]["count"].as_u64().unwrap();
        assert_eq!(gltf["bufferViews"][0]["byteLength"].as_u64().unwrap(), vertices * 12);
    }

    #[test]
    fn test_glb_layout() {
        let glb = export_glb(&batch()).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(&glb[16..20], b"JSON");
        assert_eq!(glb.len() % 4, 0);

        let json_length = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        let gltf: Value = serde_json::from_slice(&glb[20..20 + json_length]).unwrap();
        assert!(gltf["buffers"][0].get("uri").is_none());
        assert_eq!(&glb[20 + json_length + 4..20 + json_length + 8], b"BIN\0");
    }
}
