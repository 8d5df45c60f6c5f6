//! OBJ parser supporting positions, normals, texture coordinates and named
//! objects (`o`). Faces stay grouped by the object they were declared in.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::DecodeError;
use crate::mesh::{MeshData, MeshVertex};

/// One face corner, as indices into the document's attribute arrays.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Corner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// Triangulated faces declared under one `o` name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjObject {
    pub name: String,
    pub triangles: Vec<[Corner; 3]>,
}

/// Position-only triangles, welded by OBJ position index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlainMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Parsed OBJ file. Attribute arrays are shared by all objects.
#[derive(Clone, Debug, Default)]
pub struct ObjDocument {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    objects: Vec<ObjObject>,
    by_name: HashMap<String, usize>,
}

impl ObjDocument {
    /// Parse OBJ text. Faces declared before any `o` line belong to the
    /// object with an empty name.
    pub fn parse(contents: &str) -> Result<Self, DecodeError> {
        let mut doc = Self::default();
        let mut current: Option<usize> = None;

        for (line_no, line) in contents.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let Some(tag) = parts.next() else {
                continue;
            };

            match tag {
                "v" => {
                    let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                    let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                    let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                    doc.positions.push([x, y, z]);
                }
                "vt" => {
                    let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                    let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                    doc.texcoords.push([u, v]);
                }
                "vn" => {
                    let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                    let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                    let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                    doc.normals.push([nx, ny, nz]);
                }
                "o" => {
                    let name = trimmed[1..].trim();
                    current = Some(doc.object_slot(name));
                }
                "f" => {
                    let mut corners: Vec<Corner> = Vec::new();
                    for part in parts {
                        corners.push(parse_corner(
                            part,
                            doc.positions.len(),
                            doc.texcoords.len(),
                            doc.normals.len(),
                            line_no,
                        )?);
                    }

                    if corners.len() < 3 {
                        return Err(DecodeError::malformed(
                            line_no,
                            "face needs at least three vertices",
                        ));
                    }
                    let slot = *current.get_or_insert_with(|| doc.object_slot(""));
                    let object = &mut doc.objects[slot];
                    // Triangulate fan
                    for tri in 1..(corners.len() - 1) {
                        object
                            .triangles
                            .push([corners[0], corners[tri], corners[tri + 1]]);
                    }
                }
                _ => {
                    // Ignore other directives (g/s/mtllib/usemtl/etc.)
                }
            }
        }

        log::debug!(
            "Parsed OBJ: {} positions, {} objects",
            doc.positions.len(),
            doc.objects.len()
        );
        Ok(doc)
    }

    fn object_slot(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.by_name.get(name) {
            return slot;
        }
        let slot = self.objects.len();
        self.objects.push(ObjObject {
            name: name.to_owned(),
            triangles: Vec::new(),
        });
        self.by_name.insert(name.to_owned(), slot);
        slot
    }

    pub fn object(&self, name: &str) -> Option<&ObjObject> {
        self.by_name.get(name).map(|&slot| &self.objects[slot])
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjObject> {
        self.objects.iter()
    }

    /// Re-express every position and normal in another frame.
    pub fn map_frame(&mut self, to_frame: impl Fn([f32; 3]) -> [f32; 3]) {
        for p in &mut self.positions {
            *p = to_frame(*p);
        }
        for n in &mut self.normals {
            *n = to_frame(*n);
        }
    }

    /// Textured triangles of one object. Corners without a normal get the
    /// face normal; every corner must carry a texture coordinate.
    pub fn textured_mesh(&self, object: &ObjObject) -> Result<MeshData, DecodeError> {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        struct Key(Corner, Option<usize>);

        let mut unique: HashMap<Key, u32> = HashMap::new();
        let mut vertices: Vec<MeshVertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::with_capacity(object.triangles.len() * 3);

        for (face, tri) in object.triangles.iter().enumerate() {
            let face_normal = self.face_normal(tri);
            for corner in tri {
                let key = Key(*corner, corner.normal.is_none().then_some(face));
                let index = match unique.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let position = self.positions[corner.position];
                        let [u, v] = corner
                            .texcoord
                            .map(|i| self.texcoords[i])
                            .ok_or_else(|| DecodeError::MissingTexcoord(object.name.clone()))?;
                        let normal = corner
                            .normal
                            .map(|i| self.normals[i])
                            .unwrap_or(face_normal);

                        let idx = u32::try_from(vertices.len())
                            .map_err(|_| DecodeError::TooManyVertices)?;
                        // OBJ puts v = 0 at the bottom of the image.
                        vertices.push(MeshVertex::new(position, normal, [u, 1.0 - v]));
                        unique.insert(key, idx);
                        idx
                    }
                };
                indices.push(index);
            }
        }

        Ok(MeshData::new(vertices, indices))
    }

    /// Position-only triangles of one object, sharing vertices by position
    /// index so neighbouring faces share edges.
    pub fn plain_mesh(&self, object: &ObjObject) -> Result<PlainMesh, DecodeError> {
        let mut remap: HashMap<usize, u32> = HashMap::new();
        let mut mesh = PlainMesh::default();

        for tri in &object.triangles {
            for corner in tri {
                let index = match remap.get(&corner.position) {
                    Some(&idx) => idx,
                    None => {
                        let idx = u32::try_from(mesh.positions.len())
                            .map_err(|_| DecodeError::TooManyVertices)?;
                        mesh.positions.push(self.positions[corner.position]);
                        remap.insert(corner.position, idx);
                        idx
                    }
                };
                mesh.indices.push(index);
            }
        }

        Ok(mesh)
    }

    fn face_normal(&self, tri: &[Corner; 3]) -> [f32; 3] {
        let [a, b, c] = tri.map(|corner| Vec3::from(self.positions[corner.position]));
        (b - a)
            .cross(c - a)
            .try_normalize()
            .unwrap_or(Vec3::Z)
            .to_array()
    }
}

impl PlainMesh {
    /// Appends `other`, rebasing its indices past the current positions.
    pub fn append(&mut self, other: PlainMesh) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32, DecodeError> {
    let token = value.ok_or_else(|| DecodeError::malformed(line_no, format!("missing {what}")))?;
    token
        .parse::<f32>()
        .map_err(|e| DecodeError::malformed(line_no, format!("bad {what} '{token}': {e}")))
}

fn parse_corner(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    line_no: usize,
) -> Result<Corner, DecodeError> {
    let mut split = token.split('/');
    let pos = split
        .next()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DecodeError::malformed(line_no, format!("bad face element '{token}'")))?;
    let position = resolve_index(pos, pos_count, line_no)?;

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, tex_count, line_no)?),
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, norm_count, line_no)?),
        _ => None,
    };

    Ok(Corner {
        position,
        texcoord,
        normal,
    })
}

fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize, DecodeError> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| DecodeError::malformed(line_no, format!("invalid index '{token}'")))?;
    if raw == 0 {
        return Err(DecodeError::malformed(line_no, "OBJ indices are 1-based; found 0"));
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };

    if idx < 0 || idx as usize >= len {
        return Err(DecodeError::malformed(
            line_no,
            format!("index {raw} out of bounds (len={len})"),
        ));
    }

    Ok(idx as usize)
}
