//! Pod model decoder: picks the known parts out of the OBJ document and
//! builds the body mesh, its shadow volume and the gun variants.

use std::collections::HashMap;

use corelib::axis;

use crate::error::DecodeError;
use crate::mesh::MeshData;
use crate::obj::{ObjDocument, ObjObject, PlainMesh};
use crate::shadow::ShadowVolume;

/// Every sub-object of the Pod model that the viewer knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PodPart {
    Body,
    Cockpit,
    WheelFrontLeft,
    WheelFrontRight,
    WheelRearLeft,
    WheelRearRight,
    SwivelBase,
    SwivelMount,
    GunCannon,
    GunGatling,
    GunLaser,
    GunRocket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartRole {
    Body { casts_shadow: bool },
    Gun,
}

impl PodPart {
    /// Parts merged into the textured body mesh.
    pub const BODY: [PodPart; 8] = [
        PodPart::Body,
        PodPart::Cockpit,
        PodPart::WheelFrontLeft,
        PodPart::WheelFrontRight,
        PodPart::WheelRearLeft,
        PodPart::WheelRearRight,
        PodPart::SwivelBase,
        PodPart::SwivelMount,
    ];

    /// Body parts that also cast shadows.
    pub const SHADOW: [PodPart; 4] = [
        PodPart::Body,
        PodPart::Cockpit,
        PodPart::SwivelBase,
        PodPart::SwivelMount,
    ];

    /// Interchangeable guns, in display order.
    pub const GUNS: [PodPart; 4] = [
        PodPart::GunCannon,
        PodPart::GunGatling,
        PodPart::GunLaser,
        PodPart::GunRocket,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PodPart::Body => "body",
            PodPart::Cockpit => "cockpit",
            PodPart::WheelFrontLeft => "wheel_front_left",
            PodPart::WheelFrontRight => "wheel_front_right",
            PodPart::WheelRearLeft => "wheel_rear_left",
            PodPart::WheelRearRight => "wheel_rear_right",
            PodPart::SwivelBase => "swivel_base",
            PodPart::SwivelMount => "swivel_mount",
            PodPart::GunCannon => "gun_cannon",
            PodPart::GunGatling => "gun_gatling",
            PodPart::GunLaser => "gun_laser",
            PodPart::GunRocket => "gun_rocket",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::BODY
            .into_iter()
            .chain(Self::GUNS)
            .find(|part| part.name() == name)
    }

    pub fn role(self) -> PartRole {
        if Self::GUNS.contains(&self) {
            PartRole::Gun
        } else {
            PartRole::Body {
                casts_shadow: Self::SHADOW.contains(&self),
            }
        }
    }
}

/// Everything the scene needs from the model file.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBundle {
    pub primary: MeshData,
    pub shadow: ShadowVolume,
    /// Guns present in the file, in [`PodPart::GUNS`] order.
    pub guns: Vec<MeshData>,
}

impl MeshBundle {
    pub fn first_gun(&self) -> Option<&MeshData> {
        self.guns.first()
    }
}

/// Decode the Pod model. Geometry is converted from the file's Y-up frame
/// to the scene's Z-up frame here and nowhere else.
pub fn decode_pod(contents: &str) -> Result<MeshBundle, DecodeError> {
    let mut doc = ObjDocument::parse(contents)?;
    doc.map_frame(axis::to_z_up);

    let parts: HashMap<PodPart, &ObjObject> = doc
        .objects()
        .filter_map(|object| PodPart::from_name(&object.name).map(|part| (part, object)))
        .collect();

    let mut primary = MeshData::default();
    let mut casters = PlainMesh::default();
    for part in PodPart::BODY {
        let object = require(&parts, part)?;
        primary.append(doc.textured_mesh(object)?);
        if let PartRole::Body { casts_shadow: true } = part.role() {
            casters.append(doc.plain_mesh(object)?);
        }
    }
    let shadow = ShadowVolume::from_plain(&casters);

    // Guns are optional; a gun object without faces counts as absent.
    let mut guns = Vec::new();
    for part in PodPart::GUNS {
        match parts.get(&part) {
            Some(object) if !object.triangles.is_empty() => {
                guns.push(doc.textured_mesh(object)?);
            }
            Some(_) => log::debug!("Skipping empty gun '{}'", part.name()),
            None => {}
        }
    }

    log::info!(
        "Decoded Pod: {} body triangles, {} shadow triangles, {} guns",
        primary.triangle_count(),
        shadow.triangle_count(),
        guns.len()
    );

    Ok(MeshBundle {
        primary,
        shadow,
        guns,
    })
}

fn require<'a>(
    parts: &HashMap<PodPart, &'a ObjObject>,
    part: PodPart,
) -> Result<&'a ObjObject, DecodeError> {
    let object = parts
        .get(&part)
        .copied()
        .ok_or(DecodeError::MissingObject(part.name()))?;
    if object.triangles.is_empty() {
        return Err(DecodeError::EmptyObject(part.name()));
    }
    Ok(object)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fmt::Write;

    use super::*;

    /// OBJ text with one object per `(name, triangles)` entry. Object `i`
    /// sits at x = 10 * i so its geometry can be told apart.
    pub(crate) fn obj_with(objects: &[(&str, usize)]) -> String {
        let mut src = String::from("mtllib Pod.mtl\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 1 0\n");
        let mut base = 0;
        for (i, (name, triangles)) in objects.iter().enumerate() {
            let x = 10.0 * i as f32;
            writeln!(src, "o {name}\nusemtl Pod").unwrap();
            for t in 0..*triangles {
                let z = t as f32;
                writeln!(src, "v {x} 0 {z}\nv {} 0 {z}\nv {x} 1 {z}", x + 1.0).unwrap();
                writeln!(
                    src,
                    "f {}/1/1 {}/2/1 {}/3/1",
                    base + 1,
                    base + 2,
                    base + 3
                )
                .unwrap();
                base += 3;
            }
        }
        src
    }

    pub(crate) fn full_pod(guns: &[&str]) -> String {
        let mut objects: Vec<(&str, usize)> =
            PodPart::BODY.iter().map(|p| (p.name(), 1)).collect();
        objects.extend(guns.iter().map(|g| (*g, 1)));
        obj_with(&objects)
    }

    #[test]
    fn allow_lists_are_consistent() {
        for part in PodPart::SHADOW {
            assert!(PodPart::BODY.contains(&part));
            assert_eq!(part.role(), PartRole::Body { casts_shadow: true });
        }
        for part in PodPart::GUNS {
            assert!(!PodPart::BODY.contains(&part));
            assert_eq!(part.role(), PartRole::Gun);
        }
        for part in PodPart::BODY.into_iter().chain(PodPart::GUNS) {
            assert_eq!(PodPart::from_name(part.name()), Some(part));
        }
        assert_eq!(PodPart::from_name("antenna"), None);
    }

    #[test]
    fn body_parts_give_nonempty_primary_mesh() {
        let bundle = decode_pod(&full_pod(&[])).expect("decode");
        assert_eq!(bundle.primary.triangle_count(), 8);
        assert!(bundle.primary.is_valid());
        assert!(bundle.guns.is_empty());
        assert!(bundle.first_gun().is_none());
    }

    #[test]
    fn missing_body_part_fails() {
        let objects: Vec<(&str, usize)> = PodPart::BODY
            .iter()
            .filter(|p| **p != PodPart::Cockpit)
            .map(|p| (p.name(), 1))
            .collect();
        let err = decode_pod(&obj_with(&objects)).unwrap_err();
        assert!(matches!(err, DecodeError::MissingObject("cockpit")));
    }

    #[test]
    fn empty_body_part_fails() {
        let objects: Vec<(&str, usize)> = PodPart::BODY
            .iter()
            .map(|p| (p.name(), usize::from(*p != PodPart::WheelRearLeft)))
            .collect();
        let err = decode_pod(&obj_with(&objects)).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyObject("wheel_rear_left")));
    }

    #[test]
    fn shadow_comes_only_from_shadow_parts() {
        let mut objects: Vec<(&str, usize)> = vec![("gun_laser", 3), ("antenna", 5)];
        objects.extend(PodPart::BODY.iter().map(|p| (p.name(), 2)));
        let bundle = decode_pod(&obj_with(&objects)).expect("decode");
        assert_eq!(bundle.shadow.triangle_count(), 2 * PodPart::SHADOW.len());

        let shadow_slots: Vec<f32> = objects
            .iter()
            .enumerate()
            .filter(|(_, (name, _))| {
                PodPart::from_name(name).is_some_and(|p| PodPart::SHADOW.contains(&p))
            })
            .map(|(i, _)| 10.0 * i as f32)
            .collect();
        for p in bundle.shadow.positions() {
            let slot = (p.x / 10.0).floor() * 10.0;
            assert!(shadow_slots.contains(&slot), "unexpected caster at {p}");
        }
    }

    #[test]
    fn guns_follow_allow_list_order() {
        let objects: Vec<(&str, usize)> = vec![("gun_rocket", 4), ("gun_cannon", 1)]
            .into_iter()
            .chain(PodPart::BODY.iter().map(|p| (p.name(), 1)))
            .chain([("gun_laser", 3)])
            .collect();
        let bundle = decode_pod(&obj_with(&objects)).expect("decode");
        let counts: Vec<usize> = bundle.guns.iter().map(|g| g.triangle_count()).collect();
        assert_eq!(counts, vec![1, 3, 4]);
        assert_eq!(bundle.first_gun().map(|g| g.triangle_count()), Some(1));
    }

    #[test]
    fn empty_gun_is_skipped() {
        let mut src = full_pod(&["gun_cannon"]);
        src.push_str("o gun_laser\nusemtl Pod\n");
        let bundle = decode_pod(&src).expect("decode");
        assert_eq!(bundle.guns.len(), 1);
        assert_eq!(bundle.primary.triangle_count(), 8);
    }

    #[test]
    fn wheels_cast_no_shadow() {
        assert_eq!(
            PodPart::WheelRearRight.role(),
            PartRole::Body {
                casts_shadow: false
            }
        );
    }

    #[test]
    fn degenerate_face_in_body_fails() {
        let mut src = full_pod(&[]);
        src.push_str("o body\nf 1 2\n");
        assert!(matches!(
            decode_pod(&src).unwrap_err(),
            DecodeError::Malformed { .. }
        ));
    }

    #[test]
    fn body_without_texcoords_fails() {
        let src = full_pod(&[])
            .replace("/1/1", "//1")
            .replace("/2/1", "//1")
            .replace("/3/1", "//1");
        assert!(matches!(
            decode_pod(&src).unwrap_err(),
            DecodeError::MissingTexcoord(name) if name == "body"
        ));
    }

    #[test]
    fn all_four_guns_decode() {
        let bundle = decode_pod(&full_pod(&[
            "gun_gatling",
            "gun_rocket",
            "gun_cannon",
            "gun_laser",
        ]))
        .expect("decode");
        assert_eq!(bundle.guns.len(), 4);
    }

    #[test]
    fn geometry_is_converted_to_z_up_once() {
        let bundle = decode_pod(&full_pod(&[])).expect("decode");
        // First body triangle: file vertex (0, 1, 0) with normal (0, 1, 0).
        let top = bundle.primary.vertices[2];
        assert_eq!(top.position, axis::to_z_up([0.0, 1.0, 0.0]));
        assert_eq!(top.position, [0.0, 0.0, 1.0]);
        assert_eq!(top.normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn malformed_geometry_fails() {
        let mut src = full_pod(&[]);
        src.push_str("f 1/1/1 2/2/1 999/3/1\n");
        assert!(matches!(
            decode_pod(&src).unwrap_err(),
            DecodeError::Malformed { .. }
        ));
    }
}
