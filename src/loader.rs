use crate::error::SetupError;
use crate::geometry::{Shape, Triangle};
use crate::material::{Material, MaterialKind};
use crate::math::{Color, Point3, Vec2, Vec3};
use crate::scene::Scene;
use crate::texture::Texture;
use std::path::Path;

/// Loads a triangulated OBJ model (plus its MTL materials and diffuse
/// textures) into the scene. Returns the number of triangles added.
///
/// Vertex normals and texture coordinates are zero-filled when the file does
/// not provide them; the intersection code falls back to flat face normals
/// in that case.
pub fn load_obj_into(scene: &mut Scene, path: &Path) -> Result<usize, SetupError> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
    };
    let (models, materials) =
        tobj::load_obj(path, &options).map_err(|source| SetupError::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;
    let materials = materials.map_err(|source| SetupError::ModelLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    // Material slots in scene-pool terms, parallel to the MTL list; one
    // fallback slot for meshes without a material reference.
    let mut slots = Vec::with_capacity(materials.len());
    for mtl in &materials {
        slots.push(convert_material(scene, mtl, base_dir)?);
    }
    let fallback = scene.add_material(Material::diffuse(Color::splat(0.8)));

    let mut triangles = 0;
    for model in &models {
        let mesh = &model.mesh;
        let material = mesh
            .material_id
            .map_or(fallback, |id| slots.get(id).copied().unwrap_or(fallback));

        for face in mesh.indices.chunks_exact(3) {
            let positions = [
                read_vec3(&mesh.positions, face[0]),
                read_vec3(&mesh.positions, face[1]),
                read_vec3(&mesh.positions, face[2]),
            ];
            let normals = if mesh.normals.is_empty() {
                [Vec3::zero(); 3]
            } else {
                [
                    read_vec3(&mesh.normals, face[0]),
                    read_vec3(&mesh.normals, face[1]),
                    read_vec3(&mesh.normals, face[2]),
                ]
            };
            let uvs = if mesh.texcoords.is_empty() {
                [Vec2::zero(); 3]
            } else {
                [
                    read_vec2(&mesh.texcoords, face[0]),
                    read_vec2(&mesh.texcoords, face[1]),
                    read_vec2(&mesh.texcoords, face[2]),
                ]
            };

            scene.add_primitive(
                Shape::Triangle(Triangle::new(positions, normals, uvs)),
                material,
            );
            triangles += 1;
        }
    }

    log::info!(
        "loaded {}: {} triangles, {} materials",
        path.display(),
        triangles,
        materials.len()
    );
    Ok(triangles)
}

fn convert_material(
    scene: &mut Scene,
    mtl: &tobj::Material,
    base_dir: &Path,
) -> Result<usize, SetupError> {
    let albedo = mtl
        .diffuse
        .map_or(Color::splat(0.8), |[r, g, b]| {
            Color::new(r as f64, g as f64, b as f64)
        });
    let emission = mtl
        .unknown_param
        .get("Ke")
        .map_or(Color::zero(), |v| parse_triple(v));

    // PBR roughness when the exporter wrote it; otherwise fall back to the
    // Phong-lobe variance mapping of Ns.
    let roughness = mtl.unknown_param.get("Pr").map_or_else(
        || {
            let shininess = mtl.shininess.unwrap_or(0.0) as f64;
            (2.0 / (shininess + 2.0)).sqrt()
        },
        |v| v.parse().unwrap_or(1.0),
    );
    let metallic: f64 = mtl
        .unknown_param
        .get("Pm")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0);
    let ior = mtl.optical_density.map_or(1.5, f64::from);

    let kind = match mtl.illumination_model.unwrap_or(2) {
        0..=2 => MaterialKind::Diffuse,
        3 | 5 | 8 => MaterialKind::Specular,
        4 | 6 | 7 | 9 => MaterialKind::Dielectric,
        _ => MaterialKind::Diffuse,
    };

    let texture = match &mtl.diffuse_texture {
        Some(rel) => {
            let texture = Texture::load(&base_dir.join(rel))?;
            Some(scene.add_texture(texture))
        }
        None => None,
    };

    Ok(scene.add_material(Material {
        kind,
        albedo,
        emission,
        ior,
        roughness: roughness.clamp(0.0, 1.0),
        metallic: metallic.clamp(0.0, 1.0),
        texture,
    }))
}

fn read_vec3(data: &[f32], index: u32) -> Point3 {
    let i = index as usize * 3;
    Point3::new(data[i] as f64, data[i + 1] as f64, data[i + 2] as f64)
}

fn read_vec2(data: &[f32], index: u32) -> Vec2 {
    let i = index as usize * 2;
    Vec2::new(data[i] as f64, data[i + 1] as f64)
}

fn parse_triple(value: &str) -> Color {
    let mut parts = value.split_whitespace().map(|p| p.parse().unwrap_or(0.0));
    let r = parts.next().unwrap_or(0.0);
    let g = parts.next().unwrap_or(r);
    let b = parts.next().unwrap_or(r);
    Color::new(r, g, b)
}
