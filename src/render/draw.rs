//! Scene-to-Bevy conversion: wedge meshes and label text.

use super::components::{WedgeLabel, WedgeMesh};
use crate::arc::Wedge;
use crate::core::Point;
use crate::scene::Scene;
use crate::sunburst::{LabelPlacement, Sunburst};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use lyon_tessellation::VertexBuffers;
use tracing::warn;

const LABEL_FONT_SIZE: f32 = 11.0;

/// Surface pixels (origin top-left, y down) to world units (origin centre, y up).
pub fn surface_to_world(p: Point, window: Vec2) -> Vec2 {
    Vec2::new(p.x as f32 - window.x * 0.5, window.y * 0.5 - p.y as f32)
}

/// Triangle mesh for tessellated wedge geometry centred on `origin` (world).
pub fn wedge_mesh(geometry: &VertexBuffers<[f32; 2], u32>, origin: Vec2) -> Mesh {
    let positions: Vec<[f32; 3]> = geometry
        .vertices
        .iter()
        .map(|[x, y]| [origin.x + x, origin.y - y, 0.0])
        .collect();
    let vertex_count = positions.len();
    let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; vertex_count];
    let uvs: Vec<[f32; 2]> = vec![[0.0, 0.0]; vertex_count];

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(geometry.indices.clone()));
    mesh
}

/// World transform of a label: rotated about the centre, pushed out along
/// the rotated axis, then flipped in place.
pub fn label_transform(placement: &LabelPlacement, origin: Vec2, z: f32) -> Transform {
    let turn = placement.rotate.to_radians() as f32;
    let offset = placement.offset as f32;
    // surface rotation is clockwise with y down, which is counter-clockwise negated in world space
    let along = Vec2::new(turn.cos(), -turn.sin()) * offset;
    let spin = -(turn + placement.flip.to_radians() as f32);
    Transform::from_translation((origin + along).extend(z)).with_rotation(Quat::from_rotation_z(spin))
}

/// `opacity` attribute or style as a factor; missing means opaque.
pub fn opacity(raw: Option<&str>) -> f32 {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .map_or(1.0, |v| v.clamp(0.0, 1.0))
}

/// Wrapped label lines as one newline-separated run.
fn label_text(scene: &Scene, label: crate::scene::ElementId) -> String {
    scene
        .select_all(label, "tspan")
        .into_iter()
        .filter_map(|t| scene.text(t))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Spawn one mesh and one label per node under `root`.
pub fn draw_sunburst(
    commands: &mut Commands,
    root: Entity,
    chart: &Sunburst,
    scene: &Scene,
    window: Vec2,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let Some(partition) = chart.partition() else {
        return;
    };
    let origin = surface_to_world(chart.center(), window);
    let scales = *chart.scales();
    let arc = scales.arc();

    for node in partition.nodes() {
        let Some(el) = chart.elements(node.id) else {
            continue;
        };
        let wedge: Wedge = arc.wedge(node);
        if wedge.is_empty() {
            continue;
        }
        let geometry = match wedge.tessellate() {
            Ok(g) => g,
            Err(report) => {
                warn!(node = %node.id, "skipping wedge: {report:?}");
                continue;
            }
        };

        let alpha = opacity(scene.style(el.path, "opacity"));
        let fill: Color = el.fill.with_a(el.fill.a * alpha).into();
        let mesh = meshes.add(wedge_mesh(&geometry, origin));
        let material = materials.add(ColorMaterial::from(fill));
        let depth = node.depth as f32 * 0.01;

        commands.entity(root).with_children(|parent| {
            parent.spawn((
                Mesh2d(mesh),
                MeshMaterial2d(material),
                Transform::from_translation(Vec3::new(0.0, 0.0, depth)),
                WedgeMesh { node: node.id },
            ));
        });

        let label_alpha = opacity(scene.attr(el.label, "opacity"));
        if label_alpha <= 0.0 {
            continue;
        }
        let placement = LabelPlacement::of(node, &scales);
        commands.entity(root).with_children(|parent| {
            parent.spawn((
                Text2d::new(label_text(scene, el.label)),
                TextFont {
                    font_size: LABEL_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::srgba(0.1, 0.1, 0.1, label_alpha)),
                label_transform(&placement, origin, 1.0 + depth),
                WedgeLabel { node: node.id },
            ));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_origin_maps_to_top_left() {
        let w = surface_to_world(Point::new(0.0, 0.0), Vec2::new(800.0, 600.0));
        assert_eq!(w, Vec2::new(-400.0, 300.0));
        let c = surface_to_world(Point::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        assert_eq!(c, Vec2::ZERO);
    }

    #[test]
    fn opacity_defaults_to_opaque() {
        assert_eq!(opacity(None), 1.0);
        assert_eq!(opacity(Some("0.8")), 0.8);
        assert_eq!(opacity(Some("2")), 1.0);
        assert_eq!(opacity(Some("auto")), 1.0);
    }

    #[test]
    fn label_at_twelve_o_clock_points_up() {
        // surface rotation -90 degrees is straight up from the centre
        let placement = LabelPlacement {
            rotate: -90.0,
            offset: 50.0,
            flip: 0.0,
        };
        let t = label_transform(&placement, Vec2::ZERO, 0.0);
        assert!(t.translation.x.abs() < 1e-4);
        assert!((t.translation.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn wedge_mesh_flips_y() {
        let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        geometry.vertices.extend([[0.0, -10.0], [10.0, 0.0], [0.0, 0.0]]);
        geometry.indices.extend([0, 1, 2]);
        let mesh = wedge_mesh(&geometry, Vec2::new(5.0, 5.0));
        assert_eq!(mesh.count_vertices(), 3);
        let Some(bevy_mesh::VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        assert_eq!(positions[0], [5.0, 15.0, 0.0]);
    }
}
