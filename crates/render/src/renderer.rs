use glam::Vec3;

use crate::scene::{NodeKind, RetainedScene, SceneNode};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    /// Third-person chase camera behind the pinned vehicle.
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.5, -12.5),
            target: Vec3::new(0.0, 1.0, 5.0),
            fov_degrees: 45.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the attached scene and a view configuration, then
/// produces output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &RetainedScene, view: &RenderView) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable listing of the attached segments, sorted along
/// the road. Useful for CLI output, logging, and testing the scene interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list every child node.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &RetainedScene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene ({} nodes, {} total) ===\n",
            scene.len(),
            scene.total_node_count()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        let mut roots: Vec<&SceneNode> = scene.nodes().collect();
        roots.sort_by(|a, b| a.transform.position.z.total_cmp(&b.transform.position.z));

        for node in roots {
            let p = node.transform.position;
            out.push_str(&format!(
                "  [{}] {} z={:.2} children={}\n",
                node.id.short(),
                node.name,
                p.z,
                node.descendant_count()
            ));
            if self.verbose {
                for child in &node.children {
                    write_child(&mut out, child, 2);
                }
            }
        }

        out
    }
}

fn write_child(out: &mut String, node: &SceneNode, depth: usize) {
    let p = node.transform.position;
    let label = match &node.kind {
        NodeKind::Group => "group".to_string(),
        NodeKind::Strip { size, .. } => format!("strip {:.1}x{:.1}", size.x, size.z),
        NodeKind::Instance { reactive, .. } => {
            if *reactive {
                "instance (reactive)".to_string()
            } else {
                "instance".to_string()
            }
        }
    };
    out.push_str(&format!(
        "{}{} {} pos=({:.2}, {:.2}, {:.2})\n",
        "  ".repeat(depth),
        node.name,
        label,
        p.x,
        p.y,
        p.z
    ));
    for child in &node.children {
        write_child(out, child, depth + 1);
    }
}
