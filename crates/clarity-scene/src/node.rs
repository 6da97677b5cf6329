use clarity_core::math::Vec3;

use crate::geometry::{Geometry, RenderBucket};
use crate::queue::{Drawable, RenderQueue};

/// A child in the scene graph.
#[derive(Debug, Clone)]
pub enum Spatial {
    Node(Node),
    Geometry(Geometry),
}

impl Spatial {
    pub fn name(&self) -> &str {
        match self {
            Spatial::Node(node) => node.name(),
            Spatial::Geometry(geometry) => geometry.name(),
        }
    }
}

impl From<Node> for Spatial {
    fn from(node: Node) -> Self {
        Spatial::Node(node)
    }
}

impl From<Geometry> for Spatial {
    fn from(geometry: Geometry) -> Self {
        Spatial::Geometry(geometry)
    }
}

/// Scene graph node owning its children.
#[derive(Debug, Clone, Default)]
pub struct Node {
    name: String,
    translation: Vec3,
    bucket: Option<RenderBucket>,
    children: Vec<Spatial>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn bucket(&self) -> Option<RenderBucket> {
        self.bucket
    }

    /// Bucket for every descendant that does not pick its own.
    pub fn set_bucket(&mut self, bucket: RenderBucket) {
        self.bucket = Some(bucket);
    }

    pub fn attach_child(&mut self, child: impl Into<Spatial>) {
        self.children.push(child.into());
    }

    /// Detach the first direct child with the given name.
    pub fn detach_child_named(&mut self, name: &str) -> Option<Spatial> {
        let index = self.children.iter().position(|c| c.name() == name)?;
        Some(self.children.remove(index))
    }

    pub fn child_named(&self, name: &str) -> Option<&Spatial> {
        self.children.iter().find(|c| c.name() == name)
    }

    pub fn child_named_mut(&mut self, name: &str) -> Option<&mut Spatial> {
        self.children.iter_mut().find(|c| c.name() == name)
    }

    pub fn children(&self) -> &[Spatial] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn detach_all(&mut self) {
        self.children.clear();
    }

    /// All geometries below this node, depth first.
    pub fn geometries(&self) -> Vec<&Geometry> {
        let mut out = Vec::new();
        self.collect_geometries(&mut out);
        out
    }

    fn collect_geometries<'a>(&'a self, out: &mut Vec<&'a Geometry>) {
        for child in &self.children {
            match child {
                Spatial::Node(node) => node.collect_geometries(out),
                Spatial::Geometry(geometry) => out.push(geometry),
            }
        }
    }

    /// Visit every geometry below this node mutably, depth first.
    pub fn for_each_geometry_mut(&mut self, f: &mut impl FnMut(&mut Geometry)) {
        for child in &mut self.children {
            match child {
                Spatial::Node(node) => node.for_each_geometry_mut(f),
                Spatial::Geometry(geometry) => f(geometry),
            }
        }
    }
}

impl Drawable for Node {
    fn queue<'a>(&'a self, queue: &mut RenderQueue<'a>, origin: Vec3, bucket: RenderBucket) {
        let origin = origin + self.translation;
        let bucket = self.bucket.unwrap_or(bucket);
        for child in &self.children {
            match child {
                Spatial::Node(node) => node.queue(queue, origin, bucket),
                Spatial::Geometry(geometry) => queue.push(
                    geometry.bucket().unwrap_or(bucket),
                    geometry,
                    origin + geometry.translation(),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_render::{Material, Mesh, ShaderVariant};

    fn geometry(name: &str) -> Geometry {
        Geometry::new(
            name,
            Mesh::quad(1.0, 1.0),
            Material::new(ShaderVariant::Unshaded).into_shared(),
        )
    }

    #[test]
    fn test_attach_detach() {
        let mut root = Node::new("root");
        root.attach_child(geometry("a"));
        root.attach_child(Node::new("inner"));

        assert_eq!(root.child_count(), 2);
        assert!(root.child_named("inner").is_some());

        let detached = root.detach_child_named("a");
        assert!(matches!(detached, Some(Spatial::Geometry(_))));
        assert_eq!(root.child_count(), 1);
        assert!(root.detach_child_named("a").is_none());
    }

    #[test]
    fn test_geometries_recursive() {
        let mut inner = Node::new("inner");
        inner.attach_child(geometry("b"));
        inner.attach_child(geometry("c"));

        let mut root = Node::new("root");
        root.attach_child(geometry("a"));
        root.attach_child(inner);

        let names: Vec<&str> = root.geometries().iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let mut visited = 0;
        root.for_each_geometry_mut(&mut |g| {
            g.mesh_mut().set_dynamic();
            visited += 1;
        });
        assert_eq!(visited, 3);
    }
}
