use crate::command::with_document;
use crate::document::{DocumentHandle, DocumentRef};
use crate::errors::CommandError;
use glam::DVec3;
use quarry_model::{Brush, BrushFaceHandle, NodeId};
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::debug;

/// Moves a set of brush face boundaries by one delta.
#[derive(Debug)]
pub struct ResizeBrushesCommand {
    document: DocumentRef,
    name: String,
    // Sorted and deduplicated so face sets compare as sets.
    faces: Vec<BrushFaceHandle>,
    delta: DVec3,
    lock_textures: bool,
    previous: Option<Vec<(NodeId, Brush)>>,
}

impl ResizeBrushesCommand {
    pub fn resize_brushes(
        document: &DocumentHandle,
        faces: impl IntoIterator<Item = BrushFaceHandle>,
        delta: DVec3,
        lock_textures: bool,
    ) -> Self {
        let faces: BTreeSet<BrushFaceHandle> = faces.into_iter().collect();
        let brushes: BTreeSet<NodeId> = faces.iter().map(|face| face.brush).collect();
        let name = if brushes.len() == 1 {
            "Resize Brush"
        } else {
            "Resize Brushes"
        };

        Self {
            document: Rc::downgrade(document),
            name: name.to_string(),
            faces: faces.into_iter().collect(),
            delta,
            lock_textures,
            previous: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn faces(&self) -> &[BrushFaceHandle] {
        &self.faces
    }

    pub fn delta(&self) -> DVec3 {
        self.delta
    }

    pub fn lock_textures(&self) -> bool {
        self.lock_textures
    }

    pub(crate) fn perform_do(&mut self) -> Result<(), CommandError> {
        let previous = with_document(&self.document, |doc| {
            doc.resize_brushes(&self.faces, self.delta, self.lock_textures)
        })?;
        self.previous = Some(previous);
        Ok(())
    }

    pub(crate) fn perform_undo(&mut self) -> Result<(), CommandError> {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| CommandError::NotExecuted(self.name.clone()))?;
        with_document(&self.document, |doc| doc.restore_brushes(previous))?;
        self.previous = None;
        Ok(())
    }

    /// Same face set and texture lock flag: the deltas add up.
    pub(crate) fn collate_with(&mut self, other: &ResizeBrushesCommand) -> bool {
        if self.lock_textures != other.lock_textures || self.faces != other.faces {
            debug!(
                lock_textures = self.lock_textures,
                other_lock_textures = other.lock_textures,
                "Resize not collated"
            );
            return false;
        }
        self.delta += other.delta;
        true
    }
}
