use uuid::Uuid;

use crate::models::Bubble;

/// The bubbles currently on screen, oldest first.
#[derive(Debug, Default)]
pub struct BubbleField {
    live: Vec<Bubble>,
}

impl BubbleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bubble: Bubble) {
        self.live.push(bubble);
    }

    /// Removes a bubble by id. Unknown or already-removed ids are a no-op.
    pub fn remove(&mut self, id: Uuid) -> Option<Bubble> {
        let index = self.live.iter().position(|b| b.id == id)?;
        Some(self.live.remove(index))
    }

    pub fn as_slice(&self) -> &[Bubble] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bubble(x: f32) -> Bubble {
        Bubble {
            id: Uuid::new_v4(),
            x_pct: x,
            y_pct: 50.0,
            size_px: 20.0,
        }
    }

    #[test]
    fn test_insert_keeps_creation_order() {
        let mut field = BubbleField::new();
        field.insert(bubble(1.0));
        field.insert(bubble(2.0));
        let xs: Vec<f32> = field.as_slice().iter().map(|b| b.x_pct).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut field = BubbleField::new();
        let b = bubble(1.0);
        let id = b.id;
        field.insert(b);

        assert!(field.remove(id).is_some());
        assert!(field.remove(id).is_none());
        assert_eq!(field.len(), 0);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut field = BubbleField::new();
        field.insert(bubble(1.0));
        assert!(field.remove(Uuid::new_v4()).is_none());
        assert_eq!(field.len(), 1);
    }
}
