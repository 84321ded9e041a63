//! Undo/redo over whole-document snapshots.

use crate::document::Document;
use crate::error::KernelResult;
use std::collections::VecDeque;

/// Maximum number of undo states to keep.
pub const MAX_HISTORY: usize = 50;

/// Bounded past/future stacks around the present document.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Document>,
    future: Vec<Document>,
    present: Document,
    max_depth: usize,
}

impl History {
    pub fn new(document: Document) -> Self {
        Self::with_max_depth(document, MAX_HISTORY)
    }

    pub fn with_max_depth(document: Document, max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            present: document,
            max_depth: max_depth.max(1),
        }
    }

    /// The current document.
    pub fn present(&self) -> &Document {
        &self.present
    }

    /// Make `document` current, pushing the old one onto the undo stack.
    /// Clears the redo stack.
    pub fn commit(&mut self, document: Document) {
        let previous = std::mem::replace(&mut self.present, document);
        self.push_past(previous);
        self.future.clear();
        log::debug!("History commit: {} undo, 0 redo", self.past.len());
    }

    /// Commit the result of a gesture unless it left the document unchanged.
    ///
    /// Returns `false` when `before` and `after` serialize identically.
    pub fn commit_gesture(&mut self, before: &Document, after: Document) -> KernelResult<bool> {
        if serde_json::to_string(before)? == serde_json::to_string(&after)? {
            log::trace!("Skipping no-op gesture");
            return Ok(false);
        }
        self.commit(after);
        Ok(true)
    }

    /// Returns true if undo was performed.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        log::debug!("Undo: {} undo, {} redo", self.past.len(), self.future.len());
        true
    }

    /// Returns true if redo was performed.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.push_past(current);
        log::debug!("Redo: {} undo, {} redo", self.past.len(), self.future.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    fn push_past(&mut self, document: Document) {
        self.past.push_back(document);
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ConductorClass, ConductorColor, LineConductor, Mark};
    use kurbo::Point;

    fn with_line(doc: &Document) -> Document {
        let mut next = doc.clone();
        next.add_line(LineConductor::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        ));
        next
    }

    #[test]
    fn test_undo_redo_restore_documents() {
        let before = Document::new();
        let after = with_line(&before);
        let mut history = History::new(before.clone());
        history.commit(after.clone());
        assert!(history.can_undo());

        assert!(history.undo());
        assert_eq!(history.present(), &before);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(history.present(), &after);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut history = History::new(Document::new());
        history.commit(with_line(history.present()));
        history.undo();
        let mut other = history.present().clone();
        other.add_mark(Mark::new(Point::new(1.0, 1.0)));
        history.commit(other);
        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_depth_is_capped() {
        let mut history = History::with_max_depth(Document::new(), 3);
        for i in 0..10 {
            let mut next = history.present().clone();
            next.add_mark(Mark::new(Point::new(i as f64, 0.0)));
            history.commit(next);
            assert!(history.undo_depth() <= 3);
        }
        let mut undone = 0;
        while history.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(history.present().marks.len(), 7);
        assert!(history.redo_depth() <= 3);
    }

    #[test]
    fn test_default_depth() {
        let mut history = History::new(Document::new());
        for i in 0..(MAX_HISTORY + 5) {
            let mut next = history.present().clone();
            next.add_mark(Mark::new(Point::new(i as f64, 0.0)));
            history.commit(next);
        }
        assert_eq!(history.undo_depth(), MAX_HISTORY);
    }

    #[test]
    fn test_noop_gesture_is_not_committed() {
        let doc = with_line(&Document::new());
        let mut history = History::new(doc.clone());
        assert!(!history.commit_gesture(&doc, doc.clone()).unwrap());
        assert!(!history.can_undo());

        let mut moved = doc.clone();
        moved.lines[0].end = Point::new(20.0, 0.0);
        assert!(history.commit_gesture(&doc, moved.clone()).unwrap());
        assert_eq!(history.present(), &moved);
        assert!(history.undo());
        assert_eq!(history.present(), &doc);
    }
}
