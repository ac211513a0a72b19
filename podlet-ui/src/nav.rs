use std::rc::Rc;

use crate::page::PageHandle;

/// The chain of pages behind the one on display.  Descending pushes the
/// child, going back pops to the same parent instance the user left, and
/// popping at the root is refused.
pub struct Navigator {
    root: PageHandle,
    stack: Vec<PageHandle>,
}

impl Navigator {
    pub fn new(root: PageHandle) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    pub fn current(&self) -> PageHandle {
        Rc::clone(self.stack.last().unwrap_or(&self.root))
    }

    pub fn push(&mut self, page: PageHandle) {
        self.stack.push(page);
    }

    /// Drop the current page, unless it is the root.  Returns whether the
    /// display moved.
    pub fn pop(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    /// Replace the whole history with a new root.  Used when the boot
    /// screen hands over to the loaded catalog.
    pub fn reset(&mut self, root: PageHandle) {
        self.root = root;
        self.stack.clear();
    }

    pub fn depth(&self) -> usize {
        self.stack.len() + 1
    }
}
