use tracing::{debug, info, warn};

use crate::editor::command::{Command, EditorEvent, Outcome};
use crate::editor::keymap::Keymap;
use crate::error::{TreeError, TreeResult};
use crate::tree::{Envelope, FocusCursor, Node, NodeId, NodeTree, Snapshot};

/// Proof that a load slot was reserved. Consumed by
/// [`Session::complete_load`] or [`Session::cancel_load`].
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// One open outline: the tree, its focus and pending render notifications.
#[derive(Debug)]
pub struct Session {
    tree: NodeTree,
    cursor: FocusCursor,
    keymap: Keymap,
    events: Vec<EditorEvent>,
    pending_load: Option<u64>,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh outline holding only the root.
    pub fn new() -> Self {
        Self::from_tree(NodeTree::new())
    }

    pub fn from_tree(tree: NodeTree) -> Self {
        let cursor = FocusCursor::new(&tree);
        let mut session = Self {
            tree,
            cursor,
            keymap: Keymap::default(),
            events: Vec::new(),
            pending_load: None,
            next_ticket: 0,
        };
        session.flush_focus();
        session
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn keymap(&self) -> Keymap {
        self.keymap
    }

    pub fn focused(&self) -> NodeId {
        self.cursor.current()
    }

    pub fn focused_node(&self) -> Option<&Node> {
        self.tree.get(self.cursor.current())
    }

    /// Run one command. Invariant errors leave the tree as it was.
    pub fn apply(&mut self, command: Command) -> TreeResult<Outcome> {
        let result = self.apply_inner(command);
        self.cursor.repair(&self.tree);
        self.flush_focus();
        result
    }

    /// Translate a digit key through the keymap and apply it.
    pub fn apply_digit(&mut self, digit: u8) -> TreeResult<Outcome> {
        match self.keymap.command_for_digit(digit) {
            Some(command) => self.apply(command),
            None => Ok(Outcome::Ignored),
        }
    }

    fn apply_inner(&mut self, command: Command) -> TreeResult<Outcome> {
        let focused = self.cursor.current();
        match command {
            Command::CreateChild { value } => {
                let id = self.tree.add_child(focused, value)?;
                self.cursor.focus(&self.tree, id);
                self.structure_changed();
                debug!(node = %id, parent = %focused, "created child");
                Ok(Outcome::Applied)
            }
            Command::DeleteFocused => {
                if focused == self.tree.root() {
                    debug!("delete ignored: focus is on the root");
                    return Ok(Outcome::Ignored);
                }
                let removed = self.tree.delete_node(focused)?;
                let parent = removed.parent().unwrap_or(self.tree.root());
                self.cursor.focus(&self.tree, parent);
                self.structure_changed();
                Ok(Outcome::Applied)
            }
            Command::GoToParent => Ok(moved(self.cursor.go_to_parent(&self.tree))),
            Command::GoToChild(index) => Ok(moved(self.cursor.go_to_child(&self.tree, index))),
            Command::SetValue(value) => {
                self.tree.set_value(focused, value)?;
                self.events.push(EditorEvent::ValueChanged(focused));
                Ok(Outcome::Applied)
            }
        }
    }

    /// Serialize the whole tree.
    pub fn save(&self, envelope: Envelope) -> TreeResult<String> {
        let text = Snapshot::capture(&self.tree).to_json_pretty(envelope)?;
        info!(
            nodes = self.tree.len(),
            envelope = envelope.as_str(),
            "outline serialized"
        );
        Ok(text)
    }

    pub fn load_pending(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Reserve the single load slot.
    pub fn begin_load(&mut self) -> TreeResult<LoadTicket> {
        if self.pending_load.is_some() {
            return Err(TreeError::LoadInFlight);
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending_load = Some(ticket);
        Ok(LoadTicket(ticket))
    }

    /// Replace the tree with the snapshot in `text` and focus its root.
    ///
    /// On any error the current tree and focus stay as they were. The slot is
    /// released either way.
    pub fn complete_load(&mut self, ticket: LoadTicket, text: &str) -> TreeResult<()> {
        if self.pending_load != Some(ticket.0) {
            return Err(TreeError::StaleLoadTicket(ticket.0));
        }
        self.pending_load = None;

        let tree = match NodeTree::from_json(text) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(error = %err, "load rejected, keeping current outline");
                return Err(err);
            }
        };
        self.replace_tree(tree);
        Ok(())
    }

    pub fn cancel_load(&mut self, ticket: LoadTicket) {
        if self.pending_load == Some(ticket.0) {
            self.pending_load = None;
        }
    }

    /// Swap in an already-built tree, focusing its root.
    pub fn replace_tree(&mut self, tree: NodeTree) {
        self.tree = tree;
        self.cursor = FocusCursor::new(&self.tree);
        self.events.push(EditorEvent::Loaded {
            nodes: self.tree.len(),
        });
        self.structure_changed();
        self.flush_focus();
        info!(nodes = self.tree.len(), "outline loaded");
    }

    /// Hand queued notifications to the renderer.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn structure_changed(&mut self) {
        self.events.push(EditorEvent::StructureChanged {
            revision: self.tree.revision(),
        });
    }

    fn flush_focus(&mut self) {
        if let Some(id) = self.cursor.take_focus_request() {
            self.events.push(EditorEvent::FocusMoved(id));
        }
    }
}

fn moved(changed: bool) -> Outcome {
    if changed {
        Outcome::Applied
    } else {
        Outcome::Ignored
    }
}
