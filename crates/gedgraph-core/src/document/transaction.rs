//! Transactions, listeners and undo

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Datelike, Utc};

use crate::document::changes::{ChangeSet, DocumentListener, ListenerId, Transaction};
use crate::document::Document;
use crate::errors::{GedcomError, Result};
use crate::graph::NodeId;
use crate::time::PointInTime;
use crate::{log_op_end, log_op_error, log_op_start};

impl Document {
    /// Open the document's single transaction
    ///
    /// # Errors
    ///
    /// Returns `TransactionAlreadyOpen` when a transaction is open.
    pub fn start_transaction(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(GedcomError::TransactionAlreadyOpen);
        }
        self.transaction = Some(Transaction::new(false));
        Ok(())
    }

    pub fn is_transaction_open(&self) -> bool {
        self.transaction.is_some()
    }

    /// Commit the open transaction
    ///
    /// # Panics
    ///
    /// Panics when no transaction is open; that is a caller bug.
    pub fn commit(&mut self) -> ChangeSet {
        match self.try_commit() {
            Ok(changes) => changes,
            Err(err) => panic!("{err}"),
        }
    }

    /// Commit the open transaction, reporting misuse as an error
    ///
    /// Touched entities are stamped first, then the sets are frozen and
    /// listeners are notified in reverse registration order.
    ///
    /// # Errors
    ///
    /// Returns `TransactionMisuse` when no transaction is open.
    pub fn try_commit(&mut self) -> Result<ChangeSet> {
        log_op_start!("commit");
        let start = std::time::Instant::now();

        let changes = self.commit_impl().map_err(|e| {
            log_op_error!("commit", e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!(
            "commit",
            duration_ms = start.elapsed().as_millis() as u64,
            change_set_id = %changes.id(),
            change_count = changes.change_count(),
            listener_count = self.listeners.len()
        );
        Ok(changes)
    }

    fn commit_impl(&mut self) -> Result<ChangeSet> {
        let undo = match &self.transaction {
            Some(tx) => tx.undo,
            None => {
                return Err(GedcomError::TransactionMisuse {
                    message: "commit without an open transaction".to_string(),
                })
            }
        };
        if !undo {
            if let Some(at) = self.stamp_policy.stamp_time() {
                if let Err(err) = self.stamp_touched(at) {
                    tracing::warn!(
                        component = module_path!(),
                        op = "commit",
                        error = %err,
                        "could not stamp modified entities"
                    );
                }
            }
        }

        let tx = self
            .transaction
            .take()
            .ok_or_else(|| GedcomError::TransactionMisuse {
                message: "transaction closed while committing".to_string(),
            })?;
        let (changes, journal) = tx.freeze();
        if !changes.is_empty() {
            self.unsaved = true;
        }
        if !undo && self.options.keep_undo_history && !journal.is_empty() {
            self.undo_stack.push_back(journal);
            while self.undo_stack.len() > self.options.undo_depth {
                self.undo_stack.pop_front();
            }
        }
        if self.undo_stack.is_empty() {
            self.arena.free_detached();
        }

        self.notify(&changes);
        Ok(changes)
    }

    fn notify(&mut self, changes: &ChangeSet) {
        let listeners = std::mem::take(&mut self.listeners);
        let document: &Document = self;
        for (id, listener) in listeners.iter().rev() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                listener.handle_commit(document, changes)
            }));
            if outcome.is_err() {
                tracing::error!(
                    component = module_path!(),
                    op = "commit",
                    listener = %id,
                    change_set_id = %changes.id(),
                    "listener panicked"
                );
            }
        }
        self.listeners = listeners;
    }

    /// Write `CHAN:DATE` and `CHAN:DATE:TIME` on every touched entity
    fn stamp_touched(&mut self, at: DateTime<Utc>) -> Result<()> {
        let touched: Vec<NodeId> = match &self.transaction {
            Some(tx) => tx
                .touched_entities
                .iter()
                .copied()
                .filter(|e| self.contains(*e))
                .collect(),
            None => return Ok(()),
        };
        let date = PointInTime::gregorian(at.day() as u8, at.month() as u8, at.year()).to_string();
        let time = at.format("%H:%M:%S").to_string();
        for entity in touched {
            let chan = self.ensure_child(entity, "CHAN", "")?;
            let date_node = self.ensure_child(chan, "DATE", &date)?;
            self.ensure_child(date_node, "TIME", &time)?;
        }
        Ok(())
    }

    fn ensure_child(&mut self, parent: NodeId, tag: &str, value: &str) -> Result<NodeId> {
        let existing = self
            .node(parent)?
            .children()
            .iter()
            .copied()
            .find(|c| self.node(*c).is_ok_and(|n| n.tag() == tag));
        match existing {
            Some(child) => {
                if self.node(child)?.value() != value {
                    self.set_value(child, value)?;
                }
                Ok(child)
            }
            None => self.add_child(parent, tag, value),
        }
    }

    /// Run `edit` inside a transaction and commit it
    ///
    /// When `edit` fails its mutations are reverted, nothing is committed
    /// and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAlreadyOpen` when a transaction is open, or the
    /// error of `edit`.
    pub fn edit<T>(&mut self, edit: impl FnOnce(&mut Document) -> Result<T>) -> Result<(T, ChangeSet)> {
        self.start_transaction()?;
        match edit(self) {
            Ok(value) => {
                let changes = self.try_commit()?;
                Ok((value, changes))
            }
            Err(err) => {
                self.rollback_open()?;
                Err(err)
            }
        }
    }

    /// Revert and discard the open transaction without notifying anyone
    fn rollback_open(&mut self) -> Result<()> {
        let journal = match self.transaction.as_mut() {
            Some(tx) => std::mem::take(&mut tx.journal),
            None => return Ok(()),
        };
        let reverted = journal
            .iter()
            .rev()
            .try_for_each(|change| self.apply_inverse(change));
        self.transaction = None;
        reverted
    }

    /// Register a listener for committed change sets
    pub fn add_listener(&mut self, listener: impl DocumentListener + 'static) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener; false when it was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    /// Whether a non-empty transaction was committed since the last save
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    /// Revert the most recent committed transaction
    ///
    /// The reversal runs in its own transaction, so listeners receive a
    /// change set flagged as undo. Cascades are not re-run; the journal
    /// already holds every primitive change.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAlreadyOpen` when a transaction is open and
    /// `NothingToUndo` when the history is empty.
    pub fn undo(&mut self) -> Result<ChangeSet> {
        log_op_start!("undo");
        let start = std::time::Instant::now();

        let changes = self.undo_impl().map_err(|e| {
            log_op_error!("undo", e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!(
            "undo",
            duration_ms = start.elapsed().as_millis() as u64,
            change_set_id = %changes.id(),
            change_count = changes.change_count()
        );
        Ok(changes)
    }

    fn undo_impl(&mut self) -> Result<ChangeSet> {
        if self.transaction.is_some() {
            return Err(GedcomError::TransactionAlreadyOpen);
        }
        let journal = self.undo_stack.pop_back().ok_or(GedcomError::NothingToUndo)?;
        self.transaction = Some(Transaction::new(true));
        let reverted = journal
            .iter()
            .rev()
            .try_for_each(|change| self.apply_inverse(change));
        if let Err(err) = reverted {
            // the undo transaction journaled every step it managed to take
            let restored = self.rollback_open();
            self.undo_stack.push_back(journal);
            restored?;
            return Err(err);
        }
        self.try_commit()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Forget the undo history and release detached nodes
    pub fn clear_undo(&mut self) {
        self.undo_stack.clear();
        let freed = self.arena.free_detached();
        tracing::debug!(component = module_path!(), op = "clear_undo", freed);
    }
}
