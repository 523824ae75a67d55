use crate::model::{Project, Row};

/// Why a notification fired. Carried to listeners so the render side can
/// patch narrowly (e.g. a single cell) instead of rebuilding everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Active sheet switched, or sheets added/renamed/removed.
    Sheet,
    /// Project title edited.
    Title,
    /// Sticky body text edited at these board coordinates.
    Text { col: usize, row: Row },
    /// Columns added/removed/moved, transitions or parallel flags changed.
    Structure,
    /// Detail editor committed a patch at these coordinates.
    Details { col: usize, row: Row },
    /// Column visibility toggled.
    Visibility,
    /// The whole project was replaced (import, undo, storage load).
    Loaded,
}

impl ChangeReason {
    /// Keystroke-rate reasons are coalesced to one delivery per frame.
    pub fn throttled(self) -> bool {
        matches!(self, ChangeReason::Text { .. } | ChangeReason::Title)
    }
}

/// Merged reason metadata for one delivered notification.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    reasons: Vec<ChangeReason>,
}

impl ChangeSet {
    pub fn merge(&mut self, reason: ChangeReason) {
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn contains(&self, reason: ChangeReason) -> bool {
        self.reasons.contains(&reason)
    }

    pub fn reasons(&self) -> &[ChangeReason] {
        &self.reasons
    }

    /// True when anything other than cell/title typing changed, i.e. the
    /// listener cannot get away with a narrow single-field patch.
    pub fn needs_full_rebuild(&self) -> bool {
        self.reasons.iter().any(|r| !r.throttled())
    }
}

pub type Listener = Box<dyn FnMut(&Project, &ChangeSet)>;

/// Subscription + delivery mechanism. Immediate reasons deliver
/// synchronously; throttled reasons park in `pending` until `flush` (the
/// event loop calls it once per frame). Batches coalesce everything in
/// between `begin_batch`/`end_batch` into a single delivery.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<Listener>,
    batch_depth: usize,
    batched: ChangeSet,
    pending: ChangeSet,
}

impl Notifier {
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Closing the outermost batch delivers one merged notification.
    pub fn end_batch(&mut self, project: &Project) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let mut set = std::mem::take(&mut self.pending);
            for reason in std::mem::take(&mut self.batched).reasons {
                set.merge(reason);
            }
            self.deliver(project, set);
        }
    }

    pub fn notify(&mut self, project: &Project, reason: ChangeReason) {
        if self.batch_depth > 0 {
            self.batched.merge(reason);
        } else if reason.throttled() {
            self.pending.merge(reason);
        } else {
            // Drain anything still pending so listeners never observe an
            // immediate change ordered ahead of an earlier throttled one.
            let mut set = std::mem::take(&mut self.pending);
            set.merge(reason);
            self.deliver(project, set);
        }
    }

    /// Deliver coalesced throttled notifications. Returns true when a
    /// delivery happened. Latest state always wins; intermediate states
    /// between flushes are intentionally lost.
    pub fn flush(&mut self, project: &Project) -> bool {
        if self.batch_depth > 0 || self.pending.is_empty() {
            return false;
        }
        let set = std::mem::take(&mut self.pending);
        self.deliver(project, set);
        true
    }

    fn deliver(&mut self, project: &Project, set: ChangeSet) {
        if set.is_empty() {
            return;
        }
        for listener in &mut self.listeners {
            listener(project, &set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoardConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counting_notifier() -> (Notifier, Rc<RefCell<Vec<Vec<ChangeReason>>>>) {
        let mut notifier = Notifier::default();
        let log: Rc<RefCell<Vec<Vec<ChangeReason>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        notifier.subscribe(Box::new(move |_, set| {
            sink.borrow_mut().push(set.reasons().to_vec());
        }));
        (notifier, log)
    }

    #[test]
    fn immediate_reason_delivers_synchronously() {
        let project = Project::new(&BoardConfig::default());
        let (mut notifier, log) = counting_notifier();
        notifier.notify(&project, ChangeReason::Structure);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn throttled_reasons_coalesce_until_flush() {
        let project = Project::new(&BoardConfig::default());
        let (mut notifier, log) = counting_notifier();
        for _ in 0..50 {
            notifier.notify(&project, ChangeReason::Text { col: 0, row: Row::Input });
        }
        assert!(log.borrow().is_empty());
        assert!(notifier.flush(&project));
        assert_eq!(log.borrow().len(), 1);
        assert!(!notifier.flush(&project));
    }

    #[test]
    fn immediate_reason_drains_pending_first() {
        let project = Project::new(&BoardConfig::default());
        let (mut notifier, log) = counting_notifier();
        notifier.notify(&project, ChangeReason::Title);
        notifier.notify(&project, ChangeReason::Sheet);
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert!(log[0].contains(&ChangeReason::Title));
        assert!(log[0].contains(&ChangeReason::Sheet));
    }

    #[test]
    fn batch_coalesces_to_one_delivery_with_merged_reasons() {
        let project = Project::new(&BoardConfig::default());
        let (mut notifier, log) = counting_notifier();
        notifier.begin_batch();
        notifier.notify(&project, ChangeReason::Structure);
        notifier.notify(&project, ChangeReason::Visibility);
        notifier.notify(&project, ChangeReason::Structure);
        assert!(log.borrow().is_empty());
        notifier.end_batch(&project);
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].len(), 2);
    }

    #[test]
    fn nested_batches_deliver_on_outermost_close() {
        let project = Project::new(&BoardConfig::default());
        let (mut notifier, log) = counting_notifier();
        notifier.begin_batch();
        notifier.begin_batch();
        notifier.notify(&project, ChangeReason::Sheet);
        notifier.end_batch(&project);
        assert!(log.borrow().is_empty());
        notifier.end_batch(&project);
        assert_eq!(log.borrow().len(), 1);
    }
}
