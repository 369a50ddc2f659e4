use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use super::diff_mask::DiffMask;

/// Fans dirty bits raised on one entity out to every viewer that has it in
/// scope. Receivers are held weakly; a viewer dropping its receiver
/// unsubscribes it.
pub struct DirtyChannel {
    group_count: u8,
    receivers: Vec<Weak<RwLock<DiffMask>>>,
}

impl DirtyChannel {
    pub fn new(group_count: u8) -> Self {
        Self {
            group_count,
            receivers: Vec::new(),
        }
    }

    pub fn group_count(&self) -> u8 {
        self.group_count
    }

    /// Subscribes a new viewer. Its mask starts with every group dirty so that
    /// the first transmission is a full one.
    pub fn new_receiver(&mut self) -> DirtyReceiver {
        let receiver = DirtyReceiver::new(DiffMask::full(self.group_count));
        self.receivers.push(Arc::downgrade(&receiver.mask));
        receiver
    }

    pub fn send(&mut self, group: u8) {
        self.receivers.retain(|weak| match weak.upgrade() {
            Some(mask) => {
                let Ok(mut mask) = mask.write() else {
                    panic!("Mask held on current thread");
                };
                mask.set_bit(group, true);
                true
            }
            None => false,
        });
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// One viewer's pending mask for one entity.
#[derive(Clone)]
pub struct DirtyReceiver {
    mask: Arc<RwLock<DiffMask>>,
}

impl DirtyReceiver {
    fn new(mask: DiffMask) -> Self {
        Self {
            mask: Arc::new(RwLock::new(mask)),
        }
    }

    pub fn mask(&self) -> RwLockReadGuard<'_, DiffMask> {
        let Ok(mask) = self.mask.read() else {
            panic!("Mask held on current thread");
        };
        mask
    }

    fn mask_mut(&self) -> RwLockWriteGuard<'_, DiffMask> {
        let Ok(mask) = self.mask.write() else {
            panic!("Mask held on current thread");
        };
        mask
    }

    pub fn is_clear(&self) -> bool {
        self.mask().is_clear()
    }

    pub fn or_mask(&self, other: &DiffMask) {
        self.mask_mut().or(other);
    }

    pub fn nand_mask(&self, other: &DiffMask) {
        self.mask_mut().nand(other);
    }
}
