use crate::state::{ItemId, LinkItem, PipelineStatus, StatusDetails};
use crate::url::LinkCandidate;
use crate::PipelineError;

/// Ordered collection of the items of one run
///
/// Every mutation goes through [`ItemStore::update_status`]. The scheduler
/// holds the store by `&mut` and only writes to it between window barriers,
/// so worker tasks never observe a half-applied update.
#[derive(Debug, Clone)]
pub struct ItemStore<S> {
    items: Vec<LinkItem<S>>,
}

impl<S: PipelineStatus> ItemStore<S> {
    /// Creates one item per candidate, all in the initial status
    pub fn seed(candidates: Vec<LinkCandidate>) -> Self {
        let items = candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| LinkItem::new(ItemId(index), candidate))
            .collect();
        Self { items }
    }

    /// Rebuilds a store from the item list of an earlier snapshot
    pub fn from_items(items: Vec<LinkItem<S>>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&LinkItem<S>> {
        self.items.get(id.0).filter(|item| item.id == id)
    }

    /// All items, in original candidate order
    pub fn items(&self) -> &[LinkItem<S>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LinkItem<S>> {
        self.items
    }

    /// Ids of every item, in original candidate order
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Sets the status of one item together with its details
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Status written
    /// * `Err(PipelineError::UnknownItem)` - No item with that id
    pub fn update_status(
        &mut self,
        id: ItemId,
        status: S,
        details: StatusDetails,
    ) -> Result<(), PipelineError> {
        let item = self.get_mut(id)?;
        tracing::trace!("{} {} -> {}", id, item.status, status);
        item.apply(status, details);
        Ok(())
    }

    /// Puts an item back in the initial status and counts the attempt
    pub(crate) fn requeue(&mut self, id: ItemId) -> Result<(), PipelineError> {
        self.get_mut(id)?.attempts += 1;
        self.update_status(id, S::initial(), StatusDetails::default())
    }

    /// Puts back an earlier copy of an item, attempts included
    pub(crate) fn restore(&mut self, item: LinkItem<S>) -> Result<(), PipelineError> {
        let slot = self.get_mut(item.id)?;
        tracing::trace!("{} {} -> {} (restored)", item.id, slot.status, item.status);
        *slot = item;
        Ok(())
    }

    /// Returns the items matching a predicate, in original order
    pub fn selectable<P>(&self, predicate: P) -> Vec<&LinkItem<S>>
    where
        P: Fn(&LinkItem<S>) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut LinkItem<S>, PipelineError> {
        self.items
            .get_mut(id.0)
            .filter(|item| item.id == id)
            .ok_or(PipelineError::UnknownItem(id.0))
    }
}
