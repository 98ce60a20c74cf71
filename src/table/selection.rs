use std::collections::BTreeSet;

/// Ids of the checked rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: i64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Deselect exactly `visible` if all of them are selected, else select
    /// all of them. Ids outside `visible` are left alone.
    pub fn toggle_all(&mut self, visible: &[i64]) {
        if visible.is_empty() {
            return;
        }
        if self.all_selected(visible) {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }

    pub fn all_selected(&self, visible: &[i64]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_one_id() {
        let mut s = Selection::new();
        s.toggle(4);
        s.toggle(2);
        assert_eq!(s.ids(), vec![2, 4]);
        s.toggle(4);
        assert_eq!(s.ids(), vec![2]);
    }

    #[test]
    fn toggle_all_selects_then_deselects_visible_only() {
        let mut s = Selection::new();
        s.toggle(99);
        s.toggle(1);

        s.toggle_all(&[1, 2, 3]);
        assert_eq!(s.ids(), vec![1, 2, 3, 99]);

        s.toggle_all(&[1, 2, 3]);
        assert_eq!(s.ids(), vec![99]);
    }

    #[test]
    fn toggle_all_on_empty_page_is_a_no_op() {
        let mut s = Selection::new();
        s.toggle(5);
        s.toggle_all(&[]);
        assert_eq!(s.ids(), vec![5]);
        assert!(!s.all_selected(&[]));
    }
}
