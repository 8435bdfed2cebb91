use std::cmp::min;

/// Selection inside a list or grid whose length can change under it (for
/// example after a delete).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected as isize;
        let max_index = (len - 1) as isize;
        self.selected = (current + offset).clamp(0, max_index) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        self.selected = min(self.selected, len.saturating_sub(1));
    }

    pub(crate) fn current(&self, len: usize) -> Option<usize> {
        if self.selected < len {
            Some(self.selected)
        } else {
            None
        }
    }
}

/// Card grid on the home page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CardGrid {
    pub(crate) columns: usize,
}

impl CardGrid {
    /// Move left/right within the flattened grid.
    pub(crate) fn move_horizontal(&self, cursor: &mut ListCursor, offset: isize, len: usize) {
        cursor.move_selection(offset, len);
    }

    /// Move a whole row up or down, staying put if the target row is empty.
    pub(crate) fn move_vertical(&self, cursor: &mut ListCursor, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let target = cursor.selected as isize + offset * self.columns as isize;
        if target >= 0 && (target as usize) < len {
            cursor.selected = target as usize;
        }
    }

    pub(crate) fn row_of(&self, index: usize) -> usize {
        index / self.columns.max(1)
    }

    pub(crate) fn row_count(&self, len: usize) -> usize {
        len.div_ceil(self.columns.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_clamps_to_list_bounds() {
        let mut cursor = ListCursor::default();
        cursor.move_selection(-3, 4);
        assert_eq!(cursor.selected, 0);
        cursor.move_selection(10, 4);
        assert_eq!(cursor.selected, 3);
        cursor.ensure_in_bounds(2);
        assert_eq!(cursor.selected, 1);
        assert_eq!(cursor.current(0), None);
        cursor.select_last(6);
        assert_eq!(cursor.selected, 5);
        cursor.select_first();
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn grid_moves_by_rows() {
        let grid = CardGrid { columns: 3 };
        let mut cursor = ListCursor { selected: 1 };
        grid.move_vertical(&mut cursor, 1, 5);
        assert_eq!(cursor.selected, 4);
        grid.move_vertical(&mut cursor, 1, 5);
        assert_eq!(cursor.selected, 4);
        grid.move_horizontal(&mut cursor, -1, 5);
        assert_eq!(cursor.selected, 3);
        assert_eq!(grid.row_of(3), 1);
        assert_eq!(grid.row_count(5), 2);
        assert_eq!(grid.row_count(0), 0);
    }
}
