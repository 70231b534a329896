//! Marked-cell bookkeeping and win detection for one bingo card

/// Marks of one player's card
///
/// A board is won when a full row, a full column or, on square boards only,
/// either diagonal is marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    height: usize,
    width: usize,
    marked: Vec<bool>,
    joker: Option<(usize, usize)>,
}

impl Board {
    /// Create a board with no marks
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            marked: vec![false; height * width],
            joker: None,
        }
    }

    /// Create a board whose centre cell is a pre-marked Joker when the board
    /// is square with an odd side of at least 3; otherwise same as `new`
    pub fn with_joker(height: usize, width: usize) -> Self {
        let mut board = Self::new(height, width);
        if let Some(centre) = Self::joker_cell(height, width) {
            board.marked[centre.0 * width + centre.1] = true;
            board.joker = Some(centre);
        }
        board
    }

    /// Centre cell that carries the Joker for this board shape, if any
    pub fn joker_cell(height: usize, width: usize) -> Option<(usize, usize)> {
        if height == width && height >= 3 && height % 2 == 1 {
            Some((height / 2, width / 2))
        } else {
            None
        }
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether diagonals count towards a win
    pub fn is_square(&self) -> bool {
        self.height == self.width
    }

    /// Joker position, if this board has one
    pub fn joker(&self) -> Option<(usize, usize)> {
        self.joker
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    /// Whether the cell is marked; out-of-range cells are never marked
    pub fn is_marked(&self, row: usize, col: usize) -> bool {
        self.index(row, col).is_some_and(|idx| self.marked[idx])
    }

    /// Mark a cell; returns false when the cell is out of range
    pub fn mark(&mut self, row: usize, col: usize) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.marked[idx] = true;
                true
            }
            None => false,
        }
    }

    /// Flip a cell's mark. The Joker stays marked. Returns the new mark.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        if self.joker == Some((row, col)) {
            return true;
        }
        match self.index(row, col) {
            Some(idx) => {
                self.marked[idx] = !self.marked[idx];
                self.marked[idx]
            }
            None => false,
        }
    }

    /// Number of marked cells
    pub fn marked_count(&self) -> usize {
        self.marked.iter().filter(|m| **m).count()
    }

    /// Win detection over rows, columns and (square boards only) diagonals
    pub fn has_bingo(&self) -> bool {
        if self.height == 0 || self.width == 0 {
            return false;
        }

        let row_done = (0..self.height).any(|r| (0..self.width).all(|c| self.is_marked(r, c)));
        if row_done {
            return true;
        }

        let col_done = (0..self.width).any(|c| (0..self.height).all(|r| self.is_marked(r, c)));
        if col_done {
            return true;
        }

        if !self.is_square() {
            return false;
        }

        let n = self.height;
        let main_diagonal = (0..n).all(|i| self.is_marked(i, i));
        let anti_diagonal = (0..n).all(|i| self.is_marked(i, n - 1 - i));
        main_diagonal || anti_diagonal
    }
}
