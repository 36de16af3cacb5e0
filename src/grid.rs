use anyhow::bail;

// Rectangular byte grid, addressed as `(row, column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
    cells: Vec<Vec<u8>>,
}

impl Grid {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let cells: Vec<Vec<u8>> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(|line| line.bytes().collect())
            .collect();

        let Some(width) = cells.first().map(Vec::len) else {
            bail!("grid is empty");
        };
        if let Some(row) = cells.iter().position(|row| row.len() != width) {
            bail!(
                "grid row {row} has width {}, expected {width}",
                cells[row].len()
            );
        }

        Ok(Grid {
            height: cells.len(),
            width,
            cells,
        })
    }

    pub fn get(&self, (x, y): (usize, usize)) -> Option<u8> {
        self.cells.get(x).and_then(|row| row.get(y)).copied()
    }

    pub fn find(&self, cell: u8) -> Option<(usize, usize)> {
        self.positions_of(cell).next()
    }

    pub fn positions_of(&self, cell: u8) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(x, row)| {
            row.iter()
                .enumerate()
                .filter(move |&(_, &c)| c == cell)
                .map(move |(y, _)| (x, y))
        })
    }

    pub fn neighbors(&self, (x, y): (usize, usize)) -> Vec<(usize, usize)> {
        let directions = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        let mut neighbors = Vec::with_capacity(directions.len());

        for &(dx, dy) in &directions {
            let new_x = x as isize + dx;
            let new_y = y as isize + dy;
            if new_x >= 0 && new_y >= 0 && new_x < self.height as isize && new_y < self.width as isize
            {
                neighbors.push((new_x as usize, new_y as usize));
            }
        }

        neighbors
    }

    pub fn neighbors_with_stay(&self, position: (usize, usize)) -> Vec<(usize, usize)> {
        let mut neighbors = self.neighbors(position);
        neighbors.push(position);
        neighbors
    }
}
