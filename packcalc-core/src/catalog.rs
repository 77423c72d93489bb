//! Lookups the parameter form draws cells and tyre sizes from.

use crate::imports::*;
use crate::pack::CellTemplate;
use crate::vehicle::TyreSize;

/// Source of cell records, addressed by position
pub trait CellCatalog {
    fn cell(&self, index: usize) -> CalcResult<&CellTemplate>;

    fn num_cells(&self) -> usize;

    /// Position of the cell called `name`
    fn find_cell(&self, name: &str) -> Option<usize> {
        (0..self.num_cells()).find(|&i| matches!(self.cell(i), Ok(cell) if cell.name == name))
    }
}

/// Source of tyre sizes, addressed by position
pub trait TyreCatalog {
    fn tyre(&self, index: usize) -> CalcResult<TyreSize>;

    fn num_tyres(&self) -> usize;
}

/// In-memory cell library, typically loaded from YAML
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellLibrary {
    pub cells: Vec<CellTemplate>,
}

impl SerdeAPI for CellLibrary {
    fn init(&mut self) -> anyhow::Result<()> {
        for (i, cell) in self.cells.iter().enumerate() {
            cell.init_checks()
                .with_context(|| format!("cell {i} ({:?}) in library", cell.name))?;
        }
        Ok(())
    }
}

impl CellCatalog for CellLibrary {
    fn cell(&self, index: usize) -> CalcResult<&CellTemplate> {
        self.cells.get(index).ok_or_else(|| {
            CalcError::Validation(format!(
                "no cell at index {index}, library holds {}",
                self.cells.len()
            ))
        })
    }

    fn num_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Tyre size codes such as `"225/50R17"`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreList {
    pub codes: Vec<String>,
}

impl SerdeAPI for TyreList {
    fn init(&mut self) -> anyhow::Result<()> {
        for code in &self.codes {
            TyreSize::from_code(code)?;
        }
        Ok(())
    }
}

impl TyreCatalog for TyreList {
    fn tyre(&self, index: usize) -> CalcResult<TyreSize> {
        let code = self.codes.get(index).ok_or_else(|| {
            CalcError::Validation(format!(
                "no tyre at index {index}, list holds {}",
                self.codes.len()
            ))
        })?;
        TyreSize::from_code(code)
    }

    fn num_tyres(&self) -> usize {
        self.codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_library_lookup() {
        let mut second = CellTemplate::default();
        second.name = "second".into();
        let lib = CellLibrary {
            cells: vec![CellTemplate::default(), second.clone()],
        };
        assert_eq!(lib.num_cells(), 2);
        assert_eq!(lib.cell(1).unwrap(), &second);
        assert!(lib.cell(2).is_err());
        assert_eq!(lib.find_cell("second"), Some(1));
        assert_eq!(lib.find_cell("missing"), None);
    }

    #[test]
    fn test_tyre_list() {
        let tyres = TyreList::from_yaml("codes: [\"205/55R16\", \"255/35R20\"]\n").unwrap();
        assert_eq!(tyres.num_tyres(), 2);
        assert_eq!(tyres.tyre(1).unwrap().rim_diameter_in, 20.0);
        assert!(tyres.tyre(5).is_err());
        assert!(TyreList::from_yaml("codes: [\"wide\"]\n").is_err());
    }

    #[cfg(feature = "resources")]
    #[test]
    fn test_packaged_cell_library() {
        let lib = CellLibrary::from_resource("cells/sample_cells.yaml").unwrap();
        assert!(lib.num_cells() >= 3);
        assert!(lib.find_cell("generic 21700").is_some());
    }
}
