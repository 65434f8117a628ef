//! Blocks and Jacobians of calibrated curves.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

use super::CurveBuildingBlock;
use crate::error::{CurveError, CurveResult};

/// For each calibrated curve, its block and the Jacobian ∂parameters/∂quotes.
///
/// The Jacobian of a curve with n parameters has n rows and one column per
/// quote of the block, in block order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveBuildingBlockBundle {
    blocks: BTreeMap<String, (CurveBuildingBlock, DMatrix<f64>)>,
}

impl CurveBuildingBlockBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a curve's block and Jacobian, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// `MathError` if the Jacobian does not match the block, or the block
    /// does not list the curve itself with as many quotes as the Jacobian
    /// has rows.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        block: CurveBuildingBlock,
        matrix: DMatrix<f64>,
    ) -> CurveResult<()> {
        let name = name.into();
        if matrix.ncols() != block.total() {
            return Err(CurveError::math_error(format!(
                "Jacobian of {name} has {} columns, block has {} quotes",
                matrix.ncols(),
                block.total()
            )));
        }
        match block.entry(&name) {
            Some(entry) if entry.count == matrix.nrows() => {}
            _ => {
                return Err(CurveError::math_error(format!(
                    "block of {name} does not list it with {} quotes",
                    matrix.nrows()
                )));
            }
        }
        self.blocks.insert(name, (block, matrix));
        Ok(())
    }

    /// Adds every entry of another bundle.
    pub fn add_all(&mut self, other: &Self) {
        for (name, entry) in &other.blocks {
            self.blocks.insert(name.clone(), entry.clone());
        }
    }

    /// A new bundle with the entries of both; `other` wins on clashes.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.add_all(other);
        merged
    }

    /// Block of a curve.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&CurveBuildingBlock> {
        self.blocks.get(name).map(|(block, _)| block)
    }

    /// Jacobian of a curve.
    #[must_use]
    pub fn matrix(&self, name: &str) -> Option<&DMatrix<f64>> {
        self.blocks.get(name).map(|(_, matrix)| matrix)
    }

    /// True if the curve has an entry.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Number of quotes the curve depends on, its dependencies' included.
    #[must_use]
    pub fn quote_count(&self, name: &str) -> Option<usize> {
        self.block(name).map(CurveBuildingBlock::total)
    }

    /// Curve names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Number of curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True if the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
