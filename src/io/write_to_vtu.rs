use std::path::Path;

use ndarray::ArrayView2;
use vtkio::{
    Vtk,
    model::{
        Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType,
        IOBuffer, UnstructuredGridPiece, Version, VertexNumbers,
    },
};

use crate::disc::grid::Grid;
use crate::error::Result;

/// Quad-cell unstructured grid with the nodal field as point data `u`.
pub fn write_nodal_solution(
    solution: ArrayView2<f64>,
    grid: &Grid,
    time: f64,
    filename: impl AsRef<Path>,
) -> Result<()> {
    grid.check_scalar_shape(solution.shape())?;
    let mut vtk_points = Vec::with_capacity(3 * grid.node_count());
    let mut point_solutions = Vec::with_capacity(grid.node_count());
    for i in 0..grid.nx() {
        for j in 0..grid.ny() {
            let (x, y) = grid.coordinates(i, j);
            vtk_points.push(x);
            vtk_points.push(y);
            vtk_points.push(0.0); // Z-coordinate
            point_solutions.push(solution[[i, j]]);
        }
    }

    let num_cells = (grid.nx() - 1) * (grid.ny() - 1);
    let mut connectivity = Vec::with_capacity(4 * num_cells);
    for i in 0..grid.nx() - 1 {
        for j in 0..grid.ny() - 1 {
            // counter-clockwise in the (x, y) plane
            connectivity.extend([
                grid.index(i, j) as u64,
                grid.index(i + 1, j) as u64,
                grid.index(i + 1, j + 1) as u64,
                grid.index(i, j + 1) as u64,
            ]);
        }
    }

    let vtk_file = Vtk {
        version: Version::XML { major: 1, minor: 0 },
        title: format!("t = {time}"),
        byte_order: ByteOrder::native(),
        data: DataSet::inline(UnstructuredGridPiece {
            points: IOBuffer::F64(vtk_points),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets: (0..num_cells).map(|c| ((c + 1) * 4) as u64).collect(),
                },
                types: vec![CellType::Quad; num_cells],
            },
            data: Attributes {
                point: vec![Attribute::DataArray(DataArray {
                    name: "u".to_string(),
                    elem: ElementType::Scalars {
                        num_comp: 1,
                        lookup_table: None,
                    },
                    data: IOBuffer::F64(point_solutions),
                })],
                cell: vec![],
            },
        }),
        file_path: None,
    };
    vtk_file.export(filename.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_vtu_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u_0.vtu");
        let grid = Grid::new(3, 4, [0.0, 0.0], [1.0, 1.0]).unwrap();
        let u = grid.scalar_field_from_fn(|x, y| x * y);
        write_nodal_solution(u.view(), &grid, 0.5, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("UnstructuredGrid"));
        assert!(text.contains("NumberOfPoints"));
    }
}
