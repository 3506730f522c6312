#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// Cold-rooms sheet matching the `camaras` preset; one row lacks a product.
pub const CAMARAS_CSV: &str = "MARCA,PRODUCTO,CAJA APROX,UBICACION\n\
Acme,Widget,10,Camara 1\n\
Acme,Gadget,4,Reefer 2\n\
Globex,Widget,6,Camara 1\n\
Initech,,9,Camara 2\n\
Globex,Gizmo,N/A,Reefer 2\n";

/// Loose-units sheet matching the `sueltos` preset.
pub const SUELTOS_CSV: &str = "PRODUCTO,MARCA,CAJAS,UNID X CAJA,UNIDADES,UBICACION\n\
Widget,Acme,10,5,3,Camara 1\n\
Gadget,Globex,2,12,,Reefer 2\n\
Gizmo,Acme,1,6,0,Camara 1\n";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}

/// Joins rows of cells into a comma-separated payload.
pub fn csv_payload(rows: &[Vec<String>]) -> Vec<u8> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

/// A workbook cell: numbers are written as numeric cells, everything else as text.
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Builds an in-memory XLSX workbook with one worksheet.
pub fn xlsx_payload(sheet_name: &str, rows: &[Vec<Cell<'_>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).expect("sheet name");
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(r, c, *text).expect("write string");
                }
                Cell::Number(value) => {
                    worksheet.write_number(r, c, *value).expect("write number");
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save_to_buffer().expect("xlsx buffer")
}
