//! Extraction engine for the IPP tax-benefit tables.
//!
//! Each data sheet of a workbook follows the same vertical layout: a row of
//! short variable names, stacked label rows, chronological value rows, then
//! optional note and description rows. The engine decodes cells through
//! their number formats and merged regions ([`DecodeContext`]), classifies
//! rows ([`classify_rows`]), folds label rows into [`ColumnLabels`] and
//! assembles every value row into a [`ValueRecord`].
//!
//! Two outputs are built from there:
//! - a parameter tree ([`RootNode`]) rendered as tag-per-node markup by
//!   [`render_tree`],
//! - one YAML [`SheetDocument`] per sheet, written by [`export_workbook`].
//!
//! # Examples
//!
//! ```
//! use baremes_core::{extract_sheet, ExtractConfig, SheetNode};
//! use baremes_sheet::{CellRef, CellValue, DateMode, Sheet};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec![CellValue::from("date"), CellValue::from("csg_taux")],
//!     vec![CellValue::from("Date d'effet"), CellValue::from("Taux")],
//!     vec![CellValue::from("1998"), CellValue::Number(0.075)],
//! ]);
//! sheet.set_name("CSG");
//! sheet.set_number_format(CellRef::new(2, 1), "0.0%");
//!
//! let config = ExtractConfig::default();
//! let extracted = extract_sheet(&sheet, DateMode::Windows1900, &config).unwrap();
//! let node = SheetNode::build(&extracted, "Taux de CSG", &config).unwrap();
//! assert_eq!(node.variables[0].name, "csg_taux");
//! assert_eq!(node.variables[0].values[0].value.to_string(), "0.075");
//! ```

mod audit;
mod classify;
mod config;
mod convert;
mod dates;
mod decode;
mod error;
mod extract;
mod labels;
mod markup;
mod record;
mod slug;
mod tree;
mod value;
mod yaml;

pub use audit::{audit_workbook, DuplicateNamesReport};
pub use classify::{classify_rows, ClassifiedRows, RowState, ValueRow};
pub use config::ExtractConfig;
pub use convert::{convert_francs, francs_to_euros, FRANCS_PER_EURO};
pub use dates::{format_date_serial, parse_date_or_year, parse_text_date, DateCell};
pub use decode::{classify_number_format, decode_value, error_name, CellAddress, DecodeContext, NumberFormat};
pub use error::{ExtractError, ExtractResult};
pub use extract::{data_sheets, extract_sheet, join_cells, sheet_titles, ExtractedSheet};
pub use labels::{ColumnLabels, LabelPath};
pub use markup::render_tree;
pub use record::{
    assemble_record, canonical_label, canonical_path, clean_line, ValueRecord, ENTRY_DATE_LABEL,
    LAW_REFERENCE_LABEL, NOTES_LABEL, PUBLICATION_DATE_LABEL,
};
pub use slug::slugify;
pub use tree::{ParameterNode, RootNode, SheetNode, ValueNode, VariableNode};
pub use value::{DecodedValue, Number, Unit};
pub use yaml::{export_workbook, ExportReport, Nested, SheetDocument};
