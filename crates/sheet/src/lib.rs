//! Workbook model for the IPP tax-benefit tables.
//!
//! A [`Book`] holds raw [`CellValue`]s per [`Sheet`], together with the
//! metadata needed to interpret them: merged regions, per-cell number
//! formats, hyperlinks and the workbook's [`DateMode`].
//!
//! # Examples
//!
//! ```
//! use baremes_sheet::{CellRef, CellValue, MergedRegion, Sheet};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Date", "Taux", ""],
//!     vec!["", "", ""],
//! ]);
//! sheet.add_merged_region(MergedRegion::new(0, 1, 1, 3));
//!
//! let resolver = sheet.merge_resolver();
//! let anchor = resolver.resolve(CellRef::new(0, 2));
//! assert_eq!(sheet.get(anchor), &CellValue::from("Taux"));
//! ```
//!
//! ## Loading a workbook
//!
//! ```no_run
//! use baremes_sheet::Book;
//!
//! let book = Book::from_xls("Baremes IPP - prelevements sociaux.xls").unwrap();
//! for sheet in book.sheets() {
//!     println!("{}: {} rows", sheet.name(), sheet.row_count());
//! }
//! ```

mod biff;
mod book;
mod cell;
mod error;
mod hyperlink;
mod merge;
mod sheet;
mod xls;

pub use book::{Book, DateMode};
pub use cell::{CellRef, CellValue};
pub use error::{Result, SheetError};
pub use hyperlink::{Hyperlink, HyperlinkTarget};
pub use merge::{MergeResolver, MergedRegion};
pub use sheet::Sheet;
