use crate::cell::CellRef;

/// Where a hyperlink points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperlinkTarget {
    /// A location inside the same workbook, e.g. `'Taux CSG'!A1`
    Workbook { location: String },
    /// A URL, file or UNC path outside the workbook
    External,
}

/// A hyperlink anchored on a rectangular cell range (inclusive bounds)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub first: CellRef,
    pub last: CellRef,
    pub target: HyperlinkTarget,
    pub display: Option<String>,
}

impl Hyperlink {
    #[must_use]
    pub fn covers(&self, cell: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.col..=self.last.col).contains(&cell.col)
    }

    /// Name of the sheet targeted by an internal link.
    ///
    /// The location is split on the first `!` and surrounding quotes are
    /// stripped (`"'Taux CSG'!A1"` → `Taux CSG`).
    #[must_use]
    pub fn target_sheet(&self) -> Option<&str> {
        match &self.target {
            HyperlinkTarget::Workbook { location } => {
                let sheet = location.split('!').next().unwrap_or_default();
                let sheet = sheet.trim_start_matches('#');
                Some(sheet.trim_matches('"').trim_matches('\''))
            }
            HyperlinkTarget::External => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(location: &str) -> Hyperlink {
        Hyperlink {
            first: CellRef::new(0, 3),
            last: CellRef::new(0, 3),
            target: HyperlinkTarget::Workbook {
                location: location.to_string(),
            },
            display: None,
        }
    }

    #[test]
    fn test_target_sheet_strips_quotes() {
        assert_eq!(internal("'Taux CSG'!A1").target_sheet(), Some("Taux CSG"));
        assert_eq!(internal("\"CRDS\"!B2").target_sheet(), Some("CRDS"));
        assert_eq!(internal("SMIC").target_sheet(), Some("SMIC"));
    }

    #[test]
    fn test_external_has_no_target_sheet() {
        let link = Hyperlink {
            first: CellRef::new(0, 0),
            last: CellRef::new(1, 2),
            target: HyperlinkTarget::External,
            display: Some("site".to_string()),
        };
        assert_eq!(link.target_sheet(), None);
        assert!(link.covers(CellRef::new(1, 1)));
        assert!(!link.covers(CellRef::new(2, 0)));
    }
}
